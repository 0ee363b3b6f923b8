//! Filter and sort selections.
//!
//! Both are small immutable values: changing a selection builds a new one,
//! and the app recomputes its views from the base records.

use std::cmp::Ordering;

use crate::models::FlightRecord;

/// The current owner / aircraft / free-text selection. Empty means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub owner: Option<String>,
    pub registration: Option<String>,
    pub search: String,
}

impl FilterCriteria {
    pub fn with_owner(&self, owner: Option<String>) -> Self {
        Self {
            owner,
            ..self.clone()
        }
    }

    pub fn with_registration(&self, registration: Option<String>) -> Self {
        Self {
            registration,
            ..self.clone()
        }
    }

    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..self.clone()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_none() && self.registration.is_none() && self.search.trim().is_empty()
    }

    /// Search is a case-insensitive substring match over registration,
    /// type, both cities and owner.
    pub fn matches(&self, record: &FlightRecord) -> bool {
        if self.owner.as_ref().is_some_and(|o| *o != record.owner) {
            return false;
        }
        if self.registration.as_ref().is_some_and(|r| *r != record.registration) {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            &record.registration,
            &record.aircraft_type,
            &record.start_city,
            &record.end_city,
            &record.owner,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    pub fn apply(&self, records: &[FlightRecord]) -> Vec<FlightRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date,
    Registration,
    Owner,
    Duration,
    Distance,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Date,
        SortKey::Registration,
        SortKey::Owner,
        SortKey::Duration,
        SortKey::Distance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Registration => "aircraft",
            SortKey::Owner => "owner",
            SortKey::Duration => "duration",
            SortKey::Distance => "distance",
        }
    }

    pub fn next(self) -> SortKey {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self {
            key: SortKey::Date,
            direction: SortDirection::Descending,
        }
    }
}

impl SortOrder {
    /// Selecting the active key flips direction; a new key starts descending.
    pub fn toggled(self, key: SortKey) -> Self {
        if self.key == key {
            let direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
            Self { key, direction }
        } else {
            Self {
                key,
                direction: SortDirection::Descending,
            }
        }
    }

    /// Stable in-place sort.
    pub fn sort(self, records: &mut [FlightRecord]) {
        records.sort_by(|a, b| {
            let ord = self.compare(a, b);
            match self.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    fn compare(self, a: &FlightRecord, b: &FlightRecord) -> Ordering {
        match self.key {
            SortKey::Date => a.date.cmp(&b.date),
            SortKey::Registration => a.registration.cmp(&b.registration),
            SortKey::Owner => a.owner.cmp(&b.owner),
            SortKey::Duration => a.duration_minutes.total_cmp(&b.duration_minutes),
            SortKey::Distance => a.distance_km().total_cmp(&b.distance_km()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{flight, sample};

    fn owned(mut f: FlightRecord, owner: &str, city: &str) -> FlightRecord {
        f.owner = owner.to_string();
        f.start_city = city.to_string();
        f
    }

    #[test]
    fn test_empty_criteria_match_everything() {
        let criteria = FilterCriteria::default();
        assert!(criteria.is_empty());
        assert_eq!(criteria.apply(&sample()).len(), 3);
        assert!(criteria.with_search("   ").is_empty());
    }

    #[test]
    fn test_builders_leave_original_untouched() {
        let base = FilterCriteria::default();
        let by_owner = base.with_owner(Some("Acme".into()));
        let narrowed = by_owner.with_registration(Some("ABC".into()));
        assert_eq!(base, FilterCriteria::default());
        assert_eq!(by_owner.registration, None);
        assert_eq!(narrowed.owner.as_deref(), Some("Acme"));
        assert_eq!(narrowed.registration.as_deref(), Some("ABC"));
    }

    #[test]
    fn test_owner_and_registration_filters() {
        let records = vec![
            owned(flight("2024-01-01", "ABC", 60.0, "Hungary", "Austria"), "Acme", "Budapest"),
            owned(flight("2024-01-02", "XYZ", 60.0, "Austria", "Hungary"), "Acme", "Vienna"),
            owned(flight("2024-01-03", "ABC", 60.0, "Hungary", "Italy"), "Other", "Debrecen"),
        ];
        let acme = FilterCriteria::default().with_owner(Some("Acme".into()));
        assert_eq!(acme.apply(&records).len(), 2);

        let acme_abc = acme.with_registration(Some("ABC".into()));
        let hits = acme_abc.apply(&records);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].start_city, "Budapest");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let records = vec![
            owned(flight("2024-01-01", "HA-JET", 60.0, "Hungary", "Austria"), "Acme", "Budapest"),
            owned(flight("2024-01-02", "OE-XYZ", 60.0, "Austria", "Hungary"), "Other", "Vienna"),
        ];
        assert_eq!(FilterCriteria::default().with_search("buda").apply(&records).len(), 1);
        assert_eq!(FilterCriteria::default().with_search("ha-j").apply(&records).len(), 1);
        assert_eq!(FilterCriteria::default().with_search("OTHER").apply(&records).len(), 1);
        assert_eq!(FilterCriteria::default().with_search("citation").apply(&records).len(), 2);
        assert!(FilterCriteria::default().with_search("zurich").apply(&records).is_empty());
    }

    #[test]
    fn test_sort_toggle() {
        let order = SortOrder::default();
        assert_eq!(order.key, SortKey::Date);
        assert_eq!(order.direction, SortDirection::Descending);

        let flipped = order.toggled(SortKey::Date);
        assert_eq!(flipped.direction, SortDirection::Ascending);

        let by_owner = flipped.toggled(SortKey::Owner);
        assert_eq!(by_owner.key, SortKey::Owner);
        assert_eq!(by_owner.direction, SortDirection::Descending);
    }

    #[test]
    fn test_sort_records() {
        let mut records = sample();
        SortOrder::default().sort(&mut records);
        assert_eq!(records[0].registration, "XYZ");

        SortOrder { key: SortKey::Duration, direction: SortDirection::Ascending }.sort(&mut records);
        let durations: Vec<_> = records.iter().map(|r| r.duration_minutes).collect();
        assert_eq!(durations, vec![60.0, 90.0, 120.0]);

        SortOrder { key: SortKey::Registration, direction: SortDirection::Descending }.sort(&mut records);
        assert_eq!(records[0].registration, "XYZ");
    }

    #[test]
    fn test_sort_key_cycles() {
        let mut key = SortKey::Date;
        for _ in 0..SortKey::ALL.len() {
            key = key.next();
        }
        assert_eq!(key, SortKey::Date);
        assert_eq!(SortKey::Duration.next(), SortKey::Distance);
    }
}
