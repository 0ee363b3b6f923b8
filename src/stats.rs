//! The flight aggregation engine.
//!
//! Every function here is a pure pass over a slice of [`FlightRecord`]s:
//! nothing is cached, nothing is mutated, and empty input produces
//! zero-valued or empty results. The UI recomputes a [`Dashboard`] whenever
//! the filter selection changes.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{
    AircraftSummary, Country, CountryVisit, DailyBucket, FlightRecord, FlightStats, LocationDensity,
    MonthlyBucket,
};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Modelled operating cost of a private jet, in euros per flight hour.
pub const COST_PER_HOUR_EUR: f64 = 5000.0;

/// How an arrival in the same country as the departure is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalPolicy {
    /// A domestic hop is one visit: only the departure is tallied.
    #[default]
    SkipSameCountry,
    /// Every arrival is tallied, even when it matches the departure country.
    CountAll,
}

/// Haversine distance between two points in kilometres.
pub fn great_circle_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Estimated cost of `duration_minutes` of flying, rounded to whole euros.
pub fn estimate_flight_cost(duration_minutes: f64) -> i64 {
    (duration_minutes / 60.0 * COST_PER_HOUR_EUR).round() as i64
}

/// Totals over all records.
///
/// Cost is estimated once from the summed duration rather than summing
/// per-flight estimates, so rounding doesn't accumulate across short hops.
pub fn compute_flight_stats(records: &[FlightRecord]) -> FlightStats {
    let mut total_duration_minutes = 0.0;
    let mut total_distance_km = 0.0;
    let mut countries: HashSet<&str> = HashSet::new();

    for record in records {
        total_duration_minutes += record.duration_minutes;
        total_distance_km += record.distance_km();
        for country in [&record.start_country, &record.end_country] {
            if !country.is_empty() {
                countries.insert(country.key());
            }
        }
    }

    let average_flight_duration = if records.is_empty() {
        0.0
    } else {
        total_duration_minutes / records.len() as f64
    };

    FlightStats {
        total_flights: records.len(),
        total_duration_minutes,
        total_distance_km,
        estimated_cost: estimate_flight_cost(total_duration_minutes),
        unique_countries: countries.len(),
        average_flight_duration,
    }
}

/// Flights and minutes per calendar day, oldest first.
pub fn group_by_day(records: &[FlightRecord]) -> Vec<DailyBucket> {
    let mut days: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for record in records {
        let entry = days.entry(record.date.format("%Y-%m-%d").to_string()).or_default();
        entry.0 += 1;
        entry.1 += record.duration_minutes;
    }

    days.into_iter()
        .map(|(date, (flights, duration_minutes))| DailyBucket {
            date,
            flights,
            duration_minutes,
        })
        .collect()
}

/// Flights, minutes and estimated cost per `YYYY-MM`, oldest first.
pub fn group_by_month(records: &[FlightRecord]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for record in records {
        let entry = months.entry(record.date.format("%Y-%m").to_string()).or_default();
        entry.0 += 1;
        entry.1 += record.duration_minutes;
    }

    months
        .into_iter()
        .map(|(month, (flights, duration_minutes))| MonthlyBucket {
            month,
            flights,
            duration_minutes,
            estimated_cost: estimate_flight_cost(duration_minutes),
        })
        .collect()
}

/// Departures, arrivals and visits per country, most visited first.
///
/// Countries are keyed by [`Country::key`] and shown under the first name
/// seen for that key. Empty countries are skipped. Ties keep the order in
/// which countries were first seen.
pub fn compute_country_visits(records: &[FlightRecord], policy: ArrivalPolicy) -> Vec<CountryVisit> {
    let mut visits: Vec<CountryVisit> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    let mut bucket = |country: &Country| -> usize {
        if let Some(&i) = index.get(country.key()) {
            return i;
        }
        visits.push(CountryVisit {
            country: country.name().to_string(),
            code: country.code().to_string(),
            visits: 0,
            departures: 0,
            arrivals: 0,
        });
        index.insert(country.key().to_string(), visits.len() - 1);
        visits.len() - 1
    };

    let mut tallies: Vec<(usize, bool)> = Vec::new();
    for record in records {
        let start = &record.start_country;
        let end = &record.end_country;

        if !start.is_empty() {
            tallies.push((bucket(start), true));
        }

        let same_country = !start.is_empty() && start.key() == end.key();
        let skip = policy == ArrivalPolicy::SkipSameCountry && same_country;
        if !end.is_empty() && !skip {
            tallies.push((bucket(end), false));
        }
    }

    for (i, departure) in tallies {
        let visit = &mut visits[i];
        visit.visits += 1;
        if departure {
            visit.departures += 1;
        } else {
            visit.arrivals += 1;
        }
    }

    visits.sort_by(|a, b| b.visits.cmp(&a.visits));
    visits
}

/// Flight count per registration, busiest aircraft first.
///
/// With `owner_filter` set, only that owner's flights are considered. Type
/// and operator come from the first record seen for each registration.
pub fn compute_aircraft_summaries(records: &[FlightRecord], owner_filter: Option<&str>) -> Vec<AircraftSummary> {
    let mut summaries: Vec<AircraftSummary> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        if owner_filter.is_some_and(|owner| record.owner != owner) {
            continue;
        }
        match index.get(record.registration.as_str()) {
            Some(&i) => summaries[i].flight_count += 1,
            None => {
                index.insert(&record.registration, summaries.len());
                summaries.push(AircraftSummary {
                    registration: record.registration.clone(),
                    aircraft_type: record.aircraft_type.clone(),
                    operator: record.operator.clone(),
                    flight_count: 1,
                });
            }
        }
    }

    summaries.sort_by(|a, b| b.flight_count.cmp(&a.flight_count));
    summaries
}

/// Endpoint counts per 0.01° cell, densest first.
///
/// Start and end are counted independently, so a flight that starts and
/// ends in the same cell contributes two to it.
pub fn compute_location_density(records: &[FlightRecord]) -> Vec<LocationDensity> {
    let mut cells: Vec<LocationDensity> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        for (lat, lon) in [(record.start_lat, record.start_lon), (record.end_lat, record.end_lon)] {
            let (lat, lon) = (round_cell(lat), round_cell(lon));
            let key = format!("{lat:.2},{lon:.2}");
            match index.get(&key) {
                Some(&i) => cells[i].count += 1,
                None => {
                    index.insert(key, cells.len());
                    cells.push(LocationDensity { lat, lon, count: 1 });
                }
            }
        }
    }

    cells.sort_by(|a, b| b.count.cmp(&a.count));
    cells
}

// Rounds to two decimals; adding 0.0 folds -0.0 into the 0.0 cell.
fn round_cell(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

/// Distinct owners in alphabetical order.
pub fn list_owners(records: &[FlightRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.owner.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Every aggregate the views need, computed from one filtered record set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub stats: FlightStats,
    pub daily: Vec<DailyBucket>,
    pub monthly: Vec<MonthlyBucket>,
    pub countries: Vec<CountryVisit>,
    pub aircraft: Vec<AircraftSummary>,
    pub density: Vec<LocationDensity>,
}

impl Dashboard {
    pub fn compute(records: &[FlightRecord], policy: ArrivalPolicy) -> Self {
        Self {
            stats: compute_flight_stats(records),
            daily: group_by_day(records),
            monthly: group_by_month(records),
            countries: compute_country_visits(records, policy),
            aircraft: compute_aircraft_summaries(records, None),
            density: compute_location_density(records),
        }
    }

    /// Sum of visits across countries, the denominator for share columns.
    pub fn total_country_visits(&self) -> usize {
        self.countries.iter().map(|c| c.visits).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{flight, sample};

    fn with_coords(mut f: FlightRecord, start: (f64, f64), end: (f64, f64)) -> FlightRecord {
        f.start_lat = start.0;
        f.start_lon = start.1;
        f.end_lat = end.0;
        f.end_lon = end.1;
        f
    }

    #[test]
    fn test_distance_symmetric_and_zero() {
        let budapest = (47.4369, 19.2556);
        let london = (51.47, -0.4543);
        let ab = great_circle_distance_km(budapest.0, budapest.1, london.0, london.1);
        let ba = great_circle_distance_km(london.0, london.1, budapest.0, budapest.1);
        assert!((ab - ba).abs() < 1e-9);
        assert!((ab - 1490.0).abs() < 15.0, "got {ab}");
        assert_eq!(great_circle_distance_km(budapest.0, budapest.1, budapest.0, budapest.1), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = great_circle_distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.1);
    }

    #[test]
    fn test_cost_estimate() {
        assert_eq!(estimate_flight_cost(0.0), 0);
        assert_eq!(estimate_flight_cost(60.0), 5000);
        assert_eq!(estimate_flight_cost(90.0), 7500);
        assert_eq!(estimate_flight_cost(1.0), 83);
    }

    #[test]
    fn test_empty_stats() {
        let stats = compute_flight_stats(&[]);
        assert_eq!(stats, FlightStats::default());
        assert_eq!(stats.average_flight_duration, 0.0);
    }

    #[test]
    fn test_stats_for_sample() {
        let stats = compute_flight_stats(&sample());
        assert_eq!(stats.total_flights, 3);
        assert_eq!(stats.total_duration_minutes, 270.0);
        assert_eq!(stats.estimated_cost, 22_500);
        assert_eq!(stats.unique_countries, 3);
        assert_eq!(stats.average_flight_duration, 90.0);
    }

    #[test]
    fn test_cost_from_total_duration() {
        // 1 minute each rounds to 83, but three minutes together is 250.
        let records: Vec<_> = (0..3)
            .map(|_| flight("2024-01-01", "ABC", 1.0, "Hungary", "Austria"))
            .collect();
        assert_eq!(compute_flight_stats(&records).estimated_cost, 250);
    }

    #[test]
    fn test_stats_sum_distance() {
        let records = vec![
            with_coords(flight("2024-01-01", "A", 60.0, "", ""), (0.0, 0.0), (1.0, 0.0)),
            with_coords(flight("2024-01-02", "A", 60.0, "", ""), (1.0, 0.0), (0.0, 0.0)),
        ];
        let stats = compute_flight_stats(&records);
        assert!((stats.total_distance_km - 222.39).abs() < 0.1);
        assert_eq!(stats.unique_countries, 0);
    }

    #[test]
    fn test_group_by_day() {
        let days = group_by_day(&sample());
        assert_eq!(
            days,
            vec![
                DailyBucket { date: "2024-01-01".into(), flights: 2, duration_minutes: 180.0 },
                DailyBucket { date: "2024-02-15".into(), flights: 1, duration_minutes: 90.0 },
            ]
        );
    }

    #[test]
    fn test_group_by_month() {
        let mut records = sample();
        records.push(flight("2023-12-31", "XYZ", 30.0, "France", "Hungary"));
        let months = group_by_month(&records);
        let keys: Vec<_> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-01", "2024-02"]);
        assert_eq!(months[1].flights, 2);
        assert_eq!(months[1].estimated_cost, 15_000);
        assert_eq!(months[2].flights, 1);
    }

    #[test]
    fn test_grouping_is_a_partition() {
        let mut records = sample();
        records.extend((1..=20).map(|d| flight(&format!("2024-03-{d:02}"), "QQQ", 10.0, "Italy", "Spain")));
        let daily: usize = group_by_day(&records).iter().map(|b| b.flights).sum();
        let monthly: usize = group_by_month(&records).iter().map(|b| b.flights).sum();
        assert_eq!(daily, records.len());
        assert_eq!(monthly, records.len());
    }

    #[test]
    fn test_empty_groupings() {
        assert!(group_by_day(&[]).is_empty());
        assert!(group_by_month(&[]).is_empty());
        assert!(compute_country_visits(&[], ArrivalPolicy::default()).is_empty());
        assert!(compute_aircraft_summaries(&[], None).is_empty());
        assert!(compute_location_density(&[]).is_empty());
        assert!(list_owners(&[]).is_empty());
    }

    #[test]
    fn test_country_visits_sample() {
        let visits = compute_country_visits(&sample(), ArrivalPolicy::SkipSameCountry);
        let summary: Vec<_> = visits
            .iter()
            .map(|v| (v.country.as_str(), v.visits, v.departures, v.arrivals))
            .collect();
        assert_eq!(
            summary,
            vec![("Hungary", 3, 2, 1), ("Germany", 2, 1, 1), ("France", 1, 0, 1)]
        );
        assert_eq!(visits[0].code, "HU");
    }

    #[test]
    fn test_same_country_policy() {
        let records = vec![flight("2024-01-01", "ABC", 30.0, "Hungary", "Hungary")];

        let skipped = compute_country_visits(&records, ArrivalPolicy::SkipSameCountry);
        assert_eq!(skipped.len(), 1);
        assert_eq!((skipped[0].visits, skipped[0].departures, skipped[0].arrivals), (1, 1, 0));

        let counted = compute_country_visits(&records, ArrivalPolicy::CountAll);
        assert_eq!((counted[0].visits, counted[0].departures, counted[0].arrivals), (2, 1, 1));
    }

    #[test]
    fn test_country_name_variants_share_a_bucket() {
        let records = vec![
            flight("2024-05-01", "N1", 60.0, "USA", "United States"),
            flight("2024-05-02", "N1", 60.0, "United States", "USA"),
        ];

        let visits = compute_country_visits(&records, ArrivalPolicy::SkipSameCountry);
        let summary: Vec<_> = visits
            .iter()
            .map(|v| (v.country.as_str(), v.code.as_str(), v.visits, v.departures, v.arrivals))
            .collect();
        assert_eq!(summary, vec![("USA", "US", 2, 2, 0)]);

        let counted = compute_country_visits(&records, ArrivalPolicy::CountAll);
        assert_eq!((counted.len(), counted[0].visits, counted[0].arrivals), (1, 4, 2));

        assert_eq!(compute_flight_stats(&records).unique_countries, 1);
    }

    #[test]
    fn test_country_visits_skip_empty_and_ties_stable() {
        let records = vec![
            flight("2024-01-01", "A", 30.0, "", "Spain"),
            flight("2024-01-02", "A", 30.0, "Italy", ""),
            flight("2024-01-03", "A", 30.0, "Portugal", "Greece"),
        ];
        let visits = compute_country_visits(&records, ArrivalPolicy::SkipSameCountry);
        let order: Vec<_> = visits.iter().map(|v| v.country.as_str()).collect();
        assert_eq!(order, vec!["Spain", "Italy", "Portugal", "Greece"]);

        let departures: usize = visits.iter().map(|v| v.departures).sum();
        let with_start = records.iter().filter(|r| !r.start_country.is_empty()).count();
        assert_eq!(departures, with_start);
        assert!(visits.windows(2).all(|w| w[0].visits >= w[1].visits));
    }

    #[test]
    fn test_derived_countries_are_tallied() {
        let mut f = with_coords(flight("2024-01-01", "A", 30.0, "", ""), (47.43, 19.26), (0.0, 0.0));
        f.start_country = Country::derived(f.start_lat, f.start_lon);
        f.end_country = Country::derived(f.end_lat, f.end_lon);
        let visits = compute_country_visits(&[f], ArrivalPolicy::SkipSameCountry);
        assert_eq!(visits[0].country, "Hungary");
        assert_eq!(visits[1].country, "Unknown");
        assert_eq!(visits[1].code, "XX");
    }

    #[test]
    fn test_aircraft_summaries() {
        let mut records = sample();
        records[2].owner = "Acme Holdings".to_string();
        records.push({
            let mut f = flight("2024-03-01", "XYZ", 45.0, "France", "Hungary");
            f.owner = "Acme Holdings".to_string();
            f.aircraft_type = "Later Type".to_string();
            f
        });
        records.push({
            let mut f = flight("2024-03-02", "XYZ", 45.0, "Hungary", "France");
            f.owner = "Acme Holdings".to_string();
            f
        });

        let all = compute_aircraft_summaries(&records, None);
        assert_eq!(all[0].registration, "XYZ");
        assert_eq!(all[0].flight_count, 3);
        assert_eq!(all[0].aircraft_type, "Cessna Citation");
        assert_eq!(all[1].registration, "ABC");
        assert_eq!(all[1].flight_count, 2);

        let owned = compute_aircraft_summaries(&records, Some("Acme Holdings"));
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].registration, "XYZ");
        assert_eq!(
            owned[0].flight_count,
            records.iter().filter(|r| r.owner == "Acme Holdings" && r.registration == "XYZ").count()
        );

        assert!(compute_aircraft_summaries(&records, Some("Nobody")).is_empty());
    }

    #[test]
    fn test_location_density() {
        let records = vec![
            with_coords(flight("2024-01-01", "A", 30.0, "", ""), (47.4369, 19.2556), (48.1103, 16.5697)),
            with_coords(flight("2024-01-02", "A", 30.0, "", ""), (48.1098, 16.5701), (47.4371, 19.2559)),
            with_coords(flight("2024-01-03", "A", 30.0, "", ""), (-0.001, 0.001), (0.001, -0.001)),
        ];
        let cells = compute_location_density(&records);
        assert_eq!(cells.len(), 3);
        assert_eq!(cells.iter().map(|c| c.count).sum::<usize>(), 6);
        assert_eq!(cells[0].count, 2);
        assert_eq!((cells[0].lat, cells[0].lon), (47.44, 19.26));
        assert_eq!((cells[1].lat, cells[1].lon), (48.11, 16.57));
        // Both tiny offsets land in the origin cell regardless of sign.
        assert_eq!((cells[2].lat, cells[2].lon, cells[2].count), (0.0, 0.0, 2));
    }

    #[test]
    fn test_list_owners() {
        let mut records = sample();
        records[0].owner = "Zeta".to_string();
        records[1].owner = "Alpha".to_string();
        assert_eq!(list_owners(&records), vec!["Alpha", "Unknown", "Zeta"]);
    }

    #[test]
    fn test_dashboard_compute() {
        let dashboard = Dashboard::compute(&sample(), ArrivalPolicy::SkipSameCountry);
        assert_eq!(dashboard.stats.total_flights, 3);
        assert_eq!(dashboard.daily.len(), 2);
        assert_eq!(dashboard.monthly.len(), 2);
        assert_eq!(dashboard.countries.len(), 3);
        assert_eq!(dashboard.aircraft.len(), 2);
        assert_eq!(dashboard.total_country_visits(), 6);

        assert_eq!(Dashboard::compute(&[], ArrivalPolicy::CountAll), Dashboard::default());
    }
}
