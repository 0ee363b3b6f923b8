//! Coarse reverse geocoding from coordinates to countries.
//!
//! Countries are described by axis-aligned bounding boxes. Boxes overlap
//! (Austria and Hungary, France and Switzerland, ...), so lookups walk the
//! table in order and the first box that contains the point wins. Table
//! order is the priority; do not reorder entries without expecting the
//! country tallies of existing datasets to change.

/// A resolved country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryInfo {
    pub name: &'static str,
    pub code: &'static str,
}

/// Returned when no bounding box contains the point.
pub const UNKNOWN_COUNTRY: CountryInfo = CountryInfo {
    name: "Unknown",
    code: "XX",
};

struct CountryBounds {
    name: &'static str,
    code: &'static str,
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl CountryBounds {
    fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

macro_rules! bounds {
    ($name:expr, $code:expr, $min_lat:expr, $max_lat:expr, $min_lon:expr, $max_lon:expr) => {
        CountryBounds {
            name: $name,
            code: $code,
            min_lat: $min_lat,
            max_lat: $max_lat,
            min_lon: $min_lon,
            max_lon: $max_lon,
        }
    };
}

static COUNTRIES: &[CountryBounds] = &[
    bounds!("Hungary", "HU", 45.7, 48.6, 16.1, 22.9),
    bounds!("Austria", "AT", 46.4, 49.0, 9.5, 17.2),
    bounds!("Germany", "DE", 47.3, 55.1, 5.9, 15.0),
    bounds!("Switzerland", "CH", 45.8, 47.8, 6.0, 10.5),
    bounds!("France", "FR", 41.3, 51.1, -5.1, 9.6),
    bounds!("Italy", "IT", 36.6, 47.1, 6.6, 18.5),
    bounds!("Spain", "ES", 35.9, 43.8, -9.3, 4.3),
    bounds!("United Kingdom", "GB", 49.9, 60.8, -8.2, 1.8),
    bounds!("Croatia", "HR", 42.4, 46.5, 13.5, 19.4),
    bounds!("Serbia", "RS", 42.2, 46.2, 18.8, 23.0),
    bounds!("Romania", "RO", 43.6, 48.3, 20.3, 29.7),
    bounds!("Ukraine", "UA", 44.4, 52.4, 22.1, 40.2),
    bounds!("Poland", "PL", 49.0, 54.8, 14.1, 24.2),
    bounds!("Czechia", "CZ", 48.6, 51.1, 12.1, 18.9),
    bounds!("Slovakia", "SK", 47.7, 49.6, 16.8, 22.6),
    bounds!("Slovenia", "SI", 45.4, 46.9, 13.4, 16.6),
    bounds!("Greece", "GR", 34.8, 41.7, 19.4, 29.6),
    bounds!("Türkiye", "TR", 36.0, 42.1, 26.0, 44.8),
    bounds!("Russia", "RU", 41.2, 81.9, 19.6, 180.0),
    bounds!("Norway", "NO", 58.0, 71.2, 4.6, 31.1),
    bounds!("Sweden", "SE", 55.3, 69.1, 11.1, 24.2),
    bounds!("Finland", "FI", 59.8, 70.1, 20.6, 31.6),
    bounds!("Denmark", "DK", 54.6, 57.8, 8.1, 15.2),
    bounds!("Netherlands", "NL", 50.8, 53.5, 3.4, 7.2),
    bounds!("Belgium", "BE", 49.5, 51.5, 2.5, 6.4),
    bounds!("Portugal", "PT", 36.9, 42.2, -9.5, -6.2),
    bounds!("Ireland", "IE", 51.4, 55.4, -10.5, -6.0),
    bounds!("Iceland", "IS", 63.4, 66.5, -24.5, -13.5),
    bounds!("United States", "US", 24.5, 49.4, -125.0, -66.9),
    bounds!("Canada", "CA", 41.7, 83.1, -141.0, -52.6),
    bounds!("Mexico", "MX", 14.5, 32.7, -118.4, -86.7),
    bounds!("United Arab Emirates", "AE", 22.6, 26.1, 51.5, 56.4),
    bounds!("Saudi Arabia", "SA", 16.4, 32.2, 34.6, 55.7),
    bounds!("Israel", "IL", 29.5, 33.3, 34.3, 35.9),
    bounds!("Egypt", "EG", 22.0, 31.7, 24.7, 36.9),
    bounds!("Morocco", "MA", 27.7, 35.9, -13.2, -1.0),
    bounds!("South Africa", "ZA", -34.8, -22.1, 16.5, 32.9),
    bounds!("Japan", "JP", 24.0, 45.5, 123.0, 146.0),
    bounds!("China", "CN", 18.2, 53.6, 73.5, 134.8),
    bounds!("India", "IN", 6.7, 35.5, 68.2, 97.4),
    bounds!("Australia", "AU", -43.6, -10.7, 113.2, 153.6),
    bounds!("Brazil", "BR", -33.8, 5.3, -73.9, -34.8),
    bounds!("Argentina", "AR", -55.1, -21.8, -73.6, -53.6),
    bounds!("Monaco", "MC", 43.72, 43.75, 7.41, 7.44),
    bounds!("Montenegro", "ME", 41.9, 43.6, 18.5, 20.4),
    bounds!("Albania", "AL", 39.6, 42.7, 19.3, 21.1),
    bounds!("Bulgaria", "BG", 41.2, 44.2, 22.4, 28.6),
    bounds!("Cyprus", "CY", 34.6, 35.7, 32.3, 34.6),
    bounds!("Malta", "MT", 35.8, 36.1, 14.2, 14.6),
];

// Names that show up in curated CSV exports but differ from the table.
static NAME_ALIASES: &[(&str, &str)] = &[
    ("USA", "US"),
    ("United States of America", "US"),
    ("UK", "GB"),
    ("Great Britain", "GB"),
    ("Czech Republic", "CZ"),
    ("Turkey", "TR"),
    ("UAE", "AE"),
    ("Seychelles", "SC"),
    ("Maldives", "MV"),
    ("Tanzania", "TZ"),
    ("Armenia", "AM"),
    ("Hong Kong", "HK"),
    ("Philippines", "PH"),
    ("Vietnam", "VN"),
    ("Viet Nam", "VN"),
    ("Taiwan", "TW"),
    ("Luxembourg", "LU"),
];

/// Resolves a coordinate to the first country whose box contains it.
///
/// Bounds are inclusive on all four sides. Points outside every box,
/// including the `(0.0, 0.0)` placeholder the loader uses for unparsable
/// coordinates, resolve to [`UNKNOWN_COUNTRY`].
pub fn resolve_country(lat: f64, lon: f64) -> CountryInfo {
    COUNTRIES
        .iter()
        .find(|c| c.contains(lat, lon))
        .map(|c| CountryInfo {
            name: c.name,
            code: c.code,
        })
        .unwrap_or(UNKNOWN_COUNTRY)
}

/// Looks up the ISO code for a country name, case-insensitively.
pub fn code_for_name(name: &str) -> Option<&'static str> {
    let name = name.trim();
    COUNTRIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .map(|c| c.code)
        .or_else(|| {
            NAME_ALIASES
                .iter()
                .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
                .map(|(_, code)| *code)
        })
}

/// Builds the regional-indicator flag for a two-letter country code.
///
/// Anything that is not two ASCII letters, and the unknown sentinel,
/// gets a white flag.
pub fn flag_emoji(code: &str) -> String {
    if code.len() != 2 || code == UNKNOWN_COUNTRY.code || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return "🏳".to_string();
    }
    code.to_ascii_uppercase()
        .chars()
        .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}
