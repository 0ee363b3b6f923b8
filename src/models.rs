use chrono::NaiveDate;
use serde::Deserialize;

use crate::geocoding;

/// One completed flight, as produced by the loader. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightRecord {
    pub id: String,
    pub registration: String,
    pub aircraft_type: String,
    pub operator: String,
    pub owner: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: f64,
    pub start_lat: f64,
    pub start_lon: f64,
    pub end_lat: f64,
    pub end_lon: f64,
    pub start_city: String,
    pub start_country: Country,
    pub end_city: String,
    pub end_country: Country,
    pub icao: String,
    pub status: String,
    pub route_data: Vec<RoutePoint>,
}

/// A single sample of a recorded track.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, alias = "alt")]
    pub altitude: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

// Trackers emit either epoch seconds or ISO strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(f64),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Where an endpoint's country came from.
///
/// Curated datasets carry the country in the row; raw tracker exports only
/// have coordinates and go through the geocoder. Aggregation groups by
/// [`Country::key`] and displays [`Country::name`].
#[derive(Debug, Clone, PartialEq)]
pub enum Country {
    Supplied { name: String, code: String },
    Derived { name: String, code: String },
}

impl Country {
    /// Wraps a country name taken straight from the source row.
    pub fn supplied(name: &str) -> Self {
        let name = name.trim();
        let code = geocoding::code_for_name(name).unwrap_or_default();
        Country::Supplied {
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    /// Resolves the country from coordinates.
    pub fn derived(lat: f64, lon: f64) -> Self {
        let info = geocoding::resolve_country(lat, lon);
        Country::Derived {
            name: info.name.to_string(),
            code: info.code.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Country::Supplied { name, .. } | Country::Derived { name, .. } => name,
        }
    }

    /// ISO code; empty for supplied names the geocoder table doesn't know.
    pub fn code(&self) -> &str {
        match self {
            Country::Supplied { code, .. } | Country::Derived { code, .. } => code,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name().is_empty()
    }

    /// Grouping key: the ISO code, or the name when the code is unknown.
    /// "USA" and "United States" share a key.
    pub fn key(&self) -> &str {
        match self.code() {
            "" => self.name(),
            code => code,
        }
    }
}

/// The path a flight took: the recorded track when there is one, otherwise
/// a straight hop between the endpoints.
#[derive(Debug, Clone, PartialEq)]
pub enum RoutePath {
    TwoPoint { start: GeoPoint, end: GeoPoint },
    Sampled { points: Vec<GeoPoint> },
}

impl RoutePath {
    pub fn points(&self) -> Vec<GeoPoint> {
        match self {
            RoutePath::TwoPoint { start, end } => vec![*start, *end],
            RoutePath::Sampled { points } => points.clone(),
        }
    }

    /// Interpolated position at `progress` in `[0, 1]` (clamped).
    ///
    /// Sampled paths are treated as evenly spaced in time: progress picks a
    /// segment by index and interpolates linearly inside it.
    pub fn position_at(&self, progress: f64) -> GeoPoint {
        let t = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            RoutePath::TwoPoint { start, end } => lerp(*start, *end, t),
            RoutePath::Sampled { points } => match points.len() {
                0 => GeoPoint { lat: 0.0, lon: 0.0 },
                1 => points[0],
                n => {
                    let scaled = t * (n - 1) as f64;
                    let idx = (scaled.floor() as usize).min(n - 2);
                    lerp(points[idx], points[idx + 1], scaled - idx as f64)
                }
            },
        }
    }

    /// Lon/lat bounding box as `(min_lon, max_lon, min_lat, max_lat)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.points().iter().fold(
            (f64::MAX, f64::MIN, f64::MAX, f64::MIN),
            |(min_lon, max_lon, min_lat, max_lat), p| {
                (min_lon.min(p.lon), max_lon.max(p.lon), min_lat.min(p.lat), max_lat.max(p.lat))
            },
        )
    }
}

fn lerp(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    GeoPoint {
        lat: a.lat + t * (b.lat - a.lat),
        lon: a.lon + t * (b.lon - a.lon),
    }
}

impl FlightRecord {
    pub fn start(&self) -> GeoPoint {
        GeoPoint {
            lat: self.start_lat,
            lon: self.start_lon,
        }
    }

    pub fn end(&self) -> GeoPoint {
        GeoPoint {
            lat: self.end_lat,
            lon: self.end_lon,
        }
    }

    /// The canonical path for drawing and replay.
    pub fn route(&self) -> RoutePath {
        if self.route_data.is_empty() {
            RoutePath::TwoPoint {
                start: self.start(),
                end: self.end(),
            }
        } else {
            RoutePath::Sampled {
                points: self
                    .route_data
                    .iter()
                    .map(|p| GeoPoint { lat: p.lat, lon: p.lon })
                    .collect(),
            }
        }
    }

    /// Endpoint-to-endpoint great-circle distance.
    pub fn distance_km(&self) -> f64 {
        crate::stats::great_circle_distance_km(self.start_lat, self.start_lon, self.end_lat, self.end_lon)
    }

    /// Trace link on ADS-B Exchange for the day of the flight.
    pub fn adsb_exchange_url(&self) -> String {
        format!(
            "https://globe.adsbexchange.com/?icao={}&lat={}&lon={}&zoom=5&showTrace={}",
            self.icao,
            self.start_lat,
            self.start_lon,
            self.date.format("%Y-%m-%d")
        )
    }
}

/// Totals over a set of flights.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightStats {
    pub total_flights: usize,
    pub total_duration_minutes: f64,
    pub total_distance_km: f64,
    pub estimated_cost: i64,
    pub unique_countries: usize,
    pub average_flight_duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyBucket {
    pub date: String,
    pub flights: usize,
    pub duration_minutes: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyBucket {
    pub month: String,
    pub flights: usize,
    pub duration_minutes: f64,
    pub estimated_cost: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryVisit {
    pub country: String,
    pub code: String,
    pub visits: usize,
    pub departures: usize,
    pub arrivals: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AircraftSummary {
    pub registration: String,
    pub aircraft_type: String,
    pub operator: String,
    pub flight_count: usize,
}

/// Endpoint count for one rounded coordinate cell.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDensity {
    pub lat: f64,
    pub lon: f64,
    pub count: usize,
}


#[cfg(test)]
mod tests {
    use super::fixtures::flight;
    use super::*;

    #[test]
    fn test_supplied_country_resolves_code() {
        let c = Country::supplied(" Germany ");
        assert_eq!(c.name(), "Germany");
        assert_eq!(c.code(), "DE");

        let unknown = Country::supplied("Atlantis");
        assert_eq!(unknown.code(), "");
        assert!(!unknown.is_empty());
        assert!(Country::supplied("").is_empty());
    }

    #[test]
    fn test_country_key_prefers_code() {
        assert_eq!(Country::supplied("USA").key(), "US");
        assert_eq!(Country::supplied("United States").key(), "US");
        assert_eq!(Country::derived(40.0, -100.0).key(), "US");
        assert_eq!(Country::supplied("Atlantis").key(), "Atlantis");
        assert_eq!(Country::supplied("").key(), "");
    }

    #[test]
    fn test_derived_country_uses_geocoder() {
        let c = Country::derived(47.43, 19.26);
        assert!(matches!(c, Country::Derived { .. }));
        assert_eq!(c.code(), "HU");
        assert_eq!(Country::derived(0.0, 0.0).name(), "Unknown");
    }

    #[test]
    fn test_route_falls_back_to_two_points() {
        let mut f = flight("2024-01-01", "ABC", 60.0, "Hungary", "Austria");
        f.start_lat = 47.43;
        f.start_lon = 19.26;
        f.end_lat = 48.11;
        f.end_lon = 16.57;
        let route = f.route();
        assert!(matches!(route, RoutePath::TwoPoint { .. }));
        assert_eq!(route.points().len(), 2);

        f.route_data = vec![
            RoutePoint { lat: 1.0, lon: 1.0, altitude: None, timestamp: None },
            RoutePoint { lat: 2.0, lon: 2.0, altitude: Some(3000.0), timestamp: None },
            RoutePoint { lat: 3.0, lon: 3.0, altitude: None, timestamp: None },
        ];
        assert_eq!(f.route().points().len(), 3);
    }

    #[test]
    fn test_position_at_two_point() {
        let route = RoutePath::TwoPoint {
            start: GeoPoint { lat: 0.0, lon: 0.0 },
            end: GeoPoint { lat: 10.0, lon: 20.0 },
        };
        assert_eq!(route.position_at(0.5), GeoPoint { lat: 5.0, lon: 10.0 });
        assert_eq!(route.position_at(-1.0), GeoPoint { lat: 0.0, lon: 0.0 });
        assert_eq!(route.position_at(2.0), GeoPoint { lat: 10.0, lon: 20.0 });
    }

    #[test]
    fn test_position_at_sampled() {
        let route = RoutePath::Sampled {
            points: vec![
                GeoPoint { lat: 0.0, lon: 0.0 },
                GeoPoint { lat: 10.0, lon: 0.0 },
                GeoPoint { lat: 10.0, lon: 10.0 },
            ],
        };
        assert_eq!(route.position_at(0.25), GeoPoint { lat: 5.0, lon: 0.0 });
        assert_eq!(route.position_at(0.75), GeoPoint { lat: 10.0, lon: 5.0 });
        assert_eq!(route.position_at(1.0), GeoPoint { lat: 10.0, lon: 10.0 });
    }

    #[test]
    fn test_route_point_accepts_alt_and_mixed_timestamps() {
        let json = r#"[{"lat":47.4,"lon":19.2,"alt":1200,"timestamp":1704103200},
                       {"lat":48.1,"lon":16.5,"timestamp":"2024-01-01T10:30:00Z"}]"#;
        let points: Vec<RoutePoint> = serde_json::from_str(json).unwrap();
        assert_eq!(points[0].altitude, Some(1200.0));
        assert_eq!(points[0].timestamp, Some(Timestamp::Epoch(1_704_103_200.0)));
        assert!(matches!(points[1].timestamp, Some(Timestamp::Text(_))));
        assert_eq!(points[1].altitude, None);
    }

    #[test]
    fn test_adsb_exchange_url() {
        let mut f = flight("2024-03-09", "HA-ABC", 60.0, "Hungary", "Austria");
        f.icao = "4d2222".to_string();
        f.start_lat = 47.43;
        f.start_lon = 19.26;
        assert_eq!(
            f.adsb_exchange_url(),
            "https://globe.adsbexchange.com/?icao=4d2222&lat=47.43&lon=19.26&zoom=5&showTrace=2024-03-09"
        );
    }
}
