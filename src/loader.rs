//! Loading flight records from CSV.
//!
//! Two exports are in circulation: the raw tracker dump (`icao`,
//! `start_time`, coordinates, a JSON `route_data` column) and the curated
//! sheet (`Date`, cities, countries, `owner`). Columns are looked up by
//! name, case-insensitively, so either one (or a mix) loads into the same
//! [`FlightRecord`] shape. Bad rows are dropped, bad numbers become zero;
//! only an unreadable source or a header without any aircraft key fails.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::{Country, FlightRecord, RoutePoint};

const DEFAULT_AIRCRAFT_TYPE: &str = "Private Jet";
const UNKNOWN: &str = "Unknown";

/// Reads flight records from a local path or an `http(s)://` URL.
pub async fn load(source: &str) -> Result<Vec<FlightRecord>> {
    let text = if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source).await?
    } else {
        tokio::fs::read_to_string(source).await.map_err(|e| Error::Read {
            path: Path::new(source).to_path_buf(),
            source: e,
        })?
    };

    let flights = parse_flights(text.as_bytes())?;
    info!("Loaded {} flights from {}", flights.len(), source);
    Ok(flights)
}

async fn fetch(url: &str) -> Result<String> {
    let fetch_err = |source| Error::Fetch {
        url: url.to_string(),
        source,
    };
    let client = Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .map_err(fetch_err)?;

    client
        .get(url)
        .send()
        .await
        .and_then(|res| res.error_for_status())
        .map_err(fetch_err)?
        .text()
        .await
        .map_err(fetch_err)
}

// Resolved column positions. Each field lists the names it goes by across
// the two exports.
struct Columns {
    registration: Option<usize>,
    icao: Option<usize>,
    aircraft_type: Option<usize>,
    operator: Option<usize>,
    owner: Option<usize>,
    date: Option<usize>,
    start_time: Option<usize>,
    end_time: Option<usize>,
    duration: Option<usize>,
    start_lat: Option<usize>,
    start_lon: Option<usize>,
    end_lat: Option<usize>,
    end_lon: Option<usize>,
    status: Option<usize>,
    start_city: Option<usize>,
    start_country: Option<usize>,
    end_city: Option<usize>,
    end_country: Option<usize>,
    route_data: Option<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord) -> Self {
        let find_col = |names: &[&str]| {
            headers.iter().position(|h| {
                let clean_h = h.trim_start_matches('\u{feff}').trim();
                names.iter().any(|name| clean_h.eq_ignore_ascii_case(name))
            })
        };

        Self {
            registration: find_col(&["registration"]),
            icao: find_col(&["icao", "icao24"]),
            aircraft_type: find_col(&["type"]),
            operator: find_col(&["operator"]),
            owner: find_col(&["owner"]),
            date: find_col(&["date"]),
            start_time: find_col(&["start_time"]),
            end_time: find_col(&["end_time"]),
            duration: find_col(&["duration_minutes", "duration_min"]),
            start_lat: find_col(&["start_lat"]),
            start_lon: find_col(&["start_lon"]),
            end_lat: find_col(&["end_lat"]),
            end_lon: find_col(&["end_lon"]),
            status: find_col(&["status"]),
            start_city: find_col(&["start_city"]),
            start_country: find_col(&["start_country"]),
            end_city: find_col(&["end_city"]),
            end_country: find_col(&["end_country"]),
            route_data: find_col(&["route_data"]),
        }
    }

    // The curated sheet carries a Date column and reports landed flights;
    // the tracker dump calls them completed.
    fn default_status(&self) -> &'static str {
        if self.date.is_some() {
            "Landed"
        } else {
            "completed"
        }
    }
}

/// Parses a CSV document with a header row into flight records.
pub fn parse_flights<R: Read>(reader: R) -> Result<Vec<FlightRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let cols = Columns::resolve(&headers);
    if cols.registration.is_none() && cols.icao.is_none() {
        return Err(Error::MissingKeyColumn {
            headers: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut flights = Vec::new();
    let mut dropped = 0usize;
    for (row, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!("Skipping unreadable row {}: {}", row + 1, e);
                dropped += 1;
                continue;
            }
        };

        match parse_row(&cols, &record, row) {
            Some(flight) => flights.push(flight),
            None => {
                debug!("Skipping row {} without a registration or date", row + 1);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        warn!("Dropped {} of {} rows while loading flights", dropped, dropped + flights.len());
    }
    Ok(flights)
}

fn parse_row(cols: &Columns, record: &StringRecord, row: usize) -> Option<FlightRecord> {
    let get_val = |idx: Option<usize>| {
        idx.and_then(|i| record.get(i))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    };
    let text_or = |idx: Option<usize>, default: &str| get_val(idx).unwrap_or(default).to_string();
    let number = |idx: Option<usize>| parse_number(get_val(idx));

    let icao = text_or(cols.icao, "");
    let registration = get_val(cols.registration)
        .map(str::to_string)
        .or_else(|| (!icao.is_empty()).then(|| icao.to_uppercase()))?;

    let start_time = text_or(cols.start_time, "");
    let date = get_val(cols.date)
        .and_then(parse_date)
        .or_else(|| parse_date(&start_time))?;

    let (start_lat, start_lon) = (number(cols.start_lat), number(cols.start_lon));
    let (end_lat, end_lon) = (number(cols.end_lat), number(cols.end_lon));

    let country = |col: Option<usize>, lat: f64, lon: f64| match col {
        Some(_) => Country::supplied(get_val(col).unwrap_or("")),
        None => Country::derived(lat, lon),
    };

    let route_data = match get_val(cols.route_data) {
        Some(raw) => serde_json::from_str::<Vec<RoutePoint>>(raw).unwrap_or_else(|e| {
            warn!("Failed to parse route data for {} (row {}): {}", registration, row + 1, e);
            Vec::new()
        }),
        None => Vec::new(),
    };

    Some(FlightRecord {
        id: format!("{}-{}", registration, row),
        aircraft_type: text_or(cols.aircraft_type, DEFAULT_AIRCRAFT_TYPE),
        operator: text_or(cols.operator, UNKNOWN),
        owner: text_or(cols.owner, UNKNOWN),
        date,
        end_time: text_or(cols.end_time, ""),
        duration_minutes: number(cols.duration).max(0.0),
        start_city: text_or(cols.start_city, ""),
        start_country: country(cols.start_country, start_lat, start_lon),
        end_city: text_or(cols.end_city, ""),
        end_country: country(cols.end_country, end_lat, end_lon),
        status: text_or(cols.status, cols.default_status()),
        start_time,
        start_lat,
        start_lon,
        end_lat,
        end_lon,
        icao,
        registration,
        route_data,
    })
}

fn parse_number(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Extracts the calendar date from a date or timestamp string.
///
/// RFC 3339 timestamps are bucketed by their UTC date.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    None
}
