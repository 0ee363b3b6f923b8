//! CSV export of the filtered, sorted record set.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use crate::error::Result;
use crate::format::format_duration;
use crate::models::FlightRecord;

const HEADER: [&str; 8] = [
    "date",
    "registration",
    "type",
    "owner",
    "departure",
    "arrival",
    "duration",
    "icao",
];

/// Writes one header line plus one line per record, every field quoted.
pub fn write_csv<W: Write>(writer: W, records: &[FlightRecord]) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(HEADER)?;
    for f in records {
        wtr.write_record([
            f.date.format("%Y-%m-%d").to_string(),
            f.registration.clone(),
            f.aircraft_type.clone(),
            f.owner.clone(),
            place(&f.start_city, f.start_country.name()),
            place(&f.end_city, f.end_country.name()),
            format_duration(f.duration_minutes),
            f.icao.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn place(city: &str, country: &str) -> String {
    format!("{city}, {country}")
}

/// File name for an export made on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("flights_export_{}.csv", date.format("%Y-%m-%d"))
}

/// Writes the export into `dir`, creating it if needed, and returns the path.
pub fn export_to_dir(dir: &Path, records: &[FlightRecord], date: NaiveDate) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(date));
    write_csv(File::create(&path)?, records)?;
    info!("Exported {} flights to {}", records.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample;

    fn render(records: &[FlightRecord]) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_export_three_records() {
        let mut records = sample();
        records[0].start_city = "Budapest".to_string();
        records[0].end_city = "Munich".to_string();
        records[0].icao = "4d1111".to_string();

        let out = render(&records);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            r#""date","registration","type","owner","departure","arrival","duration","icao""#
        );
        assert_eq!(
            lines[1],
            r#""2024-01-01","ABC","Cessna Citation","Unknown","Budapest, Hungary","Munich, Germany","2h 0m","4d1111""#
        );
        for line in &lines {
            assert_eq!(line.split("\",\"").count(), 8);
            assert!(line.starts_with('"') && line.ends_with('"'));
        }
    }

    #[test]
    fn test_export_escapes_quotes() {
        let mut records = sample();
        records[0].owner = "The \"Big\" Fund".to_string();
        let out = render(&records[..1]);
        assert!(out.contains(r#""The ""Big"" Fund""#));
    }

    #[test]
    fn test_export_empty_is_header_only() {
        assert_eq!(render(&[]).lines().count(), 1);
    }

    #[test]
    fn test_export_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

        let path = export_to_dir(&target, &sample(), date).unwrap();
        assert_eq!(path.file_name().unwrap(), "flights_export_2024-05-01.csv");
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);
    }
}
