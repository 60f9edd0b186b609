//! Shapes normalized records into display rows and writes them out.
//!
//! Supports pretty logging, JSON to stdout, and CSV append.

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

use crate::buses::BusArrival;
use crate::docks::DockRecord;
use crate::lines::LineStatus;

const DATE_FORMAT: &str = "%a %-d %b";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Row for the line-status table.
#[derive(Debug, Serialize, PartialEq)]
pub struct LineRow {
    #[serde(rename = "Line")]
    pub line: String,
    #[serde(rename = "Status")]
    pub status: String,
}

/// Row for the dock table.
///
/// The id and the composed hover text ride along for the presentation layer
/// but are not part of the serialized column set.
#[derive(Debug, Serialize, PartialEq)]
pub struct DockRow {
    #[serde(skip)]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Bikes")]
    pub bikes: u32,
    #[serde(rename = "eBikes")]
    pub e_bikes: u32,
    #[serde(rename = "Spaces")]
    pub spaces: u32,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(skip)]
    pub hover: String,
}

/// Row for the bus-arrivals table.
#[derive(Debug, Serialize, PartialEq)]
pub struct BusRow {
    #[serde(rename = "Route")]
    pub route: String,
    #[serde(rename = "Destination")]
    pub destination: String,
    #[serde(rename = "ETA")]
    pub eta: String,
    #[serde(rename = "Reg")]
    pub reg: String,
}

pub fn line_rows(statuses: &[LineStatus]) -> Vec<LineRow> {
    statuses
        .iter()
        .map(|s| LineRow {
            line: s.line.clone(),
            status: s.status.clone(),
        })
        .collect()
}

pub fn dock_rows(records: &[DockRecord]) -> Vec<DockRow> {
    records.iter().map(dock_row).collect()
}

fn dock_row(record: &DockRecord) -> DockRow {
    let time = record.observed_at.format(TIME_FORMAT).to_string();
    DockRow {
        id: record.id.clone(),
        name: record.name.clone(),
        bikes: record.bikes_available,
        e_bikes: record.e_bikes_available,
        spaces: record.empty_spaces,
        date: record.observed_at.format(DATE_FORMAT).to_string(),
        hover: format!(
            "{} Bikes\n{} E-bikes\n{} Spaces\nat {}",
            record.bikes_available, record.e_bikes_available, record.empty_spaces, time
        ),
        time,
    }
}

pub fn bus_rows(arrivals: &[BusArrival]) -> Vec<BusRow> {
    arrivals
        .iter()
        .map(|a| BusRow {
            route: a.route.clone(),
            destination: a.destination.clone(),
            eta: a.eta.format(TIME_FORMAT).to_string(),
            reg: a.vehicle_id.clone(),
        })
        .collect()
}

/// Logs rows using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(rows: &[T]) {
    debug!("{:#?}", rows);
}

/// Writes rows to stdout as pretty-printed JSON.
pub fn print_json<T: Serialize>(rows: &[T]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(rows)?);
    Ok(())
}

/// Appends rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_records<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = rows.len(), "appending CSV rows");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::London;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn record() -> DockRecord {
        DockRecord {
            id: "BikePoints_109".to_string(),
            name: "Soho Square".to_string(),
            latitude: 51.515,
            longitude: -0.132,
            bikes_available: 5,
            e_bikes_available: 2,
            empty_spaces: 3,
            observed_at: London.with_ymd_and_hms(2023, 1, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_dock_row_formats_date_and_time_separately() {
        let row = dock_row(&record());

        assert_eq!(row.date, "Sun 1 Jan");
        assert_eq!(row.time, "08:00:00");
        assert_eq!(row.name, "Soho Square");
    }

    #[test]
    fn test_dock_row_hover_lists_counts_and_time() {
        let row = dock_row(&record());

        assert_eq!(row.hover, "5 Bikes\n2 E-bikes\n3 Spaces\nat 08:00:00");
    }

    #[test]
    fn test_bus_row_eta_has_second_precision() {
        let arrival = BusArrival {
            stop_id: "490001180E".to_string(),
            route: "188".to_string(),
            destination: "North Greenwich".to_string(),
            eta: London.with_ymd_and_hms(2023, 5, 10, 9, 1, 30).unwrap(),
            vehicle_id: "LX11AZB".to_string(),
        };

        let rows = bus_rows(&[arrival]);

        assert_eq!(rows[0].eta, "09:01:30");
        assert_eq!(rows[0].reg, "LX11AZB");
    }

    #[test]
    fn test_csv_columns_exclude_id_and_hover() {
        let path = temp_path("commute_status_test_columns.csv");
        let _ = fs::remove_file(&path);

        append_records(&path, &dock_rows(&[record()])).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(header, "Name,Bikes,eBikes,Spaces,Date,Time");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_append_records_writes_header_once() {
        let path = temp_path("commute_status_test_header.csv");
        let _ = fs::remove_file(&path);

        let rows = line_rows(&[LineStatus {
            line: "DLR".to_string(),
            status: "Good Service".to_string(),
        }]);
        append_records(&path, &rows).unwrap();
        append_records(&path, &rows).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("Line")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&line_rows(&[]));
    }
}
