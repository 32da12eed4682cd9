//! Output formatting and persistence for analysis results.
//!
//! Supports pretty-printing and JSON logging of statistics, the joined day
//! series CSV consumed by the chart renderer, and the filtered record export.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use tracing::{debug, info};

use crate::analyzers::types::JoinedDaySeries;
use crate::schema::AccidentRecord;
use crate::stats::is_after;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty<T: std::fmt::Debug>(value: &T) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes the joined series as CSV: `day`, harm per category, cumulative harm
/// per category.
pub fn write_joined_series<W: Write>(writer: W, series: &JoinedDaySeries) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(series.column_names())?;

    for row in &series.rows {
        writer.write_record([
            row.day.format("%Y-%m-%d").to_string(),
            row.harmed[0].to_string(),
            row.harmed[1].to_string(),
            row.cumulative[0].to_string(),
            row.cumulative[1].to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_joined_series_file(path: &str, series: &JoinedDaySeries) -> Result<()> {
    debug!(path, rows = series.rows.len(), "Writing joined day series");
    let file = File::create(path).with_context(|| format!("Failed to create '{path}'"))?;
    write_joined_series(file, series)
}

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    time: String,
    barrier_built: Option<bool>,
    route_number: Option<u32>,
    route_km_marker: Option<f64>,
    n_participants: u32,
    n_vehicles: u32,
    n_diseased: u32,
    n_injured: u32,
    accident_classification_2: Option<&'a str>,
}

/// Writes filtered records sorted by time.
///
/// `barrier_built` is set from `intervention` (accidents after its midnight)
/// and left empty when no intervention date is configured.
pub fn write_record_export<W: Write>(
    writer: W,
    records: &[AccidentRecord],
    intervention: Option<NaiveDate>,
) -> Result<()> {
    let mut sorted: Vec<&AccidentRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.time);

    let mut writer = WriterBuilder::new().from_writer(writer);
    for record in sorted {
        writer.serialize(ExportRow {
            time: record.time.format("%Y-%m-%d %H:%M:%S").to_string(),
            barrier_built: intervention.map(|date| is_after(record, date)),
            route_number: record.route_number,
            route_km_marker: record.route_km_marker,
            n_participants: record.n_participants,
            n_vehicles: record.n_vehicles,
            n_diseased: record.n_diseased,
            n_injured: record.n_injured,
            accident_classification_2: record.accident_type.as_deref(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_record_export_file(
    path: &str,
    records: &[AccidentRecord],
    intervention: Option<NaiveDate>,
) -> Result<()> {
    debug!(path, rows = records.len(), "Writing filtered record export");
    let file = File::create(path).with_context(|| format!("Failed to create '{path}'"))?;
    write_record_export(file, records, intervention)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::JoinedDay;
    use crate::stats::CategoryStats;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    fn joined() -> JoinedDaySeries {
        JoinedDaySeries {
            categories: ["motor_vehicle".to_string(), "bicycle".to_string()],
            rows: vec![
                JoinedDay {
                    day: day(5),
                    harmed: [1, 2],
                    cumulative: [1, 2],
                },
                JoinedDay {
                    day: day(6),
                    harmed: [0, 3],
                    cumulative: [1, 5],
                },
            ],
        }
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&CategoryStats::default());
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&CategoryStats::default()).unwrap();
    }

    #[test]
    fn test_joined_series_csv() {
        let mut buffer = Vec::new();
        write_joined_series(&mut buffer, &joined()).unwrap();
        let content = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(
            lines,
            vec![
                "day,n_harmed_motor_vehicle,n_harmed_bicycle,n_harmed_motor_vehicle_cumulative,n_harmed_bicycle_cumulative",
                "2020-01-05,1,2,1,2",
                "2020-01-06,0,3,1,5",
            ]
        );
    }

    #[test]
    fn test_joined_series_file_is_created() {
        let path = temp_path("accident_harm_test_joined.csv");
        let _ = fs::remove_file(&path);

        write_joined_series_file(&path, &joined()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_record_export_is_sorted_with_barrier_flag() {
        let late = AccidentRecord::new("B", day(20).and_hms_opt(9, 0, 0).unwrap());
        let mut early = AccidentRecord::new("A", day(2).and_hms_opt(9, 0, 0).unwrap());
        early.route_number = Some(15);
        early.route_km_marker = Some(18.5);
        early.accident_type = Some("Kokkupõrge".to_string());

        let mut buffer = Vec::new();
        write_record_export(&mut buffer, &[late, early], Some(day(10))).unwrap();
        let content = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = content.lines().collect();

        assert_eq!(
            lines[0],
            "time,barrier_built,route_number,route_km_marker,n_participants,n_vehicles,n_diseased,n_injured,accident_classification_2"
        );
        assert_eq!(lines[1], "2020-01-02 09:00:00,false,15,18.5,0,0,0,0,Kokkupõrge");
        assert_eq!(lines[2], "2020-01-20 09:00:00,true,,,0,0,0,0,");
    }

    #[test]
    fn test_record_export_without_intervention_leaves_flag_empty() {
        let record = AccidentRecord::new("A", day(2).and_hms_opt(9, 0, 0).unwrap());
        let mut buffer = Vec::new();
        write_record_export(&mut buffer, &[record], None).unwrap();
        let content = String::from_utf8(buffer).unwrap();
        assert!(content.lines().nth(1).unwrap().starts_with("2020-01-02 09:00:00,,"));
    }
}
