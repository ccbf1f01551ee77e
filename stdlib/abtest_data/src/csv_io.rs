//! CSV export and import of experiment rows.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use abtest_analysis::Arm;
use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{ReaderBuilder, Trim, WriterBuilder};
use serde::Deserialize;

use crate::error::DataError;
use crate::record::{ExperimentData, ExperimentRecord};

pub const DEFAULT_CSV_PATH: &str = "ab_test_data.csv";

#[derive(Debug, Deserialize)]
struct CsvRowRaw {
    user_id: u64,
    group: String,
    timestamp: String,
    conversion: i64,
}

pub fn write_csv<W: Write>(data: &ExperimentData, writer: W) -> Result<(), DataError> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in data.records() {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn save_csv<P: AsRef<Path>>(data: &ExperimentData, path: P) -> Result<(), DataError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_csv(data, file)?;
    log::info!("wrote {} rows to {}", data.len(), path.display());
    Ok(())
}

/// Read rows written by [`write_csv`] or any CSV with the same columns.
///
/// Group labels are case-insensitive. Timestamps may be RFC 3339 or a naive
/// `YYYY-MM-DD HH:MM:SS[.fff]`, read as UTC.
pub fn read_csv<R: Read>(reader: R) -> Result<ExperimentData, DataError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<CsvRowRaw>().enumerate() {
        let row = row?;
        records.push(convert_row(i + 1, row)?);
    }
    log::debug!("read {} rows", records.len());
    Ok(ExperimentData::new(records))
}

pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<ExperimentData, DataError> {
    read_csv(File::open(path)?)
}

fn convert_row(row: usize, raw: CsvRowRaw) -> Result<ExperimentRecord, DataError> {
    let invalid = |message: String| DataError::InvalidRecord { row, message };
    let group: Arm = raw.group.parse().map_err(|_| {
        invalid(format!(
            "unknown group '{}', expected 'control' or 'treatment'",
            raw.group
        ))
    })?;
    let conversion = match raw.conversion {
        0 => 0,
        1 => 1,
        other => return Err(invalid(format!("conversion is {other}, expected 0 or 1"))),
    };
    let timestamp = parse_timestamp(&raw.timestamp)
        .ok_or_else(|| invalid(format!("unparseable timestamp '{}'", raw.timestamp)))?;
    Ok(ExperimentRecord {
        user_id: raw.user_id,
        group,
        timestamp,
        conversion,
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
