use crate::error::{AnalysisError, Result};
use crate::types::{RawProjectRow, RawTimesheetRow};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const PROJECT_COLUMNS: [&str; 3] = ["ProjectCode", "ContractPrice", "PurchaseCost"];
pub const TIMESHEET_COLUMNS: [&str; 3] = ["ProjectCode", "Department", "Hours"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
}

pub fn load_projects(path: impl AsRef<Path>) -> Result<(Vec<RawProjectRow>, LoadReport)> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    read_table(file, &path.display().to_string(), &PROJECT_COLUMNS)
}

pub fn load_timesheet(path: impl AsRef<Path>) -> Result<(Vec<RawTimesheetRow>, LoadReport)> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    read_table(file, &path.display().to_string(), &TIMESHEET_COLUMNS)
}

/// Read a CSV table, rejecting it when a required column is missing or it has
/// no data rows. Rows that fail to deserialize are counted and skipped.
pub fn read_table<T, R>(
    reader: R,
    source_name: &str,
    required: &[&str],
) -> Result<(Vec<T>, LoadReport)>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(AnalysisError::input_shape(
            source_name,
            format!("missing required columns: {}", missing.join(", ")),
        ));
    }

    let mut rows = Vec::new();
    let mut report = LoadReport::default();
    for result in rdr.deserialize::<T>() {
        report.total_rows += 1;
        match result {
            Ok(row) => rows.push(row),
            Err(e) => {
                report.parse_errors += 1;
                debug!(source = source_name, error = %e, "skipping unreadable row");
            }
        }
    }

    if report.total_rows == 0 {
        return Err(AnalysisError::input_shape(source_name, "no data rows"));
    }
    info!(
        source = source_name,
        rows = rows.len(),
        skipped = report.parse_errors,
        "loaded table"
    );
    Ok((rows, report))
}
