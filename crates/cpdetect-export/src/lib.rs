// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Flat-table and JSON renderings of a [`DetectionResult`].
//!
//! The CSV layout has one row per change point:
//!
//! ```text
//! trajectory,ts,log_odds,start_end
//! traj_0,20,43.07,"(0, 40)"
//! ```
//!
//! Rows are grouped by trajectory and keep discovery order within each.

use cpdetect_core::{CpdError, DetectionResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const CSV_HEADER: [&str; 4] = ["trajectory", "ts", "log_odds", "start_end"];

pub fn crate_name() -> &'static str {
    "cpdetect-export"
}

fn csv_error(err: csv::Error) -> CpdError {
    CpdError::export(format!("csv: {err}"))
}

fn write_rows<W: Write>(
    result: &DetectionResult,
    writer: &mut csv::Writer<W>,
) -> Result<usize, CpdError> {
    writer.write_record(CSV_HEADER).map_err(csv_error)?;

    let mut rows = 0usize;
    for (id, trajectory) in result.iter() {
        for cp in &trajectory.change_points {
            let (start, end) = cp.start_end;
            writer
                .write_record([
                    id.to_string(),
                    cp.ts.to_string(),
                    cp.log_odds.to_string(),
                    format!("({start}, {end})"),
                ])
                .map_err(csv_error)?;
            rows += 1;
        }
    }

    writer
        .flush()
        .map_err(|err| CpdError::export(format!("flush: {err}")))?;
    Ok(rows)
}

/// Renders every change point of `result` as CSV text.
pub fn to_csv_string(result: &DetectionResult) -> Result<String, CpdError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    write_rows(result, &mut writer)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| CpdError::export(format!("csv buffer: {err}")))?;
    String::from_utf8(bytes).map_err(|err| CpdError::export(format!("csv is not utf-8: {err}")))
}

/// Writes the CSV rendering of `result` to `path`, replacing any existing file.
/// Returns the number of change-point rows written.
pub fn write_csv(result: &DetectionResult, path: impl AsRef<Path>) -> Result<usize, CpdError> {
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|err| CpdError::export(format!("cannot create {}: {err}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);
    let rows = write_rows(result, &mut writer)?;
    info!(path = %path.display(), rows, "exported change points");
    Ok(rows)
}

/// Serializes the full result, diagnostics included.
pub fn to_json_string(result: &DetectionResult) -> Result<String, CpdError> {
    serde_json::to_string_pretty(result).map_err(|err| CpdError::export(format!("json: {err}")))
}

pub fn from_json_str(raw: &str) -> Result<DetectionResult, CpdError> {
    serde_json::from_str(raw).map_err(|err| CpdError::export(format!("json: {err}")))
}
