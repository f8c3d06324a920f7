//! Summary statistics and CSV export of batch results.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::batch::JobResult;
use crate::error::CoreResult;

/// Format of the `timestamp` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Totals over a list of job results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ResultsSummary {
    pub total_shots: u64,
    pub total_ones: u64,
    /// Share of `1` outcomes in percent; zero when nothing was measured.
    pub success_rate_percent: f64,
}

pub fn summarize(results: &[JobResult]) -> ResultsSummary {
    let total_shots: u64 = results.iter().map(|r| r.count0 + r.count1).sum();
    let total_ones: u64 = results.iter().map(|r| r.count1).sum();
    #[allow(clippy::cast_precision_loss)]
    let success_rate_percent = if total_shots == 0 {
        0.0
    } else {
        100.0 * total_ones as f64 / total_shots as f64
    };
    ResultsSummary {
        total_shots,
        total_ones,
        success_rate_percent,
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    job_id: &'a str,
    idx: u32,
    circ_name: &'a str,
    bit1: &'static str,
    count1: u64,
    bit0: &'static str,
    count0: u64,
    shots: u32,
    timestamp: String,
}

impl<'a> From<&'a JobResult> for CsvRow<'a> {
    fn from(r: &'a JobResult) -> Self {
        Self {
            job_id: &r.job_id,
            idx: r.index,
            circ_name: &r.label,
            bit1: "1",
            count1: r.count1,
            bit0: "0",
            count0: r.count0,
            shots: r.shots,
            timestamp: r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Header plus one row per result, in input order.
///
/// An empty slice yields an empty string rather than a lone header.
pub fn to_csv(results: &[JobResult]) -> CoreResult<String> {
    if results.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for result in results {
        writer.serialize(CsvRow::from(result))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Download name for an export captured at `at`.
pub fn export_filename(at: DateTime<Local>) -> String {
    format!("quantum_results_{}.csv", at.format("%Y%m%d_%H%M%S"))
}
