use polars::prelude::*;

use crate::case::Artifact;
use crate::error::PipelineError;

pub mod buscoords;
pub mod capacitor;
pub mod circuit;
pub mod line;
pub mod linecode;
pub mod load;
pub mod loadshape;
pub mod pvsystem;
pub mod regcontrol;
pub mod transformer;

/// Explicit builder result, inspected by the orchestrator via ordinary
/// branching. An empty feeder slice is an expected no-op, not a failure.
#[derive(Debug)]
pub enum BuilderOutcome<T> {
    Built {
        records: Vec<T>,
        artifacts: Vec<Artifact>,
    },
    /// The feeder has no rows in the source table; skip the entity kind.
    Empty { table: &'static str },
    /// Instances exist for the feeder but none matched an equipment row.
    BrokenAssociation {
        equipment: &'static str,
        instances: &'static str,
    },
}

impl<T> BuilderOutcome<T> {
    pub fn built(records: Vec<T>, artifacts: Vec<Artifact>) -> Self {
        BuilderOutcome::Built { records, artifacts }
    }
}

pub(crate) fn str_cell(
    frame: &DataFrame,
    column: &str,
    row: usize,
) -> Result<String, PipelineError> {
    Ok(frame
        .column(column)?
        .str()?
        .get(row)
        .unwrap_or("")
        .trim()
        .to_string())
}

pub(crate) fn f64_cell(frame: &DataFrame, column: &str, row: usize) -> Result<f64, PipelineError> {
    let series = frame
        .column(column)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series.f64()?.get(row).unwrap_or(0.0))
}

/// Number formatting for emitted scripts: fixed precision, trailing zeros
/// dropped.
pub(crate) fn fmt_num(value: f64) -> String {
    let text = format!("{value:.4}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
