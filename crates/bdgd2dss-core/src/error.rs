use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("feeder {0} not found in CTMT")]
    FeederNotFound(String),

    #[error("table {0} missing from dataset")]
    TableMissing(String),

    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("schema configuration is invalid: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("unknown phase configuration '{0}'")]
    UnknownPhaseConfig(String),

    #[error("voltage code '{0}' is not numeric")]
    InvalidVoltageCode(String),

    #[error("{entity} builder failed: {message}")]
    Builder {
        entity: &'static str,
        message: String,
    },

    #[error("malformed geometry for {table} row {row}: {message}")]
    Geometry {
        table: String,
        row: usize,
        message: String,
    },
}
