use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use polars::prelude::*;
use serde::Deserialize;

use crate::dataset::{FeederDataset, TableEntry};
use crate::error::PipelineError;

/// Declarative description of the source tables: which columns to keep,
/// their target types, and whether the table carries geometry. Mirrors the
/// `bdgd2dss.json` configuration consumed at run time.
#[derive(Debug, Deserialize)]
pub struct SchemaConfig {
    pub tables: BTreeMap<String, TableSchema>,
}

#[derive(Debug, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<String>,
    #[serde(default)]
    pub types: BTreeMap<String, ColumnType>,
    #[serde(default)]
    pub geometry: bool,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Str,
    F64,
    I64,
}

impl ColumnType {
    fn dtype(self) -> DataType {
        match self {
            ColumnType::Str => DataType::String,
            ColumnType::F64 => DataType::Float64,
            ColumnType::I64 => DataType::Int64,
        }
    }
}

pub fn load_schema(path: &Path) -> Result<SchemaConfig, PipelineError> {
    let text = fs::read_to_string(path)?;
    let schema = serde_json::from_str(&text)?;
    Ok(schema)
}

/// Loads every configured table from `<dir>/<TABLE>.csv`, projecting to the
/// configured columns and coercing the configured types. One call per run;
/// every feeder re-filters from the result.
pub fn load_dataset(dir: &Path, schema: &SchemaConfig) -> Result<FeederDataset, PipelineError> {
    let mut dataset = FeederDataset::new();

    for (name, table) in &schema.tables {
        let path = dir.join(format!("{name}.csv"));
        let mut frame = CsvReadOptions::default()
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(path))?
            .finish()?;

        frame = frame.select(table.columns.iter().map(String::as_str))?;
        for (column, ty) in &table.types {
            let cast = frame
                .column(column)?
                .as_materialized_series()
                .cast(&ty.dtype())?;
            frame.with_column(cast)?;
        }

        dataset.insert(
            name.clone(),
            TableEntry {
                frame,
                has_geometry: table.geometry,
            },
        );
    }

    Ok(dataset)
}
