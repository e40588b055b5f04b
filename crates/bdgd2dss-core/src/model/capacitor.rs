use polars::prelude::DataFrame;

use crate::case::{Artifact, ArtifactKind};
use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::model::{f64_cell, fmt_num, str_cell, BuilderOutcome};
use crate::phases;
use crate::voltages;

pub const ARTIFACT_NAME: &str = "Capacitores.dss";

/// One MV capacitor bank (UNCRMT unit).
#[derive(Debug, Clone)]
pub struct Capacitor {
    pub name: String,
    pub bus1: String,
    pub nphases: usize,
    pub kv: f64,
    pub kvar: f64,
}

impl Capacitor {
    fn definition(&self) -> String {
        format!(
            "New \"Capacitor.{}\" bus1=\"{}\" phases={} kv={} kvar={}\n",
            self.name,
            self.bus1,
            self.nphases,
            voltages::fmt_kv(self.kv),
            fmt_num(self.kvar),
        )
    }
}

/// Builds shunt capacitor banks, feeder-scoped. Only emitted when bank
/// generation is switched on.
pub fn build(config: &RunConfig, table: &DataFrame) -> Result<BuilderOutcome<Capacitor>, PipelineError> {
    if table.is_empty() {
        return Ok(BuilderOutcome::Empty { table: "UNCRMT" });
    }

    let mut records = Vec::with_capacity(table.height());
    let mut content = String::new();

    for row in 0..table.height() {
        let cod = str_cell(table, "COD_ID", row)?;
        let conn = phases::phase_connection(&str_cell(table, "FAS_CON", row)?, config.four_wire)?;
        let kv = voltages::kv_from_code(&str_cell(table, "TEN_NOM", row)?)?;
        let kvar = f64_cell(table, "POT_NOM", row)?;

        let bank = Capacitor {
            name: cod.clone(),
            bus1: format!("{}{}", str_cell(table, "PAC", row)?, conn.nodes),
            nphases: conn.nphases,
            kv,
            kvar,
        };
        content.push_str(&bank.definition());
        records.push(bank);
    }

    let artifact = Artifact::new_static(ArtifactKind::Capacitor, ARTIFACT_NAME, content);
    Ok(BuilderOutcome::built(records, vec![artifact]))
}
