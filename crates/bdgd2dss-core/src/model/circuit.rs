use polars::prelude::DataFrame;

use crate::case::{Artifact, ArtifactKind};
use crate::error::PipelineError;
use crate::model::{str_cell, BuilderOutcome};
use crate::voltages;

pub const ARTIFACT_NAME: &str = "Circuito.dss";

/// Source equivalent of one feeder, from its CTMT row.
#[derive(Debug, Clone)]
pub struct Circuit {
    pub name: String,
    pub source_bus: String,
    /// Feeder MV nominal, resolved from the TEN_NOM code.
    pub kv_nom: f64,
}

impl Circuit {
    fn definition(&self) -> String {
        format!(
            "New \"Circuit.{}\" bus1=\"{}\" basekv={} pu=1.0 angle=0 phases=3 mvasc3=99999 mvasc1=99999\n",
            self.name,
            self.source_bus,
            voltages::fmt_kv(self.kv_nom),
        )
    }
}

/// Builds the circuit definition from the feeder's CTMT slice (keyed on
/// COD_ID, not CTMT: this is the feeder-index table itself).
pub fn build(ctmt: &DataFrame) -> Result<BuilderOutcome<Circuit>, PipelineError> {
    if ctmt.is_empty() {
        return Ok(BuilderOutcome::Empty { table: "CTMT" });
    }

    let name = str_cell(ctmt, "COD_ID", 0)?;
    let source_bus = str_cell(ctmt, "PAC_INI", 0)?;
    let kv_nom = voltages::kv_from_code(&str_cell(ctmt, "TEN_NOM", 0)?)?;

    let circuit = Circuit {
        name,
        source_bus,
        kv_nom,
    };

    let mut content = String::from("Set DefaultBaseFrequency=60\n\n");
    content.push_str(&circuit.definition());

    let artifact = Artifact::new_static(ArtifactKind::Circuit, ARTIFACT_NAME, content);
    Ok(BuilderOutcome::built(vec![circuit], vec![artifact]))
}
