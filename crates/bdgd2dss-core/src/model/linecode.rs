use polars::prelude::DataFrame;

use crate::case::{Artifact, ArtifactKind};
use crate::error::PipelineError;
use crate::model::{f64_cell, fmt_num, str_cell, BuilderOutcome};

pub const ARTIFACT_NAME: &str = "Condutores.dss";

/// Maximum conductor count a linecode variant is emitted for (three phases
/// plus neutral).
const MAX_WIRES: usize = 4;

/// One emitted linecode variant: a SEGCON conductor type bound to a wire
/// count. Lines reference these as `<conductor>_<wires>`.
#[derive(Debug, Clone)]
pub struct LineCode {
    pub name: String,
    pub nphases: usize,
    pub r1_ohm_km: f64,
    pub x1_ohm_km: f64,
    pub normamps: f64,
}

impl LineCode {
    fn definition(&self) -> String {
        format!(
            "New \"Linecode.{}\" nphases={} r1={} x1={} units=km normamps={}\n",
            self.name,
            self.nphases,
            fmt_num(self.r1_ohm_km),
            fmt_num(self.x1_ohm_km),
            fmt_num(self.normamps),
        )
    }
}

/// SEGCON is a catalog table, not feeder-scoped: every conductor type is
/// emitted once per possible wire count so line builders can reference the
/// variant matching their phase configuration.
pub fn build(segcon: &DataFrame) -> Result<BuilderOutcome<LineCode>, PipelineError> {
    if segcon.is_empty() {
        return Ok(BuilderOutcome::Empty { table: "SEGCON" });
    }

    let mut records = Vec::with_capacity(segcon.height() * MAX_WIRES);
    let mut content = String::new();

    for row in 0..segcon.height() {
        let cod = str_cell(segcon, "COD_ID", row)?;
        let r1 = f64_cell(segcon, "R1", row)?;
        let x1 = f64_cell(segcon, "X1", row)?;
        let normamps = f64_cell(segcon, "CNOM", row)?;

        for wires in 1..=MAX_WIRES {
            let code = LineCode {
                name: format!("{cod}_{wires}"),
                nphases: wires,
                r1_ohm_km: r1,
                x1_ohm_km: x1,
                normamps,
            };
            content.push_str(&code.definition());
            records.push(code);
        }
    }

    let artifact = Artifact::new_static(ArtifactKind::LineCode, ARTIFACT_NAME, content);
    Ok(BuilderOutcome::built(records, vec![artifact]))
}
