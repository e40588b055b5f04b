use polars::prelude::DataFrame;

use crate::case::{Artifact, ArtifactKind};
use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::model::{f64_cell, fmt_num, str_cell, BuilderOutcome};
use crate::phases;
use crate::voltages;

pub const ARTIFACT_NAME: &str = "Reguladores.dss";

/// One voltage regulator bank, from the joined EQRE × UNREMT frame. Each
/// bank comes out as a regulating transformer plus its RegControl element.
#[derive(Debug, Clone)]
pub struct RegControl {
    pub name: String,
    pub bus1: String,
    pub bus2: String,
    pub nphases: usize,
    pub kv: f64,
    pub kva: f64,
    pub ptratio: f64,
    /// Regulated voltage on the PT secondary.
    pub vreg: f64,
}

impl RegControl {
    fn definition(&self) -> String {
        format!(
            concat!(
                "New \"Transformer.REG_{name}\" phases={phases} windings=2 buses=(\"{bus1}\" \"{bus2}\") ",
                "conns=(wye wye) kvs=({kv} {kv}) kvas=({kva} {kva}) xhl=0.5 %loadloss=0.01\n",
                "New \"RegControl.{name}\" transformer=\"REG_{name}\" winding=2 vreg={vreg} band=2 ",
                "ptratio={ptratio} maxtapchange=1 numtaps=32\n",
            ),
            name = self.name,
            phases = self.nphases,
            bus1 = self.bus1,
            bus2 = self.bus2,
            kv = voltages::fmt_kv(self.kv),
            kva = fmt_num(self.kva),
            vreg = fmt_num(self.vreg),
            ptratio = fmt_num(self.ptratio),
        )
    }
}

/// Builds regulator banks from the already-joined equipment+unit frame.
pub fn build(
    config: &RunConfig,
    joined: &DataFrame,
) -> Result<BuilderOutcome<RegControl>, PipelineError> {
    if joined.is_empty() {
        return Ok(BuilderOutcome::Empty { table: "UNREMT" });
    }

    let mut records = Vec::with_capacity(joined.height());
    let mut content = String::new();

    for row in 0..joined.height() {
        let unit = str_cell(joined, "UN_RE", row)?;
        let conn = phases::phase_connection(&str_cell(joined, "FAS_CON", row)?, config.four_wire)?;
        let kv = voltages::nearest_standard(voltages::kv_from_code(&str_cell(
            joined, "TEN_NOM", row,
        )?)?);
        let kva = f64_cell(joined, "POT_NOM", row)?;
        let ptratio = f64_cell(joined, "REL_TP", row)?;

        // Line-to-neutral target on the PT secondary.
        let kv_ln = if conn.nphases == 3 {
            kv / 3f64.sqrt()
        } else {
            kv
        };
        let vreg = if ptratio > 0.0 {
            kv_ln * 1000.0 / ptratio
        } else {
            kv_ln * 1000.0
        };

        let bank = RegControl {
            name: unit,
            bus1: format!("{}{}", str_cell(joined, "PAC_1", row)?, conn.nodes),
            bus2: format!("{}{}", str_cell(joined, "PAC_2", row)?, conn.nodes),
            nphases: conn.nphases,
            kv,
            kva,
            ptratio,
            vreg,
        };
        content.push_str(&bank.definition());
        records.push(bank);
    }

    let artifact = Artifact::new_static(ArtifactKind::RegControl, ARTIFACT_NAME, content);
    Ok(BuilderOutcome::built(records, vec![artifact]))
}
