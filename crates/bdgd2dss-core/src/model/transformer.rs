use polars::prelude::DataFrame;

use crate::case::{Artifact, ArtifactKind};
use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::model::{f64_cell, fmt_num, str_cell, BuilderOutcome};
use crate::phases;
use crate::voltages;

pub const ARTIFACT_NAME: &str = "Transformadores.dss";

/// One distribution transformer, from the joined EQTRMT × UNTRMT frame
/// (equipment ratings + unit placement).
#[derive(Debug, Clone)]
pub struct Transformer {
    pub name: String,
    pub buses: Vec<String>,
    pub nphases: usize,
    pub kv_pri: f64,
    pub kv_sec: f64,
    pub kva: f64,
    pub conns: Vec<&'static str>,
    pub loadloss_pct: f64,
    pub noloadloss_pct: f64,
}

impl Transformer {
    fn definition(&self) -> String {
        let buses: Vec<String> = self.buses.iter().map(|b| format!("\"{b}\"")).collect();
        let mut kvs = vec![voltages::fmt_kv(self.kv_pri)];
        let mut kvas = vec![fmt_num(self.kva)];
        for _ in 1..self.buses.len() {
            kvs.push(voltages::fmt_kv(self.kv_sec));
            kvas.push(fmt_num(self.kva));
        }
        format!(
            "New \"Transformer.{}\" phases={} windings={} buses=({}) conns=({}) kvs=({}) kvas=({}) %loadloss={} %noloadloss={} xhl=3.5\n",
            self.name,
            self.nphases,
            self.buses.len(),
            buses.join(" "),
            self.conns.join(" "),
            kvs.join(" "),
            kvas.join(" "),
            fmt_num(self.loadloss_pct),
            fmt_num(self.noloadloss_pct),
        )
    }
}

/// BDGD `LIG` connection codes.
fn winding_conns(lig: &str, windings: usize) -> Vec<&'static str> {
    let (pri, sec) = match lig.trim() {
        "2" => ("wye", "wye"),
        "3" => ("delta", "delta"),
        _ => ("delta", "wye"),
    };
    let mut conns = vec![pri];
    for _ in 1..windings {
        conns.push(sec);
    }
    conns
}

/// Losses come in watts; OpenDSS wants percent of rated kVA.
fn loss_pct(watts: f64, kva: f64) -> f64 {
    if kva > 0.0 {
        watts / (10.0 * kva)
    } else {
        0.0
    }
}

/// Builds transformers from the already-joined equipment+unit frame. The
/// joiner has guaranteed the frame is feeder-scoped and non-empty.
pub fn build(
    config: &RunConfig,
    joined: &DataFrame,
) -> Result<BuilderOutcome<Transformer>, PipelineError> {
    if joined.is_empty() {
        return Ok(BuilderOutcome::Empty { table: "UNTRMT" });
    }

    let mut records = Vec::with_capacity(joined.height());
    let mut content = String::new();

    for row in 0..joined.height() {
        let unit = str_cell(joined, "UNI_TR_MT", row)?;
        let conn = phases::phase_connection(&str_cell(joined, "FAS_CON", row)?, config.four_wire)?;
        let kva = f64_cell(joined, "POT_NOM", row)?;
        let kv_pri = voltages::nearest_standard(voltages::kv_from_code(&str_cell(
            joined, "TEN_PRI", row,
        )?)?);
        let kv_sec = voltages::nearest_standard(voltages::kv_from_code(&str_cell(
            joined, "TEN_SEC", row,
        )?)?);
        let per_fer = f64_cell(joined, "PER_FER", row)?;
        let per_tot = f64_cell(joined, "PER_TOT", row)?;

        // Primary connects phase-only; the secondary carries the neutral.
        let pri_nodes: String = (1..=conn.nphases).map(|n| format!(".{n}")).collect();
        let mut buses = vec![format!("{}{pri_nodes}", str_cell(joined, "PAC_1", row)?)];
        buses.push(format!("{}{}", str_cell(joined, "PAC_2", row)?, conn.nodes));
        let pac3 = str_cell(joined, "PAC_3", row)?;
        if !pac3.is_empty() {
            buses.push(format!("{pac3}{}", conn.nodes));
        }

        let windings = buses.len();
        let transformer = Transformer {
            name: unit,
            buses,
            nphases: conn.nphases,
            kv_pri,
            kv_sec,
            kva,
            conns: winding_conns(&str_cell(joined, "LIG", row)?, windings),
            loadloss_pct: loss_pct(per_tot - per_fer, kva),
            noloadloss_pct: loss_pct(per_fer, kva),
        };
        content.push_str(&transformer.definition());
        records.push(transformer);
    }

    let artifact = Artifact::new_static(ArtifactKind::Transformer, ARTIFACT_NAME, content);
    Ok(BuilderOutcome::built(records, vec![artifact]))
}
