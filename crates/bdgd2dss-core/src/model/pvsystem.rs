use polars::prelude::DataFrame;

use crate::case::{Artifact, ArtifactKind, CalendarRole};
use crate::config::{GeneratorModel, RunConfig};
use crate::error::PipelineError;
use crate::model::{f64_cell, fmt_num, str_cell, BuilderOutcome};
use crate::phases;
use crate::voltages;

pub const LV_ARTIFACT_NAME: &str = "GD_BT_DU_01.dss";
pub const MV_ARTIFACT_NAME: &str = "GD_MT_DU_01.dss";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationLevel {
    Lv,
    Mv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    Generator,
    PvSystem,
}

/// One distributed-generation unit (UGBT_tab / UGMT_tab).
#[derive(Debug, Clone)]
pub struct Generation {
    pub name: String,
    pub bus1: String,
    pub nphases: usize,
    pub kv: f64,
    pub kw: f64,
    pub kind: GenerationKind,
}

impl Generation {
    fn definition(&self) -> String {
        match self.kind {
            GenerationKind::Generator => format!(
                "New \"Generator.{}\" bus1=\"{}\" phases={} kv={} kw={} pf=0.92 model=1 status=variable\n",
                self.name,
                self.bus1,
                self.nphases,
                voltages::fmt_kv(self.kv),
                fmt_num(self.kw),
            ),
            GenerationKind::PvSystem => format!(
                "New \"PVSystem.{}\" bus1=\"{}\" phases={} kv={} kva={} pmpp={} irradiance=1 pf=1\n",
                self.name,
                self.bus1,
                self.nphases,
                voltages::fmt_kv(self.kv),
                fmt_num(self.kw),
                fmt_num(self.kw),
            ),
        }
    }
}

fn resolve_kind(model: GeneratorModel, ceg: &str) -> GenerationKind {
    match model {
        GeneratorModel::Generator => GenerationKind::Generator,
        GeneratorModel::PvSystem => GenerationKind::PvSystem,
        // CEG codes carry the plant class; UFV marks photovoltaic plants.
        GeneratorModel::AsBdgd => {
            if ceg.to_ascii_uppercase().starts_with("UFV") {
                GenerationKind::PvSystem
            } else {
                GenerationKind::Generator
            }
        }
    }
}

/// Builds the generation artifact for one voltage level. The artifact name
/// starts with the reserved `GD` prefix, so the master keeps its redirect
/// commented out.
pub fn build(
    config: &RunConfig,
    level: GenerationLevel,
    table: &DataFrame,
) -> Result<BuilderOutcome<Generation>, PipelineError> {
    let (table_name, artifact_name, role, model, prefix) = match level {
        GenerationLevel::Lv => (
            "UGBT_tab",
            LV_ARTIFACT_NAME,
            CalendarRole::GenerationLv,
            config.gen_model_lv,
            "GD_BT",
        ),
        GenerationLevel::Mv => (
            "UGMT_tab",
            MV_ARTIFACT_NAME,
            CalendarRole::GenerationMv,
            config.gen_model_mv,
            "GD_MT",
        ),
    };

    if table.is_empty() {
        return Ok(BuilderOutcome::Empty { table: table_name });
    }

    let mut records = Vec::with_capacity(table.height());
    let mut content = String::new();

    for row in 0..table.height() {
        let cod = str_cell(table, "COD_ID", row)?;
        let pac = str_cell(table, "PAC", row)?;
        let conn = phases::phase_connection(&str_cell(table, "FAS_CON", row)?, config.four_wire)?;
        let kv = voltages::kv_from_code(&str_cell(table, "TEN_FORN", row)?)?;
        let kw = f64_cell(table, "POT_INST", row)?;
        let ceg = str_cell(table, "CEG", row)?;

        let unit = Generation {
            name: format!("{prefix}_{cod}"),
            bus1: format!("{pac}{}", conn.nodes),
            nphases: conn.nphases,
            kv,
            kw,
            kind: resolve_kind(model, &ceg),
        };
        content.push_str(&unit.definition());
        records.push(unit);
    }

    let artifact = Artifact::new_calendar(ArtifactKind::Generation, role, artifact_name, content);
    Ok(BuilderOutcome::built(records, vec![artifact]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn units_frame(ceg: &str) -> DataFrame {
        df![
            "COD_ID" => ["G1"],
            "CTMT" => ["F1"],
            "PAC" => ["B7"],
            "FAS_CON" => ["ABC"],
            "TEN_FORN" => ["34"],
            "POT_INST" => [75.0],
            "CEG" => [ceg],
        ]
        .unwrap()
    }

    #[test]
    fn as_bdgd_mode_follows_the_ceg_class() {
        let config = RunConfig::default();
        match build(&config, GenerationLevel::Mv, &units_frame("UFV.CP.012345")).unwrap() {
            BuilderOutcome::Built { records, artifacts } => {
                assert_eq!(records[0].kind, GenerationKind::PvSystem);
                assert_eq!(artifacts[0].name, MV_ARTIFACT_NAME);
                assert!(artifacts[0].is_disabled_redirect());
                assert!(artifacts[0].content.contains("PVSystem.GD_MT_G1"));
            }
            other => panic!("expected Built, got {other:?}"),
        }

        match build(&config, GenerationLevel::Mv, &units_frame("UTE.CP.000001")).unwrap() {
            BuilderOutcome::Built { records, .. } => {
                assert_eq!(records[0].kind, GenerationKind::Generator);
            }
            other => panic!("expected Built, got {other:?}"),
        }
    }

    #[test]
    fn lv_mode_is_forced_by_configuration() {
        let mut config = RunConfig::default();
        config.gen_model_lv = GeneratorModel::PvSystem;
        match build(&config, GenerationLevel::Lv, &units_frame("GD.XX.1")).unwrap() {
            BuilderOutcome::Built { records, artifacts } => {
                assert_eq!(records[0].kind, GenerationKind::PvSystem);
                assert_eq!(artifacts[0].name, LV_ARTIFACT_NAME);
            }
            other => panic!("expected Built, got {other:?}"),
        }
    }
}
