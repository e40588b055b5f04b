use polars::prelude::DataFrame;

use crate::case::{Artifact, ArtifactKind};
use crate::config::RunConfig;
use crate::error::PipelineError;
use crate::model::{f64_cell, fmt_num, str_cell, BuilderOutcome};
use crate::phases;

/// Service drops longer than this are capped when `limit_ramal_30m` is on.
pub const RAMAL_LIMIT_M: f64 = 30.0;

/// Drops at or below this length model a service entrance, not a span.
const ENTRANCE_THRESHOLD_M: f64 = 1.0;

/// One line segment (or sectionalizing switch) of any of the five segment
/// tables.
#[derive(Debug, Clone)]
pub struct Line {
    pub name: String,
    pub bus1: String,
    pub bus2: String,
    pub nphases: usize,
    /// Empty for switches.
    pub linecode: String,
    pub length_m: f64,
    pub switch: bool,
}

impl Line {
    fn definition(&self) -> String {
        if self.switch {
            format!(
                "New \"Line.{}\" phases={} bus1=\"{}\" bus2=\"{}\" switch=y r1=0.001 x1=0 c1=0\n",
                self.name, self.nphases, self.bus1, self.bus2,
            )
        } else {
            format!(
                "New \"Line.{}\" phases={} bus1=\"{}\" bus2=\"{}\" linecode=\"{}\" length={} units=m\n",
                self.name,
                self.nphases,
                self.bus1,
                self.bus2,
                self.linecode,
                fmt_num(self.length_m),
            )
        }
    }
}

fn artifact_name(entity: &str) -> String {
    match entity {
        "SSDMT" => "LinhasMT_SSDMT.dss".to_string(),
        "SSDBT" => "LinhasBT_SSDBT.dss".to_string(),
        "UNSEMT" => "ChavesMT_UNSEMT.dss".to_string(),
        "UNSEBT" => "ChavesBT_UNSEBT.dss".to_string(),
        "RAMLIG" => "Ramais_RAMLIG.dss".to_string(),
        other => format!("Linhas_{other}.dss"),
    }
}

fn is_switch_table(entity: &str) -> bool {
    matches!(entity, "UNSEMT" | "UNSEBT")
}

/// Builds the line group for one segment table, feeder-scoped. UNSE* tables
/// hold sectionalizing units and come out as switches; RAMLIG service drops
/// honor the 30 m cap and split their sub-metre entrance jumpers into an
/// auxiliary artifact.
pub fn build(
    config: &RunConfig,
    entity: &'static str,
    table: &DataFrame,
) -> Result<BuilderOutcome<Line>, PipelineError> {
    if table.is_empty() {
        return Ok(BuilderOutcome::Empty { table: entity });
    }

    let switches = is_switch_table(entity);
    let ramal = entity == "RAMLIG";

    let mut records = Vec::with_capacity(table.height());
    let mut content = String::new();
    let mut entrance_content = String::new();

    for row in 0..table.height() {
        let cod = str_cell(table, "COD_ID", row)?;
        let pac1 = str_cell(table, "PAC_1", row)?;
        let pac2 = str_cell(table, "PAC_2", row)?;
        let conn = phases::phase_connection(&str_cell(table, "FAS_CON", row)?, config.four_wire)?;

        let bus1 = format!("{pac1}{}", conn.nodes);
        let bus2 = format!("{pac2}{}", conn.nodes);

        let line = if switches {
            Line {
                name: format!("{entity}_{cod}"),
                bus1,
                bus2,
                nphases: conn.nphases,
                linecode: String::new(),
                length_m: 0.0,
                switch: true,
            }
        } else {
            let mut length = f64_cell(table, "COMP", row)?;
            if ramal && config.limit_ramal_30m && length > RAMAL_LIMIT_M {
                length = RAMAL_LIMIT_M;
            }
            let conductor = str_cell(table, "TIP_CND", row)?;

            if ramal && length <= ENTRANCE_THRESHOLD_M {
                let entrance = Line {
                    name: format!("ENTRADA_{cod}"),
                    bus1,
                    bus2,
                    nphases: conn.nphases,
                    linecode: String::new(),
                    length_m: 0.0,
                    switch: true,
                };
                entrance_content.push_str(&entrance.definition());
                records.push(entrance);
                continue;
            }

            Line {
                name: format!("{entity}_{cod}"),
                bus1,
                bus2,
                nphases: conn.nphases,
                linecode: format!("{conductor}_{}", conn.wires()),
                length_m: length,
                switch: false,
            }
        };

        content.push_str(&line.definition());
        records.push(line);
    }

    let mut artifacts = vec![Artifact::new_static(
        ArtifactKind::Line,
        artifact_name(entity),
        content,
    )];
    if !entrance_content.is_empty() {
        artifacts.push(Artifact::new_static(
            ArtifactKind::Line,
            format!("EntradasDeEnergia_{entity}.dss"),
            entrance_content,
        ));
    }

    Ok(BuilderOutcome::built(records, artifacts))
}
