use polars::prelude::*;
use tracing::{info, warn};

use crate::calendar;
use crate::case::Case;
use crate::config::RunConfig;
use crate::dataset::{self, FeederDataset, JoinCheck};
use crate::error::PipelineError;
use crate::master;
use crate::model::{
    buscoords, capacitor, circuit, line, linecode, load, loadshape, pvsystem, regcontrol,
    transformer, BuilderOutcome,
};

/// Segment tables, in emission order: MV spans, MV switches, LV spans, LV
/// switches, service drops.
const LINE_TABLES: [&str; 5] = ["SSDMT", "UNSEMT", "SSDBT", "UNSEBT", "RAMLIG"];

/// Geometry sources for bus coordinates; first table wins on shared buses.
const COORD_TABLES: [&str; 2] = ["SSDMT", "SSDBT"];

/// Feeder identifiers present in the circuit index table.
pub fn feeder_list(dataset: &FeederDataset) -> Result<Vec<String>, PipelineError> {
    let ctmt = dataset.frame("CTMT")?;
    let ids = ctmt.column("COD_ID")?.str()?;
    Ok(ids.into_iter().flatten().map(str::to_string).collect())
}

/// Runs the pipeline for the configured feeder, or for every feeder in CTMT
/// sequentially over the same loaded dataset. In all-feeders mode a feeder
/// that aborts does not stop the remaining feeders.
pub fn run(config: &RunConfig, dataset: &FeederDataset) -> Result<Vec<Case>, PipelineError> {
    match &config.feeder {
        Some(feeder) => Ok(vec![assemble_case(config, dataset, feeder)?]),
        None => {
            let mut cases = Vec::new();
            for feeder in feeder_list(dataset)? {
                match assemble_case(config, dataset, &feeder) {
                    Ok(case) => cases.push(case),
                    Err(err) => warn!(feeder = %feeder, error = %err, "feeder aborted"),
                }
            }
            Ok(cases)
        }
    }
}

/// Folds one builder outcome into the case. Every failure mode short of
/// `FeederNotFound` is contained here: the entity kind is skipped with a
/// diagnostic and processing moves on.
fn apply<T>(
    case: &mut Case,
    entity: &'static str,
    outcome: Result<BuilderOutcome<T>, PipelineError>,
    assign: impl FnOnce(&mut Case, Vec<T>),
) {
    match outcome {
        Ok(BuilderOutcome::Built { records, artifacts }) => {
            info!(entity, records = records.len(), "built entity definitions");
            assign(case, records);
            for artifact in artifacts {
                case.push_artifact(artifact);
            }
        }
        Ok(BuilderOutcome::Empty { table }) => {
            warn!(entity, table, "no rows for this feeder; skipping entity kind");
        }
        Ok(BuilderOutcome::BrokenAssociation {
            equipment,
            instances,
        }) => {
            warn!(
                entity,
                equipment,
                instances,
                "instances exist but match no equipment row; check the association"
            );
        }
        Err(err) => {
            warn!(entity, error = %err, "builder failed; continuing with remaining entity kinds");
        }
    }
}

fn joined_outcome<T>(
    dataset: &FeederDataset,
    feeder: &str,
    equipment_table: &'static str,
    instance_table: &'static str,
    fk_left: &str,
    build: impl FnOnce(&DataFrame) -> Result<BuilderOutcome<T>, PipelineError>,
) -> Result<BuilderOutcome<T>, PipelineError> {
    let equipment = dataset.frame(equipment_table)?;
    let instances = dataset.filter_by_feeder(instance_table, feeder)?;
    match dataset::join_equipment_instances(equipment, &instances, fk_left, "COD_ID", feeder)? {
        JoinCheck::Joined(joined) => build(&joined),
        JoinCheck::InstancesEmpty => Ok(BuilderOutcome::Empty {
            table: instance_table,
        }),
        JoinCheck::BrokenAssociation => Ok(BuilderOutcome::BrokenAssociation {
            equipment: equipment_table,
            instances: instance_table,
        }),
    }
}

/// Builds the complete artifact set for one feeder. Only an unknown feeder
/// aborts; every entity-kind failure is downgraded to a diagnostic and a
/// skipped artifact.
pub fn assemble_case(
    config: &RunConfig,
    dataset: &FeederDataset,
    feeder: &str,
) -> Result<Case, PipelineError> {
    let ctmt = dataset.frame("CTMT")?;
    let slice = ctmt
        .clone()
        .lazy()
        .filter(col("COD_ID").eq(lit(feeder.to_string())))
        .collect()?;
    if slice.is_empty() {
        return Err(PipelineError::FeederNotFound(feeder.to_string()));
    }

    info!(feeder, "building feeder case");
    let mut case = Case::new(feeder);

    apply(&mut case, "Circuit", circuit::build(&slice), |case, r| {
        case.circuits = r
    });

    apply(
        &mut case,
        "LineCode",
        dataset.frame("SEGCON").and_then(linecode::build),
        |case, r| case.line_codes = r,
    );

    for table in LINE_TABLES {
        let outcome = dataset
            .filter_by_feeder(table, feeder)
            .and_then(|frame| line::build(config, table, &frame));
        apply(&mut case, table, outcome, |case, mut r| {
            case.lines.append(&mut r)
        });
    }

    let outcome = joined_outcome(dataset, feeder, "EQTRMT", "UNTRMT", "UNI_TR_MT", |joined| {
        transformer::build(config, joined)
    });
    apply(&mut case, "Transformer", outcome, |case, r| {
        case.transformers = r
    });

    let outcome = joined_outcome(dataset, feeder, "EQRE", "UNREMT", "UN_RE", |joined| {
        regcontrol::build(config, joined)
    });
    apply(&mut case, "RegControl", outcome, |case, r| {
        case.regcontrols = r
    });

    if config.capacitors {
        let outcome = dataset
            .filter_by_feeder("UNCRMT", feeder)
            .and_then(|frame| capacitor::build(config, &frame));
        apply(&mut case, "Capacitor", outcome, |case, r| {
            case.capacitors = r
        });
    }

    apply(
        &mut case,
        "LoadShape",
        dataset.frame("CRVCRG").and_then(loadshape::build),
        |case, r| case.load_shapes = r,
    );

    let outcome = dataset.filter_by_feeder("UCBT_tab", feeder).and_then(|ucbt| {
        let pip = match dataset.filter_by_feeder("PIP", feeder) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "PIP unavailable; low-voltage loads proceed without it");
                DataFrame::empty()
            }
        };
        load::build_lv(config, &ucbt, &pip)
    });
    apply(&mut case, "Load/LV", outcome, |case, mut r| {
        case.loads.append(&mut r)
    });

    let outcome = dataset
        .filter_by_feeder("UCMT_tab", feeder)
        .and_then(|ucmt| load::build_mv(config, &ucmt));
    apply(&mut case, "Load/MV", outcome, |case, mut r| {
        case.loads.append(&mut r)
    });

    for (table, level) in [
        ("UGBT_tab", pvsystem::GenerationLevel::Lv),
        ("UGMT_tab", pvsystem::GenerationLevel::Mv),
    ] {
        let outcome = dataset
            .filter_by_feeder(table, feeder)
            .and_then(|frame| pvsystem::build(config, level, &frame));
        apply(&mut case, table, outcome, |case, mut r| {
            case.generation.append(&mut r)
        });
    }

    if config.coords {
        let mut frames: Vec<(&'static str, DataFrame)> = Vec::new();
        for table in COORD_TABLES {
            match dataset.get(table) {
                Ok(entry) if entry.has_geometry => {
                    match dataset::filter_frame_by_feeder(&entry.frame, feeder) {
                        Ok(frame) => frames.push((table, frame)),
                        Err(err) => warn!(table, error = %err, "coordinate source unusable"),
                    }
                }
                Ok(_) => warn!(table, "geometry columns absent; skipping coordinate source"),
                Err(err) => warn!(table, error = %err, "coordinate source missing"),
            }
        }
        let refs: Vec<(&str, &DataFrame)> = frames.iter().map(|(n, f)| (*n, f)).collect();
        apply(&mut case, "BusCoords", buscoords::build(&refs), |case, r| {
            case.bus_coords = r
        });
    }

    let master = master::build(&case);
    case.push_artifact(master);

    let expanded = calendar::expand(case.artifacts());
    case.replace_artifacts(expanded);

    Ok(case)
}
