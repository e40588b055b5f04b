use std::collections::BTreeMap;

use polars::prelude::*;

use crate::error::PipelineError;

/// Column carrying the feeder foreign key on every feeder-scoped table.
pub const FEEDER_FK: &str = "CTMT";

/// One loaded source table. `has_geometry` marks tables whose rows carry a
/// WKT geometry column usable for bus coordinates.
#[derive(Debug, Clone)]
pub struct TableEntry {
    pub frame: DataFrame,
    pub has_geometry: bool,
}

/// The loaded multi-table dataset. Read-only for the duration of a session;
/// every feeder run re-filters from the same frames.
#[derive(Debug, Default)]
pub struct FeederDataset {
    tables: BTreeMap<String, TableEntry>,
}

impl FeederDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, entry: TableEntry) {
        self.tables.insert(name.into(), entry);
    }

    pub fn get(&self, name: &str) -> Result<&TableEntry, PipelineError> {
        self.tables
            .get(name)
            .ok_or_else(|| PipelineError::TableMissing(name.to_string()))
    }

    pub fn frame(&self, name: &str) -> Result<&DataFrame, PipelineError> {
        self.get(name).map(|entry| &entry.frame)
    }

    /// Slices `table` down to the rows belonging to `feeder`. Row order and
    /// all columns are preserved; a feeder with no rows yields an empty frame,
    /// a missing table yields `TableMissing`.
    pub fn filter_by_feeder(&self, table: &str, feeder: &str) -> Result<DataFrame, PipelineError> {
        let frame = self.frame(table)?;
        filter_frame_by_feeder(frame, feeder)
    }
}

/// Feeder filter on an already-loaded frame, keyed on the `CTMT` column.
pub fn filter_frame_by_feeder(frame: &DataFrame, feeder: &str) -> Result<DataFrame, PipelineError> {
    let filtered = frame
        .clone()
        .lazy()
        .filter(col(FEEDER_FK).eq(lit(feeder.to_string())))
        .collect()?;
    Ok(filtered)
}

/// Outcome of an equipment × instance join, keeping the two empty cases
/// apart: no instances for the feeder is benign, instances that match no
/// equipment row is a dataset defect.
#[derive(Debug)]
pub enum JoinCheck {
    Joined(DataFrame),
    InstancesEmpty,
    BrokenAssociation,
}

/// Inner join between an equipment-definition table and a feeder-scoped
/// instance table, keyed on `equipment[fk_left] == instances[fk_right]`.
///
/// The equipment table is never feeder-scoped, so the join runs on the full
/// equipment frame against the feeder-scoped instances and the joined result
/// is re-filtered by feeder afterwards. Filtering the equipment side first
/// would drop associations that cross feeder boundaries at the data level.
pub fn join_equipment_instances(
    equipment: &DataFrame,
    instances: &DataFrame,
    fk_left: &str,
    fk_right: &str,
    feeder: &str,
) -> Result<JoinCheck, PipelineError> {
    if instances.is_empty() {
        return Ok(JoinCheck::InstancesEmpty);
    }

    let joined = equipment
        .clone()
        .lazy()
        .join(
            instances.clone().lazy(),
            [col(fk_left)],
            [col(fk_right)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    let joined = filter_frame_by_feeder(&joined, feeder)?;
    if joined.is_empty() {
        Ok(JoinCheck::BrokenAssociation)
    } else {
        Ok(JoinCheck::Joined(joined))
    }
}
