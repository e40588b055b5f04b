use polars::prelude::DataFrame;

use crate::case::{Artifact, ArtifactKind};
use crate::error::PipelineError;
use crate::model::{f64_cell, fmt_num, str_cell, BuilderOutcome};

pub const ARTIFACT_NAME: &str = "CurvasDeCarga.dss";

/// Hourly points per CRVCRG curve row.
pub const CURVE_POINTS: usize = 24;

/// One simulator day shape: a CRVCRG load-curve type for one day type,
/// normalized to per-unit of its own mean. Loads reference these as
/// `<curve>_<day_type>`.
#[derive(Debug, Clone)]
pub struct LoadShape {
    pub name: String,
    pub mult: Vec<f64>,
}

impl LoadShape {
    fn definition(&self) -> String {
        let points: Vec<String> = self.mult.iter().map(|v| fmt_num(*v)).collect();
        format!(
            "New \"Loadshape.{}\" npts={} interval=1.0 mult=({})\n",
            self.name,
            self.mult.len(),
            points.join(" "),
        )
    }
}

fn point_columns() -> Vec<String> {
    (1..=CURVE_POINTS).map(|p| format!("POT_{p:02}")).collect()
}

/// Converts the CRVCRG curve table (one row per curve type × day type) into
/// day shapes. The table is a catalog shared by all feeders.
pub fn build(crvcrg: &DataFrame) -> Result<BuilderOutcome<LoadShape>, PipelineError> {
    if crvcrg.is_empty() {
        return Ok(BuilderOutcome::Empty { table: "CRVCRG" });
    }

    let columns = point_columns();
    let mut records = Vec::with_capacity(crvcrg.height());
    let mut content = String::new();

    for row in 0..crvcrg.height() {
        let curve = str_cell(crvcrg, "COD_ID", row)?;
        let day_type = str_cell(crvcrg, "TIP_DIA", row)?;

        let mut points = Vec::with_capacity(CURVE_POINTS);
        for column in &columns {
            points.push(f64_cell(crvcrg, column, row)?);
        }

        let mean = points.iter().sum::<f64>() / points.len() as f64;
        if mean > 0.0 {
            for point in points.iter_mut() {
                *point /= mean;
            }
        }

        let shape = LoadShape {
            name: format!("{curve}_{day_type}"),
            mult: points,
        };
        content.push_str(&shape.definition());
        records.push(shape);
    }

    let artifact = Artifact::new_static(ArtifactKind::LoadShape, ARTIFACT_NAME, content);
    Ok(BuilderOutcome::built(records, vec![artifact]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    pub(crate) fn curve_frame(curves: &[(&str, &str)]) -> DataFrame {
        let mut columns: Vec<Column> = vec![
            Column::new(
                "COD_ID".into(),
                curves.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
            ),
            Column::new(
                "TIP_DIA".into(),
                curves.iter().map(|(_, d)| *d).collect::<Vec<_>>(),
            ),
        ];
        for p in 1..=CURVE_POINTS {
            let values: Vec<f64> = curves.iter().map(|_| if p <= 12 { 1.0 } else { 3.0 }).collect();
            columns.push(Column::new(format!("POT_{p:02}").into(), values));
        }
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn shapes_are_normalized_per_unit_of_mean() {
        let frame = curve_frame(&[("5", "DU"), ("5", "SA")]);
        match build(&frame).unwrap() {
            BuilderOutcome::Built { records, artifacts } => {
                assert_eq!(records.len(), 2);
                assert_eq!(records[0].name, "5_DU");
                // mean of 12×1.0 + 12×3.0 is 2.0
                assert!((records[0].mult[0] - 0.5).abs() < 1e-9);
                assert!((records[0].mult[23] - 1.5).abs() < 1e-9);
                assert!(artifacts[0].content.contains("New \"Loadshape.5_SA\" npts=24"));
            }
            other => panic!("expected Built, got {other:?}"),
        }
    }
}
