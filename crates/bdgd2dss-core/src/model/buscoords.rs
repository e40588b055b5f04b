use std::collections::HashSet;

use polars::prelude::DataFrame;

use crate::case::{Artifact, ArtifactKind};
use crate::error::PipelineError;
use crate::model::{str_cell, BuilderOutcome};

/// Fixed name referenced by the hardcoded redirect at the end of every
/// master script.
pub const ARTIFACT_NAME: &str = "buscoords.csv";

#[derive(Debug, Clone)]
pub struct BusCoord {
    pub bus: String,
    pub x: f64,
    pub y: f64,
}

/// Pulls one coordinate pair per bus out of the segment geometries: the
/// first vertex of a segment locates its PAC_1, the last its PAC_2. The
/// first table wins on duplicate buses, so MV geometry takes precedence
/// when both carry a bus.
pub fn build(tables: &[(&str, &DataFrame)]) -> Result<BuilderOutcome<BusCoord>, PipelineError> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut records: Vec<BusCoord> = Vec::new();

    for (table_name, frame) in tables {
        for row in 0..frame.height() {
            let wkt = str_cell(frame, "geometry", row)?;
            let vertices =
                parse_linestring(&wkt).map_err(|message| PipelineError::Geometry {
                    table: table_name.to_string(),
                    row,
                    message,
                })?;
            let (first, last) = match (vertices.first(), vertices.last()) {
                (Some(first), Some(last)) => (*first, *last),
                _ => continue,
            };

            for (bus, (x, y)) in [
                (str_cell(frame, "PAC_1", row)?, first),
                (str_cell(frame, "PAC_2", row)?, last),
            ] {
                if !bus.is_empty() && seen.insert(bus.clone()) {
                    records.push(BusCoord { bus, x, y });
                }
            }
        }
    }

    if records.is_empty() {
        return Ok(BuilderOutcome::Empty { table: "SSDMT" });
    }

    let content = serialize(&records)?;
    let artifact = Artifact::new_static(ArtifactKind::BusCoords, ARTIFACT_NAME, content);
    Ok(BuilderOutcome::built(records, vec![artifact]))
}

/// OpenDSS buscoords files carry no header row.
fn serialize(records: &[BusCoord]) -> Result<String, PipelineError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for coord in records {
        writer
            .write_record([
                coord.bus.as_str(),
                &format!("{:.6}", coord.x),
                &format!("{:.6}", coord.y),
            ])
            .map_err(|err| PipelineError::Builder {
                entity: "BusCoords",
                message: err.to_string(),
            })?;
    }
    let bytes = writer.into_inner().map_err(|err| PipelineError::Builder {
        entity: "BusCoords",
        message: err.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|err| PipelineError::Builder {
        entity: "BusCoords",
        message: err.to_string(),
    })
}

/// Minimal WKT LINESTRING reader; the loader guarantees geometry tables
/// carry this form.
fn parse_linestring(wkt: &str) -> Result<Vec<(f64, f64)>, String> {
    let trimmed = wkt.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let rest = trimmed
        .strip_prefix("LINESTRING")
        .ok_or_else(|| format!("expected LINESTRING, got '{trimmed}'"))?
        .trim();
    let inner = rest
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| "unbalanced parentheses".to_string())?;

    let mut vertices = Vec::new();
    for pair in inner.split(',') {
        let mut parts = pair.split_whitespace();
        let x: f64 = parts
            .next()
            .ok_or_else(|| "missing x coordinate".to_string())?
            .parse()
            .map_err(|_| format!("bad coordinate in '{pair}'"))?;
        let y: f64 = parts
            .next()
            .ok_or_else(|| "missing y coordinate".to_string())?
            .parse()
            .map_err(|_| format!("bad coordinate in '{pair}'"))?;
        vertices.push((x, y));
    }
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn endpoints_map_to_pac_buses_first_wins() {
        let mt = df![
            "PAC_1" => ["B1"],
            "PAC_2" => ["B2"],
            "geometry" => ["LINESTRING (10.0 20.0, 11.0 21.0, 12.0 22.0)"],
        ]
        .unwrap();
        let bt = df![
            "PAC_1" => ["B2"],
            "PAC_2" => ["B3"],
            "geometry" => ["LINESTRING (99.0 99.0, 13.0 23.0)"],
        ]
        .unwrap();

        match build(&[("SSDMT", &mt), ("SSDBT", &bt)]).unwrap() {
            BuilderOutcome::Built { records, artifacts } => {
                assert_eq!(records.len(), 3);
                let b2 = records.iter().find(|c| c.bus == "B2").unwrap();
                // B2 keeps the MV endpoint, not the BT duplicate.
                assert_eq!(b2.x, 12.0);
                assert!(artifacts[0].content.starts_with("B1,10.000000,20.000000"));
            }
            other => panic!("expected Built, got {other:?}"),
        }
    }

    #[test]
    fn malformed_geometry_is_a_named_error() {
        let mt = df![
            "PAC_1" => ["B1"],
            "PAC_2" => ["B2"],
            "geometry" => ["POINT (1 2)"],
        ]
        .unwrap();
        assert!(matches!(
            build(&[("SSDMT", &mt)]),
            Err(PipelineError::Geometry { .. })
        ));
    }
}
