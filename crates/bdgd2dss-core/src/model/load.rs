use polars::prelude::*;

use crate::case::{Artifact, ArtifactKind, CalendarRole};
use crate::config::{LoadModel, RunConfig};
use crate::error::PipelineError;
use crate::model::{f64_cell, fmt_num, str_cell, BuilderOutcome};
use crate::phases;
use crate::voltages;

pub const LV_ARTIFACT_NAME: &str = "Cargas_BT_DU_01.dss";
pub const MV_ARTIFACT_NAME: &str = "Cargas_MT_DU_01.dss";

/// Hours in the regulatory year used to turn annual energy into mean demand.
const HOURS_PER_YEAR: f64 = 8760.0;

/// Descriptive columns carried through aggregation (last sub-record wins).
const UCBT_DESCRIPTIVE: &[&str] = &["FAS_CON", "TEN_FORN", "TIP_CC", "UNI_TR_MT", "DAT_CON"];
const PIP_DESCRIPTIVE: &[&str] = &["FAS_CON", "TEN_FORN", "TIP_CC"];
const UCMT_DESCRIPTIVE: &[&str] = &["FAS_CON", "TEN_FORN", "TIP_CC", "PN_CON"];

/// One aggregated load: a physical connection point with its year of
/// monthly energy.
#[derive(Debug, Clone)]
pub struct Load {
    pub name: String,
    pub bus1: String,
    pub nphases: usize,
    pub kv: f64,
    /// Day-shape reference carrying the `_DU` token for calendar expansion.
    pub daily: String,
    /// Mean annual demand.
    pub kw: f64,
    pub monthly_kwh: [f64; 12],
}

pub(crate) fn ene_columns() -> Vec<String> {
    (1..=12).map(|m| format!("ENE_{m:02}")).collect()
}

/// Collapses raw consumer sub-records into one row per connection point
/// (`PAC`): descriptive attributes keep the last value seen in input order,
/// the twelve monthly energy fields are summed.
pub fn aggregate_connection_points(
    table: &DataFrame,
    descriptive: &[&str],
) -> Result<DataFrame, PipelineError> {
    let mut aggs: Vec<Expr> = descriptive.iter().map(|c| col(*c).last()).collect();
    for column in ene_columns() {
        aggs.push(col(column.as_str()).sum());
    }

    let aggregated = table
        .clone()
        .lazy()
        .group_by_stable([col("PAC")])
        .agg(aggs)
        .collect()?;
    Ok(aggregated)
}

fn records_from(
    config: &RunConfig,
    aggregated: &DataFrame,
    prefix: &str,
) -> Result<(Vec<Load>, String), PipelineError> {
    let ene = ene_columns();
    let mut records = Vec::with_capacity(aggregated.height());
    let mut content = String::new();

    for row in 0..aggregated.height() {
        let pac = str_cell(aggregated, "PAC", row)?;
        let conn =
            phases::phase_connection(&str_cell(aggregated, "FAS_CON", row)?, config.four_wire)?;
        let kv = voltages::kv_from_code(&str_cell(aggregated, "TEN_FORN", row)?)?;
        let curve = str_cell(aggregated, "TIP_CC", row)?;

        let mut monthly = [0.0f64; 12];
        for (month, column) in ene.iter().enumerate() {
            monthly[month] = f64_cell(aggregated, column, row)?;
        }
        let kw = monthly.iter().sum::<f64>() / HOURS_PER_YEAR;

        let load = Load {
            name: format!("{prefix}_{pac}"),
            bus1: format!("{pac}{}", conn.nodes),
            nphases: conn.nphases,
            kv,
            daily: format!("{curve}_DU"),
            kw,
            monthly_kwh: monthly,
        };
        content.push_str(&definitions(config.load_model, &load));
        records.push(load);
    }

    Ok((records, content))
}

fn definitions(model: LoadModel, load: &Load) -> String {
    let common = format!(
        "bus1=\"{}\" phases={} conn=wye kv={} daily=\"{}\" pf=0.92 status=variable vminpu=0.92 vmaxpu=1.5",
        load.bus1,
        load.nphases,
        voltages::fmt_kv(load.kv),
        load.daily,
    );
    match model {
        LoadModel::Aneel => {
            // ANEEL split: half constant impedance, half constant current.
            format!(
                "New \"Load.{name}_1\" {common} model=2 kw={half}\nNew \"Load.{name}_2\" {common} model=3 kw={half}\n",
                name = load.name,
                common = common,
                half = fmt_num(load.kw / 2.0),
            )
        }
        LoadModel::Model8 => format!(
            "New \"Load.{name}\" {common} model=8 kw={kw}\n",
            name = load.name,
            common = common,
            kw = fmt_num(load.kw),
        ),
    }
}

/// Low-voltage loads: UCBT consumers plus public lighting (PIP), folded into
/// a single artifact the way the master expects them.
pub fn build_lv(
    config: &RunConfig,
    ucbt: &DataFrame,
    pip: &DataFrame,
) -> Result<BuilderOutcome<Load>, PipelineError> {
    if ucbt.is_empty() && pip.is_empty() {
        return Ok(BuilderOutcome::Empty { table: "UCBT_tab" });
    }

    let mut records = Vec::new();
    let mut content = String::new();

    if !ucbt.is_empty() {
        let aggregated = aggregate_connection_points(ucbt, UCBT_DESCRIPTIVE)?;
        let (mut built, block) = records_from(config, &aggregated, "BT")?;
        records.append(&mut built);
        content.push_str(&block);
    }
    if !pip.is_empty() {
        let aggregated = aggregate_connection_points(pip, PIP_DESCRIPTIVE)?;
        let (mut built, block) = records_from(config, &aggregated, "IP")?;
        records.append(&mut built);
        content.push_str(&block);
    }

    let artifact = Artifact::new_calendar(
        ArtifactKind::Load,
        CalendarRole::LoadLv,
        LV_ARTIFACT_NAME,
        content,
    );
    Ok(BuilderOutcome::built(records, vec![artifact]))
}

/// Medium-voltage consumer loads (UCMT).
pub fn build_mv(config: &RunConfig, ucmt: &DataFrame) -> Result<BuilderOutcome<Load>, PipelineError> {
    if ucmt.is_empty() {
        return Ok(BuilderOutcome::Empty { table: "UCMT_tab" });
    }

    let aggregated = aggregate_connection_points(ucmt, UCMT_DESCRIPTIVE)?;
    let (records, content) = records_from(config, &aggregated, "MT")?;

    let artifact = Artifact::new_calendar(
        ArtifactKind::Load,
        CalendarRole::LoadMv,
        MV_ARTIFACT_NAME,
        content,
    );
    Ok(BuilderOutcome::built(records, vec![artifact]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    pub(crate) fn consumer_frame(
        rows: &[(&str, &str, &str, &str, f64)],
        extra: &[(&str, Vec<&str>)],
    ) -> DataFrame {
        let mut columns: Vec<Column> = vec![
            Column::new(
                "PAC".into(),
                rows.iter().map(|r| r.0).collect::<Vec<_>>(),
            ),
            Column::new(
                "CTMT".into(),
                rows.iter().map(|r| r.1).collect::<Vec<_>>(),
            ),
            Column::new(
                "FAS_CON".into(),
                rows.iter().map(|r| r.2).collect::<Vec<_>>(),
            ),
            Column::new("TEN_FORN".into(), vec!["6"; rows.len()]),
            Column::new(
                "TIP_CC".into(),
                rows.iter().map(|r| r.3).collect::<Vec<_>>(),
            ),
        ];
        for (name, values) in extra {
            columns.push(Column::new((*name).into(), values.clone()));
        }
        for m in 1..=12 {
            let values: Vec<f64> = rows.iter().map(|r| r.4).collect();
            columns.push(Column::new(format!("ENE_{m:02}").into(), values));
        }
        DataFrame::new(columns).unwrap()
    }

    fn ucbt_extra(len: usize) -> Vec<(&'static str, Vec<&'static str>)> {
        vec![
            ("UNI_TR_MT", vec!["TR1"; len]),
            ("DAT_CON", vec!["2015-01-01"; len]),
        ]
    }

    #[test]
    fn aggregation_sums_energy_and_keeps_last_descriptives() {
        let frame = consumer_frame(
            &[
                ("P1", "F1", "AN", "1", 100.0),
                ("P1", "F1", "ABN", "2", 50.0),
                ("P2", "F1", "BN", "1", 30.0),
            ],
            &ucbt_extra(3),
        );

        let aggregated = aggregate_connection_points(&frame, UCBT_DESCRIPTIVE).unwrap();
        assert_eq!(aggregated.height(), 2);

        let pacs = aggregated.column("PAC").unwrap().str().unwrap();
        let row = (0..aggregated.height())
            .find(|i| pacs.get(*i) == Some("P1"))
            .unwrap();
        let fas = aggregated.column("FAS_CON").unwrap().str().unwrap();
        assert_eq!(fas.get(row), Some("ABN"), "last sub-record wins");
        let ene_01 = aggregated.column("ENE_01").unwrap().f64().unwrap();
        assert_eq!(ene_01.get(row), Some(150.0), "monthly energy is summed");
    }

    #[test]
    fn aneel_model_splits_each_point_into_two_half_loads() {
        let config = RunConfig::default();
        let frame = consumer_frame(&[("P1", "F1", "ABCN", "5", 876.0)], &ucbt_extra(1));
        let empty_pip = consumer_frame(&[], &[]);

        match build_lv(&config, &frame, &empty_pip).unwrap() {
            BuilderOutcome::Built { records, artifacts } => {
                assert_eq!(records.len(), 1);
                // 12 months × 876 kWh over 8760 h = 1.2 kW
                assert!((records[0].kw - 1.2).abs() < 1e-9);
                let content = &artifacts[0].content;
                assert!(content.contains("Load.BT_P1_1"));
                assert!(content.contains("Load.BT_P1_2"));
                assert!(content.contains("model=2 kw=0.6"));
                assert!(content.contains("model=3 kw=0.6"));
                assert!(content.contains("daily=\"5_DU\""));
            }
            other => panic!("expected Built, got {other:?}"),
        }
    }

    #[test]
    fn model8_emits_a_single_definition() {
        let mut config = RunConfig::default();
        config.load_model = LoadModel::Model8;
        let frame = consumer_frame(
            &[("P9", "F1", "AN", "3", 100.0)],
            &[("PN_CON", vec!["PN1"])],
        );

        match build_mv(&config, &frame).unwrap() {
            BuilderOutcome::Built { artifacts, .. } => {
                let content = &artifacts[0].content;
                assert!(content.contains("Load.MT_P9\""));
                assert!(content.contains("model=8"));
                assert!(!content.contains("MT_P9_1"));
            }
            other => panic!("expected Built, got {other:?}"),
        }
    }

    #[test]
    fn empty_tables_decline_to_produce_output() {
        let config = RunConfig::default();
        let empty = consumer_frame(&[], &ucbt_extra(0));
        assert!(matches!(
            build_lv(&config, &empty, &consumer_frame(&[], &[])).unwrap(),
            BuilderOutcome::Empty { table: "UCBT_tab" }
        ));
    }
}
