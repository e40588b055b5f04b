//! End-to-end feeder assembly over an in-memory dataset: two feeders, a
//! conductor catalog, segments with geometry, consumers, a transformer bank
//! and a deliberately broken regulator association.

use polars::prelude::*;

use bdgd2dss_core::assembler;
use bdgd2dss_core::{CalendarRole, FeederDataset, RunConfig, TableEntry};

fn table(dataset: &mut FeederDataset, name: &str, frame: DataFrame, has_geometry: bool) {
    dataset.insert(
        name,
        TableEntry {
            frame,
            has_geometry,
        },
    );
}

/// Ten MV segments for F1 chained S0 -> S10, each with a two-vertex
/// LINESTRING so every PAC gets a coordinate.
fn ssdmt_frame() -> DataFrame {
    let n = 10;
    let cods: Vec<String> = (0..n).map(|i| format!("MT{i}")).collect();
    let pac1: Vec<String> = (0..n).map(|i| format!("S{i}")).collect();
    let pac2: Vec<String> = (0..n).map(|i| format!("S{}", i + 1)).collect();
    let geometry: Vec<String> = (0..n)
        .map(|i| format!("LINESTRING ({i}.0 0.0, {}.0 0.0)", i + 1))
        .collect();

    DataFrame::new(vec![
        Column::new("COD_ID".into(), cods),
        Column::new("CTMT".into(), vec!["F1"; n]),
        Column::new("PAC_1".into(), pac1),
        Column::new("PAC_2".into(), pac2),
        Column::new("FAS_CON".into(), vec!["ABC"; n]),
        Column::new("TIP_CND".into(), vec!["CA50"; n]),
        Column::new("COMP".into(), vec![120.0; n]),
        Column::new("geometry".into(), geometry),
    ])
    .unwrap()
}

/// Fifty LV consumer sub-records across forty connection points: P0..P9
/// carry two sub-records each, P10..P39 one.
fn ucbt_frame() -> DataFrame {
    let mut pacs: Vec<String> = Vec::new();
    for i in 0..40 {
        pacs.push(format!("P{i}"));
    }
    for i in 0..10 {
        pacs.push(format!("P{i}"));
    }
    let n = pacs.len();
    assert_eq!(n, 50);

    let mut columns = vec![
        Column::new("PAC".into(), pacs),
        Column::new("CTMT".into(), vec!["F1"; n]),
        Column::new("FAS_CON".into(), vec!["AN"; n]),
        Column::new("TEN_FORN".into(), vec!["6"; n]),
        Column::new("TIP_CC".into(), vec!["5"; n]),
        Column::new("UNI_TR_MT".into(), vec!["TR1"; n]),
        Column::new("DAT_CON".into(), vec!["2015-06-01"; n]),
    ];
    for m in 1..=12 {
        columns.push(Column::new(format!("ENE_{m:02}").into(), vec![73.0; n]));
    }
    DataFrame::new(columns).unwrap()
}

fn crvcrg_frame() -> DataFrame {
    let mut columns = vec![
        Column::new("COD_ID".into(), vec!["5", "5", "5"]),
        Column::new("TIP_DIA".into(), vec!["DU", "SA", "DO"]),
    ];
    for p in 1..=24 {
        columns.push(Column::new(
            format!("POT_{p:02}").into(),
            vec![1.0 + p as f64 / 24.0; 3],
        ));
    }
    DataFrame::new(columns).unwrap()
}

fn sample_dataset() -> FeederDataset {
    let mut dataset = FeederDataset::new();

    table(
        &mut dataset,
        "CTMT",
        df![
            "COD_ID" => ["F1", "F2"],
            "PAC_INI" => ["SE1", "SE2"],
            "TEN_NOM" => ["34", "34"],
        ]
        .unwrap(),
        false,
    );

    table(
        &mut dataset,
        "SEGCON",
        df![
            "COD_ID" => ["CA50", "CA35", "CU16"],
            "R1" => [0.6045, 0.8671, 1.1732],
            "X1" => [0.3944, 0.4121, 0.4018],
            "CNOM" => [180.0, 145.0, 98.0],
        ]
        .unwrap(),
        false,
    );

    table(&mut dataset, "SSDMT", ssdmt_frame(), true);
    table(&mut dataset, "UCBT_tab", ucbt_frame(), false);
    table(&mut dataset, "CRVCRG", crvcrg_frame(), false);

    table(
        &mut dataset,
        "EQTRMT",
        df![
            "UNI_TR_MT" => ["TR1"],
            "POT_NOM" => [75.0],
            "TEN_PRI" => ["34"],
            "TEN_SEC" => ["6"],
            "LIG" => ["1"],
            "PER_FER" => [285.0],
            "PER_TOT" => [1035.0],
        ]
        .unwrap(),
        false,
    );
    table(
        &mut dataset,
        "UNTRMT",
        df![
            "COD_ID" => ["TR1"],
            "CTMT" => ["F1"],
            "PAC_1" => ["S5"],
            "PAC_2" => ["P0"],
            "PAC_3" => [""],
            "FAS_CON" => ["ABCN"],
        ]
        .unwrap(),
        false,
    );

    // F2 has a regulator unit whose equipment row is absent: the join must
    // come back broken and the feeder must still finish.
    table(
        &mut dataset,
        "EQRE",
        df![
            "UN_RE" => ["RX"],
            "POT_NOM" => [100.0],
            "TEN_NOM" => ["34"],
            "REL_TP" => [69.0],
        ]
        .unwrap(),
        false,
    );
    table(
        &mut dataset,
        "UNREMT",
        df![
            "COD_ID" => ["R9"],
            "CTMT" => ["F2"],
            "PAC_1" => ["S2"],
            "PAC_2" => ["S3"],
            "FAS_CON" => ["ABC"],
        ]
        .unwrap(),
        false,
    );

    table(
        &mut dataset,
        "UGMT_tab",
        df![
            "COD_ID" => ["GD1"],
            "CTMT" => ["F1"],
            "PAC" => ["S7"],
            "FAS_CON" => ["ABC"],
            "TEN_FORN" => ["34"],
            "POT_INST" => [500.0],
            "CEG" => ["UFV.CP.012345-6"],
        ]
        .unwrap(),
        false,
    );

    dataset
}

fn f1_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.feeder = Some("F1".into());
    config
}

#[test]
fn f1_produces_the_full_artifact_set() {
    let dataset = sample_dataset();
    let case = assembler::assemble_case(&f1_config(), &dataset, "F1").unwrap();

    let names = case.artifact_names();
    for expected in [
        "Circuito.dss",
        "Condutores.dss",
        "LinhasMT_SSDMT.dss",
        "Transformadores.dss",
        "CurvasDeCarga.dss",
        "buscoords.csv",
        "Cargas_BT_DU_01.dss",
        "Cargas_BT_SA_07.dss",
        "GD_MT_DO_12.dss",
        "Master_DU_01",
        "Master_DO_12",
    ] {
        assert!(names.contains(&expected), "missing artifact {expected}");
    }

    // 40 unique connection points from 50 sub-records.
    assert_eq!(case.loads.len(), 40);
    // Chained segments share interior buses: S0..S10 plus nothing else.
    assert_eq!(case.bus_coords.len(), 11);

    let masters: Vec<_> = case
        .artifacts()
        .iter()
        .filter(|a| a.role == CalendarRole::Master)
        .collect();
    assert_eq!(masters.len(), 36);

    let base = masters.iter().find(|a| a.name == "Master_DU_01").unwrap();
    assert!(base.content.starts_with("clear\n"));
    assert!(base.content.contains("Redirect \"Cargas_BT_DU_01.dss\""));
    assert!(base.content.contains("!Redirect \"GD_MT_DU_01.dss\""));
    assert!(base.content.contains("Calc Voltagebases"));
    // Feeder MV nominal and the transformer secondary are both bases.
    assert!(base.content.contains("13.8"));
    assert!(base.content.contains("0.22"));
    assert!(base.content.ends_with("buscoords buscoords.csv\n"));

    // Variants reference their own calendar slot, never the base's.
    let sa_07 = masters.iter().find(|a| a.name == "Master_SA_07").unwrap();
    assert!(sa_07.content.contains("Redirect \"Cargas_BT_SA_07.dss\""));
    assert!(!sa_07.content.contains("Cargas_BT_DU_01.dss"));
}

#[test]
fn f2_broken_regulator_join_skips_the_entity_and_finishes() {
    let dataset = sample_dataset();
    let case = assembler::assemble_case(&f1_config(), &dataset, "F2").unwrap();

    let names = case.artifact_names();
    assert!(
        !names.contains(&"Reguladores.dss"),
        "broken association must not produce regulator output"
    );
    assert!(case.regcontrols.is_empty());

    // The run still assembles the circuit and the 36 masters.
    assert!(names.contains(&"Circuito.dss"));
    assert_eq!(
        names.iter().filter(|n| n.starts_with("Master_")).count(),
        36
    );
}

#[test]
fn reruns_are_byte_identical() {
    let dataset = sample_dataset();
    let config = f1_config();
    let first = assembler::assemble_case(&config, &dataset, "F1").unwrap();
    let second = assembler::assemble_case(&config, &dataset, "F1").unwrap();

    assert_eq!(first.artifacts().len(), second.artifacts().len());
    for (a, b) in first.artifacts().iter().zip(second.artifacts()) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.content, b.content, "artifact {} drifted", a.name);
    }
}
