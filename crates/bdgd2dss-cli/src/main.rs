use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use bdgd2dss_core::{assembler, loader, writer};
use bdgd2dss_core::{GeneratorModel, LoadModel, RunConfig};

/// Converts a BDGD distribution dataset into OpenDSS circuit models.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Directory holding the exported BDGD tables (one CSV per table).
    #[arg(short, long)]
    dataset: PathBuf,

    /// Table/column schema configuration.
    #[arg(long, default_value = "bdgd2dss.json")]
    schema: PathBuf,

    /// Build a single feeder; omit to build every feeder in CTMT.
    #[arg(short, long)]
    feeder: Option<String>,

    /// Output directory; one subdirectory per feeder.
    #[arg(short, long, default_value = "dss_models_output")]
    output: PathBuf,

    /// Keep service drops at their recorded length instead of capping at 30 m.
    #[arg(long)]
    no_ramal_30m: bool,

    /// Drop the neutral conductor instead of emitting it as a fourth node.
    #[arg(long)]
    no_four_wire: bool,

    /// Also generate shunt capacitor banks.
    #[arg(long)]
    capacitors: bool,

    /// Load representation for consumer points.
    #[arg(long, value_enum, default_value_t = LoadModelArg::Aneel)]
    load_model: LoadModelArg,

    /// Modeling of medium-voltage generation units.
    #[arg(long, value_enum, default_value_t = GenModelArg::AsBdgd)]
    gen_mt: GenModelArg,

    /// Modeling of low-voltage generation units.
    #[arg(long, value_enum, default_value_t = GenModelArg::Generator)]
    gen_bt: GenModelArg,

    /// Skip the bus-coordinates artifact.
    #[arg(long)]
    no_coords: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LoadModelArg {
    Aneel,
    Model8,
}

impl From<LoadModelArg> for LoadModel {
    fn from(arg: LoadModelArg) -> Self {
        match arg {
            LoadModelArg::Aneel => LoadModel::Aneel,
            LoadModelArg::Model8 => LoadModel::Model8,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GenModelArg {
    Generator,
    Pvsystem,
    AsBdgd,
}

impl From<GenModelArg> for GeneratorModel {
    fn from(arg: GenModelArg) -> Self {
        match arg {
            GenModelArg::Generator => GeneratorModel::Generator,
            GenModelArg::Pvsystem => GeneratorModel::PvSystem,
            GenModelArg::AsBdgd => GeneratorModel::AsBdgd,
        }
    }
}

impl Cli {
    fn into_config(self) -> RunConfig {
        RunConfig {
            dataset_dir: self.dataset,
            schema_path: self.schema,
            output_dir: self.output,
            feeder: self.feeder,
            limit_ramal_30m: !self.no_ramal_30m,
            four_wire: !self.no_four_wire,
            capacitors: self.capacitors,
            load_model: self.load_model.into(),
            gen_model_mv: self.gen_mt.into(),
            gen_model_lv: self.gen_bt.into(),
            coords: !self.no_coords,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Cli::parse().into_config();

    let schema = loader::load_schema(&config.schema_path)
        .with_context(|| format!("loading schema {}", config.schema_path.display()))?;
    let dataset = loader::load_dataset(&config.dataset_dir, &schema)
        .with_context(|| format!("loading dataset from {}", config.dataset_dir.display()))?;

    let all_feeders = config.feeder.is_none();
    let cases = assembler::run(&config, &dataset).context("building feeder cases")?;

    for case in &cases {
        writer::write_case(&config.output_dir, case)
            .with_context(|| format!("writing outputs for feeder {}", case.feeder))?;
    }

    if all_feeders {
        let feeders: Vec<String> = cases.iter().map(|c| c.feeder.clone()).collect();
        writer::export_feeder_list(&config.output_dir, &feeders)
            .context("writing the feeder index")?;
    }

    println!(
        "Finished: {} feeder(s) written to {}",
        cases.len(),
        config.output_dir.display()
    );
    Ok(())
}
