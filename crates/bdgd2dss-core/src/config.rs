use std::path::PathBuf;

/// Load representation emitted for each aggregated connection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadModel {
    /// Two half-power definitions per point: constant impedance + constant current.
    Aneel,
    /// Single ZIP definition (OpenDSS model 8).
    Model8,
}

/// How distributed-generation units are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorModel {
    Generator,
    PvSystem,
    /// Follow the unit type recorded in the dataset (CEG code).
    AsBdgd,
}

/// Run parameters, built by the caller and passed down the whole call chain.
/// Builders never consult ambient state.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dataset_dir: PathBuf,
    pub schema_path: PathBuf,
    pub output_dir: PathBuf,
    /// `None` means all feeders found in CTMT.
    pub feeder: Option<String>,
    /// Cap RAMLIG service-drop segments at 30 m.
    pub limit_ramal_30m: bool,
    /// Emit the neutral conductor as a fourth node on wye circuits.
    pub four_wire: bool,
    pub capacitors: bool,
    pub load_model: LoadModel,
    pub gen_model_mv: GeneratorModel,
    pub gen_model_lv: GeneratorModel,
    /// Generate the geographic coordinates artifact.
    pub coords: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            dataset_dir: PathBuf::new(),
            schema_path: PathBuf::new(),
            output_dir: PathBuf::from("dss_models_output"),
            feeder: None,
            limit_ramal_30m: true,
            four_wire: true,
            capacitors: false,
            load_model: LoadModel::Aneel,
            gen_model_mv: GeneratorModel::AsBdgd,
            gen_model_lv: GeneratorModel::Generator,
            coords: true,
        }
    }
}
