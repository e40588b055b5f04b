pub mod assembler;
pub mod calendar;
pub mod case;
pub mod config;
pub mod dataset;
pub mod error;
pub mod loader;
pub mod master;
pub mod model;
pub mod phases;
pub mod voltages;
pub mod writer;

pub use case::{Artifact, ArtifactKind, CalendarRole, Case};
pub use config::{GeneratorModel, LoadModel, RunConfig};
pub use dataset::{FeederDataset, TableEntry};
pub use error::PipelineError;
pub use model::BuilderOutcome;
