use crate::model::buscoords::BusCoord;
use crate::model::capacitor::Capacitor;
use crate::model::circuit::Circuit;
use crate::model::line::Line;
use crate::model::linecode::LineCode;
use crate::model::load::Load;
use crate::model::loadshape::LoadShape;
use crate::model::pvsystem::Generation;
use crate::model::regcontrol::RegControl;
use crate::model::transformer::Transformer;

/// Reserved prefix marking generation artifacts; the master script keeps
/// their redirects commented out.
pub const DISABLED_REDIRECT_PREFIX: &str = "GD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Circuit,
    LineCode,
    Line,
    Transformer,
    RegControl,
    Capacitor,
    LoadShape,
    Load,
    Generation,
    BusCoords,
    Master,
}

/// Calendar role of an artifact. Calendar-varying artifacts are tagged with
/// their role so the expander and master generator look them up explicitly
/// instead of by list position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarRole {
    Static,
    LoadLv,
    LoadMv,
    GenerationLv,
    GenerationMv,
    Master,
}

impl CalendarRole {
    pub fn is_calendar_varying(self) -> bool {
        !matches!(self, CalendarRole::Static)
    }
}

/// One finished in-memory output unit.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub role: CalendarRole,
    pub name: String,
    pub content: String,
}

impl Artifact {
    pub fn new_static(kind: ArtifactKind, name: impl Into<String>, content: String) -> Self {
        Self {
            kind,
            role: CalendarRole::Static,
            name: name.into(),
            content,
        }
    }

    pub fn new_calendar(
        kind: ArtifactKind,
        role: CalendarRole,
        name: impl Into<String>,
        content: String,
    ) -> Self {
        Self {
            kind,
            role,
            name: name.into(),
            content,
        }
    }

    /// Redirects for generation artifacts stay in the master for audit but
    /// are not executed.
    pub fn is_disabled_redirect(&self) -> bool {
        self.name.starts_with(DISABLED_REDIRECT_PREFIX)
    }
}

/// Aggregate result for one feeder run. Created when feeder processing
/// starts, filled by the builders, discarded after the artifacts are
/// written. Entity records never outlive the case that produced them.
#[derive(Debug, Default)]
pub struct Case {
    pub feeder: String,
    pub circuits: Vec<Circuit>,
    pub line_codes: Vec<LineCode>,
    pub lines: Vec<Line>,
    pub transformers: Vec<Transformer>,
    pub regcontrols: Vec<RegControl>,
    pub capacitors: Vec<Capacitor>,
    pub load_shapes: Vec<LoadShape>,
    pub loads: Vec<Load>,
    pub generation: Vec<Generation>,
    pub bus_coords: Vec<BusCoord>,
    artifacts: Vec<Artifact>,
}

impl Case {
    pub fn new(feeder: impl Into<String>) -> Self {
        Self {
            feeder: feeder.into(),
            ..Self::default()
        }
    }

    pub fn push_artifact(&mut self, artifact: Artifact) {
        debug_assert!(
            !self.artifacts.iter().any(|a| a.name == artifact.name),
            "artifact {} recorded twice",
            artifact.name
        );
        self.artifacts.push(artifact);
    }

    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Swaps in the calendar-expanded artifact list after expansion.
    pub fn replace_artifacts(&mut self, artifacts: Vec<Artifact>) {
        self.artifacts = artifacts;
    }

    pub fn artifact_names(&self) -> Vec<&str> {
        self.artifacts.iter().map(|a| a.name.as_str()).collect()
    }

    pub fn artifact_by_role(&self, role: CalendarRole) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.role == role)
    }

    /// MV nominal of the feeder itself, sourced from the circuit entity.
    pub fn circuit_kv(&self) -> Option<f64> {
        self.circuits.first().map(|c| c.kv_nom)
    }
}
