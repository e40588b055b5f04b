use crate::error::PipelineError;

/// Resolved BDGD `FAS_CON` phase configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseConnection {
    /// Energized phases, without the neutral.
    pub nphases: usize,
    /// OpenDSS node suffix, leading dot included (e.g. ".1.2.3.4").
    pub nodes: String,
    pub has_neutral: bool,
}

impl PhaseConnection {
    /// Conductor count, neutral included when it is emitted.
    pub fn wires(&self) -> usize {
        self.nodes.matches('.').count()
    }
}

/// Maps a `FAS_CON` value (e.g. "ABC", "ABN", "CN") to OpenDSS bus nodes.
/// The neutral becomes node 4 only when `four_wire` generation is on;
/// otherwise it is dropped and the connection is implicitly grounded.
pub fn phase_connection(fas_con: &str, four_wire: bool) -> Result<PhaseConnection, PipelineError> {
    let normalized = fas_con.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(PipelineError::UnknownPhaseConfig(fas_con.to_string()));
    }

    let mut nodes = String::new();
    let mut nphases = 0usize;
    let mut has_neutral = false;

    for ch in normalized.chars() {
        let node = match ch {
            'A' => 1,
            'B' => 2,
            'C' => 3,
            'N' => {
                has_neutral = true;
                continue;
            }
            _ => return Err(PipelineError::UnknownPhaseConfig(fas_con.to_string())),
        };
        nphases += 1;
        nodes.push_str(&format!(".{node}"));
    }

    if nphases == 0 {
        return Err(PipelineError::UnknownPhaseConfig(fas_con.to_string()));
    }
    if has_neutral && four_wire {
        nodes.push_str(".4");
    }

    Ok(PhaseConnection {
        nphases,
        nodes,
        has_neutral,
    })
}
