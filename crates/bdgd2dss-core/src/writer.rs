use std::fs;
use std::path::Path;

use tracing::info;

use crate::case::Case;
use crate::error::PipelineError;

/// Writes every artifact of a finished case under `<output>/<feeder>/`.
/// Re-running a build overwrites the previous files in place.
pub fn write_case(output_dir: &Path, case: &Case) -> Result<(), PipelineError> {
    let feeder_dir = output_dir.join(&case.feeder);
    fs::create_dir_all(&feeder_dir)?;

    for artifact in case.artifacts() {
        fs::write(feeder_dir.join(&artifact.name), &artifact.content)?;
    }

    info!(
        feeder = %case.feeder,
        artifacts = case.artifacts().len(),
        "wrote feeder outputs"
    );
    Ok(())
}

/// Exports the feeder index discovered in CTMT, one identifier per line.
pub fn export_feeder_list(output_dir: &Path, feeders: &[String]) -> Result<(), PipelineError> {
    fs::create_dir_all(output_dir)?;
    let mut text = String::new();
    for feeder in feeders {
        text.push_str(feeder);
        text.push('\n');
    }
    fs::write(output_dir.join("Alimentadores.txt"), text)?;
    Ok(())
}
