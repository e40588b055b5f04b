use crate::case::{Artifact, ArtifactKind, CalendarRole, Case};
use crate::calendar::{BASE_DAY_TYPE, BASE_MONTH};
use crate::model::buscoords;
use crate::voltages;

/// Voltage-base list for the solver: the standard nominal levels, every
/// transformer winding discovered in the case, and the feeder's own MV
/// nominal. Ascending, de-duplicated.
pub fn voltage_bases(case: &Case) -> Vec<f64> {
    let mut bases: Vec<f64> = voltages::STANDARD_KVS.clone();
    for transformer in &case.transformers {
        bases.push(transformer.kv_pri);
        bases.push(transformer.kv_sec);
    }
    if let Some(kv) = case.circuit_kv() {
        bases.push(kv);
    }

    bases.sort_by(|a, b| a.total_cmp(b));
    bases.dedup_by_key(|kv| (*kv * 1000.0).round() as i64);
    bases
}

/// Builds the `(DU, 01)` master script from the case's accumulated
/// artifacts. Calendar variants come out of the expander by token
/// substitution over this base.
pub fn build(case: &Case) -> Artifact {
    let mut script = String::from("clear\n");

    for artifact in case.artifacts() {
        if matches!(artifact.kind, ArtifactKind::BusCoords | ArtifactKind::Master) {
            continue;
        }
        if artifact.is_disabled_redirect() {
            script.push_str(&format!("!Redirect \"{}\"\n", artifact.name));
        } else {
            script.push_str(&format!("Redirect \"{}\"\n", artifact.name));
        }
    }

    let bases: Vec<String> = voltage_bases(case)
        .into_iter()
        .map(voltages::fmt_kv)
        .collect();

    script.push_str(&format!(
        "Set mode = daily\n\
         Set Voltagebases = [{}]\n\
         Calc Voltagebases\n\
         Set tolerance = 0.0001\n\
         Set maxcontroliter = 10\n\
         Solve\n\
         buscoords {}\n",
        bases.join(" "),
        buscoords::ARTIFACT_NAME,
    ));

    Artifact::new_calendar(
        ArtifactKind::Master,
        CalendarRole::Master,
        format!("Master_{BASE_DAY_TYPE}_{BASE_MONTH}"),
        script,
    )
}
