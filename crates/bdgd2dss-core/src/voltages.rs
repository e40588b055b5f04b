use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::PipelineError;

/// BDGD `TEN` domain: voltage code -> nominal kV. Subset of the ANEEL
/// controlled vocabulary covering the levels that appear in distribution
/// datasets.
pub static VOLTAGE_CODES: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("1", 0.110),
        ("2", 0.120),
        ("3", 0.127),
        ("4", 0.208),
        ("5", 0.216),
        ("6", 0.220),
        ("7", 0.230),
        ("8", 0.231),
        ("9", 0.240),
        ("10", 0.254),
        ("11", 0.380),
        ("12", 0.400),
        ("13", 0.440),
        ("14", 0.480),
        ("15", 0.500),
        ("20", 3.2),
        ("23", 4.16),
        ("25", 6.0),
        ("27", 6.9),
        ("30", 12.0),
        ("33", 13.2),
        ("34", 13.8),
        ("37", 15.0),
        ("39", 23.0),
        ("45", 34.5),
    ])
});

/// Standard distribution nominal levels, ascending. Buckets for rating
/// lookups and the base list of the master script.
pub static STANDARD_KVS: Lazy<Vec<f64>> = Lazy::new(|| {
    vec![
        0.110, 0.127, 0.220, 0.380, 0.440, 3.2, 4.16, 6.9, 12.0, 13.2, 13.8, 23.0, 34.5,
    ]
});

/// Resolves a `TEN_*` code to kV. Codes absent from the vocabulary are read
/// as volts and snapped to the nearest standard bucket.
pub fn kv_from_code(code: &str) -> Result<f64, PipelineError> {
    let code = code.trim();
    if let Some(kv) = VOLTAGE_CODES.get(code) {
        return Ok(*kv);
    }
    let volts: f64 = code
        .parse()
        .map_err(|_| PipelineError::InvalidVoltageCode(code.to_string()))?;
    Ok(nearest_standard(volts / 1000.0))
}

/// Snaps an arbitrary kV value to the controlled vocabulary.
pub fn nearest_standard(kv: f64) -> f64 {
    let mut best = STANDARD_KVS[0];
    let mut best_dist = (kv - best).abs();
    for candidate in STANDARD_KVS.iter().copied() {
        let dist = (kv - candidate).abs();
        if dist < best_dist {
            best = candidate;
            best_dist = dist;
        }
    }
    best
}

/// Formats a kV value the way OpenDSS scripts carry them (no trailing
/// zeros).
pub fn fmt_kv(kv: f64) -> String {
    let text = format!("{kv:.3}");
    let trimmed = text.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
