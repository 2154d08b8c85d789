//! Transfer-curve presets on disk.
//!
//! A preset is a small JSON file holding the knot vector and control
//! colors. Deserialization goes through `TransferCurve::new`, so a
//! hand-edited file that breaks the curve invariants is rejected with a
//! proper error instead of producing a corrupt curve.

use std::path::Path;

use glam::Vec4;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use volray_core::error::CoreError;
use volray_core::transfer::TransferCurve;

/// Errors loading or saving a preset.
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read preset {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to write preset {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    #[error("preset is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("preset violates curve invariants: {0}")]
    Invalid(#[from] CoreError),
}

/// Serialized form of a transfer curve.
#[derive(Debug, Serialize, Deserialize)]
struct CurvePreset {
    knots: Vec<f32>,
    colors: Vec<[f32; 4]>,
}

/// Loads a transfer curve from a JSON preset file.
pub fn load(path: &Path) -> Result<TransferCurve, PresetError> {
    let text = std::fs::read_to_string(path).map_err(|source| PresetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let preset: CurvePreset = serde_json::from_str(&text)?;
    let colors = preset.colors.into_iter().map(Vec4::from).collect();
    Ok(TransferCurve::new(colors, preset.knots)?)
}

/// Saves a transfer curve as a JSON preset file.
pub fn save(path: &Path, curve: &TransferCurve) -> Result<(), PresetError> {
    let preset = CurvePreset {
        knots: curve.knots().to_vec(),
        colors: curve.colors().iter().map(|c| c.to_array()).collect(),
    };
    let text = serde_json::to_string_pretty(&preset)?;
    std::fs::write(path, text).map_err(|source| PresetError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Loads the default preset from a directory when one exists, falling
/// back to the built-in curve. Parse and invariant errors are logged and
/// swallowed; a broken preset never blocks startup.
#[must_use]
pub fn load_or_default(preset_dir: &Path) -> TransferCurve {
    let path = preset_dir.join("default.json");
    if !path.exists() {
        return TransferCurve::default();
    }
    match load(&path) {
        Ok(curve) => {
            log::info!("loaded transfer preset from {}", path.display());
            curve
        }
        Err(err) => {
            log::warn!("ignoring preset {}: {err}", path.display());
            TransferCurve::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = std::env::temp_dir().join("volray-preset-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.json");

        let curve = TransferCurve::default();
        save(&path, &curve).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded.knots(), curve.knots());
        assert_eq!(loaded.colors(), curve.colors());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_invalid_preset_rejected() {
        let dir = std::env::temp_dir().join("volray-preset-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("invalid.json");
        // Knot count disagrees with the two control points.
        std::fs::write(
            &path,
            r#"{"knots": [0.0, 1.0], "colors": [[0,0,0,0],[1,1,1,1]]}"#,
        )
        .unwrap();

        assert!(matches!(load(&path), Err(PresetError::Invalid(_))));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_default_falls_back() {
        let curve = load_or_default(Path::new("/nonexistent/presets"));
        assert_eq!(curve.num_points(), TransferCurve::default().num_points());
    }
}
