//! Optional TOML run configuration.
//!
//! A config file supplies what the two original script variants hardcoded:
//! the model backend settings and the verification knobs. Command-line flags
//! always win over file values.
//!
//! ```toml
//! [model]
//! weights_path = "/opt/facematch/facenet.safetensors"
//! model = "Facenet"
//!
//! [verify]
//! strict_detection = false
//! threshold_override = 0.85
//! metric = "cosine"
//! ```

use std::path::Path;

use serde::Deserialize;

use facematch_contracts::{FacematchError, FacematchResult};
use facematch_engine::DistanceMetric;
use facematch_model::ModelConfig;

/// The `[verify]` table: per-knob overrides applied on top of the profile
/// selected on the command line. Absent keys leave the profile untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifySection {
    pub strict_detection: Option<bool>,
    pub threshold_override: Option<f32>,
    pub metric: Option<DistanceMetric>,
}

/// A parsed config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub verify: VerifySection,
}

impl RunConfig {
    /// Parse `s` as TOML run configuration.
    pub fn from_toml_str(s: &str) -> FacematchResult<Self> {
        toml::from_str(s).map_err(|e| FacematchError::ConfigError {
            reason: format!("failed to parse config TOML: {e}"),
        })
    }

    /// Read the file at `path` and parse it as TOML run configuration.
    pub fn from_file(path: &Path) -> FacematchResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| FacematchError::ConfigError {
            reason: format!("failed to read config file '{}': {e}", path.display()),
        })?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facematch_model::ModelKind;

    #[test]
    fn full_config_parses() {
        let config = RunConfig::from_toml_str(
            r#"
            [model]
            weights_path = "/opt/facematch/facenet.safetensors"
            model = "Facenet512"
            input_size = 160

            [verify]
            strict_detection = true
            threshold_override = 0.6
            metric = "euclidean_l2"
            "#,
        )
        .unwrap();

        assert_eq!(config.model.model, ModelKind::Facenet512);
        assert_eq!(
            config.model.weights_path.to_str().unwrap(),
            "/opt/facematch/facenet.safetensors"
        );
        assert_eq!(config.verify.strict_detection, Some(true));
        assert_eq!(config.verify.threshold_override, Some(0.6));
        assert_eq!(config.verify.metric, Some(DistanceMetric::EuclideanL2));
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = RunConfig::from_toml_str("").unwrap();
        assert_eq!(config.model.model, ModelKind::Facenet);
        assert!(config.verify.strict_detection.is_none());
        assert!(config.verify.metric.is_none());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = RunConfig::from_toml_str("[model\nweights_path =").unwrap_err();
        assert!(matches!(err, FacematchError::ConfigError { .. }));
        assert!(err.is_preflight());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let err = RunConfig::from_file(Path::new("/no/such/facematch.toml")).unwrap_err();
        assert!(matches!(err, FacematchError::ConfigError { .. }));
    }
}
