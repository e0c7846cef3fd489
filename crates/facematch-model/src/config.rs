//! Model backend configuration.
//!
//! Use [`ModelConfig::stub`] for tests and demos without weight files.

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use facematch_contracts::{FacematchError, FacematchResult};

/// Default network input size (square, pixels).
pub const DEFAULT_INPUT_SIZE: usize = 160;

/// Which embedding model the backend reports and sizes itself for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelKind {
    /// 128-dimensional embeddings.
    Facenet,
    /// 512-dimensional embeddings.
    Facenet512,
}

impl ModelKind {
    /// The identifier reported in the outcome record.
    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Facenet => "Facenet",
            ModelKind::Facenet512 => "Facenet512",
        }
    }

    /// Output embedding dimension.
    pub fn embedding_dim(self) -> usize {
        match self {
            ModelKind::Facenet => 128,
            ModelKind::Facenet512 => 512,
        }
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Facenet" | "facenet" => Ok(ModelKind::Facenet),
            "Facenet512" | "facenet512" => Ok(ModelKind::Facenet512),
            other => Err(format!(
                "unknown model '{other}' (expected Facenet or Facenet512)"
            )),
        }
    }
}

/// Configuration for [`FacenetBackend`](crate::FacenetBackend).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the safetensors weights file.
    #[serde(default)]
    pub weights_path: PathBuf,
    /// Which model variant the weights encode.
    #[serde(default = "default_model")]
    pub model: ModelKind,
    /// Square input size the networks expect. Must be a multiple of 8.
    #[serde(default = "default_input_size")]
    pub input_size: usize,
    /// If true, run in deterministic stub mode (no weight files required).
    #[serde(default)]
    pub testing_stub: bool,
}

fn default_model() -> ModelKind {
    ModelKind::Facenet
}

fn default_input_size() -> usize {
    DEFAULT_INPUT_SIZE
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: PathBuf::new(),
            model: ModelKind::Facenet,
            input_size: DEFAULT_INPUT_SIZE,
            testing_stub: false,
        }
    }
}

impl ModelConfig {
    /// Env var used to locate the weights file when no path is configured.
    pub const ENV_WEIGHTS_PATH: &'static str = "FACEMATCH_WEIGHTS";

    /// Creates a config for a weights file.
    pub fn new<P: Into<PathBuf>>(weights_path: P) -> Self {
        Self {
            weights_path: weights_path.into(),
            ..Default::default()
        }
    }

    /// Loads the weights path from [`Self::ENV_WEIGHTS_PATH`] if set.
    pub fn from_env() -> Self {
        let weights_path = std::env::var(Self::ENV_WEIGHTS_PATH)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_default();

        Self {
            weights_path,
            ..Default::default()
        }
    }

    /// Creates a stub config (no weight files; deterministic outputs).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> FacematchResult<()> {
        if self.input_size == 0 || self.input_size % 8 != 0 {
            return Err(FacematchError::ConfigError {
                reason: format!(
                    "input_size must be a non-zero multiple of 8, got {}",
                    self.input_size
                ),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.weights_path.as_os_str().is_empty() {
            return Err(FacematchError::ConfigError {
                reason: format!(
                    "weights_path is required (set it or the {} env var)",
                    Self::ENV_WEIGHTS_PATH
                ),
            });
        }

        if !self.weights_path.exists() {
            return Err(FacematchError::ModelLoad {
                reason: format!(
                    "weights file not found at '{}'",
                    self.weights_path.display()
                ),
            });
        }

        Ok(())
    }
}
