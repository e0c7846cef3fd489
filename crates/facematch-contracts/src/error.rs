//! Error taxonomy for the facematch pipeline.
//!
//! Failures fall into two tiers with different process-exit semantics:
//!
//! 1. **Preflight** — bad arguments, missing/empty/undecodable input files,
//!    bad configuration. Detected before the model is ever touched. Always
//!    fatal: JSON error record on stdout plus a non-zero exit code.
//! 2. **Invocation** — anything raised while the model backend runs
//!    (detection, weight loading, inference). Caught at the call site and
//!    reported as a JSON error record, but the process still exits 0; the
//!    JSON body is the only failure signal for this tier.
//!
//! The tier split is queried via [`FacematchError::is_preflight`] so the CLI
//! keeps the exit-code mapping in one place.

use thiserror::Error;

/// The unified error type for the facematch crates.
#[derive(Debug, Error)]
pub enum FacematchError {
    /// Fewer than two image paths were supplied on the command line.
    #[error("Missing arguments. Usage: facematch <image1> <image2>")]
    MissingArguments,

    /// At least one of the two input paths does not exist on disk.
    #[error("One or more image files not found")]
    FilesNotFound,

    /// At least one input file has zero length. Both sizes are reported so
    /// the caller can see which side of the pair is broken.
    #[error("One or more image files are empty. Img1: {size1} bytes, Img2: {size2} bytes")]
    EmptyFile { size1: u64, size2: u64 },

    /// An input file exists but does not decode as an image.
    #[error("could not decode image at '{path}': {reason}")]
    UndecodableImage { path: String, reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// Strict detection was requested and no face was found in the image.
    #[error("no face detected in '{path}' (strict detection enabled)")]
    NoFaceDetected { path: String },

    /// The model weights could not be located or loaded.
    #[error("failed to load face model: {reason}")]
    ModelLoad { reason: String },

    /// The model backend failed while detecting or embedding a face.
    #[error("face verification failed: {reason}")]
    Inference { reason: String },
}

impl FacematchError {
    /// True for tier-1 errors detected before the model is invoked.
    ///
    /// Preflight errors map to a non-zero exit code; invocation errors are
    /// reported through the JSON body alone and the process exits 0.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            FacematchError::MissingArguments
                | FacematchError::FilesNotFound
                | FacematchError::EmptyFile { .. }
                | FacematchError::UndecodableImage { .. }
                | FacematchError::ConfigError { .. }
        )
    }
}

/// Convenience alias used throughout the facematch crates.
pub type FacematchResult<T> = Result<T, FacematchError>;
