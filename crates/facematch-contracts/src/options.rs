//! Verification options and the two named profiles.
//!
//! The original deployment shipped two near-duplicate scripts differing only
//! in detector strictness and an ad-hoc threshold override. Here that is one
//! configurable record with two constructors, so callers pick a profile and
//! then adjust individual knobs if needed.

use serde::{Deserialize, Serialize};

/// The fixed threshold override used by the lenient profile.
///
/// The model's own default for Facenet + cosine (0.40) proved too strict for
/// ID-document-vs-selfie pairs, so the lenient profile relaxes it.
pub const LENIENT_THRESHOLD: f32 = 0.85;

/// Knobs controlling one verification run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerifyOptions {
    /// When true, failing to detect a face in either image is an error.
    /// When false, an undetected face falls back to embedding the whole frame.
    pub strict_detection: bool,

    /// When set, replaces the model's default threshold; `verified` is
    /// recomputed against this value and it is reported as the effective
    /// threshold.
    pub threshold_override: Option<f32>,

    /// When true, preflight additionally rejects empty files and files that
    /// do not decode as images, before the model is touched.
    pub deep_preflight: bool,
}

impl VerifyOptions {
    /// The lenient profile: tolerate undetected faces, relax the threshold
    /// to [`LENIENT_THRESHOLD`], and validate inputs deeply up front.
    pub fn lenient() -> Self {
        Self {
            strict_detection: false,
            threshold_override: Some(LENIENT_THRESHOLD),
            deep_preflight: true,
        }
    }

    /// The strict profile: a face must be detected in both images, and the
    /// model's own default threshold is reported unchanged.
    pub fn strict() -> Self {
        Self {
            strict_detection: true,
            threshold_override: None,
            deep_preflight: false,
        }
    }
}

impl Default for VerifyOptions {
    /// The lenient profile is the default; it is the variant the original
    /// service invoked.
    fn default() -> Self {
        Self::lenient()
    }
}
