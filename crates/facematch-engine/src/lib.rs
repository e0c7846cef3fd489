//! # facematch-engine
//!
//! Preflight validation, distance metrics, and the verification pipeline.
//!
//! The engine is backend-agnostic: face detection and embedding sit behind
//! the [`detect::FaceDetector`] and [`embed::FaceEmbedder`] traits, and the
//! real model lives in `facematch-model`. Everything here is synchronous and
//! one-shot — the process verifies a single pair and exits.

pub mod detect;
pub mod embed;
pub mod metrics;
pub mod preflight;
pub mod verifier;

pub use detect::{FaceBounds, FaceDetector};
pub use embed::FaceEmbedder;
pub use metrics::{default_threshold, DistanceMetric};
pub use verifier::FaceVerifier;
