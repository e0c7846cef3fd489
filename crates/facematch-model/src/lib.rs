//! # facematch-model
//!
//! The candle-based face model backend: a face-box detector and a
//! FaceNet-style embedder loaded from a single safetensors file, plus a
//! deterministic stub mode for tests and weight-less environments.

pub mod backend;
pub mod config;
pub mod device;
mod net;

pub use backend::FacenetBackend;
pub use config::{ModelConfig, ModelKind, DEFAULT_INPUT_SIZE};
