//! # facematch-contracts
//!
//! Shared types and the error taxonomy for the facematch verifier.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate — only data definitions and error types.

pub mod error;
pub mod options;
pub mod outcome;

pub use error::{FacematchError, FacematchResult};
pub use options::{VerifyOptions, LENIENT_THRESHOLD};
pub use outcome::{MatchReport, VerifyOutcome};
