//! The verification outcome record and its JSON report shape.
//!
//! One `VerifyOutcome` is produced per invocation, never persisted and never
//! mutated after the threshold is resolved. The serialized form is governed
//! by [`MatchReport`]: exactly one JSON object per process run, which is
//! *either* the complete success record *or* an `{"error": ...}` record —
//! never a mixture of the two.

use serde::{Deserialize, Serialize};

/// A complete, successful verification result.
///
/// Invariant: `verified == (distance <= threshold)`. Both constructors
/// enforce this, including after a threshold override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifyOutcome {
    /// True iff the two images are judged to show the same person.
    pub verified: bool,
    /// Dissimilarity between the two face embeddings. Lower is more similar.
    pub distance: f32,
    /// The cutoff `verified` was decided against. When an override is in
    /// effect this is the override value, not the model's own default.
    pub threshold: f32,
    /// Identifier of the embedding model used (e.g. "Facenet").
    pub model: String,
    /// Identifier of the distance function used (e.g. "cosine").
    pub similarity_metric: String,
}

impl VerifyOutcome {
    /// Build an outcome, deriving `verified` from `distance <= threshold`.
    pub fn new(
        distance: f32,
        threshold: f32,
        model: impl Into<String>,
        similarity_metric: impl Into<String>,
    ) -> Self {
        Self {
            verified: distance <= threshold,
            distance,
            threshold,
            model: model.into(),
            similarity_metric: similarity_metric.into(),
        }
    }

    /// Replace the decision threshold and recompute `verified` against it.
    ///
    /// The override becomes the reported threshold; the original default is
    /// discarded.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self.verified = self.distance <= threshold;
        self
    }
}

/// The single JSON object printed to stdout, success or failure.
///
/// Serialized untagged: a success renders as the five-field outcome record,
/// a failure renders as `{"error": "<message>"}` with no other keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MatchReport {
    /// All five success fields present; no `error` field.
    Success(VerifyOutcome),
    /// A single free-text `error` field replacing all others.
    Error { error: String },
}

impl MatchReport {
    /// Wrap an error message into the error-record shape.
    pub fn from_error(message: impl Into<String>) -> Self {
        MatchReport::Error {
            error: message.into(),
        }
    }

    /// Serialize to the one-line JSON form printed on stdout.
    ///
    /// Serialization of these fixed shapes cannot fail; a broken serializer
    /// would itself be reported as an error record rather than a panic.
    pub fn to_json_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!("{{\"error\":\"failed to serialize report: {e}\"}}")
        })
    }
}

impl From<VerifyOutcome> for MatchReport {
    fn from(outcome: VerifyOutcome) -> Self {
        MatchReport::Success(outcome)
    }
}
