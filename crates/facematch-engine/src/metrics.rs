//! Distance metrics and the per-model default threshold table.
//!
//! Thresholds are the published operating points for each embedding model
//! under each metric; a model/metric pair outside the table falls back to
//! the generic defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The distance function applied to a pair of embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    Cosine,
    Euclidean,
    EuclideanL2,
}

impl DistanceMetric {
    /// The identifier reported in the outcome record.
    pub fn name(self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::EuclideanL2 => "euclidean_l2",
        }
    }

    /// Compute the dissimilarity between `a` and `b`. Lower is more similar.
    ///
    /// Vectors of unequal length are truncated to the shorter one rather
    /// than panicking; backends always produce equal-length embeddings, so
    /// this only matters for hand-built inputs.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        let n = a.len().min(b.len());
        let (a, b) = (&a[..n], &b[..n]);
        match self {
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::Euclidean => euclidean_distance(a, b),
            DistanceMetric::EuclideanL2 => {
                let a = l2_normalize(a);
                let b = l2_normalize(b);
                euclidean_distance(&a, &b)
            }
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" => Ok(DistanceMetric::Euclidean),
            "euclidean_l2" | "euclidean-l2" => Ok(DistanceMetric::EuclideanL2),
            other => Err(format!(
                "unknown metric '{other}' (expected cosine, euclidean, or euclidean_l2)"
            )),
        }
    }
}

/// Default decision threshold for a model/metric pair.
///
/// Known models carry tuned operating points; anything else gets the
/// generic per-metric defaults.
pub fn default_threshold(model: &str, metric: DistanceMetric) -> f32 {
    match (model, metric) {
        ("Facenet", DistanceMetric::Cosine) => 0.40,
        ("Facenet", DistanceMetric::Euclidean) => 10.0,
        ("Facenet", DistanceMetric::EuclideanL2) => 0.80,
        ("Facenet512", DistanceMetric::Cosine) => 0.30,
        ("Facenet512", DistanceMetric::Euclidean) => 23.56,
        ("Facenet512", DistanceMetric::EuclideanL2) => 1.04,
        (_, DistanceMetric::Cosine) => 0.40,
        (_, DistanceMetric::Euclidean) => 0.55,
        (_, DistanceMetric::EuclideanL2) => 0.75,
    }
}

fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        // A zero vector has no direction; treat it as maximally dissimilar.
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}

fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let n = norm(v);
    if n == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| x / n).collect()
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
