//! The face embedding seam.

use image::DynamicImage;

use facematch_contracts::FacematchResult;

/// Pluggable embedding backend: turns a face crop into a fixed-dimension
/// vector suitable for distance comparison.
pub trait FaceEmbedder: Send + Sync {
    /// Embed one face crop.
    fn embed(&self, face: &DynamicImage) -> FacematchResult<Vec<f32>>;

    /// The model identifier reported in the outcome record (e.g. "Facenet").
    fn model_name(&self) -> &str;
}
