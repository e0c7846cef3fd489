//! The face model backend.
//!
//! `FacenetBackend` implements both engine seams — detection and embedding —
//! from a single weights file, or from a deterministic stub when
//! `ModelConfig::testing_stub` is set. The stub needs no files: it embeds
//! images by block-mean luminance and treats a (near-)uniform frame as
//! containing no face, which is enough to exercise every pipeline branch.

use std::sync::Arc;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::{debug, info, warn};

use facematch_contracts::{FacematchError, FacematchResult};
use facematch_engine::{FaceBounds, FaceDetector, FaceEmbedder};

use crate::config::ModelConfig;
use crate::device::select_device;
use crate::net::{DetectionNet, EmbeddingNet, NET_STRIDE};

/// Minimum squashed score for a grid cell to count as a detection.
const DETECTION_CONFIDENCE: f32 = 0.5;

/// Luminance variance below which the stub reports no face.
const STUB_UNIFORM_EPS: f32 = 1e-4;

/// Side length of the stub's block-mean grid.
const STUB_GRID: u32 = 8;

enum Backend {
    Model {
        detector: DetectionNet,
        embedder: EmbeddingNet,
        device: Device,
    },
    Stub,
}

struct BackendInner {
    backend: Backend,
    config: ModelConfig,
}

/// Detector + embedder pair loaded from one safetensors file.
///
/// Cheap to clone; clones share the loaded networks, so one backend can be
/// handed to the verifier as both its detector and its embedder.
#[derive(Clone)]
pub struct FacenetBackend {
    inner: Arc<BackendInner>,
}

impl std::fmt::Debug for FacenetBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacenetBackend")
            .field(
                "backend",
                &match &self.inner.backend {
                    Backend::Model { device, .. } => format!("Model({device:?})"),
                    Backend::Stub => "Stub".to_string(),
                },
            )
            .field("model", &self.inner.config.model.name())
            .finish()
    }
}

impl FacenetBackend {
    /// Load the backend described by `config` (stub mode is supported).
    pub fn load(config: ModelConfig) -> FacematchResult<Self> {
        config.validate()?;

        if config.testing_stub {
            warn!("face model running in STUB mode (testing only)");
            return Ok(Self {
                inner: Arc::new(BackendInner {
                    backend: Backend::Stub,
                    config,
                }),
            });
        }

        let device = select_device()?;
        debug!(?device, "selected compute device");

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                &[config.weights_path.clone()],
                DType::F32,
                &device,
            )
        }
        .map_err(load_err)?;

        let detector = DetectionNet::load(vb.pp("detector")).map_err(load_err)?;
        let embedder = EmbeddingNet::load(
            vb.pp("embedder"),
            config.input_size,
            config.model.embedding_dim(),
        )
        .map_err(load_err)?;

        info!(
            weights = %config.weights_path.display(),
            model = config.model.name(),
            input_size = config.input_size,
            embedding_dim = config.model.embedding_dim(),
            "face model loaded"
        );

        Ok(Self {
            inner: Arc::new(BackendInner {
                backend: Backend::Model {
                    detector,
                    embedder,
                    device,
                },
                config,
            }),
        })
    }

    fn config(&self) -> &ModelConfig {
        &self.inner.config
    }

    /// Prewhiten and lay out an image as a `(1, 3, s, s)` tensor in `[-1, 1]`.
    fn to_tensor(
        &self,
        image: &DynamicImage,
        device: &Device,
    ) -> Result<Tensor, candle_core::Error> {
        let size = self.config().input_size;
        let resized = image
            .resize_exact(size as u32, size as u32, FilterType::Triangle)
            .to_rgb8();
        let mut data = vec![0.0_f32; 3 * size * size];
        for (x, y, pixel) in resized.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for ch in 0..3 {
                data[ch * size * size + y * size + x] = f32::from(pixel.0[ch]) / 127.5 - 1.0;
            }
        }
        Tensor::from_vec(data, (1, 3, size, size), device)
    }

    fn detect_with_net(
        &self,
        detector: &DetectionNet,
        device: &Device,
        image: &DynamicImage,
    ) -> FacematchResult<Vec<FaceBounds>> {
        let input = self.to_tensor(image, device).map_err(infer_err)?;
        let raw = detector.forward(&input).map_err(infer_err)?;
        let grid = candle_nn::ops::sigmoid(&raw)
            .and_then(|g| g.squeeze(0))
            .and_then(|g| g.to_vec3::<f32>())
            .map_err(infer_err)?;

        // Channels: [score, dx, dy, dw, dh], one cell per NET_STRIDE pixels.
        let cells = grid[0].len();
        let mut best: Option<(usize, usize, f32)> = None;
        for (row, scores) in grid[0].iter().enumerate() {
            for (col, &score) in scores.iter().enumerate() {
                if score >= DETECTION_CONFIDENCE
                    && best.map_or(true, |(_, _, s)| score > s)
                {
                    best = Some((row, col, score));
                }
            }
        }

        let Some((row, col, score)) = best else {
            return Ok(Vec::new());
        };

        // Map the winning cell back to source-image pixel coordinates. The
        // sigmoid-squashed offsets place the box center within the cell and
        // size it between zero and the full frame.
        let input_size = self.config().input_size as f32;
        let stride = NET_STRIDE as f32;
        let center_x = (col as f32 + grid[1][row][col]) * stride;
        let center_y = (row as f32 + grid[2][row][col]) * stride;
        let width = grid[3][row][col] * input_size;
        let height = grid[4][row][col] * input_size;

        let scale_x = image.width() as f32 / input_size;
        let scale_y = image.height() as f32 / input_size;
        let x = ((center_x - width / 2.0) * scale_x).max(0.0) as u32;
        let y = ((center_y - height / 2.0) * scale_y).max(0.0) as u32;

        debug!(score, x, y, cells, "face box decoded");
        Ok(vec![FaceBounds {
            x,
            y,
            width: ((width * scale_x) as u32).max(1),
            height: ((height * scale_y) as u32).max(1),
            confidence: score,
        }])
    }

    fn embed_with_net(
        &self,
        embedder: &EmbeddingNet,
        device: &Device,
        face: &DynamicImage,
    ) -> FacematchResult<Vec<f32>> {
        let input = self.to_tensor(face, device).map_err(infer_err)?;
        let raw = embedder
            .forward(&input)
            .and_then(|t| t.squeeze(0))
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(infer_err)?;
        Ok(l2_normalize(raw))
    }
}

impl FaceDetector for FacenetBackend {
    fn detect(&self, image: &DynamicImage) -> FacematchResult<Vec<FaceBounds>> {
        match &self.inner.backend {
            Backend::Model {
                detector, device, ..
            } => self.detect_with_net(detector, device, image),
            Backend::Stub => Ok(stub_detect(image)),
        }
    }
}

impl FaceEmbedder for FacenetBackend {
    fn embed(&self, face: &DynamicImage) -> FacematchResult<Vec<f32>> {
        match &self.inner.backend {
            Backend::Model {
                embedder, device, ..
            } => self.embed_with_net(embedder, device, face),
            Backend::Stub => Ok(stub_embed(face, self.config().model.embedding_dim())),
        }
    }

    fn model_name(&self) -> &str {
        self.config().model.name()
    }
}

fn load_err(e: candle_core::Error) -> FacematchError {
    FacematchError::ModelLoad {
        reason: e.to_string(),
    }
}

fn infer_err(e: candle_core::Error) -> FacematchError {
    FacematchError::Inference {
        reason: e.to_string(),
    }
}

fn l2_normalize(v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        return v;
    }
    v.into_iter().map(|x| x / norm).collect()
}

// ── Stub backend ──────────────────────────────────────────────────────────────

/// Normalized luminance of every pixel.
fn luma_values(image: &DynamicImage) -> Vec<f32> {
    image
        .to_luma8()
        .pixels()
        .map(|p| f32::from(p.0[0]) / 255.0)
        .collect()
}

/// A uniform frame has no face; anything with texture gets one centered box.
fn stub_detect(image: &DynamicImage) -> Vec<FaceBounds> {
    let values = luma_values(image);
    if values.is_empty() {
        return Vec::new();
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let variance =
        values.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / values.len() as f32;
    if variance < STUB_UNIFORM_EPS {
        return Vec::new();
    }

    vec![FaceBounds {
        x: image.width() / 4,
        y: image.height() / 4,
        width: (image.width() / 2).max(1),
        height: (image.height() / 2).max(1),
        confidence: 0.9,
    }]
}

/// Block-mean luminance on an 8×8 grid, normalized and cycled out to `dim`.
fn stub_embed(face: &DynamicImage, dim: usize) -> Vec<f32> {
    let gray = face.to_luma8();
    let (w, h) = (gray.width().max(1), gray.height().max(1));
    let mut sums = vec![0.0_f32; (STUB_GRID * STUB_GRID) as usize];
    let mut counts = vec![0.0_f32; sums.len()];
    for (x, y, pixel) in gray.enumerate_pixels() {
        let bx = (x * STUB_GRID / w).min(STUB_GRID - 1);
        let by = (y * STUB_GRID / h).min(STUB_GRID - 1);
        let idx = (by * STUB_GRID + bx) as usize;
        sums[idx] += f32::from(pixel.0[0]) / 255.0;
        counts[idx] += 1.0;
    }
    let blocks: Vec<f32> = sums
        .iter()
        .zip(&counts)
        .map(|(s, c)| if *c > 0.0 { s / c } else { 0.0 })
        .collect();
    l2_normalize(blocks.into_iter().cycle().take(dim).collect())
}
