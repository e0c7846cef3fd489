//! The candle network definitions.
//!
//! Two small fully-convolutional nets share one safetensors file:
//!
//! - `DetectionNet` under the `detector` prefix — three stride-2 conv stages
//!   and a 1×1 head producing a `(1, 5, g, g)` grid of
//!   `[score, dx, dy, dw, dh]` cells, an anchor-free face-box predictor.
//! - `EmbeddingNet` under the `embedder` prefix — three stride-2 conv stages
//!   flattened into a linear projection to the embedding dimension.
//!
//! Both expect prewhitened `(1, 3, s, s)` input in `[-1, 1]`.

use candle_core::{Result, Tensor};
use candle_nn::{conv2d, linear, Conv2d, Conv2dConfig, Linear, Module, VarBuilder};

/// Downsampling factor of the three stride-2 stages.
pub(crate) const NET_STRIDE: usize = 8;

fn stride2() -> Conv2dConfig {
    Conv2dConfig {
        padding: 1,
        stride: 2,
        ..Default::default()
    }
}

pub(crate) struct DetectionNet {
    conv1: Conv2d,
    conv2: Conv2d,
    conv3: Conv2d,
    head: Conv2d,
}

impl DetectionNet {
    pub(crate) fn load(vb: VarBuilder) -> Result<Self> {
        let conv1 = conv2d(3, 16, 3, stride2(), vb.pp("conv1"))?;
        let conv2 = conv2d(16, 32, 3, stride2(), vb.pp("conv2"))?;
        let conv3 = conv2d(32, 64, 3, stride2(), vb.pp("conv3"))?;
        let head = conv2d(64, 5, 1, Conv2dConfig::default(), vb.pp("head"))?;
        Ok(Self {
            conv1,
            conv2,
            conv3,
            head,
        })
    }

    /// `(1, 3, s, s)` → `(1, 5, s/8, s/8)` raw grid (scores not yet squashed).
    pub(crate) fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let x = self.conv1.forward(x)?.relu()?;
        let x = self.conv2.forward(&x)?.relu()?;
        let x = self.conv3.forward(&x)?.relu()?;
        self.head.forward(&x)
    }
}

pub(crate) struct EmbeddingNet {
    conv1: Conv2d,
    conv2: Conv2d,
    conv3: Conv2d,
    fc: Linear,
}

impl EmbeddingNet {
    pub(crate) fn load(vb: VarBuilder, input_size: usize, embedding_dim: usize) -> Result<Self> {
        let conv1 = conv2d(3, 32, 3, stride2(), vb.pp("conv1"))?;
        let conv2 = conv2d(32, 64, 3, stride2(), vb.pp("conv2"))?;
        let conv3 = conv2d(64, 128, 3, stride2(), vb.pp("conv3"))?;
        let spatial = input_size / NET_STRIDE;
        let fc = linear(128 * spatial * spatial, embedding_dim, vb.pp("fc"))?;
        Ok(Self {
            conv1,
            conv2,
            conv3,
            fc,
        })
    }

    /// `(1, 3, s, s)` → `(1, dim)` unnormalized embedding.
    pub(crate) fn forward(&self, x: &Tensor) -> Result<Tensor> {
        let x = self.conv1.forward(x)?.relu()?;
        let x = self.conv2.forward(&x)?.relu()?;
        let x = self.conv3.forward(&x)?.relu()?;
        let x = x.flatten_from(1)?;
        self.fc.forward(&x)
    }
}
