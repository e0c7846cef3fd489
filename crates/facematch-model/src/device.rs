//! Compute device selection (CPU by default, GPU behind cargo features).

use candle_core::Device;
use tracing::warn;

use facematch_contracts::FacematchResult;

/// Selects the compute device based on enabled features, falling back to CPU.
pub fn select_device() -> FacematchResult<Device> {
    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => return Ok(device),
            Err(e) => warn!(error = %e, "Metal device unavailable, falling back"),
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => return Ok(device),
            Err(e) => warn!(error = %e, "CUDA device unavailable, falling back"),
        }
    }

    Ok(Device::Cpu)
}
