//! Preflight input validation.
//!
//! Runs before the model backend is touched. Checks are ordered cheapest
//! first: existence, then byte sizes, then a full decode. The first failure
//! wins — there is no partial validation and no retry.
//!
//! The size and decode checks only run under deep preflight (the lenient
//! profile); the strict profile trusts the model invocation to surface bad
//! inputs as tier-2 errors.

use std::fs;
use std::path::Path;

use tracing::debug;

use facematch_contracts::{FacematchError, FacematchResult};

/// Validate the two input paths.
///
/// With `deep == false` only existence is checked. With `deep == true` the
/// files must also be non-empty and decodable as images.
pub fn check_inputs(img1: &Path, img2: &Path, deep: bool) -> FacematchResult<()> {
    if !img1.exists() || !img2.exists() {
        return Err(FacematchError::FilesNotFound);
    }

    if !deep {
        return Ok(());
    }

    let size1 = file_size(img1)?;
    let size2 = file_size(img2)?;
    debug!(size1, size2, "preflight file sizes");
    if size1 == 0 || size2 == 0 {
        return Err(FacematchError::EmptyFile { size1, size2 });
    }

    check_decodes(img1)?;
    check_decodes(img2)?;
    Ok(())
}

fn file_size(path: &Path) -> FacematchResult<u64> {
    // The file existed a moment ago; a metadata failure here means it is
    // unreadable, which the caller should learn about the same way.
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| FacematchError::UndecodableImage {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

fn check_decodes(path: &Path) -> FacematchResult<()> {
    image::open(path)
        .map(|_| ())
        .map_err(|e| FacematchError::UndecodableImage {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}
