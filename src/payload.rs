//! Local scratch files holding the probe payload

use crate::defaults::BYTES_PER_MB;
use crate::error::{AppError, Result};
use rand::RngCore;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write `size_mb` MiB of random bytes to `path`, returning the byte count.
///
/// The file is filled one MiB at a time so memory use does not grow with
/// the configured size.
pub fn create_random_file(path: &Path, size_mb: u64) -> Result<u64> {
    let create_error = |e: std::io::Error| AppError::io(format!("Create random file error: {}: {}", path.display(), e));

    let mut file = File::create(path).map_err(create_error)?;
    let mut rng = rand::thread_rng();
    let mut chunk = vec![0u8; BYTES_PER_MB as usize];

    for _ in 0..size_mb {
        rng.fill_bytes(&mut chunk);
        file.write_all(&chunk).map_err(create_error)?;
    }
    file.sync_all().map_err(create_error)?;

    Ok(size_mb * BYTES_PER_MB)
}

/// Delete a local file
pub fn remove_file(path: &Path) -> Result<()> {
    std::fs::remove_file(path)
        .map_err(|e| AppError::io(format!("Remove file error: {}: {}", path.display(), e)))
}
