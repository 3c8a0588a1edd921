//! Checksum utilities for uploaded files
//!
//! Artifacts are fingerprinted with MD5, the digest Zenodo reports for
//! deposition files.

use crate::error::Result;
use std::io::Read;
use std::path::Path;

/// Compute the MD5 checksum of an in-memory buffer as lowercase hex.
pub fn md5_hex(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

/// Compute the MD5 checksum of any readable source
pub fn compute_checksum<R: Read>(reader: &mut R) -> Result<String> {
    let mut context = md5::Context::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        context.consume(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", context.compute()))
}

/// Compute checksum and size of a file on disk.
pub fn checksum_and_size(path: impl AsRef<Path>) -> Result<(String, u64)> {
    let path = path.as_ref();
    let size = std::fs::metadata(path)?.len();
    let mut file = std::fs::File::open(path)?;
    let checksum = compute_checksum(&mut file)?;
    Ok((checksum, size))
}
