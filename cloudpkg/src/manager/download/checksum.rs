//! SHA-256 checksum calculation for file verification.
//!
//! The same digest is computed when a package is published and when an
//! installed file is checked against its manifest entry, so both sides must
//! go through these functions.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::manager::error::{ManagerError, ManagerResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the SHA-256 checksum of a whole stream.
///
/// Reads until end-of-stream before returning.
///
/// # Returns
///
/// The uppercase hexadecimal SHA-256 hash of the stream contents.
pub fn calculate_checksum<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:X}", hasher.finalize()))
}

/// Calculate the SHA-256 checksum of a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn calculate_file_checksum(path: &Path) -> ManagerResult<String> {
    let file = File::open(path).map_err(|e| ManagerError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    calculate_checksum(file).map_err(|e| ManagerError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })
}
