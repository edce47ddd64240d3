//! Bounded file access for coverage logs.
//!
//! `SafeReader` memory-maps a log file and enforces `IOLimits` so that a
//! corrupt or hostile path cannot make the parser map or walk an arbitrarily
//! large file. The mapping lives exactly as long as the reader.

pub mod error;

use crate::io::error::{IoError, Result};
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Defines the resource limits for I/O operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IOLimits {
    /// The absolute maximum file size that can be opened.
    pub max_file_size: u64,
    /// The maximum total number of bytes that can be read from the file across all operations.
    pub max_read_bytes: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: 512 * 1024 * 1024,  // 512MB
            max_read_bytes: 512 * 1024 * 1024, // 512MB
        }
    }
}

/// A bounded file reader backed by a read-only memory map.
pub struct SafeReader {
    path: PathBuf,
    // None when the file size is zero; memmap cannot map empty files.
    mmap: Option<Mmap>,
    limits: IOLimits,
    bytes_read: u64,
    file_size: u64,
}

impl SafeReader {
    /// Opens a file, memory-maps it, and wraps it in a `SafeReader`.
    ///
    /// This function will fail if the file size exceeds `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limits.max_file_size = limits.max_file_size,
            "Opening coverage log"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "File is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        let mmap = if file_size == 0 {
            None
        } else {
            // Safety: read-only map of a regular file; the map is dropped with the reader.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            limits,
            bytes_read: 0,
            file_size,
        })
    }

    /// Returns the total size of the underlying file in bytes.
    pub fn size(&self) -> u64 {
        self.file_size
    }

    /// Returns the total number of bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Returns the `IOLimits` enforced by this reader.
    pub fn limits(&self) -> &IOLimits {
        &self.limits
    }

    /// Borrows the whole file, charging its length against the read budget.
    ///
    /// # Errors
    ///
    /// Returns `IoError::ReadLimitExceeded` if the file would push the total
    /// number of bytes read past `limits.max_read_bytes`.
    pub fn contents(&mut self) -> Result<&[u8]> {
        if self.bytes_read.saturating_add(self.file_size) > self.limits.max_read_bytes {
            warn!(
                path = %self.path.display(),
                current_read = self.bytes_read,
                requested = self.file_size,
                limit = self.limits.max_read_bytes,
                "Read limit exceeded"
            );
            return Err(IoError::ReadLimitExceeded {
                limit: self.limits.max_read_bytes,
                current: self.bytes_read,
            });
        }

        self.bytes_read += self.file_size;
        trace!(
            path = %self.path.display(),
            len = self.file_size,
            total_read = self.bytes_read,
            "Borrowed file contents"
        );

        Ok(self.mmap.as_deref().unwrap_or(&[]))
    }
}
