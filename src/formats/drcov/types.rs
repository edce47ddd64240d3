//! Core drcov data types and constants

use serde::{Deserialize, Serialize};
use std::fmt;

/// The only log version this parser understands.
pub const SUPPORTED_LOG_VERSION: u32 = 2;

pub const VERSION_KEY: &str = "DRCOV VERSION";
pub const FLAVOR_KEY: &str = "DRCOV FLAVOR";
pub const MODULE_TABLE_KEY: &str = "Module Table";
pub const COLUMNS_KEY: &str = "Columns";
pub const BB_TABLE_KEY: &str = "BB Table";

/// Leading bytes of a text-encoded block table.
pub const TEXT_TABLE_TOKEN: &[u8] = b"module id";
/// Full header line of a text-encoded block table.
pub const TEXT_TABLE_HEADER: &str = "module id, start, size:";

/// Layout revision of the module table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModuleTableVersion {
    /// `id, size, path`; no version token in the table header.
    V1 = 1,
    V2 = 2,
    /// Adds `containing_id`.
    V3 = 3,
    /// Adds the file `offset`.
    V4 = 4,
}

impl ModuleTableVersion {
    pub fn from_u32(val: u32) -> Option<Self> {
        match val {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            3 => Some(Self::V3),
            4 => Some(Self::V4),
            _ => None,
        }
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Whether a `Columns:` line follows the table header.
    pub fn has_columns(self) -> bool {
        self >= Self::V2
    }
}

impl fmt::Display for ModuleTableVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.as_u32())
    }
}

/// Wire encoding of the basic block table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockEncoding {
    Binary,
    Text,
}

/// One loaded image (executable or shared library).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: u32,
    /// Enclosing module for split images (table v3+)
    pub containing_id: Option<u32>,
    pub base: u64,
    /// End address (exclusive)
    pub end: u64,
    pub size: u64,
    pub entry: u64,
    /// Windows only
    pub checksum: Option<u32>,
    /// Windows only
    pub timestamp: Option<u32>,
    /// File offset (table v4)
    pub offset: Option<u64>,
    pub path: String,
    pub filename: String,
}

impl Module {
    /// Alias for `base`; table v3 renamed the column to `start`.
    pub fn start(&self) -> u64 {
        self.base
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Module {}: {} @ {:#x}-{:#x}",
            self.id, self.filename, self.base, self.end
        )
    }
}

/// One covered code region, as stored in the block table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasicBlock {
    /// Offset from the owning module's base
    pub offset: u32,
    pub size: u16,
    pub mod_id: u16,
}

impl BasicBlock {
    /// Size of one packed record: u32 offset, u16 size, u16 module id.
    pub const ENCODED_SIZE: usize = 8;

    /// Decode one little-endian packed record.
    pub fn from_le_bytes(record: [u8; Self::ENCODED_SIZE]) -> Self {
        let [o0, o1, o2, o3, s0, s1, m0, m1] = record;
        Self {
            offset: u32::from_le_bytes([o0, o1, o2, o3]),
            size: u16::from_le_bytes([s0, s1]),
            mod_id: u16::from_le_bytes([m0, m1]),
        }
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Block @ {:#x} of size {} (module {})",
            self.offset, self.size, self.mod_id
        )
    }
}
