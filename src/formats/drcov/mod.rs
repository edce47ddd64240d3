//! DynamoRIO drcov coverage log parser
//!
//! A log is a text header, a text module table, and a basic block table whose
//! records are either packed binary or text:
//!
//! ```text
//! DRCOV VERSION: 2
//! DRCOV FLAVOR: drcov
//! Module Table: version 2, count 1
//! Columns: id, base, end, entry, path
//!  0, 0x400000, 0x401000, 0x400010, /opt/target
//! BB Table: 2 bbs
//! <2 x 8-byte records>
//! ```
//!
//! [`DrcovLog::from_bytes`] turns a buffer into an immutable [`DrcovLog`] in
//! one pass. [`DrcovParser`] wraps that behind the [`CoverageParser`]
//! interface for callers that construct first and parse later.

use bytes::Bytes;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub mod blocks;
pub mod cursor;
pub mod header;
pub mod hitcount;
pub mod lookup;
pub mod modules;
pub mod types;
pub mod utils;

use blocks::parse_block_table;
use cursor::LogCursor;
use header::parse_header;
use modules::parse_module_table;
pub use hitcount::HitCountMap;
pub use lookup::{find_module, LookupMode};
pub use types::*;

use crate::config::ParserConfig;
use crate::error::{DrcovError, Result};
use crate::formats::CoverageParser;
use crate::io::{IOLimits, SafeReader};

/// A fully parsed drcov log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrcovLog {
    version: u32,
    flavor: String,
    module_table_version: ModuleTableVersion,
    columns: Vec<String>,
    modules: Vec<Module>,
    block_encoding: BlockEncoding,
    blocks: Vec<BasicBlock>,
    hit_counts: HitCountMap,
}

impl DrcovLog {
    /// Parse a complete log held in memory.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let span = crate::span_trace!("drcov_parse", len = data.len());
        let _guard = span.enter();

        let mut cursor = LogCursor::new(data);
        let header = parse_header(&mut cursor)?;
        let module_table = parse_module_table(&mut cursor)?;
        let block_table = parse_block_table(&mut cursor)?;
        let hit_counts = HitCountMap::from_blocks(&block_table.blocks);

        info!(
            flavor = %header.flavor,
            table_version = %module_table.version,
            modules = module_table.modules.len(),
            blocks = block_table.blocks.len(),
            unique_blocks = hit_counts.unique_blocks(),
            encoding = ?block_table.encoding,
            "Parsed drcov log"
        );

        Ok(Self {
            version: header.version,
            flavor: header.flavor,
            module_table_version: module_table.version,
            columns: module_table.columns,
            modules: module_table.modules,
            block_encoding: block_table.encoding,
            blocks: block_table.blocks,
            hit_counts,
        })
    }

    /// Parse a log file. The file is mapped only for the duration of the call.
    pub fn from_path<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let mut reader = SafeReader::open(path, limits)?;
        Self::from_bytes(reader.contents()?)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn flavor(&self) -> &str {
        &self.flavor
    }

    pub fn module_table_version(&self) -> ModuleTableVersion {
        self.module_table_version
    }

    /// Column names declared by the module table (empty for v1 tables).
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn block_encoding(&self) -> BlockEncoding {
        self.block_encoding
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn hit_counts(&self) -> &HitCountMap {
        &self.hit_counts
    }

    pub fn module(&self, name: &str, mode: LookupMode) -> Option<&Module> {
        find_module(&self.modules, name, mode)
    }

    fn require_module(&self, name: &str, mode: LookupMode) -> Result<&Module> {
        self.module(name, mode)
            .ok_or_else(|| DrcovError::ModuleNotFound(name.to_string()))
    }

    /// Blocks recorded against module `id`, in table order.
    ///
    /// Split images share a filename across several module ids, so callers
    /// walking the module table should group by id rather than by name.
    pub fn blocks_by_module_id(&self, id: u32) -> Vec<BasicBlock> {
        self.blocks
            .iter()
            .filter(|bb| u32::from(bb.mod_id) == id)
            .copied()
            .collect()
    }

    /// Blocks recorded for the module `name` resolves to, in table order.
    pub fn blocks_by_module(&self, name: &str, mode: LookupMode) -> Result<Vec<BasicBlock>> {
        let module = self.require_module(name, mode)?;
        Ok(self.blocks_by_module_id(module.id))
    }

    /// `(offset, count)` pairs for the module `name` resolves to.
    pub fn hit_counts_by_module(&self, name: &str, mode: LookupMode) -> Result<Vec<(u32, usize)>> {
        let module = self.require_module(name, mode)?;
        // Block records can only name 16-bit module ids.
        Ok(u16::try_from(module.id)
            .map(|id| self.hit_counts.module_hits(id))
            .unwrap_or_default())
    }
}

/// Where a [`DrcovParser`] reads its log from.
#[derive(Debug, Clone)]
pub enum LogSource {
    Path(PathBuf),
    Buffer(Bytes),
}

/// Deferred drcov parser implementing [`CoverageParser`].
#[derive(Debug, Clone)]
pub struct DrcovParser {
    source: LogSource,
    config: ParserConfig,
    log: Option<DrcovLog>,
}

impl DrcovParser {
    /// Create a parser from exactly one of a file path or an in-memory buffer.
    pub fn new(path: Option<PathBuf>, data: Option<Vec<u8>>) -> Result<Self> {
        let source = match (path, data) {
            (Some(path), None) => LogSource::Path(path),
            (None, Some(data)) => LogSource::Buffer(Bytes::from(data)),
            _ => return Err(DrcovError::Construction),
        };
        Ok(Self::from_source(source))
    }

    pub fn from_source(source: LogSource) -> Self {
        Self {
            source,
            config: ParserConfig::default(),
            log: None,
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::from_source(LogSource::Path(path.into()))
    }

    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::from_source(LogSource::Buffer(data.into()))
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    pub fn source(&self) -> &LogSource {
        &self.source
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The parsed log, once `parse` has succeeded.
    pub fn log(&self) -> Option<&DrcovLog> {
        self.log.as_ref()
    }

    pub fn into_log(self) -> Option<DrcovLog> {
        self.log
    }

    fn parsed(&self) -> Result<&DrcovLog> {
        self.log.as_ref().ok_or(DrcovError::NotParsed)
    }

    /// `(offset, count)` pairs for a module, using the configured lookup mode.
    pub fn hit_counts_by_module(&self, name: &str) -> Result<Vec<(u32, usize)>> {
        self.parsed()?.hit_counts_by_module(name, self.config.lookup)
    }
}

impl CoverageParser for DrcovParser {
    type Module = Module;
    type Block = BasicBlock;

    fn parse(&mut self) -> Result<()> {
        if self.log.is_some() {
            return Ok(());
        }

        let log = match &self.source {
            LogSource::Path(path) => DrcovLog::from_path(path, self.config.io.clone()),
            LogSource::Buffer(data) => DrcovLog::from_bytes(data),
        }
        .map_err(|e| crate::log_error!(e, "drcov parse failed"))?;

        self.log = Some(log);
        Ok(())
    }

    fn is_parsed(&self) -> bool {
        self.log.is_some()
    }

    fn get_modules(&self) -> &[Module] {
        self.log.as_ref().map(DrcovLog::modules).unwrap_or(&[])
    }

    fn get_basic_blocks(&self) -> &[BasicBlock] {
        self.log.as_ref().map(DrcovLog::blocks).unwrap_or(&[])
    }

    fn get_blocks_by_module(&self, name: &str) -> Result<Vec<BasicBlock>> {
        self.parsed()?.blocks_by_module(name, self.config.lookup)
    }

    fn get_module(&self, name: &str, fuzzy: bool) -> Option<&Module> {
        self.log.as_ref()?.module(name, LookupMode::from(fuzzy))
    }
}
