//! Module table parsing
//!
//! The table layout has changed across DynamoRIO releases without ever being
//! documented. Each revision gets its own record type; `ModuleRecord::decode`
//! picks the shape from the table version and the observed field count, and
//! every shape is then normalised into a [`Module`].

use thiserror::Error;
use tracing::{debug, trace};

use crate::error::{DrcovError, Result, Stage};
use crate::formats::drcov::cursor::LogCursor;
use crate::formats::drcov::types::{Module, ModuleTableVersion, COLUMNS_KEY, MODULE_TABLE_KEY};
use crate::formats::drcov::utils::{key_value, module_filename, parse_dec, parse_hex, HexInt};

/// Field separator inside a module record.
const FIELD_SEPARATOR: &str = ", ";

/// Upper bound on up-front allocation; the declared count is untrusted.
const MAX_PREALLOCATED_MODULES: usize = 4096;

/// Why a single module record could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("{version} record has {found} fields, expected {expected}")]
    FieldCount {
        version: ModuleTableVersion,
        found: usize,
        expected: &'static str,
    },

    #[error("invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("module end {end:#x} precedes base {base:#x}")]
    InvertedRange { base: u64, end: u64 },
}

/// Checksum and timestamp, only written by the Windows client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowsInfo {
    pub checksum: u32,
    pub timestamp: u32,
}

/// `id, size, path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordV1 {
    pub id: u32,
    pub size: u64,
    pub path: String,
}

/// `id, base, end, entry, [checksum, timestamp,] path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordV2 {
    pub id: u32,
    pub base: u64,
    pub end: u64,
    pub entry: u64,
    pub windows: Option<WindowsInfo>,
    pub path: String,
}

/// `id, containing_id, start, end, entry, [checksum, timestamp,] path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordV3 {
    pub id: u32,
    pub containing_id: u32,
    pub base: u64,
    pub end: u64,
    pub entry: u64,
    pub windows: Option<WindowsInfo>,
    pub path: String,
}

/// `id, containing_id, start, end, entry, offset, [checksum, timestamp,] path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordV4 {
    pub id: u32,
    pub containing_id: u32,
    pub base: u64,
    pub end: u64,
    pub entry: u64,
    pub offset: u64,
    pub windows: Option<WindowsInfo>,
    pub path: String,
}

/// One module table line, in the shape of its table version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRecord {
    V1(RecordV1),
    V2(RecordV2),
    V3(RecordV3),
    V4(RecordV4),
}

fn dec_u32(field: &'static str, value: &str) -> std::result::Result<u32, RecordError> {
    parse_dec(value).ok_or_else(|| RecordError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn hex<T: HexInt>(field: &'static str, value: &str) -> std::result::Result<T, RecordError> {
    parse_hex(value).ok_or_else(|| RecordError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

fn windows_info(
    checksum: &str,
    timestamp: &str,
) -> std::result::Result<WindowsInfo, RecordError> {
    Ok(WindowsInfo {
        checksum: hex("checksum", checksum)?,
        timestamp: hex("timestamp", timestamp)?,
    })
}

impl ModuleRecord {
    /// Decode one module line according to `version`.
    pub fn decode(
        line: &str,
        version: ModuleTableVersion,
    ) -> std::result::Result<Self, RecordError> {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
        let field_count = |expected| RecordError::FieldCount {
            version,
            found: fields.len(),
            expected,
        };

        let record = match version {
            ModuleTableVersion::V1 => match fields[..] {
                [id, size, path] => ModuleRecord::V1(RecordV1 {
                    id: dec_u32("id", id)?,
                    size: parse_dec(size).ok_or_else(|| RecordError::InvalidNumber {
                        field: "size",
                        value: size.to_string(),
                    })?,
                    path: path.to_string(),
                }),
                _ => return Err(field_count("3")),
            },
            ModuleTableVersion::V2 => {
                let (head, windows, path) = match fields[..] {
                    [id, base, end, entry, path] => ([id, base, end, entry], None, path),
                    [id, base, end, entry, checksum, timestamp, path] => (
                        [id, base, end, entry],
                        Some(windows_info(checksum, timestamp)?),
                        path,
                    ),
                    _ => return Err(field_count("5 or 7")),
                };
                let [id, base, end, entry] = head;
                ModuleRecord::V2(RecordV2 {
                    id: dec_u32("id", id)?,
                    base: hex("base", base)?,
                    end: hex("end", end)?,
                    entry: hex("entry", entry)?,
                    windows,
                    path: path.to_string(),
                })
            }
            ModuleTableVersion::V3 => {
                let (head, windows, path) = match fields[..] {
                    [id, cid, base, end, entry, path] => ([id, cid, base, end, entry], None, path),
                    [id, cid, base, end, entry, checksum, timestamp, path] => (
                        [id, cid, base, end, entry],
                        Some(windows_info(checksum, timestamp)?),
                        path,
                    ),
                    _ => return Err(field_count("6 or 8")),
                };
                let [id, cid, base, end, entry] = head;
                ModuleRecord::V3(RecordV3 {
                    id: dec_u32("id", id)?,
                    containing_id: dec_u32("containing_id", cid)?,
                    base: hex("start", base)?,
                    end: hex("end", end)?,
                    entry: hex("entry", entry)?,
                    windows,
                    path: path.to_string(),
                })
            }
            ModuleTableVersion::V4 => {
                let (head, windows, path) = match fields[..] {
                    [id, cid, base, end, entry, offset, path] => {
                        ([id, cid, base, end, entry, offset], None, path)
                    }
                    [id, cid, base, end, entry, offset, checksum, timestamp, path] => (
                        [id, cid, base, end, entry, offset],
                        Some(windows_info(checksum, timestamp)?),
                        path,
                    ),
                    _ => return Err(field_count("7 or 9")),
                };
                let [id, cid, base, end, entry, offset] = head;
                ModuleRecord::V4(RecordV4 {
                    id: dec_u32("id", id)?,
                    containing_id: dec_u32("containing_id", cid)?,
                    base: hex("start", base)?,
                    end: hex("end", end)?,
                    entry: hex("entry", entry)?,
                    offset: hex("offset", offset)?,
                    windows,
                    path: path.to_string(),
                })
            }
        };

        Ok(record)
    }
}

fn span_size(base: u64, end: u64) -> std::result::Result<u64, RecordError> {
    end.checked_sub(base)
        .ok_or(RecordError::InvertedRange { base, end })
}

impl TryFrom<ModuleRecord> for Module {
    type Error = RecordError;

    fn try_from(record: ModuleRecord) -> std::result::Result<Self, Self::Error> {
        let module = match record {
            ModuleRecord::V1(r) => Module {
                id: r.id,
                containing_id: None,
                base: 0,
                end: 0,
                size: r.size,
                entry: 0,
                checksum: None,
                timestamp: None,
                offset: None,
                filename: module_filename(&r.path),
                path: r.path,
            },
            ModuleRecord::V2(r) => Module {
                id: r.id,
                containing_id: None,
                base: r.base,
                end: r.end,
                size: span_size(r.base, r.end)?,
                entry: r.entry,
                checksum: r.windows.map(|w| w.checksum),
                timestamp: r.windows.map(|w| w.timestamp),
                offset: None,
                filename: module_filename(&r.path),
                path: r.path,
            },
            ModuleRecord::V3(r) => Module {
                id: r.id,
                containing_id: Some(r.containing_id),
                base: r.base,
                end: r.end,
                size: span_size(r.base, r.end)?,
                entry: r.entry,
                checksum: r.windows.map(|w| w.checksum),
                timestamp: r.windows.map(|w| w.timestamp),
                offset: None,
                filename: module_filename(&r.path),
                path: r.path,
            },
            ModuleRecord::V4(r) => Module {
                id: r.id,
                containing_id: Some(r.containing_id),
                base: r.base,
                end: r.end,
                size: span_size(r.base, r.end)?,
                entry: r.entry,
                checksum: r.windows.map(|w| w.checksum),
                timestamp: r.windows.map(|w| w.timestamp),
                offset: Some(r.offset),
                filename: module_filename(&r.path),
                path: r.path,
            },
        };
        Ok(module)
    }
}

/// Decoded module table section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTable {
    pub version: ModuleTableVersion,
    /// Declared column names; empty for v1 tables.
    pub columns: Vec<String>,
    pub modules: Vec<Module>,
}

/// Parse `Module Table: version <v>, count <n>` or the legacy `Module Table: <n>`.
pub fn parse_table_header(cursor: &mut LogCursor<'_>) -> Result<(ModuleTableVersion, usize)> {
    let (line, text) = cursor.text_line(Stage::ModuleTable)?;
    let malformed = |message: &str| DrcovError::malformed(Stage::ModuleTable, line, text, message);

    let value = key_value(text, MODULE_TABLE_KEY)
        .ok_or_else(|| malformed("expected 'Module Table: ...'"))?;

    let Some((version_part, count_part)) = value.split_once(',') else {
        // Legacy tables carry only a count.
        let count = parse_dec(value).ok_or_else(|| malformed("module count is not an integer"))?;
        return Ok((ModuleTableVersion::V1, count));
    };

    let version: u32 = version_part
        .trim()
        .strip_prefix("version")
        .and_then(|v| parse_dec(v.trim()))
        .ok_or_else(|| malformed("expected 'version <int>'"))?;
    let version = ModuleTableVersion::from_u32(version)
        .ok_or(DrcovError::UnsupportedTableVersion { version, line })?;

    let count: usize = count_part
        .trim()
        .strip_prefix("count")
        .and_then(|c| parse_dec(c.trim()))
        .ok_or_else(|| malformed("expected 'count <int>'"))?;

    Ok((version, count))
}

/// Parse `Columns: id, base, ...`.
pub fn parse_columns(cursor: &mut LogCursor<'_>) -> Result<Vec<String>> {
    let (line, text) = cursor.text_line(Stage::ModuleTable)?;
    let value = key_value(text, COLUMNS_KEY).ok_or_else(|| {
        DrcovError::malformed(Stage::ModuleTable, line, text, "expected 'Columns: ...'")
    })?;
    Ok(value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect())
}

/// Parse the whole module table: header, optional columns, and entries.
pub fn parse_module_table(cursor: &mut LogCursor<'_>) -> Result<ModuleTable> {
    let (version, count) = parse_table_header(cursor)?;
    let columns = if version.has_columns() {
        parse_columns(cursor)?
    } else {
        Vec::new()
    };

    debug!(%version, count, columns = ?columns, "Parsing module table");

    let mut modules = Vec::with_capacity(count.min(MAX_PREALLOCATED_MODULES));
    for _ in 0..count {
        let (line, text) = cursor.text_line(Stage::ModuleTable)?;
        let module = ModuleRecord::decode(text, version)
            .and_then(Module::try_from)
            .map_err(|e| DrcovError::malformed(Stage::ModuleTable, line, text, e.to_string()))?;
        trace!(id = module.id, filename = %module.filename, base = module.base, "Decoded module");
        modules.push(module);
    }

    Ok(ModuleTable {
        version,
        columns,
        modules,
    })
}
