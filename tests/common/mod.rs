//! Common test utilities and helpers.
//!
//! Builders for synthetic drcov logs so integration tests can describe a log
//! by its parts instead of carrying binary fixtures.


/// `DRCOV VERSION` / `DRCOV FLAVOR` lines.
pub fn header(version: u32, flavor: &str) -> String {
    format!("DRCOV VERSION: {version}\nDRCOV FLAVOR: {flavor}\n")
}

/// A module table with an explicit version, its columns line, and entries.
pub fn module_table(version: u32, columns: &str, entries: &[&str]) -> String {
    let mut out = format!(
        "Module Table: version {version}, count {}\nColumns: {columns}\n",
        entries.len()
    );
    for entry in entries {
        out.push_str(entry);
        out.push('\n');
    }
    out
}

/// A legacy (v1) module table: count only, no columns line.
pub fn legacy_module_table(entries: &[&str]) -> String {
    let mut out = format!("Module Table: {}\n", entries.len());
    for entry in entries {
        out.push_str(entry);
        out.push('\n');
    }
    out
}

/// Block table with packed little-endian records.
pub fn binary_blocks(blocks: &[(u32, u16, u16)]) -> Vec<u8> {
    let mut out = format!("BB Table: {} bbs\n", blocks.len()).into_bytes();
    for &(offset, size, mod_id) in blocks {
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&mod_id.to_le_bytes());
    }
    out
}

/// Block table in the `-dump_text` form.
pub fn text_blocks(blocks: &[(u32, u16, u16)]) -> Vec<u8> {
    let mut out = format!("BB Table: {} bbs\nmodule id, start, size:\n", blocks.len());
    for &(offset, size, mod_id) in blocks {
        out.push_str(&format!("module[{mod_id:3}]: {offset:#018x}, {size}\n"));
    }
    out.into_bytes()
}

/// Concatenate a version 2 header, a module table, and a block table.
pub fn build_log(module_table: &str, blocks: &[u8]) -> Vec<u8> {
    let mut out = header(2, "drcov").into_bytes();
    out.extend_from_slice(module_table.as_bytes());
    out.extend_from_slice(blocks);
    out
}

/// Columns line used by Linux v2 tables.
pub const V2_COLUMNS: &str = "id, base, end, entry, path";
/// Columns line used by Windows v2 tables.
pub const V2_WINDOWS_COLUMNS: &str = "id, base, end, entry, checksum, timestamp, path";
pub const V3_COLUMNS: &str = "id, containing_id, start, end, entry, path";
pub const V4_COLUMNS: &str = "id, containing_id, start, end, entry, offset, path";
pub const V4_WINDOWS_COLUMNS: &str =
    "id, containing_id, start, end, entry, offset, checksum, timestamp, path";

/// Get the full path to a sample log
pub fn sample_file_path<P: AsRef<std::path::Path>>(relative_path: P) -> std::path::PathBuf {
    std::path::Path::new("samples").join(relative_path)
}

/// Sample logs checked into `samples/drcov`.
pub mod test_data {
    /// Linux, module table v4, binary block table
    pub const SAMPLE_V4_BINARY: &str = "drcov/hello-v4-binary.log";
    /// Windows, module table v2 with checksum/timestamp, text block table, CRLF
    pub const SAMPLE_V2_WINDOWS_TEXT: &str = "drcov/hello-v2-windows-text.log";
}
