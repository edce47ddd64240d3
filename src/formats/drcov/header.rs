//! drcov log header parsing

use tracing::debug;

use crate::error::{DrcovError, Result, Stage};
use crate::formats::drcov::cursor::LogCursor;
use crate::formats::drcov::types::{FLAVOR_KEY, SUPPORTED_LOG_VERSION, VERSION_KEY};
use crate::formats::drcov::utils::{key_value, parse_dec};

/// The two leading lines of a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogHeader {
    pub version: u32,
    pub flavor: String,
}

/// Parse `DRCOV VERSION: <int>` and `DRCOV FLAVOR: <token>`.
pub fn parse_header(cursor: &mut LogCursor<'_>) -> Result<LogHeader> {
    let (line, text) = cursor.text_line(Stage::Header)?;
    let value = key_value(text, VERSION_KEY).ok_or_else(|| {
        DrcovError::malformed(Stage::Header, line, text, "expected 'DRCOV VERSION: <int>'")
    })?;
    let version: u32 = parse_dec(value).ok_or_else(|| {
        DrcovError::malformed(Stage::Header, line, text, "log version is not an integer")
    })?;
    if version != SUPPORTED_LOG_VERSION {
        return Err(DrcovError::UnsupportedVersion { version });
    }

    let (line, text) = cursor.text_line(Stage::Header)?;
    let flavor = key_value(text, FLAVOR_KEY).ok_or_else(|| {
        DrcovError::malformed(Stage::Header, line, text, "expected 'DRCOV FLAVOR: <token>'")
    })?;

    debug!(version, flavor, "Parsed drcov header");

    Ok(LogHeader {
        version,
        flavor: flavor.to_string(),
    })
}
