//! Basic block table parsing
//!
//! drcov writes the table either as packed little-endian records or, when
//! run with `-dump_text`, as one `module[ id]: 0x..., size` line per block.
//! Nothing in the header says which, so the encoding is sniffed from the
//! first bytes after the table header.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::error::{DrcovError, Result, Stage};
use crate::formats::drcov::cursor::LogCursor;
use crate::formats::drcov::types::{
    BasicBlock, BlockEncoding, BB_TABLE_KEY, TEXT_TABLE_HEADER, TEXT_TABLE_TOKEN,
};
use crate::formats::drcov::utils::{key_value, parse_dec, parse_hex};

const MAX_PREALLOCATED_BLOCKS: usize = 1 << 20;

static TEXT_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^module\[\s*(?P<mod>[0-9]+)\]:\s*(?P<start>0x[0-9a-fA-F]+),\s*(?P<size>[0-9]+)$")
        .expect("text block pattern is valid")
});

/// Decoded basic block table section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockTable {
    pub encoding: BlockEncoding,
    pub blocks: Vec<BasicBlock>,
}

/// Parse `BB Table: <n> bbs`, returning `n`.
pub fn parse_table_header(cursor: &mut LogCursor<'_>) -> Result<usize> {
    let (line, text) = cursor.text_line(Stage::BlockTable)?;
    key_value(text, BB_TABLE_KEY)
        .and_then(|value| value.strip_suffix("bbs"))
        .and_then(|count| parse_dec(count.trim()))
        .ok_or_else(|| {
            DrcovError::malformed(Stage::BlockTable, line, text, "expected 'BB Table: <n> bbs'")
        })
}

/// Decide the table encoding without consuming any input.
pub fn sniff_encoding(cursor: &LogCursor<'_>) -> BlockEncoding {
    match cursor.peek(TEXT_TABLE_TOKEN.len()) {
        Some(token) if token == TEXT_TABLE_TOKEN => BlockEncoding::Text,
        _ => BlockEncoding::Binary,
    }
}

/// Decode `count` packed 8-byte records.
pub fn decode_binary(cursor: &mut LogCursor<'_>, count: usize) -> Result<Vec<BasicBlock>> {
    let available = cursor.remaining().len();
    let expected = count.checked_mul(BasicBlock::ENCODED_SIZE).unwrap_or(usize::MAX);
    let raw = cursor.take(expected).ok_or(DrcovError::TruncatedBlocks {
        count,
        expected,
        found: available,
    })?;

    let blocks: Vec<BasicBlock> = raw
        .chunks_exact(BasicBlock::ENCODED_SIZE)
        .map(|chunk| {
            let mut record = [0u8; BasicBlock::ENCODED_SIZE];
            record.copy_from_slice(chunk);
            BasicBlock::from_le_bytes(record)
        })
        .collect();

    if !cursor.is_eof() {
        debug!(
            trailing = cursor.remaining().len(),
            "Ignoring bytes after binary block table"
        );
    }

    Ok(blocks)
}

fn parse_text_entry(text: &str) -> Option<BasicBlock> {
    let caps = TEXT_ENTRY.captures(text)?;
    Some(BasicBlock {
        offset: parse_hex(&caps["start"])?,
        size: caps["size"].parse().ok()?,
        mod_id: caps["mod"].parse().ok()?,
    })
}

/// Decode the `module id, start, size:` header and `count` entry lines.
pub fn decode_text(cursor: &mut LogCursor<'_>, count: usize) -> Result<Vec<BasicBlock>> {
    let (line, text) = cursor.text_line(Stage::BlockTable)?;
    if text != TEXT_TABLE_HEADER {
        return Err(DrcovError::malformed(
            Stage::BlockTable,
            line,
            text,
            format!("expected '{TEXT_TABLE_HEADER}'"),
        ));
    }

    let mut blocks = Vec::with_capacity(count.min(MAX_PREALLOCATED_BLOCKS));
    for _ in 0..count {
        let (line, text) = cursor.text_line(Stage::BlockTable)?;
        let block = parse_text_entry(text).ok_or_else(|| {
            DrcovError::malformed(Stage::BlockTable, line, text, "invalid basic block entry")
        })?;
        trace!(mod_id = block.mod_id, offset = block.offset, size = block.size, "Decoded block");
        blocks.push(block);
    }

    Ok(blocks)
}

/// Parse the block table header and its records in whichever encoding is present.
pub fn parse_block_table(cursor: &mut LogCursor<'_>) -> Result<BlockTable> {
    let count = parse_table_header(cursor)?;
    let encoding = sniff_encoding(cursor);
    debug!(count, ?encoding, "Parsing basic block table");

    let blocks = match encoding {
        BlockEncoding::Binary => decode_binary(cursor, count)?,
        BlockEncoding::Text => decode_text(cursor, count)?,
    };

    Ok(BlockTable { encoding, blocks })
}
