//! Name-based module queries through the public API.

use drcov_log::{CoverageParser, DrcovError, DrcovParser, ErrorKind, LookupMode, ParserConfig};

use crate::common::*;

fn parser() -> DrcovParser {
    let data = build_log(
        &module_table(
            2,
            V2_WINDOWS_COLUMNS,
            &[
                "0, 0x400000, 0x410000, 0x401000, 0x1, 0x2, C:\\bin\\MyBinary.exe",
                "1, 0x7ff000000000, 0x7ff000100000, 0x7ff000001000, 0x3, 0x4, C:\\Windows\\System32\\ntdll.dll",
            ],
        ),
        &binary_blocks(&[(0x100, 4, 0), (0x200, 8, 1), (0x100, 4, 0), (0x300, 2, 0)]),
    );
    let mut parser = DrcovParser::from_bytes(data);
    parser.parse().unwrap();
    parser
}

#[test]
fn test_fuzzy_lookup() {
    let parser = parser();
    assert_eq!(parser.get_module("mybinary", true).map(|m| m.id), Some(0));
    assert_eq!(parser.get_module("mybinary.dll", true).map(|m| m.id), Some(0));
    assert_eq!(parser.get_module("NTDLL.DLL", true).map(|m| m.id), Some(1));
    assert!(parser.get_module("kernel32.dll", true).is_none());
}

#[test]
fn test_strict_lookup() {
    let parser = parser();
    assert_eq!(parser.get_module("MyBinary.exe", false).map(|m| m.id), Some(0));
    assert!(parser.get_module("mybinary.exe", false).is_none());
    assert!(parser.get_module("mybinary.exe", true).is_some());
}

#[test]
fn test_blocks_by_module() {
    let parser = parser();
    let blocks = parser.get_blocks_by_module("mybinary").unwrap();
    assert_eq!(
        blocks.iter().map(|bb| bb.offset).collect::<Vec<_>>(),
        vec![0x100, 0x100, 0x300]
    );
    assert_eq!(parser.get_blocks_by_module("ntdll").unwrap().len(), 1);
}

#[test]
fn test_blocks_by_unknown_module_fail() {
    let parser = parser();
    let err = parser.get_blocks_by_module("kernel32").unwrap_err();
    assert!(matches!(err, DrcovError::ModuleNotFound(ref name) if name == "kernel32"));
    assert_eq!(err.kind(), ErrorKind::Lookup);
    assert_eq!(err.to_string(), "No coverage for module 'kernel32' in log");
}

#[test]
fn test_hit_counts_by_module() {
    let parser = parser();
    assert_eq!(
        parser.hit_counts_by_module("MyBinary").unwrap(),
        vec![(0x100, 2), (0x300, 1)]
    );
    assert!(parser.hit_counts_by_module("missing").is_err());
}

#[test]
fn test_strict_config_applies_to_block_queries() {
    let mut config = ParserConfig::default();
    config.lookup = LookupMode::Strict;
    let mut strict = DrcovParser::from_bytes(build_log(
        &module_table(2, V2_COLUMNS, &["0, 0x400000, 0x410000, 0x401000, MyBinary.exe"]),
        &binary_blocks(&[(0x100, 4, 0)]),
    ))
    .with_config(config);
    strict.parse().unwrap();

    assert!(strict.get_blocks_by_module("mybinary").is_err());
    assert_eq!(strict.get_blocks_by_module("MyBinary.exe").unwrap().len(), 1);
}
