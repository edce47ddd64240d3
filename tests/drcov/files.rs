//! Parsing logs from disk.

use drcov_log::io::IOLimits;
use drcov_log::{CoverageParser, DrcovError, DrcovLog, DrcovParser, ErrorKind, ParserConfig};
use std::path::PathBuf;

use crate::common::test_utils::create_temp_file;
use crate::common::*;

fn sample() -> Vec<u8> {
    build_log(
        &module_table(
            3,
            V3_COLUMNS,
            &["0, 0, 0x400000, 0x401000, 0x400010, /opt/target"],
        ),
        &text_blocks(&[(0x10, 4, 0), (0x20, 4, 0)]),
    )
}

#[test]
fn test_parse_from_file() {
    let file = create_temp_file(&sample());
    let mut parser = DrcovParser::new(Some(file.path().to_path_buf()), None).unwrap();
    parser.parse().unwrap();
    assert_eq!(parser.get_modules()[0].filename, "target");
    assert_eq!(parser.get_basic_blocks().len(), 2);
}

#[test]
fn test_file_and_buffer_agree() {
    let data = sample();
    let file = create_temp_file(&data);
    let from_file = DrcovLog::from_path(file.path(), IOLimits::default()).unwrap();
    let from_buffer = DrcovLog::from_bytes(&data).unwrap();
    assert_eq!(from_file, from_buffer);
}

#[test]
fn test_missing_file_is_io_error() {
    let mut parser = DrcovParser::from_path(PathBuf::from("/nonexistent/drcov.proc.log"));
    let err = parser.parse().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!parser.is_parsed());
}

#[test]
fn test_file_size_limit() {
    let file = create_temp_file(&sample());
    let mut config = ParserConfig::default();
    config.io.max_file_size = 16;
    let mut parser = DrcovParser::from_path(file.path()).with_config(config);
    let err = parser.parse().unwrap_err();
    assert!(matches!(err, DrcovError::Io(_)));
}

#[test]
fn test_empty_file() {
    let file = create_temp_file(b"");
    let err = DrcovLog::from_path(file.path(), IOLimits::default()).unwrap_err();
    assert!(matches!(err, DrcovError::UnexpectedEof { line: 0, .. }));
}

#[test]
fn test_construction_errors() {
    let err = DrcovParser::new(None, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Construction);
    let err = DrcovParser::new(Some(PathBuf::from("x")), Some(Vec::new())).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Construction);
}
