//! Checked-in sample logs.

use drcov_log::formats::drcov::{BlockEncoding, ModuleTableVersion};
use drcov_log::io::IOLimits;
use drcov_log::{DrcovLog, LookupMode};

use crate::common::sample_file_path;
use crate::common::test_data::*;

#[test]
fn test_linux_v4_binary_sample() {
    let log = DrcovLog::from_path(sample_file_path(SAMPLE_V4_BINARY), IOLimits::default()).unwrap();
    assert_eq!(log.flavor(), "drcov-64");
    assert_eq!(log.module_table_version(), ModuleTableVersion::V4);
    assert_eq!(log.block_encoding(), BlockEncoding::Binary);
    assert_eq!(log.modules().len(), 3);
    assert_eq!(log.blocks().len(), 6);

    // Modules 0 and 1 are two mappings of the same image.
    let modules = log.modules();
    assert_eq!(modules[0].filename, modules[1].filename);
    assert_eq!(modules[1].offset, Some(0x2000));
    assert_eq!(log.blocks_by_module_id(0).len(), 4);
    assert_eq!(
        log.blocks_by_module_id(1)
            .iter()
            .map(|bb| (bb.offset, bb.size))
            .collect::<Vec<_>>(),
        vec![(0x2000, 16)]
    );
    assert_eq!(modules[2].filename, "libc.so.6");
    assert_eq!(modules[2].size, 0x195000);

    assert_eq!(log.hit_counts().count(0, 0x1060), 2);
    assert_eq!(log.hit_counts().count(0, 0x1080), 2);
    assert_eq!(
        log.hit_counts_by_module("libc", LookupMode::Fuzzy).unwrap(),
        vec![(0x29dc0, 1)]
    );
}

#[test]
fn test_windows_v2_text_sample() {
    let log = DrcovLog::from_path(sample_file_path(SAMPLE_V2_WINDOWS_TEXT), IOLimits::default())
        .unwrap();
    assert_eq!(log.module_table_version(), ModuleTableVersion::V2);
    assert_eq!(log.block_encoding(), BlockEncoding::Text);
    assert_eq!(log.columns().len(), 7);

    let hello = log.module("hello.exe", LookupMode::Strict).unwrap();
    assert_eq!(hello.checksum, Some(0x00031a7b));
    assert_eq!(hello.timestamp, Some(0x5c9b2e01));
    assert_eq!(hello.size, 0x27000);

    let ntdll = log.module("ntdll.dll", LookupMode::Strict).unwrap();
    assert_eq!(ntdll.path, "C:\\Windows\\SYSTEM32\\ntdll.dll");

    assert_eq!(log.blocks().len(), 4);
    assert_eq!(log.hit_counts().count(0, 0xd3f0), 2);
    assert_eq!(
        log.blocks_by_module("ntdll", LookupMode::Fuzzy).unwrap()[0].offset,
        0x9f1a0
    );
}
