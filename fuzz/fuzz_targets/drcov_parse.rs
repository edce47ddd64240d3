#![no_main]
use drcov_log::DrcovLog;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must produce a log or an error, never a panic.
    if let Ok(log) = DrcovLog::from_bytes(data) {
        assert_eq!(log.hit_counts().total_hits(), log.blocks().len());
    }
});
