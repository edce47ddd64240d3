//! Parser for DynamoRIO drcov coverage logs.
//!
//! ```no_run
//! use drcov_log::formats::drcov::{DrcovLog, LookupMode};
//! use drcov_log::io::IOLimits;
//!
//! let log = DrcovLog::from_path("drcov.target.exe.log", IOLimits::default())?;
//! for module in log.modules() {
//!     let blocks = log.blocks_by_module(&module.filename, LookupMode::Strict)?;
//!     println!("{module}: {} blocks", blocks.len());
//! }
//! # Ok::<(), drcov_log::error::DrcovError>(())
//! ```

/// Parser configuration
pub mod config;
/// Error types
pub mod error;
/// Coverage log formats
pub mod formats;
/// Bounded file access
pub mod io;
/// Tracing setup
pub mod logging;

pub use config::ParserConfig;
pub use error::{DrcovError, ErrorKind, Result, Stage};
pub use formats::drcov::{BasicBlock, DrcovLog, DrcovParser, HitCountMap, LookupMode, Module};
pub use formats::CoverageParser;
