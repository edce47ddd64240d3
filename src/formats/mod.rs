//! Coverage log formats.
//!
//! Each format parser implements [`CoverageParser`] so consumers can query
//! modules and blocks without knowing which tool produced the log.

pub mod drcov;

use crate::error::Result;

/// Capability interface shared by coverage format parsers.
///
/// `parse` must run before the queries return anything; until then the list
/// queries are empty and `get_module` finds nothing.
pub trait CoverageParser {
    type Module;
    type Block;

    /// Parse the input. Calling it again after success does nothing.
    fn parse(&mut self) -> Result<()>;

    fn is_parsed(&self) -> bool;

    fn get_modules(&self) -> &[Self::Module];

    fn get_basic_blocks(&self) -> &[Self::Block];

    /// Blocks belonging to the module `name` resolves to.
    ///
    /// # Errors
    ///
    /// Fails when no module matches `name`, rather than returning an empty list.
    fn get_blocks_by_module(&self, name: &str) -> Result<Vec<Self::Block>>;

    fn get_module(&self, name: &str, fuzzy: bool) -> Option<&Self::Module>;
}
