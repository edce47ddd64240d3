//! Module name resolution.

use serde::{Deserialize, Serialize};

use crate::formats::drcov::types::Module;

/// How a module name query is matched against `Module::filename`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupMode {
    /// Case-insensitive substring match, retried without the extension.
    #[default]
    Fuzzy,
    /// Exact, case-sensitive filename equality.
    Strict,
}

impl From<bool> for LookupMode {
    /// `true` selects fuzzy matching.
    fn from(fuzzy: bool) -> Self {
        if fuzzy {
            LookupMode::Fuzzy
        } else {
            LookupMode::Strict
        }
    }
}

fn find_substring<'a>(modules: &'a [Module], needle: &str) -> Option<&'a Module> {
    let needle = needle.to_lowercase();
    modules
        .iter()
        .find(|m| m.filename.to_lowercase().contains(&needle))
}

/// Find the first module in table order whose filename matches `name`.
pub fn find_module<'a>(modules: &'a [Module], name: &str, mode: LookupMode) -> Option<&'a Module> {
    match mode {
        LookupMode::Strict => modules.iter().find(|m| m.filename == name),
        LookupMode::Fuzzy => find_substring(modules, name).or_else(|| {
            // "foo.dll" should still find "foo.exe" or "libfoo.so".
            let (stem, _) = name.split_once('.')?;
            find_substring(modules, stem)
        }),
    }
}
