//! Black-list spreadsheet parser.
//!
//! A black list is a flat list of `code_system_name`/`code` rows with no
//! value set grouping.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use valueset_types::BlackListEntry;

use crate::parser::{SheetParser, SheetRecord, SheetRow};
use crate::types::{LoaderResult, SheetConfig};

const CODE_SYSTEM_NAME_COLUMN: &str = "code_system_name";
const CODE_COLUMN: &str = "code";

impl SheetRecord for BlackListEntry {
    const REQUIRED_COLUMNS: &'static [&'static str] = &[CODE_SYSTEM_NAME_COLUMN, CODE_COLUMN];

    fn from_row(row: &SheetRow<'_>) -> LoaderResult<Self> {
        Ok(BlackListEntry::new(
            row.get(CODE_SYSTEM_NAME_COLUMN),
            row.get(CODE_COLUMN),
        ))
    }
}

/// Parses a black-list file.
pub fn parse_black_list<P: AsRef<Path>>(
    path: P,
    config: SheetConfig,
) -> LoaderResult<Vec<BlackListEntry>> {
    SheetParser::<_, BlackListEntry>::from_path(path, config)?.parse_all()
}

/// Code sets keyed by code system name.
pub type CodeIndex = HashMap<String, HashSet<String>>;

/// Builds one code set per code system.
pub fn index_codes<'a, I>(pairs: I) -> CodeIndex
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut index = CodeIndex::new();
    for (code_system_name, code) in pairs {
        index
            .entry(code_system_name.to_string())
            .or_default()
            .insert(code.to_string());
    }
    index
}

/// Returns true if the index holds the code under the code system.
pub fn index_contains(index: &CodeIndex, code_system_name: &str, code: &str) -> bool {
    index
        .get(code_system_name)
        .is_some_and(|codes| codes.contains(code))
}
