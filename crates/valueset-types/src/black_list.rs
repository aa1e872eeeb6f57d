//! Black-list entry type.

/// A globally disallowed `(code_system_name, code)` pair.
///
/// Black lists are not grouped by value set: an entry applies to every
/// stored concept with the same code system name and code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlackListEntry {
    /// Name of the code system.
    pub code_system_name: String,
    /// The disallowed code.
    pub code: String,
}

impl BlackListEntry {
    /// Creates a new entry.
    pub fn new(code_system_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            code_system_name: code_system_name.into(),
            code: code.into(),
        }
    }
}
