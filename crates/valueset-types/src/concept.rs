//! Value set concept type.
//!
//! This module provides the `Concept` struct representing a single coded
//! term inside a value set, together with its white-list/black-list flags.

/// A coded term belonging to a value set.
///
/// The pair `(code_system_name, code)` is what white lists and black lists
/// match against.
///
/// # Examples
///
/// ```
/// use valueset_types::Concept;
///
/// let mut concept = Concept::new("LOINC", "1234-5");
/// assert!(!concept.is_annotated());
///
/// concept.white_list = true;
/// concept.black_list = true;
/// assert!(concept.is_conflicted());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Concept {
    /// The code within its code system.
    pub code: String,
    /// Name of the code system (e.g. "LOINC", "SNOMEDCT").
    pub code_system_name: String,
    /// OID of the code system, when the source provides it.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub code_system: Option<String>,
    /// Version of the code system, when the source provides it.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub code_system_version: Option<String>,
    /// Human-readable descriptor.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub display_name: Option<String>,
    /// Explicitly approved for use in measure logic.
    #[cfg_attr(feature = "serde", serde(default))]
    pub white_list: bool,
    /// Explicitly disallowed for use in measure logic.
    #[cfg_attr(feature = "serde", serde(default))]
    pub black_list: bool,
}

impl Concept {
    /// Creates an unflagged concept with only a code system name and code.
    pub fn new(code_system_name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            code_system_name: code_system_name.into(),
            ..Default::default()
        }
    }

    /// Returns true if this concept matches the given code system and code.
    pub fn matches(&self, code_system_name: &str, code: &str) -> bool {
        self.code_system_name == code_system_name && self.code == code
    }

    /// Returns true if either annotation flag is set.
    pub fn is_annotated(&self) -> bool {
        self.white_list || self.black_list
    }

    /// Returns true if the concept is both white-listed and black-listed.
    pub fn is_conflicted(&self) -> bool {
        self.white_list && self.black_list
    }
}
