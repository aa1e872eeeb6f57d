//! Value set type.
//!
//! A value set is an OID-keyed, ordered collection of concepts.

use crate::{Concept, Oid};

/// A named collection of coded terms used to define clinical criteria.
///
/// # Examples
///
/// ```
/// use valueset_types::{Concept, ValueSet};
///
/// let value_set = ValueSet::with_concepts(
///     "2.16.840.1.113883.3.464.1003.101.12.1001",
///     vec![Concept::new("CPT", "99201"), Concept::new("CPT", "99202")],
/// );
///
/// assert_eq!(value_set.concepts.len(), 2);
/// assert!(value_set.contains("CPT", "99202"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueSet {
    /// Unique identifier of the value set.
    pub oid: Oid,
    /// Human-readable name.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub display_name: Option<String>,
    /// Version or release label reported by the source.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub version: Option<String>,
    /// Member concepts, in source order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub concepts: Vec<Concept>,
}

impl ValueSet {
    /// Creates an empty value set.
    pub fn new(oid: impl Into<Oid>) -> Self {
        Self {
            oid: oid.into(),
            ..Default::default()
        }
    }

    /// Creates a value set holding the given concepts.
    pub fn with_concepts(oid: impl Into<Oid>, concepts: Vec<Concept>) -> Self {
        Self {
            oid: oid.into(),
            concepts,
            ..Default::default()
        }
    }

    /// Returns true if any concept matches the code system and code.
    pub fn contains(&self, code_system_name: &str, code: &str) -> bool {
        self.concepts
            .iter()
            .any(|c| c.matches(code_system_name, code))
    }

    /// Number of white-listed concepts.
    pub fn white_listed_count(&self) -> usize {
        self.concepts.iter().filter(|c| c.white_list).count()
    }

    /// Number of black-listed concepts.
    pub fn black_listed_count(&self) -> usize {
        self.concepts.iter().filter(|c| c.black_list).count()
    }
}
