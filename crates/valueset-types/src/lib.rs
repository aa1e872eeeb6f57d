//! # valueset-types
//!
//! Type definitions for clinical quality-measure value sets.
//!
//! A value set is identified by an OID and owns an ordered list of concepts.
//! Each concept can be white-listed (approved) or black-listed (disallowed)
//! independently.
//!
//! ## Features
//!
//! - `serde` (default): Enables serialization/deserialization support via serde.
//!   The document store in `valueset-loader` relies on it.
//!
//! ## Usage
//!
//! ```rust
//! use valueset_types::{BlackListEntry, Concept, ValueSet};
//!
//! let mut value_set = ValueSet::with_concepts(
//!     "2.16.840.1.113883.3.464.1003.198.12.1019",
//!     vec![Concept::new("LOINC", "1234-5"), Concept::new("SNOMEDCT", "99")],
//! );
//!
//! let denied = BlackListEntry::new("SNOMEDCT", "99");
//! for concept in &mut value_set.concepts {
//!     if concept.matches(&denied.code_system_name, &denied.code) {
//!         concept.black_list = true;
//!     }
//! }
//!
//! assert_eq!(value_set.black_listed_count(), 1);
//! ```

#![warn(missing_docs)]

mod black_list;
mod concept;
mod oid;
mod value_set;
pub mod well_known;

// Re-export all public types at crate root
pub use black_list::BlackListEntry;
pub use concept::Concept;
pub use oid::{is_well_formed_oid, Oid};
pub use value_set::ValueSet;
