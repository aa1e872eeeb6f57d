//! # valueset-loader
//!
//! Imports clinical value sets into a document store and curates their
//! white-list/black-list annotations.
//!
//! Every operation is a sequential *parse/fetch -> transform -> persist*
//! pipeline over a [`ValueSetStore`]:
//!
//! - [`load_from_spreadsheet`] + [`save_value_sets`]: spreadsheet import,
//!   inserting only OIDs that are not stored yet.
//! - [`vsac::load_from_remote`]: VSAC retrieval with a file-per-OID cache.
//! - [`apply_white_list`] / [`apply_black_list`]: flag matching concepts.
//! - [`clear_annotations`]: reset every flag.
//!
//! ```
//! use valueset_loader::{apply_black_list_entries, clear_annotations, MemoryStore, ValueSetStore};
//! use valueset_types::{BlackListEntry, Concept, ValueSet};
//!
//! let mut store = MemoryStore::new();
//! store.insert(&ValueSet::with_concepts("1.2.3", vec![Concept::new("SNOMEDCT", "99")]))?;
//!
//! let report = apply_black_list_entries(&mut store, &[BlackListEntry::new("SNOMEDCT", "99")])?;
//! assert_eq!(report.matched, 1);
//!
//! let cleared = clear_annotations(&mut store)?;
//! assert_eq!(cleared.black_cleared, 1);
//! # Ok::<(), valueset_loader::LoaderError>(())
//! ```

#![warn(missing_docs)]

mod annotate;
pub mod black_list;
pub mod hqmf;
mod loader;
pub mod parser;
pub mod spreadsheet;
mod store;
mod types;
pub mod vsac;

pub use annotate::{
    apply_black_list, apply_black_list_entries, apply_parsed_white_list, apply_white_list,
    clear_annotations,
};
pub use hqmf::value_set_oids_from_hqmf;
pub use loader::{load_from_spreadsheet, save_value_sets, value_set_models};
pub use spreadsheet::{parse_value_sets, ParsedValueSets};
pub use store::{JsonFileStore, MemoryStore, ValueSetStore};
pub use types::{
    BlackListReport, ClearReport, FetchReport, ListConflict, LoaderError, LoaderResult,
    SheetConfig, VsacConfig, VsacCredentials, WhiteListDiscrepancy, WhiteListReport,
    DEFAULT_API_URL, DEFAULT_TICKET_URL,
};

// Re-export valueset-types for convenience
pub use valueset_types;
