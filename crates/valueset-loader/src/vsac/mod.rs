//! VSAC (Value Set Authority Center) import.
//!
//! [`VsacClient`] talks to the terminology service, [`svs`] parses its
//! responses and [`load_from_remote`] ties both to the store with a
//! file-per-OID response cache.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use valueset_loader::vsac::{load_from_remote, VsacClient};
//! use valueset_loader::{JsonFileStore, VsacConfig, VsacCredentials};
//!
//! let mut client = VsacClient::new(
//!     VsacConfig::default(),
//!     VsacCredentials::new("username", "password"),
//! )?;
//! let mut store = JsonFileStore::open("db/value_sets")?;
//! let oids = vec!["2.16.840.1.113883.3.464.1003.101.12.1001".to_string()];
//!
//! let report = load_from_remote(&oids, &mut client, &mut store, Path::new("db/code_sets"))?;
//! println!("loaded {}", report.loaded());
//! # Ok::<(), valueset_loader::LoaderError>(())
//! ```

mod client;
mod fetcher;
pub mod svs;

pub use client::{decode_utf8, MockValueSetSource, ValueSetSource, VsacClient};
pub use fetcher::{cache_path, load_from_remote};
