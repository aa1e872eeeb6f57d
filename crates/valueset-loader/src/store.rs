//! Value set document store.
//!
//! The store is the single source of truth for loaded value sets. Two
//! implementations are provided:
//!
//! - [`MemoryStore`]: an in-process map, used by tests and dry runs.
//! - [`JsonFileStore`]: one JSON document per value set in a directory.
//!
//! Both iterate in OID order so that every operation processes value sets
//! deterministically.
//!
//! ```
//! use valueset_loader::{MemoryStore, ValueSetStore};
//! use valueset_types::{Concept, ValueSet};
//!
//! let mut store = MemoryStore::new();
//! store.insert(&ValueSet::with_concepts("1.2.3", vec![Concept::new("LOINC", "1234-5")]))?;
//!
//! assert!(store.contains("1.2.3")?);
//! assert!(store.insert(&ValueSet::new("1.2.3")).is_err());
//! # Ok::<(), valueset_loader::LoaderError>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;
use valueset_types::{Oid, ValueSet};

use crate::types::{LoaderError, LoaderResult};

/// Persistence seam for value set documents.
pub trait ValueSetStore {
    /// Returns every stored OID.
    fn oids(&self) -> LoaderResult<BTreeSet<Oid>>;

    /// Loads one value set.
    fn find(&self, oid: &str) -> LoaderResult<Option<ValueSet>>;

    /// Loads every value set, in OID order.
    fn all(&self) -> LoaderResult<Vec<ValueSet>>;

    /// Stores a new value set. Fails with `DuplicateOid` if the OID exists.
    fn insert(&mut self, value_set: &ValueSet) -> LoaderResult<()>;

    /// Stores a value set, replacing any document with the same OID.
    fn save(&mut self, value_set: &ValueSet) -> LoaderResult<()>;

    /// Returns true if a value set with this OID is stored.
    fn contains(&self, oid: &str) -> LoaderResult<bool> {
        Ok(self.find(oid)?.is_some())
    }

    /// Loads the stored value sets among `oids`, in request order.
    ///
    /// OIDs that are not stored are left out.
    fn find_many(&self, oids: &[Oid]) -> LoaderResult<Vec<ValueSet>> {
        let mut found = Vec::with_capacity(oids.len());
        for oid in oids {
            if let Some(value_set) = self.find(oid)? {
                found.push(value_set);
            }
        }
        Ok(found)
    }
}

/// In-memory store keyed by OID.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value_sets: BTreeMap<Oid, ValueSet>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored value sets.
    pub fn len(&self) -> usize {
        self.value_sets.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.value_sets.is_empty()
    }

    /// Borrows a stored value set.
    pub fn get(&self, oid: &str) -> Option<&ValueSet> {
        self.value_sets.get(oid)
    }
}

impl ValueSetStore for MemoryStore {
    fn oids(&self) -> LoaderResult<BTreeSet<Oid>> {
        Ok(self.value_sets.keys().cloned().collect())
    }

    fn find(&self, oid: &str) -> LoaderResult<Option<ValueSet>> {
        Ok(self.value_sets.get(oid).cloned())
    }

    fn all(&self) -> LoaderResult<Vec<ValueSet>> {
        Ok(self.value_sets.values().cloned().collect())
    }

    fn insert(&mut self, value_set: &ValueSet) -> LoaderResult<()> {
        if self.value_sets.contains_key(&value_set.oid) {
            return Err(LoaderError::DuplicateOid {
                oid: value_set.oid.clone(),
            });
        }
        self.value_sets
            .insert(value_set.oid.clone(), value_set.clone());
        Ok(())
    }

    fn save(&mut self, value_set: &ValueSet) -> LoaderResult<()> {
        self.value_sets
            .insert(value_set.oid.clone(), value_set.clone());
        Ok(())
    }

    fn contains(&self, oid: &str) -> LoaderResult<bool> {
        Ok(self.value_sets.contains_key(oid))
    }
}

const DOCUMENT_EXTENSION: &str = "json";

/// Directory of JSON documents, one `<oid>.json` per value set.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Opens the store, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(root: P) -> LoaderResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Directory holding the documents.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, oid: &str) -> LoaderResult<PathBuf> {
        if oid.is_empty()
            || oid == "."
            || oid == ".."
            || oid.contains(['/', '\\'])
            || oid.contains('\0')
        {
            return Err(LoaderError::InvalidOid {
                value: oid.to_string(),
            });
        }
        Ok(self.root.join(format!("{}.{}", oid, DOCUMENT_EXTENSION)))
    }

    fn read_document(path: &Path) -> LoaderResult<ValueSet> {
        let bytes = fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn write_document(&self, value_set: &ValueSet) -> LoaderResult<()> {
        let path = self.document_path(&value_set.oid)?;
        let json = serde_json::to_vec_pretty(value_set)?;
        fs::write(&path, json)?;
        trace!(oid = %value_set.oid, path = %path.display(), "wrote value set document");
        Ok(())
    }

    /// Document paths in file-name order.
    fn document_paths(&self) -> LoaderResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(DOCUMENT_EXTENSION)
            {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl ValueSetStore for JsonFileStore {
    fn oids(&self) -> LoaderResult<BTreeSet<Oid>> {
        Ok(self
            .document_paths()?
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect())
    }

    fn find(&self, oid: &str) -> LoaderResult<Option<ValueSet>> {
        let path = self.document_path(oid)?;
        if !path.exists() {
            return Ok(None);
        }
        Self::read_document(&path).map(Some)
    }

    fn all(&self) -> LoaderResult<Vec<ValueSet>> {
        let mut value_sets = self
            .document_paths()?
            .iter()
            .map(|p| Self::read_document(p))
            .collect::<LoaderResult<Vec<_>>>()?;
        value_sets.sort_by(|a, b| a.oid.cmp(&b.oid));
        Ok(value_sets)
    }

    fn insert(&mut self, value_set: &ValueSet) -> LoaderResult<()> {
        if self.document_path(&value_set.oid)?.exists() {
            return Err(LoaderError::DuplicateOid {
                oid: value_set.oid.clone(),
            });
        }
        self.write_document(value_set)
    }

    fn save(&mut self, value_set: &ValueSet) -> LoaderResult<()> {
        self.write_document(value_set)
    }

    fn contains(&self, oid: &str) -> LoaderResult<bool> {
        Ok(self.document_path(oid)?.exists())
    }
}
