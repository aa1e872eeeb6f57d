//! Spreadsheet import and idempotent persistence.

use std::path::Path;

use tracing::{debug, info};
use valueset_types::{Oid, ValueSet};

use crate::spreadsheet::parse_value_sets;
use crate::store::ValueSetStore;
use crate::types::{LoaderResult, SheetConfig};

/// Inserts the value sets whose OID is not stored yet.
///
/// Stored OIDs are read once per call. Records with an already-stored OID,
/// or repeated within `value_sets`, are skipped without touching the stored
/// document. Returns the number of inserted value sets.
pub fn save_value_sets<S: ValueSetStore>(
    store: &mut S,
    value_sets: &[ValueSet],
) -> LoaderResult<usize> {
    let mut existing = store.oids()?;
    let mut inserted = 0;

    for value_set in value_sets {
        if existing.contains(&value_set.oid) {
            debug!(oid = %value_set.oid, "value set already stored");
            continue;
        }
        store.insert(value_set)?;
        existing.insert(value_set.oid.clone());
        inserted += 1;
    }

    info!(
        "saved {} new value sets ({} already present)",
        inserted,
        value_sets.len() - inserted
    );
    Ok(inserted)
}

/// Parses a value-set spreadsheet and returns its records unmodified.
pub fn load_from_spreadsheet<P: AsRef<Path>>(
    path: P,
    config: SheetConfig,
) -> LoaderResult<Vec<ValueSet>> {
    let path = path.as_ref();
    let parsed = parse_value_sets(path, config)?;
    info!(
        "parsed {} value sets from {}",
        parsed.value_sets.len(),
        path.display()
    );
    Ok(parsed.value_sets)
}

/// Returns the stored value sets for `oids`, skipping unknown OIDs.
pub fn value_set_models<S: ValueSetStore>(store: &S, oids: &[Oid]) -> LoaderResult<Vec<ValueSet>> {
    store.find_many(oids)
}
