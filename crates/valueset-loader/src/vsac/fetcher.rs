//! Cached value set retrieval into the store.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use valueset_types::{is_well_formed_oid, Oid};

use super::client::{decode_utf8, ValueSetSource};
use super::svs::parse_value_set;
use crate::store::ValueSetStore;
use crate::types::{FetchReport, LoaderError, LoaderResult};

/// Path of the cached response for `oid`. Only dotted-decimal OIDs are accepted.
pub fn cache_path(cache_dir: &Path, oid: &str) -> LoaderResult<PathBuf> {
    if !is_well_formed_oid(oid) {
        return Err(LoaderError::InvalidOid {
            value: oid.to_string(),
        });
    }
    Ok(cache_dir.join(format!("{}.xml", oid)))
}

/// Fetches and stores every OID not already in the store.
///
/// OIDs are processed in order. A cached `<oid>.xml` in `cache_dir` is used
/// when present; otherwise the payload is retrieved from `source` and written
/// to the cache before it is parsed. The first failure aborts the run; value
/// sets inserted before it stay stored.
pub fn load_from_remote<V, S>(
    oids: &[Oid],
    source: &mut V,
    store: &mut S,
    cache_dir: &Path,
) -> LoaderResult<FetchReport>
where
    V: ValueSetSource,
    S: ValueSetStore,
{
    fs::create_dir_all(cache_dir)?;

    let mut existing = store.oids()?;
    let mut report = FetchReport::default();

    for (index, oid) in oids.iter().enumerate() {
        if existing.contains(oid) {
            debug!(%oid, "value set already stored");
            report.skipped += 1;
            continue;
        }

        let cached = cache_path(cache_dir, oid)?;
        let payload = if cached.exists() {
            debug!(%oid, path = %cached.display(), "reading cached response");
            report.from_cache += 1;
            decode_utf8(&fs::read(&cached)?)
        } else {
            info!("fetching value set {} ({}/{})", oid, index + 1, oids.len());
            let payload = source.retrieve_value_set(oid)?;
            fs::write(&cached, payload.as_bytes())?;
            report.fetched += 1;
            payload
        };

        let value_set = parse_value_set(&payload, oid)?;
        store.insert(&value_set)?;
        existing.insert(oid.clone());
    }

    info!(
        "loaded {} value sets from VSAC ({} fetched, {} cached, {} already present)",
        report.loaded(),
        report.fetched,
        report.from_cache,
        report.skipped
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::vsac::MockValueSetSource;
    use valueset_types::{Concept, ValueSet};

    fn payload(oid: &str, code: &str) -> String {
        format!(
            r#"<ns0:RetrieveValueSetResponse xmlns:ns0="urn:ihe:iti:svs:2008"><ns0:ValueSet ID="{oid}" displayName="Set {oid}"><ns0:ConceptList><ns0:Concept code="{code}" codeSystemName="LOINC"/></ns0:ConceptList></ns0:ValueSet></ns0:RetrieveValueSetResponse>"#
        )
    }

    fn oids(values: &[&str]) -> Vec<Oid> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_fetch_populates_store_and_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("code_sets");
        let mut source = MockValueSetSource::new();
        source.add_payload("1.1", payload("1.1", "1234-5"));
        source.add_payload("2.2", payload("2.2", "6789-0"));
        let mut store = MemoryStore::new();

        let report =
            load_from_remote(&oids(&["1.1", "2.2"]), &mut source, &mut store, &cache_dir).unwrap();

        assert_eq!(report.fetched, 2);
        assert_eq!(report.from_cache, 0);
        assert_eq!(store.len(), 2);
        assert!(store.get("2.2").unwrap().contains("LOINC", "6789-0"));
        assert_eq!(
            std::fs::read_to_string(cache_dir.join("1.1.xml")).unwrap(),
            payload("1.1", "1234-5")
        );
    }

    #[test]
    fn test_second_run_reads_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = MockValueSetSource::new();
        source.add_payload("1.1", payload("1.1", "1234-5"));

        let mut first_store = MemoryStore::new();
        load_from_remote(&oids(&["1.1"]), &mut source, &mut first_store, dir.path()).unwrap();

        let mut second_store = MemoryStore::new();
        let report =
            load_from_remote(&oids(&["1.1"]), &mut source, &mut second_store, dir.path()).unwrap();

        assert_eq!(source.requests().len(), 1);
        assert_eq!(report.from_cache, 1);
        assert_eq!(report.fetched, 0);
        assert_eq!(first_store.get("1.1"), second_store.get("1.1"));
    }

    #[test]
    fn test_stored_oids_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = MockValueSetSource::new();
        let mut store = MemoryStore::new();
        let original = ValueSet::with_concepts("1.1", vec![Concept::new("CPT", "99201")]);
        store.insert(&original).unwrap();

        let report = load_from_remote(&oids(&["1.1"]), &mut source, &mut store, dir.path()).unwrap();

        assert_eq!(report.skipped, 1);
        assert!(source.requests().is_empty());
        assert_eq!(store.get("1.1"), Some(&original));
        assert!(!dir.path().join("1.1.xml").exists());
    }

    #[test]
    fn test_mismatched_id_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = MockValueSetSource::new();
        source.add_payload("1.1", payload("1.1", "1"));
        source.add_payload("2.2", payload("9.9", "2"));
        source.add_payload("3.3", payload("3.3", "3"));
        let mut store = MemoryStore::new();

        let result =
            load_from_remote(&oids(&["1.1", "2.2", "3.3"]), &mut source, &mut store, dir.path());

        match result {
            Err(LoaderError::ValueSetNotFound { oid }) => assert_eq!(oid, "2.2"),
            other => panic!("expected ValueSetNotFound, got {:?}", other),
        }
        assert_eq!(source.requests(), &oids(&["1.1", "2.2"])[..]);
        assert!(store.get("1.1").is_some());
        assert!(store.get("2.2").is_none());
        assert!(store.get("3.3").is_none());
    }

    #[test]
    fn test_fetch_failure_aborts_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = MockValueSetSource::new();
        source.add_payload("2.2", payload("2.2", "2"));
        let mut store = MemoryStore::new();

        let result = load_from_remote(&oids(&["1.1", "2.2"]), &mut source, &mut store, dir.path());

        assert!(matches!(result, Err(LoaderError::HttpStatus { status: 404, .. })));
        assert!(store.is_empty());
        assert!(!dir.path().join("1.1.xml").exists());
    }

    #[test]
    fn test_cache_path_requires_dotted_oid() {
        let dir = Path::new("/tmp/cache");
        assert_eq!(cache_path(dir, "1.2.3").unwrap(), dir.join("1.2.3.xml"));
        for bad in ["", "..", "../1.2.3", "1.2/3", "1.2.x", "1..2"] {
            assert!(
                matches!(cache_path(dir, bad), Err(LoaderError::InvalidOid { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_malformed_oid_aborts_before_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = MockValueSetSource::new();
        let mut store = MemoryStore::new();

        let result = load_from_remote(&oids(&["../etc"]), &mut source, &mut store, dir.path());

        assert!(matches!(result, Err(LoaderError::InvalidOid { .. })));
        assert!(source.requests().is_empty());
    }
}
