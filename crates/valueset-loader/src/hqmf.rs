//! Value set references in HQMF measure documents.
//!
//! HQMF criteria reference value sets through a `valueSet` attribute, e.g.
//! `<code valueSet="2.16.840.1.113883.3.464.1003.101.12.1001"/>`. The OIDs
//! collected here are the input list for [`crate::vsac::load_from_remote`].

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;
use valueset_types::Oid;

use crate::types::{LoaderError, LoaderResult};
use crate::vsac::decode_utf8;
use crate::vsac::svs::attribute;

const VALUE_SET_ATTRIBUTE: &[u8] = b"valueSet";

/// Reads an HQMF file and returns the value set OIDs it references.
pub fn value_set_oids_from_hqmf<P: AsRef<Path>>(path: P) -> LoaderResult<Vec<Oid>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoaderError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let xml = decode_utf8(&fs::read(path)?);
    let oids = value_set_oids(&xml)?;
    debug!(count = oids.len(), path = %path.display(), "collected value set OIDs");
    Ok(oids)
}

/// Returns the distinct `valueSet` attribute values in document order.
pub fn value_set_oids(xml: &str) -> LoaderResult<Vec<Oid>> {
    let mut reader = Reader::from_str(xml);
    let mut seen = HashSet::new();
    let mut oids = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                if let Some(oid) = attribute(&e, VALUE_SET_ATTRIBUTE)? {
                    let oid = oid.trim().to_string();
                    if !oid.is_empty() && seen.insert(oid.clone()) {
                        oids.push(oid);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(oids)
}
