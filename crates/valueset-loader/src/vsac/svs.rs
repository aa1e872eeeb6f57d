//! IHE Sharing Value Sets (SVS) response parsing.
//!
//! VSAC answers value set requests with a `RetrieveValueSetResponse`
//! document in the `urn:ihe:iti:svs:2008` namespace:
//!
//! ```xml
//! <ns0:RetrieveValueSetResponse xmlns:ns0="urn:ihe:iti:svs:2008">
//!   <ns0:ValueSet ID="2.16.840.1.113883.3.464.1003.198.12.1013"
//!                 displayName="HbA1c Laboratory Test" version="20210220">
//!     <ns0:ConceptList>
//!       <ns0:Concept code="4548-4" codeSystem="2.16.840.1.113883.6.1"
//!                    codeSystemName="LOINC" codeSystemVersion="2.68"
//!                    displayName="Hemoglobin A1c/Hemoglobin.total in Blood"/>
//!     </ns0:ConceptList>
//!   </ns0:ValueSet>
//! </ns0:RetrieveValueSetResponse>
//! ```
//!
//! Only elements bound to the SVS namespace are considered, whatever prefix
//! (or default namespace) the payload uses.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;
use valueset_types::well_known::SVS_NAMESPACE;
use valueset_types::{Concept, ValueSet};

use crate::types::{LoaderError, LoaderResult};

const RESPONSE_ELEMENT: &[u8] = b"RetrieveValueSetResponse";
const VALUE_SET_ELEMENT: &[u8] = b"ValueSet";
const CONCEPT_LIST_ELEMENT: &[u8] = b"ConceptList";
const CONCEPT_ELEMENT: &[u8] = b"Concept";

/// Parses an SVS response and returns the value set with the requested OID.
///
/// Reading stops at the end of the matched `ValueSet`, so concepts of any
/// sibling value set are never collected.
///
/// # Errors
/// Returns `ValueSetNotFound` when the response has no SVS `ValueSet` child
/// of an SVS `RetrieveValueSetResponse` root, or when that element's `ID`
/// differs from `oid`. Malformed XML yields `Xml`.
pub fn parse_value_set(xml: &str, oid: &str) -> LoaderResult<ValueSet> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Local names of open ancestors; empty for elements outside SVS.
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut found: Option<ValueSet> = None;
    let mut value_set_open = false;

    loop {
        let (namespace, event) = reader.read_resolved_event()?;
        let in_svs = is_svs(&namespace);
        match event {
            Event::Start(e) => {
                let matched = handle_element(&e, in_svs, &path, oid, &mut found)?;
                path.push(svs_local_name(&e, in_svs));
                value_set_open |= matched;
            }
            Event::Empty(e) => {
                if handle_element(&e, in_svs, &path, oid, &mut found)? {
                    break;
                }
            }
            Event::End(_) => {
                path.pop();
                if value_set_open && path.len() == 1 {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    found.ok_or_else(|| LoaderError::ValueSetNotFound {
        oid: oid.to_string(),
    })
}

fn is_svs(namespace: &ResolveResult<'_>) -> bool {
    matches!(namespace, ResolveResult::Bound(Namespace(uri)) if *uri == SVS_NAMESPACE.as_bytes())
}

fn svs_local_name(element: &BytesStart<'_>, in_svs: bool) -> Vec<u8> {
    if in_svs {
        element.local_name().as_ref().to_vec()
    } else {
        Vec::new()
    }
}

/// Inspects one opening tag given the SVS local names of its ancestors.
///
/// Returns true when the tag is the matched `ValueSet`.
fn handle_element(
    element: &BytesStart<'_>,
    in_svs: bool,
    path: &[Vec<u8>],
    oid: &str,
    found: &mut Option<ValueSet>,
) -> LoaderResult<bool> {
    if !in_svs {
        return Ok(false);
    }
    let name = element.local_name();
    let name = name.as_ref();

    match path {
        [root] if root == RESPONSE_ELEMENT && name == VALUE_SET_ELEMENT => {
            let id = attribute(element, b"ID")?;
            if id.as_deref() != Some(oid) {
                return Err(LoaderError::ValueSetNotFound {
                    oid: oid.to_string(),
                });
            }
            *found = Some(ValueSet {
                oid: oid.to_string(),
                display_name: attribute(element, b"displayName")?,
                version: attribute(element, b"version")?,
                concepts: Vec::new(),
            });
            Ok(true)
        }
        [root, value_set, list]
            if root == RESPONSE_ELEMENT
                && value_set == VALUE_SET_ELEMENT
                && list == CONCEPT_LIST_ELEMENT
                && name == CONCEPT_ELEMENT =>
        {
            if let Some(value_set) = found.as_mut() {
                value_set.concepts.push(concept(element)?);
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn concept(element: &BytesStart<'_>) -> LoaderResult<Concept> {
    Ok(Concept {
        code: attribute(element, b"code")?.unwrap_or_default(),
        code_system_name: attribute(element, b"codeSystemName")?.unwrap_or_default(),
        code_system: attribute(element, b"codeSystem")?,
        code_system_version: attribute(element, b"codeSystemVersion")?,
        display_name: attribute(element, b"displayName")?,
        ..Default::default()
    })
}

/// Returns the unescaped value of the attribute with the given local name.
pub(crate) fn attribute(element: &BytesStart<'_>, name: &[u8]) -> LoaderResult<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() != name {
            continue;
        }
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape(&raw).map_err(|e| LoaderError::Xml(e.to_string()))?;
        return Ok(Some(value.into_owned()));
    }
    Ok(None)
}
