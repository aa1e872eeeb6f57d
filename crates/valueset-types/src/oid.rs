//! Value set object identifier (OID) type.
//!
//! Value sets are keyed by dotted-decimal OIDs such as
//! `2.16.840.1.113883.3.464.1003.101.12.1001`.

/// A value set object identifier.
///
/// # Examples
///
/// ```
/// use valueset_types::Oid;
///
/// let office_visit: Oid = "2.16.840.1.113883.3.464.1003.101.12.1001".to_string();
/// assert!(valueset_types::is_well_formed_oid(&office_visit));
/// ```
pub type Oid = String;

/// Returns true if `value` looks like a dotted-decimal OID.
///
/// Only the shape is checked (non-empty numeric arcs separated by dots).
pub fn is_well_formed_oid(value: &str) -> bool {
    !value.is_empty()
        && value
            .split('.')
            .all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit()))
}
