//! Well-known names used by value set sources.
//!
//! # Examples
//!
//! ```
//! use valueset_types::well_known;
//!
//! assert_eq!(well_known::SVS_NAMESPACE, "urn:ihe:iti:svs:2008");
//! assert!(well_known::is_grouping("grouping"));
//! ```

/// XML namespace of IHE Sharing Value Sets responses.
pub const SVS_NAMESPACE: &str = "urn:ihe:iti:svs:2008";

/// Code system name marking a row whose code is a child value set OID.
pub const GROUPING_CODE_SYSTEM: &str = "GROUPING";

/// Service name VSAC service tickets are issued for.
pub const UMLS_SERVICE: &str = "http://umlsks.nlm.nih.gov";

/// Returns true if the code system name denotes a grouping row.
pub fn is_grouping(code_system_name: &str) -> bool {
    code_system_name.trim().eq_ignore_ascii_case(GROUPING_CODE_SYSTEM)
}
