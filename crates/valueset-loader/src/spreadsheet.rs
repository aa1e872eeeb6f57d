//! Value set spreadsheet parser.
//!
//! Parses value-set exports (also used for white lists) where every row is
//! one concept of one value set:
//!
//! | Column | Required | Description |
//! |--------|----------|-------------|
//! | Value Set OID | yes | OID of the owning value set |
//! | Value Set Name | no | Display name of the value set |
//! | Code System | yes | Code system name, or `GROUPING` |
//! | Code System Version | no | Code system version |
//! | Code | yes | The code, or a child OID for `GROUPING` rows |
//! | Descriptor | no | Display name of the concept |

use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use tracing::debug;
use valueset_types::{well_known, Concept, Oid, ValueSet};

use crate::parser::{SheetParser, SheetRecord, SheetRow};
use crate::types::{LoaderResult, SheetConfig};

const OID_COLUMN: &str = "Value Set OID";
const NAME_COLUMN: &str = "Value Set Name";
const CODE_SYSTEM_COLUMN: &str = "Code System";
const CODE_SYSTEM_VERSION_COLUMN: &str = "Code System Version";
const CODE_COLUMN: &str = "Code";
const DESCRIPTOR_COLUMN: &str = "Descriptor";

/// One row of a value-set spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueSetRow {
    /// Owning value set.
    pub oid: Oid,
    /// Value set display name.
    pub name: Option<String>,
    /// Code system name.
    pub code_system_name: String,
    /// Code system version.
    pub code_system_version: Option<String>,
    /// Code, or child OID on grouping rows.
    pub code: String,
    /// Concept display name.
    pub descriptor: Option<String>,
}

impl ValueSetRow {
    /// Returns true if the row references a child value set.
    pub fn is_grouping(&self) -> bool {
        well_known::is_grouping(&self.code_system_name)
    }

    fn into_concept(self) -> Concept {
        Concept {
            code: self.code,
            code_system_name: self.code_system_name,
            code_system_version: self.code_system_version,
            display_name: self.descriptor,
            ..Default::default()
        }
    }
}

impl SheetRecord for ValueSetRow {
    const REQUIRED_COLUMNS: &'static [&'static str] =
        &[OID_COLUMN, CODE_SYSTEM_COLUMN, CODE_COLUMN];

    fn from_row(row: &SheetRow<'_>) -> LoaderResult<Self> {
        Ok(Self {
            oid: row.get(OID_COLUMN).to_string(),
            name: row.optional(NAME_COLUMN),
            code_system_name: row.get(CODE_SYSTEM_COLUMN).to_string(),
            code_system_version: row.optional(CODE_SYSTEM_VERSION_COLUMN),
            code: row.get(CODE_COLUMN).to_string(),
            descriptor: row.optional(DESCRIPTOR_COLUMN),
        })
    }
}

/// Value sets parsed from a spreadsheet together with their child OIDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedValueSets {
    /// Value sets in order of first appearance. Grouping sets carry the
    /// flattened concepts of their children.
    pub value_sets: Vec<ValueSet>,
    /// OIDs referenced as children by grouping rows.
    pub child_oids: BTreeSet<Oid>,
}

impl ParsedValueSets {
    /// Returns true if `oid` is referenced as a child of another value set.
    pub fn is_child(&self, oid: &str) -> bool {
        self.child_oids.contains(oid)
    }
}

/// Parses a value-set spreadsheet file.
pub fn parse_value_sets<P: AsRef<Path>>(
    path: P,
    config: SheetConfig,
) -> LoaderResult<ParsedValueSets> {
    let parser = SheetParser::<_, ValueSetRow>::from_path(path, config)?;
    group_rows(parser.parse_all()?)
}

/// Parses value-set rows from any reader.
pub fn parse_value_sets_from_reader<R: Read>(
    reader: R,
    config: SheetConfig,
) -> LoaderResult<ParsedValueSets> {
    let parser = SheetParser::<_, ValueSetRow>::from_reader(reader, config)?;
    group_rows(parser.parse_all()?)
}

/// Groups rows into value sets, records child OIDs and flattens groupings.
fn group_rows(rows: Vec<ValueSetRow>) -> LoaderResult<ParsedValueSets> {
    let mut order: Vec<Oid> = Vec::new();
    let mut sets: HashMap<Oid, ValueSet> = HashMap::new();
    let mut children: HashMap<Oid, Vec<Oid>> = HashMap::new();
    let mut child_oids = BTreeSet::new();

    for row in rows {
        if row.oid.is_empty() {
            debug!(code = %row.code, "skipping row without value set OID");
            continue;
        }

        let set = sets.entry(row.oid.clone()).or_insert_with(|| {
            order.push(row.oid.clone());
            ValueSet::new(row.oid.clone())
        });
        if set.display_name.is_none() {
            set.display_name = row.name.clone();
        }

        if row.is_grouping() {
            child_oids.insert(row.code.clone());
            children.entry(row.oid).or_default().push(row.code);
        } else {
            set.concepts.push(row.into_concept());
        }
    }

    let flattened: HashMap<Oid, Vec<Concept>> = children
        .keys()
        .map(|oid| {
            let mut visited = HashSet::new();
            (oid.clone(), collect_concepts(oid, &sets, &children, &mut visited))
        })
        .collect();

    let value_sets = order
        .into_iter()
        .filter_map(|oid| {
            let mut set = sets.remove(&oid)?;
            if let Some(concepts) = flattened.get(&oid) {
                set.concepts = concepts.clone();
            }
            Some(set)
        })
        .collect();

    Ok(ParsedValueSets {
        value_sets,
        child_oids,
    })
}

/// Own concepts of `oid` followed by those of its children, depth first.
fn collect_concepts(
    oid: &str,
    sets: &HashMap<Oid, ValueSet>,
    children: &HashMap<Oid, Vec<Oid>>,
    visited: &mut HashSet<Oid>,
) -> Vec<Concept> {
    if !visited.insert(oid.to_string()) {
        return Vec::new();
    }

    let mut concepts = sets
        .get(oid)
        .map(|set| set.concepts.clone())
        .unwrap_or_default();

    if let Some(child_list) = children.get(oid) {
        for child in child_list {
            concepts.extend(collect_concepts(child, sets, children, visited));
        }
    }

    concepts
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Value Set OID,Value Set Name,Code System,Code System Version,Code,Descriptor\n";

    fn parse(body: &str) -> ParsedValueSets {
        let data = format!("{}{}", HEADER, body);
        parse_value_sets_from_reader(data.as_bytes(), SheetConfig::default()).unwrap()
    }

    #[test]
    fn test_rows_grouped_by_oid_in_order() {
        let parsed = parse(
            "1.2.3,Diabetes,SNOMEDCT,2020-03,44054006,Type 2 diabetes\n\
             1.2.4,HbA1c,LOINC,2.68,4548-4,Hemoglobin A1c\n\
             1.2.3,Diabetes,ICD10CM,2021,E11.9,Type 2 diabetes without complications\n",
        );

        assert_eq!(parsed.value_sets.len(), 2);
        assert_eq!(parsed.value_sets[0].oid, "1.2.3");
        assert_eq!(parsed.value_sets[0].display_name.as_deref(), Some("Diabetes"));
        assert_eq!(parsed.value_sets[0].concepts.len(), 2);
        assert!(parsed.value_sets[0].contains("ICD10CM", "E11.9"));
        assert_eq!(parsed.value_sets[1].oid, "1.2.4");
        assert_eq!(
            parsed.value_sets[1].concepts[0].code_system_version.as_deref(),
            Some("2.68")
        );
        assert!(parsed.child_oids.is_empty());
    }

    #[test]
    fn test_grouping_flattens_children() {
        let parsed = parse(
            "1.9,Group,GROUPING,,1.9.1,\n\
             1.9,Group,GROUPING,,1.9.2,\n\
             1.9.1,Child A,LOINC,,1234-5,\n\
             1.9.2,Child B,SNOMEDCT,,99,\n",
        );

        assert!(parsed.is_child("1.9.1"));
        assert!(parsed.is_child("1.9.2"));
        assert!(!parsed.is_child("1.9"));

        let group = &parsed.value_sets[0];
        assert_eq!(group.oid, "1.9");
        assert_eq!(group.concepts.len(), 2);
        assert!(group.contains("LOINC", "1234-5"));
        assert!(group.contains("SNOMEDCT", "99"));
        assert_eq!(parsed.value_sets.len(), 3);
    }

    #[test]
    fn test_grouping_cycle_terminates() {
        let parsed = parse(
            "1.1,A,GROUPING,,1.2,\n\
             1.2,B,GROUPING,,1.1,\n\
             1.2,B,LOINC,,1234-5,\n",
        );

        let a = &parsed.value_sets[0];
        assert_eq!(a.concepts.len(), 1);
        let b = &parsed.value_sets[1];
        assert_eq!(b.concepts.len(), 1);
    }

    #[test]
    fn test_rows_without_oid_skipped() {
        let parsed = parse(",,LOINC,,1234-5,\n1.2.3,,LOINC,,6789-0,\n");
        assert_eq!(parsed.value_sets.len(), 1);
        assert_eq!(parsed.value_sets[0].oid, "1.2.3");
    }

    #[test]
    fn test_required_columns_enforced() {
        let data = "Value Set OID,Code\n1.2.3,99\n";
        let result = parse_value_sets_from_reader(data.as_bytes(), SheetConfig::default());
        assert!(result.is_err());
    }
}
