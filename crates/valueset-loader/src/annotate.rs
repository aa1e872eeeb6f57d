//! White-list, black-list and reset operations over stored value sets.
//!
//! All three walk stored concepts and flip the `white_list`/`black_list`
//! flags by `(code_system_name, code)` membership. The flags are independent:
//! a concept may end up with both set, which is reported but kept.

use std::path::Path;

use tracing::{info, warn};

use crate::black_list::{index_codes, index_contains, parse_black_list};
use crate::spreadsheet::{parse_value_sets, ParsedValueSets};
use crate::store::ValueSetStore;
use crate::types::{
    BlackListReport, ClearReport, ListConflict, LoaderResult, SheetConfig, WhiteListDiscrepancy,
    WhiteListReport,
};
use valueset_types::BlackListEntry;

/// Marks stored concepts listed in a white-list spreadsheet.
pub fn apply_white_list<S: ValueSetStore, P: AsRef<Path>>(
    store: &mut S,
    path: P,
    config: SheetConfig,
) -> LoaderResult<WhiteListReport> {
    let parsed = parse_value_sets(path, config)?;
    apply_parsed_white_list(store, &parsed)
}

/// Marks stored concepts listed in already-parsed white-list value sets.
pub fn apply_parsed_white_list<S: ValueSetStore>(
    store: &mut S,
    parsed: &ParsedValueSets,
) -> LoaderResult<WhiteListReport> {
    let mut report = WhiteListReport::default();

    for listed in &parsed.value_sets {
        let Some(mut existing) = store.find(&listed.oid)? else {
            if !parsed.is_child(&listed.oid) {
                warn!(oid = %listed.oid, "white list value set missing from store");
                report.missing.push(listed.oid.clone());
            }
            continue;
        };

        let codes = index_codes(
            listed
                .concepts
                .iter()
                .map(|c| (c.code_system_name.as_str(), c.code.as_str())),
        );

        let mut matched = 0;
        for concept in &mut existing.concepts {
            if index_contains(&codes, &concept.code_system_name, &concept.code) {
                concept.white_list = true;
                matched += 1;
            }
        }

        let declared = listed.concepts.len();
        if matched != declared {
            warn!(
                oid = %listed.oid,
                declared,
                matched,
                "white list codes missing from stored value set"
            );
            report.discrepancies.push(WhiteListDiscrepancy {
                oid: listed.oid.clone(),
                declared,
                matched,
            });
        }
        report.matched += matched;

        store.save(&existing)?;
    }

    info!("loaded: {} white list entries", report.matched);
    Ok(report)
}

/// Marks stored concepts listed in a black-list spreadsheet.
pub fn apply_black_list<S: ValueSetStore, P: AsRef<Path>>(
    store: &mut S,
    path: P,
    config: SheetConfig,
) -> LoaderResult<BlackListReport> {
    let entries = parse_black_list(path, config)?;
    apply_black_list_entries(store, &entries)
}

/// Marks stored concepts matching any of `entries`, across every value set.
pub fn apply_black_list_entries<S: ValueSetStore>(
    store: &mut S,
    entries: &[BlackListEntry],
) -> LoaderResult<BlackListReport> {
    let denied = index_codes(
        entries
            .iter()
            .map(|e| (e.code_system_name.as_str(), e.code.as_str())),
    );
    let mut report = BlackListReport::default();

    for mut value_set in store.all()? {
        let mut changed = false;
        for concept in &mut value_set.concepts {
            if !index_contains(&denied, &concept.code_system_name, &concept.code) {
                continue;
            }
            changed = true;
            concept.black_list = true;
            report.matched += 1;
            if concept.is_conflicted() {
                warn!(
                    oid = %value_set.oid,
                    code_system_name = %concept.code_system_name,
                    code = %concept.code,
                    "white list code black listed"
                );
                report.conflicts.push(ListConflict {
                    oid: value_set.oid.clone(),
                    code_system_name: concept.code_system_name.clone(),
                    code: concept.code.clone(),
                });
            }
        }
        if changed {
            store.save(&value_set)?;
        }
    }

    info!("loaded: {} black list entries", report.matched);
    Ok(report)
}

/// Clears both flags on every stored concept.
pub fn clear_annotations<S: ValueSetStore>(store: &mut S) -> LoaderResult<ClearReport> {
    let mut report = ClearReport::default();

    for mut value_set in store.all()? {
        let mut changed = false;
        for concept in value_set.concepts.iter_mut().filter(|c| c.is_annotated()) {
            if concept.white_list {
                report.white_cleared += 1;
            }
            if concept.black_list {
                report.black_cleared += 1;
            }
            concept.white_list = false;
            concept.black_list = false;
            changed = true;
        }
        if changed {
            store.save(&value_set)?;
        }
    }

    info!(
        "deleted {} white / {} black list entries",
        report.white_cleared, report.black_cleared
    );
    Ok(report)
}
