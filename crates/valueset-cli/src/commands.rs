//! Subcommand execution against the configured store.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};
use valueset_loader::vsac::{self, ValueSetSource, VsacClient};
use valueset_loader::{
    apply_black_list, apply_white_list, clear_annotations, load_from_spreadsheet,
    save_value_sets, value_set_oids_from_hqmf, JsonFileStore, LoaderResult, ValueSetStore,
    VsacCredentials,
};
use valueset_types::Oid;

use crate::cli::{Cli, Command, VsacArgs};
use crate::config::AppConfig;

/// Runs the parsed command line to completion.
pub fn run(cli: Cli) -> LoaderResult<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path.clone());
    let mut store = JsonFileStore::open(&store_path)?;
    info!("using value set store at {}", store_path.display());

    execute(cli.command, &config, &mut store)
}

fn execute<S: ValueSetStore>(
    command: Command,
    config: &AppConfig,
    store: &mut S,
) -> LoaderResult<()> {
    match command {
        Command::Spreadsheet { path, sheet } => {
            let value_sets = load_from_spreadsheet(&path, sheet.sheet_config())?;
            save_value_sets(store, &value_sets)?;
        }
        Command::Vsac(args) => {
            let mut vsac_config = config.vsac_config(args.proxy.clone());
            vsac_config.timeout = args.timeout_secs.map(Duration::from_secs);
            let credentials = VsacCredentials::new(args.username.as_str(), args.password.as_str());
            let mut client = VsacClient::new(vsac_config, credentials)?;
            fetch_remote(&args, config, &mut client, store)?;
        }
        Command::WhiteList { path, sheet } => {
            let report = apply_white_list(store, &path, sheet.sheet_config())?;
            info!(
                "white list applied: {} concepts matched, {} value sets missing, {} with discrepancies",
                report.matched,
                report.missing.len(),
                report.discrepancies.len()
            );
        }
        Command::BlackList { path, sheet } => {
            let report = apply_black_list(store, &path, sheet.sheet_config())?;
            info!(
                "black list applied: {} concepts matched, {} white list codes blacklisted",
                report.matched,
                report.conflicts.len()
            );
        }
        Command::ClearLists => {
            clear_annotations(store)?;
        }
    }
    Ok(())
}

fn fetch_remote<V, S>(
    args: &VsacArgs,
    config: &AppConfig,
    source: &mut V,
    store: &mut S,
) -> LoaderResult<()>
where
    V: ValueSetSource,
    S: ValueSetStore,
{
    let oids = requested_oids(&args.oids, args.hqmf.as_deref())?;
    if oids.is_empty() {
        warn!("no value set OIDs requested");
        return Ok(());
    }

    let cache_dir: PathBuf = args
        .cache_dir
        .clone()
        .unwrap_or_else(|| config.value_set_path.clone());
    let report = vsac::load_from_remote(&oids, source, store, &cache_dir)?;
    info!(
        "loaded {} value sets ({} fetched, {} cached, {} already stored)",
        report.loaded(),
        report.fetched,
        report.from_cache,
        report.skipped
    );
    Ok(())
}

/// Explicit OIDs first, then any from the HQMF document, without repeats.
fn requested_oids(explicit: &[String], hqmf: Option<&Path>) -> LoaderResult<Vec<Oid>> {
    let mut oids: Vec<Oid> = Vec::new();
    let from_hqmf = match hqmf {
        Some(path) => value_set_oids_from_hqmf(path)?,
        None => Vec::new(),
    };
    for oid in explicit.iter().chain(from_hqmf.iter()) {
        if !oids.contains(oid) {
            oids.push(oid.clone());
        }
    }
    Ok(oids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use valueset_loader::vsac::MockValueSetSource;
    use valueset_loader::MemoryStore;

    const SVS: &str = r#"<RetrieveValueSetResponse xmlns="urn:ihe:iti:svs:2008">
  <ValueSet ID="2.16.840.1.113883.3.464" displayName="Diabetes" version="1">
    <ConceptList>
      <Concept code="44054006" codeSystemName="SNOMEDCT" codeSystem="2.16.840.1.113883.6.96" displayName="Diabetes mellitus type 2"/>
    </ConceptList>
  </ValueSet>
</RetrieveValueSetResponse>"#;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_requested_oids_merges_hqmf() {
        let dir = tempfile::tempdir().unwrap();
        let hqmf = write(
            dir.path(),
            "measure.xml",
            r#"<QualityMeasureDocument>
  <value valueSet="1.2.3"/>
  <code valueSet="4.5.6"/>
</QualityMeasureDocument>"#,
        );

        let oids = requested_oids(&["1.2.3".to_string()], Some(&hqmf)).unwrap();
        assert_eq!(oids, vec!["1.2.3", "4.5.6"]);
    }

    #[test]
    fn test_spreadsheet_then_lists() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = write(
            dir.path(),
            "value_sets.csv",
            "Value Set OID,Value Set Name,Code System,Code\n\
             1.2.3,Labs,LOINC,1234-5\n\
             1.2.3,Labs,SNOMEDCT,99\n",
        );
        let black = write(dir.path(), "black.csv", "code_system_name,code\nSNOMEDCT,99\n");
        let config = AppConfig::default();
        let mut store = MemoryStore::new();

        let cli = Cli::try_parse_from(["valueset", "spreadsheet", sheet.to_str().unwrap()]).unwrap();
        execute(cli.command, &config, &mut store).unwrap();
        assert_eq!(store.len(), 1);

        let cli = Cli::try_parse_from(["valueset", "white-list", sheet.to_str().unwrap()]).unwrap();
        execute(cli.command, &config, &mut store).unwrap();
        let cli = Cli::try_parse_from(["valueset", "black-list", black.to_str().unwrap()]).unwrap();
        execute(cli.command, &config, &mut store).unwrap();

        let stored = store.get("1.2.3").unwrap();
        assert!(stored.concepts.iter().all(|c| c.white_list));
        assert_eq!(stored.black_listed_count(), 1);

        let cli = Cli::try_parse_from(["valueset", "clear-lists"]).unwrap();
        execute(cli.command, &config, &mut store).unwrap();
        let stored = store.get("1.2.3").unwrap();
        assert!(stored.concepts.iter().all(|c| !c.is_annotated()));
    }

    #[test]
    fn test_fetch_remote_uses_configured_cache() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            value_set_path: dir.path().join("code_sets"),
            ..AppConfig::default()
        };
        let cli = Cli::try_parse_from([
            "valueset",
            "vsac",
            "--oid",
            "2.16.840.1.113883.3.464",
            "--username",
            "jdoe",
            "--password",
            "secret",
        ])
        .unwrap();
        let Command::Vsac(args) = cli.command else {
            panic!("expected vsac command");
        };

        let mut source = MockValueSetSource::new();
        source.add_payload("2.16.840.1.113883.3.464", SVS);
        let mut store = MemoryStore::new();

        fetch_remote(&args, &config, &mut source, &mut store).unwrap();

        assert!(store.get("2.16.840.1.113883.3.464").is_some());
        assert!(dir
            .path()
            .join("code_sets")
            .join("2.16.840.1.113883.3.464.xml")
            .exists());
    }

    #[test]
    fn test_fetch_remote_without_oids_is_a_no_op() {
        let cli = Cli::try_parse_from([
            "valueset",
            "vsac",
            "--username",
            "jdoe",
            "--password",
            "secret",
        ])
        .unwrap();
        let Command::Vsac(args) = cli.command else {
            panic!("expected vsac command");
        };
        let mut source = MockValueSetSource::new();
        let mut store = MemoryStore::new();

        fetch_remote(&args, &AppConfig::default(), &mut source, &mut store).unwrap();
        assert!(source.requests().is_empty());
        assert!(store.is_empty());
    }
}
