//! Drives the `dax` command set against a ledger in a temporary directory.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::Parser;
use dax_cli::{DaxCli, LOCK_WAIT, Ledger, LedgerError, LedgerLock, run};
use pretty_assertions::assert_eq;
use testresult::TestResult;

const OWNER: &str = "0x00000000000000000000000000000000000000aa";
const USER: &str = "0x00000000000000000000000000000000000000bb";
const STRANGER: &str = "0x00000000000000000000000000000000000000cc";

fn dax(state: &Path, args: &[&str]) -> anyhow::Result<String> {
    let state = state.to_string_lossy().into_owned();
    let argv = ["dax", "--state", state.as_str()]
        .into_iter()
        .chain(args.iter().copied());
    run(&DaxCli::try_parse_from(argv)?)
}

fn initialized() -> anyhow::Result<(tempfile::TempDir, PathBuf)> {
    let directory = tempfile::tempdir()?;
    let state = directory.path().join("ledger.json");
    dax(
        &state,
        &[
            "init",
            "--owner",
            OWNER,
            "--metadata-uri",
            "ipfs://meta",
            "--download-uri",
            "ipfs://data",
        ],
    )?;
    Ok((directory, state))
}

#[test]
fn it_runs_the_grant_and_revoke_scenario() -> TestResult {
    let (_directory, state) = initialized()?;

    assert_eq!(dax(&state, &["owner"])?, OWNER);
    assert_eq!(dax(&state, &["metadata-uri"])?, "ipfs://meta");
    assert_eq!(dax(&state, &["download-uri"])?, "ipfs://data");

    dax(
        &state,
        &[
            "grant", "--caller", OWNER, USER, "--start", "1000", "--end", "2000",
        ],
    )?;
    assert_eq!(dax(&state, &["check", USER, "--at", "1500"])?, "true");
    assert_eq!(dax(&state, &["check", USER, "--at", "2001"])?, "false");

    dax(&state, &["revoke", "--caller", OWNER, USER])?;
    assert_eq!(dax(&state, &["check", USER, "--at", "1500"])?, "false");

    let events = dax(&state, &["events"])?;
    let lines: Vec<serde_json::Value> = events
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "AccessGranted");
    assert_eq!(lines[0]["start"], 1000);
    assert_eq!(lines[1]["event"], "AccessRevoked");
    assert_eq!(lines[1]["subject"], USER);
    Ok(())
}

#[test]
fn it_leaves_the_ledger_untouched_on_rejection() -> TestResult {
    let (_directory, state) = initialized()?;
    let before = std::fs::read_to_string(&state)?;

    let Err(error) = dax(&state, &["grant", "--caller", STRANGER, STRANGER]) else {
        panic!("a stranger was allowed to grant");
    };
    assert!(error.to_string().contains("Not authorized"));
    let rejected = dax(&state, &["set-download-uri", "--caller", USER, "ipfs://x"]);
    assert!(rejected.is_err());

    assert_eq!(std::fs::read_to_string(&state)?, before);
    Ok(())
}

#[test]
fn it_grants_unbounded_access_by_default() -> TestResult {
    let (_directory, state) = initialized()?;
    dax(&state, &["grant", "--caller", OWNER, USER])?;

    assert_eq!(dax(&state, &["check", USER, "--at", "1"])?, "true");
    assert_eq!(dax(&state, &["check", USER])?, "true");

    let shown: serde_json::Value = serde_json::from_str(&dax(&state, &["show", USER])?)?;
    assert_eq!(
        shown,
        serde_json::json!({ "authorized": true, "start": 0, "end": 0 })
    );
    Ok(())
}

#[test]
fn it_lists_every_touched_subject() -> TestResult {
    let (_directory, state) = initialized()?;
    dax(
        &state,
        &["grant", "--caller", OWNER, USER, "--start", "5", "--end", "9"],
    )?;
    dax(&state, &["revoke", "--caller", OWNER, STRANGER])?;

    assert_eq!(
        dax(&state, &["list"])?,
        format!("{USER} authorized=true window=5..=9\n{STRANGER} authorized=false window=..")
    );
    Ok(())
}

#[test]
fn it_updates_uris() -> TestResult {
    let (_directory, state) = initialized()?;
    dax(
        &state,
        &["set-metadata-uri", "--caller", OWNER, "ipfs://meta2"],
    )?;
    dax(
        &state,
        &["set-download-uri", "--caller", OWNER, "ipfs://data2"],
    )?;

    assert_eq!(dax(&state, &["metadata-uri"])?, "ipfs://meta2");
    assert_eq!(dax(&state, &["download-uri"])?, "ipfs://data2");
    // URI changes are not journaled.
    assert_eq!(dax(&state, &["events"])?, "");
    Ok(())
}

#[test]
fn it_initializes_from_a_config_file() -> TestResult {
    let directory = tempfile::tempdir()?;
    let config = directory.path().join("config.json");
    std::fs::write(
        &config,
        format!(r#"{{ "owner": "{STRANGER}", "metadata_uri": "ipfs://from-config" }}"#),
    )?;
    let state = directory.path().join("ledger.json");
    let config = config.to_string_lossy().into_owned();

    dax(&state, &["init", "--config", &config, "--owner", OWNER])?;

    assert_eq!(dax(&state, &["owner"])?, OWNER);
    assert_eq!(dax(&state, &["metadata-uri"])?, "ipfs://from-config");
    assert_eq!(dax(&state, &["download-uri"])?, "");
    Ok(())
}

#[test]
fn it_refuses_to_reinitialize_without_force() -> TestResult {
    let (_directory, state) = initialized()?;

    let error = dax(&state, &["init", "--owner", STRANGER]).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<LedgerError>(),
        Some(LedgerError::Exists { .. })
    ));

    dax(&state, &["init", "--owner", STRANGER, "--force"])?;
    assert_eq!(dax(&state, &["owner"])?, STRANGER);
    assert!(Ledger::load(&state)?.events.is_empty());
    Ok(())
}

#[test]
fn it_requires_an_owner_to_initialize() -> TestResult {
    let directory = tempfile::tempdir()?;
    let state = directory.path().join("ledger.json");
    assert!(dax(&state, &["init"]).is_err());
    assert!(!state.exists());
    Ok(())
}

#[test]
fn it_reports_a_missing_ledger() -> TestResult {
    let directory = tempfile::tempdir()?;
    let state = directory.path().join("absent.json");
    let error = dax(&state, &["owner"]).unwrap_err();
    assert!(error.to_string().contains("dax init"));
    Ok(())
}

#[test]
fn it_keeps_every_grant_made_concurrently() -> TestResult {
    let (_directory, state) = initialized()?;
    let state = state.as_path();
    let subjects: Vec<String> = (1..=16).map(|index| format!("0x{index:040x}")).collect();

    let results: Vec<anyhow::Result<String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = subjects
            .iter()
            .map(String::as_str)
            .map(|subject| {
                scope.spawn(move || dax(state, &["grant", "--caller", OWNER, subject]))
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });
    for result in &results {
        assert!(result.is_ok(), "{result:?}");
    }

    let ledger = Ledger::load(state)?;
    assert_eq!(ledger.registry.grants().count(), subjects.len());
    assert_eq!(dax(state, &["events"])?.lines().count(), subjects.len());
    for subject in &subjects {
        assert_eq!(dax(state, &["check", subject.as_str(), "--at", "1"])?, "true");
    }
    Ok(())
}

#[test]
fn it_waits_for_a_command_holding_the_ledger() -> TestResult {
    let (_directory, state) = initialized()?;
    let held = LedgerLock::acquire(&state, LOCK_WAIT)?;

    std::thread::scope(|scope| -> TestResult {
        let grant = scope.spawn(|| dax(&state, &["grant", "--caller", OWNER, USER]).is_ok());
        std::thread::sleep(Duration::from_millis(50));
        assert!(!grant.is_finished());

        drop(held);
        assert!(grant.join().unwrap());
        Ok(())
    })?;

    assert_eq!(dax(&state, &["check", USER, "--at", "1"])?, "true");
    Ok(())
}

#[test]
fn it_rejects_malformed_addresses() {
    let parsed = DaxCli::try_parse_from(["dax", "check", "0x1234"]);
    assert!(parsed.is_err());
}

#[test]
fn it_inspects_metadata_documents() -> TestResult {
    let (directory, state) = initialized()?;
    let document = directory.path().join("metadata.json");
    let write_document = |owner: &str, download_uri: &str| {
        std::fs::write(
            &document,
            format!(
                r#"{{
                  "name": "Survey",
                  "description": "Sonar captures",
                  "created_at": "2024-03-01T12:00:00Z",
                  "owner": "{owner}",
                  "license": "CC-BY-4.0",
                  "download_uri": "{download_uri}",
                  "document_uri": "https://docs.example/survey",
                  "files": [{{ "filename": "a.bin", "hash": "00" }}]
                }}"#
            ),
        )
    };
    let document_arg = document.to_string_lossy().into_owned();

    write_document(OWNER, "ipfs://data")?;
    assert_eq!(
        dax(&state, &["inspect-metadata", &document_arg])?,
        "'Survey' agrees with the registry"
    );

    write_document(STRANGER, "https://elsewhere.example/")?;
    let report = dax(&state, &["inspect-metadata", &document_arg])?;
    assert!(report.starts_with("'Survey' disagrees with the registry in 2 way(s):"));
    assert!(report.contains(STRANGER));
    assert!(report.contains("https://elsewhere.example/"));
    Ok(())
}

#[test]
fn it_maps_verbosity_to_a_log_level() -> TestResult {
    assert_eq!(DaxCli::try_parse_from(["dax", "owner"])?.log_level(), "warn");
    assert_eq!(DaxCli::try_parse_from(["dax", "-v", "owner"])?.log_level(), "info");
    assert_eq!(DaxCli::try_parse_from(["dax", "owner", "-vv"])?.log_level(), "debug");
    Ok(())
}
