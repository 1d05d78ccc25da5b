//! Focused unit tests covering check CLI configuration.

use super::helpers::{CheckWorkspace, StubCollaboratorBuilder, write_utf8};
use super::*;
use crate::check::{CheckArgs, CheckConfig, RunSummary, config_from_layers_for_test, run_check_with};
use camino::Utf8PathBuf;
use ortho_config::MergeComposer;
use rstest::rstest;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;

fn config_for(workspace: &CheckWorkspace) -> CheckConfig {
    CheckConfig::try_from(CheckArgs {
        osm_pbf: Some(workspace.osm_pbf.clone()),
        rules_dir: Some(workspace.rules_dir.clone()),
        ..CheckArgs::default()
    })
    .expect("config should build")
}

#[rstest]
fn converting_without_extract_errors() {
    let err = CheckConfig::try_from(CheckArgs::default()).expect_err("missing extract");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_OSM_PBF);
            assert_eq!(env, ENV_OSM_PBF);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn defaults_are_applied() {
    let config = CheckConfig::try_from(CheckArgs {
        osm_pbf: Some(Utf8PathBuf::from("france.osm.pbf")),
        ..CheckArgs::default()
    })
    .expect("config should build");
    assert_eq!(config.rules_dir, Utf8PathBuf::from("."));
    assert_eq!(config.labels_out, Utf8PathBuf::from("names.csv"));
    assert_eq!(config.osm_api_url, "https://api.openstreetmap.org");
    assert_eq!(config.editor_url, "http://127.0.0.1:8111");
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.editor_timeout, Duration::from_secs(5));
    assert_eq!(config.engine.workers, 1);
    assert!(config.engine.corrections_enabled);
    assert!(!config.engine.highlight_findings);
    assert_eq!(config.engine.max_passes, 16);
    assert!(!config.validation.highway_whitelist);
    assert!(config.validation.deprecated_checks);
    assert!(config.log_file.is_none());
}

#[rstest]
fn flags_map_onto_engine_and_validation_options() {
    let config = CheckConfig::try_from(CheckArgs {
        osm_pbf: Some(Utf8PathBuf::from("france.osm.pbf")),
        workers: Some(4),
        corrections: Some(false),
        highway_whitelist: Some(true),
        deprecated_checks: Some(false),
        highlight_findings: Some(true),
        max_passes: Some(3),
        request_timeout_secs: Some(60),
        editor_timeout_secs: Some(2),
        ..CheckArgs::default()
    })
    .expect("config should build");
    assert_eq!(config.engine.workers, 4);
    assert!(!config.engine.corrections_enabled);
    assert!(config.engine.highlight_findings);
    assert_eq!(config.engine.max_passes, 3);
    assert!(config.validation.highway_whitelist);
    assert!(!config.validation.deprecated_checks);
    assert_eq!(config.request_timeout, Duration::from_secs(60));
    assert_eq!(config.editor_timeout, Duration::from_secs(2));
}

#[rstest]
fn validate_sources_reports_missing_extract() {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    let config = CheckConfig::try_from(CheckArgs {
        osm_pbf: Some(root.join("missing.osm.pbf")),
        rules_dir: Some(root.clone()),
        ..CheckArgs::default()
    })
    .expect("config should build");
    match config.validate_sources().expect_err("extract is missing") {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_OSM_PBF),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_rejects_directories() {
    let workspace = CheckWorkspace::new();
    let mut config = config_for(&workspace);
    config.osm_pbf = workspace.rules_dir.clone();
    match config.validate_sources().expect_err("extract is a directory") {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_OSM_PBF);
            assert_eq!(path, workspace.rules_dir);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_requires_rules_dir() {
    let workspace = CheckWorkspace::new();
    let mut config = config_for(&workspace);
    config.rules_dir = workspace.root.join("no-such-rules");
    assert!(matches!(
        config.validate_sources(),
        Err(CliError::MissingRulesDir { .. })
    ));
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "workers": "many" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "osm_pbf": "from-file.osm.pbf",
            "workers": 2,
            "osm_api_url": "http://from-file:3000",
        }),
        None,
    );
    composer.push_environment(json!({
        "osm_pbf": "from-env.osm.pbf",
        "workers": 3,
    }));
    composer.push_cli(json!({ "workers": 8 }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.osm_pbf, Utf8PathBuf::from("from-env.osm.pbf"));
    assert_eq!(config.engine.workers, 8);
    assert_eq!(config.osm_api_url, "http://from-file:3000");
}

#[rstest]
fn check_writes_summary_and_label_report() {
    let workspace = CheckWorkspace::new();
    let labels_out = workspace.root.join("out/names.csv");
    let args = CheckArgs {
        osm_pbf: Some(workspace.osm_pbf.clone()),
        rules_dir: Some(workspace.rules_dir.clone()),
        labels_out: Some(labels_out.clone()),
        ..CheckArgs::default()
    };
    let builder = StubCollaboratorBuilder::new();
    let mut stdout = Vec::new();

    run_check_with(args, &builder, &mut stdout).expect("check should succeed");

    let summary: RunSummary =
        serde_json::from_slice(&stdout).expect("stdout should hold the JSON summary");
    assert_eq!(
        summary,
        RunSummary {
            labels: 2,
            errors: 2,
            nodes: 3,
            ways: 1,
            relations: 1,
            chunks: 2,
            corrections: 2,
            cancelled: false,
        }
    );
    let report = std::fs::read_to_string(&labels_out).expect("label report exists");
    assert_eq!(report, "Ch. Pasteur,way/10,relation/20\nLe Café,node/1\n");
    assert_eq!(builder.sink.commands().len(), 2);
}

#[rstest]
fn invalid_correction_rule_surfaces_catalogue_error() {
    let workspace = CheckWorkspace::new();
    write_utf8(
        &workspace.rules_dir.join("corrections.csv"),
        b"pattern,template\n(unclosed,x\n",
    );
    let args = CheckArgs {
        osm_pbf: Some(workspace.osm_pbf.clone()),
        rules_dir: Some(workspace.rules_dir.clone()),
        labels_out: Some(workspace.root.join("names.csv")),
        ..CheckArgs::default()
    };
    let err = run_check_with(args, &StubCollaboratorBuilder::new(), &mut Vec::new())
        .expect_err("catalogue is invalid");
    assert!(matches!(err, CliError::Catalogue(_)));
}
