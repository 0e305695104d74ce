//! Unit tests for CLI commands
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use crate::cli::{execute, Cli, Commands, FormatArg, VersionArg};
use clap::Parser;
use std::path::Path;

const MODEL: &str = r#"
api:
  name: shop
services:
  - name: items
    http:
      path: /items
      files:
        - { path: "/assets/{*rest}", source: ./public }
    methods:
      - name: show
        payload:
          type: object
          fields:
            - { name: id, type: int, required: true }
        result: { type: string }
        http:
          routes: ["GET /{id}"]
"#;

const BROKEN: &str = r#"
api:
  name: shop
services:
  - name: items
    methods:
      - name: show
        payload:
          type: object
          fields:
            - { name: id, type: int }
        http:
          routes: ["GET /items/{missing}"]
"#;

fn write_model(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("api.yaml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_generate_command_parses() {
    let cli = Cli::try_parse_from([
        "httpbind-gen",
        "generate",
        "--model",
        "api.yaml",
        "--output",
        "out",
        "--dry-run",
    ])
    .unwrap();

    match cli.command {
        Commands::Generate {
            model,
            output,
            config,
            dry_run,
            allow_failures,
        } => {
            assert_eq!(model.to_string_lossy(), "api.yaml");
            assert_eq!(output.unwrap().to_string_lossy(), "out");
            assert!(config.is_none());
            assert!(dry_run);
            assert!(!allow_failures);
        }
        _ => panic!("Expected Generate command"),
    }
}

#[test]
fn test_openapi_defaults() {
    let cli = Cli::try_parse_from(["httpbind-gen", "openapi", "--model", "api.yaml"]).unwrap();
    match cli.command {
        Commands::Openapi { version, format, .. } => {
            assert_eq!(version, VersionArg::V3);
            assert_eq!(format, FormatArg::Yaml);
        }
        _ => panic!("Expected Openapi command"),
    }
    assert!(
        Cli::try_parse_from(["httpbind-gen", "openapi", "--model", "a", "--version", "v4"])
            .is_err()
    );
}

#[test]
fn test_generate_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), MODEL);
    let output = dir.path().join("out");
    let command = Commands::Generate {
        model,
        output: Some(output.clone()),
        config: None,
        dry_run: false,
        allow_failures: false,
    };

    let mut out = Vec::new();
    assert!(execute(&command, &mut out).unwrap());
    for file in [
        "mod.rs",
        "items/mod.rs",
        "items/paths.rs",
        "items/server.rs",
        "openapi.json",
        "openapi3.yaml",
    ] {
        assert!(output.join(file).exists(), "missing {file}");
    }

    // a second run leaves everything unchanged
    let mut out = Vec::new();
    assert!(execute(&command, &mut out).unwrap());
    assert!(String::from_utf8(out).unwrap().starts_with("wrote 0 of"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), MODEL);
    let output = dir.path().join("out");
    let command = Commands::Generate {
        model,
        output: Some(output.clone()),
        config: None,
        dry_run: true,
        allow_failures: false,
    };
    let mut out = Vec::new();
    assert!(execute(&command, &mut out).unwrap());
    let listing = String::from_utf8(out).unwrap();
    assert!(listing.contains("would write"));
    assert!(listing.contains("paths.rs"));
    assert!(!output.exists());
}

#[test]
fn test_config_disables_documents() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), MODEL);
    std::fs::write(dir.path().join("httpbind.toml"), "[openapi]\nenabled = false\n").unwrap();
    let output = dir.path().join("out");
    let command = Commands::Generate {
        model,
        output: Some(output.clone()),
        config: None,
        dry_run: false,
        allow_failures: false,
    };
    assert!(execute(&command, &mut Vec::new()).unwrap());
    assert!(output.join("items/types.rs").exists());
    assert!(!output.join("openapi.json").exists());
}

#[test]
fn test_failures_fail_the_run_unless_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), BROKEN);

    let check = Commands::Check { model: model.clone() };
    let mut out = Vec::new();
    assert!(!execute(&check, &mut out).unwrap());
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "0 endpoint(s), 0 static mount(s), 1 failure(s)\n"
    );

    let generate = |allow_failures| Commands::Generate {
        model: model.clone(),
        output: Some(dir.path().join("out")),
        config: None,
        dry_run: true,
        allow_failures,
    };
    assert!(!execute(&generate(false), &mut Vec::new()).unwrap());
    assert!(execute(&generate(true), &mut Vec::new()).unwrap());
}

#[test]
fn test_routes_lists_mounts() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), MODEL);
    let mut out = Vec::new();
    assert!(execute(&Commands::Routes { model }, &mut out).unwrap());
    let listing = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = listing.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("/items/{id} -> items.show"));
    assert!(lines[1].contains("(files: ./public)"));
}

#[test]
fn test_openapi_prints_document() {
    let dir = tempfile::tempdir().unwrap();
    let model = write_model(dir.path(), MODEL);
    let mut out = Vec::new();
    let command = Commands::Openapi {
        model,
        version: VersionArg::V2,
        format: FormatArg::Json,
    };
    assert!(execute(&command, &mut out).unwrap());
    let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(doc["swagger"], "2.0");
    assert!(doc["paths"]["/items/{id}"]["get"].is_object());
}
