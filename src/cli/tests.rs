//! Unit tests for CLI commands

use crate::cli::{execute, CacheAction, Cli, Commands};
use clap::Parser;
use serde_json::Value;
use std::io::Write;

const MANIFEST: &str = r#"
models:
  - name: Books
    fields:
      - { name: id, type: ID }
      - { name: title, type: Text }
    routes:
      - { method: GET, path: /Books/featured, apiClass: BooksAPIController, apiMethod: featured }
controllers:
  - class: Gravitycar\Models\Books\Api\BooksAPIController
    routes:
      - { method: GET, path: /Books/top/?, apiMethod: featured, parameterNames: [count] }
records:
  Books:
    - { title: Dune }
    - { title: Emma }
"#;

fn manifest_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();
    file
}

fn run(args: &[&str]) -> (anyhow::Result<()>, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let result = execute(&cli, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_all_commands_parse() {
    let commands = vec![
        vec!["gravitycar-routes", "routes"],
        vec!["gravitycar-routes", "routes", "--method", "get", "--json"],
        vec!["gravitycar-routes", "match", "GET", "/Users/1", "page=2"],
        vec!["gravitycar-routes", "--manifest", "m.yaml", "match", "GET", "/x", "--dispatch"],
        vec!["gravitycar-routes", "parse", "startRow=0", "endRow=20"],
        vec!["gravitycar-routes", "cache", "rebuild", "--config", "c.toml"],
        vec!["gravitycar-routes", "cache", "clear"],
        vec!["gravitycar-routes", "docs", "Users"],
    ];
    for args in commands {
        let cli = Cli::try_parse_from(&args);
        assert!(cli.is_ok(), "Failed to parse command: {:?}", args);
    }

    let cli = Cli::try_parse_from(["gravitycar-routes", "cache", "clear", "--manifest", "m.yaml"]).unwrap();
    assert!(matches!(cli.command, Commands::Cache { action: CacheAction::Clear }));
    assert_eq!(cli.manifest.unwrap().to_string_lossy(), "m.yaml");
}

#[test]
fn test_parse_prints_normalized_envelope() {
    let (result, out) = run(&["gravitycar-routes", "parse", "startRow=20", "endRow=40"]);
    result.unwrap();
    let body: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["pageSize"], 20);
    assert_eq!(body["meta"]["detectedFormat"], "ag-grid");
}

#[test]
fn test_match_and_dispatch_with_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "route_cache_enabled = false\n").unwrap();
    let manifest = manifest_file();
    let manifest = manifest.path().to_str().unwrap();
    let config = config.to_str().unwrap();

    let (result, out) = run(&[
        "gravitycar-routes", "--manifest", manifest, "--config", config, "match", "GET", "/Books/top/5",
    ]);
    result.unwrap();
    let body: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(body["params"]["count"], "5");
    assert_eq!(body["route"]["apiMethod"], "featured");

    let (result, out) = run(&[
        "gravitycar-routes", "--manifest", manifest, "--config", config, "match", "GET", "/Books",
        "title=Dune", "--dispatch",
    ]);
    result.unwrap();
    let body: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (result, out) = run(&[
        "gravitycar-routes", "--manifest", manifest, "--config", config, "match", "GET", "/a/b/c/d",
    ]);
    assert!(result.is_err());
    let body: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(body["status"], 404);
}

#[test]
fn test_cache_rebuild_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("routes.json");
    let config = dir.path().join("config.toml");
    std::fs::write(&config, format!("route_cache_path = {:?}\n", cache.to_str().unwrap())).unwrap();
    let manifest = manifest_file();
    let args = |action: &'static str| {
        vec![
            "gravitycar-routes".to_string(),
            "--manifest".to_string(),
            manifest.path().to_string_lossy().into_owned(),
            "--config".to_string(),
            config.to_string_lossy().into_owned(),
            "cache".to_string(),
            action.to_string(),
        ]
    };

    let cli = Cli::try_parse_from(args("rebuild")).unwrap();
    let mut out = Vec::new();
    execute(&cli, &mut out).unwrap();
    assert!(cache.exists());
    assert!(String::from_utf8(out).unwrap().starts_with("cached 10 routes"));

    let cli = Cli::try_parse_from(args("clear")).unwrap();
    let mut out = Vec::new();
    execute(&cli, &mut out).unwrap();
    assert!(!cache.exists());
}

#[test]
fn test_docs_lists_explicit_and_implied_routes() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "route_cache_enabled = false\n").unwrap();
    let manifest = manifest_file();
    let (result, out) = run(&[
        "gravitycar-routes",
        "--manifest",
        manifest.path().to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "docs",
        "Books",
    ]);
    result.unwrap();
    let body: Value = serde_json::from_str(&out).unwrap();
    let endpoints = body["endpoints"].as_array().unwrap();
    assert!(endpoints.iter().any(|e| e["path"] == "/Books/featured" && e["implied"] == false));
    assert!(endpoints.iter().any(|e| e["path"] == "/Books/{id}" && e["implied"] == true));
}
