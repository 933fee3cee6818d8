//! Integration tests for argument handling and `--show-config`.
//!
//! Exercises the path from raw command-line arguments to the rendered
//! configuration report.

use std::fs;

use clap::Parser;
use tempfile::TempDir;

use dockinspect_cli::cli::{Cli, OutputFormat, parse_properties};
use dockinspect_cli::output::{ConfigReport, OutputWriter};
use dockinspect_core::config::Config;

async fn load_from_args(args: &[&str]) -> Result<Config, Box<dyn std::error::Error>> {
    let cli = Cli::try_parse_from(args)?;
    let properties = parse_properties(&cli.properties)?;
    Ok(Config::load(cli.config_path().as_deref(), &properties).await?)
}

fn render_json(config: &Config) -> serde_json::Value {
    let mut buffer = Vec::new();
    OutputWriter::new(OutputFormat::Json)
        .render_to(&ConfigReport::new(None, config.masked_entries()), &mut buffer)
        .expect("rendering should succeed");
    serde_json::from_slice(&buffer).expect("valid JSON")
}

fn entry<'a>(report: &'a serde_json::Value, key: &str) -> &'a serde_json::Value {
    report["entries"]
        .as_array()
        .expect("entries array")
        .iter()
        .find(|e| e["key"] == key)
        .map(|e| &e["value"])
        .unwrap_or_else(|| panic!("missing entry {key}"))
}

#[tokio::test]
#[serial_test::serial]
async fn test_properties_override_config_file() {
    // Given: a config file naming one image
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("dockinspect.toml");
    fs::write(
        &config_path,
        "[docker]\nimage = \"alpine:3.6\"\n\n[upload]\nbdio = false\n",
    )
    .expect("should write config");
    let config_arg = config_path.display().to_string();

    // When: a property on the command line names another
    let config = load_from_args(&[
        "dockinspect",
        "--config",
        &config_arg,
        "--docker.image=ubuntu:22.04",
    ])
    .await
    .expect("config should load");

    // Then: the command line wins, untouched file values remain
    assert_eq!(config.docker_image, "ubuntu:22.04");
    assert!(!config.upload_bdio);
}

#[tokio::test]
#[serial_test::serial]
async fn test_missing_explicit_config_file_fails() {
    let result = load_from_args(&["dockinspect", "--config", "/nonexistent/dockinspect.toml"]).await;
    assert!(result.is_err(), "explicit missing config must fail");
}

#[tokio::test]
#[serial_test::serial]
async fn test_unknown_property_fails() {
    let result = load_from_args(&["dockinspect", "--no.such.option=1"]).await;
    assert!(result.is_err(), "unknown property must be rejected");
}

#[tokio::test]
#[serial_test::serial]
async fn test_show_config_masks_secrets() {
    let config = load_from_args(&[
        "dockinspect",
        "--hub.password=hunter2",
        "--hub.url=https://hub.example.com",
    ])
    .await
    .expect("config should load");

    let report = render_json(&config);

    assert_eq!(entry(&report, "hub.password"), "********");
    assert_eq!(entry(&report, "hub.url"), "https://hub.example.com");
    assert_eq!(entry(&report, "hub.api.token"), "", "empty secrets stay empty");
}

#[tokio::test]
#[serial_test::serial]
async fn test_env_secret_is_masked() {
    // SAFETY: serial_test로 직렬화됩니다.
    unsafe { std::env::set_var("DOCKINSPECT_HUB_API_TOKEN", "from-env") };
    let config = load_from_args(&["dockinspect"]).await;
    // SAFETY: serial_test로 직렬화됩니다.
    unsafe { std::env::remove_var("DOCKINSPECT_HUB_API_TOKEN") };

    let config = config.expect("config should load");
    assert_eq!(config.hub_api_token, "from-env");
    assert_eq!(entry(&render_json(&config), "hub.api.token"), "********");
}
