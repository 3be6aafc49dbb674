use clap::Parser;
use dupewalk::cli::{Cli, OutputFormat};
use dupewalk::config::Config;
use figment::providers::Serialized;
use figment::Figment;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // No Env layer, so other tests' variables cannot leak in
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("DUPEWALK_IT_ENV_JOBS", "6");
    std::env::set_var("DUPEWALK_IT_ENV_OUTPUT", "json");
    std::env::set_var("DUPEWALK_IT_ENV_FOLLOW_SYMLINKS", "true");

    let config: Config = Config::figment_with_prefix(None, "DUPEWALK_IT_ENV_")
        .unwrap()
        .extract()
        .unwrap();

    assert_eq!(config.jobs, 6);
    assert_eq!(config.output, OutputFormat::Json);
    assert!(config.follow_symlinks);

    std::env::remove_var("DUPEWALK_IT_ENV_JOBS");
    std::env::remove_var("DUPEWALK_IT_ENV_OUTPUT");
    std::env::remove_var("DUPEWALK_IT_ENV_FOLLOW_SYMLINKS");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
jobs = 3
channel_capacity = 0
max_depth = 5
"#,
    )
    .unwrap();

    let config: Config = Config::figment_with_prefix(Some(&config_path), "DUPEWALK_IT_TOML_")
        .unwrap()
        .extract()
        .unwrap();

    assert_eq!(config.jobs, 3);
    assert_eq!(config.channel_capacity, 0);
    assert_eq!(config.max_depth, Some(5));
    assert!(!config.follow_symlinks);
    assert_eq!(config.output, OutputFormat::Text);
}

#[test]
fn test_env_overrides_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "jobs = 3\nchannel_capacity = 16\n").unwrap();
    std::env::set_var("DUPEWALK_IT_LAYER_JOBS", "9");

    let config: Config = Config::figment_with_prefix(Some(&config_path), "DUPEWALK_IT_LAYER_")
        .unwrap()
        .extract()
        .unwrap();

    assert_eq!(config.jobs, 9);
    assert_eq!(config.channel_capacity, 16);

    std::env::remove_var("DUPEWALK_IT_LAYER_JOBS");
}

#[test]
fn test_cli_overrides_everything() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "jobs = 3\noutput = \"json\"\n").unwrap();

    let mut config: Config = Config::figment_with_prefix(Some(&config_path), "DUPEWALK_IT_CLI_")
        .unwrap()
        .extract()
        .unwrap();
    let cli = Cli::try_parse_from(["dupewalk", "/tmp", "-j", "12", "-o", "text"]).unwrap();
    config.apply_cli(&cli);

    assert_eq!(config.jobs, 12);
    assert_eq!(config.output, OutputFormat::Text);
}

#[test]
fn test_unset_cli_flags_keep_file_values() {
    let mut config = Config {
        jobs: 5,
        follow_symlinks: true,
        max_depth: Some(2),
        ..Config::default()
    };
    let cli = Cli::try_parse_from(["dupewalk", "/tmp"]).unwrap();
    config.apply_cli(&cli);

    assert_eq!(config.jobs, 5);
    assert!(config.follow_symlinks);
    assert_eq!(config.max_depth, Some(2));
}

#[test]
fn test_invalid_value_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "jobs = \"many\"\n").unwrap();

    let result = Config::figment_with_prefix(Some(&config_path), "DUPEWALK_IT_BAD_")
        .unwrap()
        .extract::<Config>();

    assert!(result.is_err());
}

#[test]
fn test_missing_explicit_file_is_error() {
    let temp_dir = tempdir().unwrap();
    let result = Config::load(Some(&temp_dir.path().join("absent.toml")));
    assert!(result.is_err());
}

#[test]
fn test_finder_config_carries_settings() {
    let config = Config {
        jobs: 7,
        channel_capacity: 0,
        follow_symlinks: true,
        max_depth: Some(4),
        output: OutputFormat::Json,
    };
    let flag = Arc::new(AtomicBool::new(false));

    let finder_config = config.finder_config(Arc::clone(&flag));

    assert_eq!(finder_config.jobs, 7);
    assert_eq!(finder_config.channel_capacity, 0);
    assert!(finder_config.walker_config.follow_symlinks);
    assert_eq!(finder_config.walker_config.max_depth, Some(4));
    flag.store(true, Ordering::SeqCst);
    assert!(finder_config
        .shutdown_flag
        .as_ref()
        .is_some_and(|f| f.load(Ordering::SeqCst)));
}

#[test]
fn test_toml_output_reloads() {
    let config = Config {
        jobs: 2,
        max_depth: Some(8),
        ..Config::default()
    };
    let rendered = config.to_toml().unwrap();

    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, &rendered).unwrap();
    let reloaded: Config = Config::figment_with_prefix(Some(&config_path), "DUPEWALK_IT_RELOAD_")
        .unwrap()
        .extract()
        .unwrap();

    assert_eq!(reloaded, config);
}
