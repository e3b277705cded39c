//! Tests for configuration and graceful degradation
//!
//! - Missing TOML files do not prevent startup
//! - Priority order for root folder resolution
//! - Automatic root folder creation
//!
//! Tests that touch EWS_ROOT_FOLDER or EWS_CONFIG are marked #[serial] so they
//! do not race each other.

use ews_common::config::{
    load_toml_config, load_toml_config_or_default, load_toml_config_with_source,
    resolve_config_path, CompiledDefaults, ConfigSource, RootFolderInitializer, RootFolderResolver, TomlConfig, ENV_CONFIG_PATH, ENV_ROOT_FOLDER,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert!(defaults.root_folder.to_string_lossy().contains("ews"));
    assert_eq!(defaults.port, 5780);
    assert_eq!(defaults.bind_address, "127.0.0.1");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ENV_ROOT_FOLDER);

    let toml = TomlConfig::default();
    let root_folder = RootFolderResolver::new(None, &toml).resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    env::set_var(ENV_ROOT_FOLDER, "/tmp/ews-test-env-folder");

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/ews-test-toml-folder")),
        ..Default::default()
    };
    let root_folder = RootFolderResolver::new(None, &toml).resolve();

    env::remove_var(ENV_ROOT_FOLDER);
    assert_eq!(root_folder, PathBuf::from("/tmp/ews-test-env-folder"));
}

#[test]
#[serial]
fn test_resolver_cli_arg_beats_env() {
    env::set_var(ENV_ROOT_FOLDER, "/tmp/ews-test-env-folder");

    let toml = TomlConfig::default();
    let cli = Path::new("/tmp/ews-test-cli-folder");
    let root_folder = RootFolderResolver::new(Some(cli), &toml).resolve();

    env::remove_var(ENV_ROOT_FOLDER);
    assert_eq!(root_folder, PathBuf::from("/tmp/ews-test-cli-folder"));
}

#[test]
#[serial]
fn test_resolver_toml_used_when_env_missing() {
    env::remove_var(ENV_ROOT_FOLDER);

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/ews-test-toml-folder")),
        ..Default::default()
    };
    let root_folder = RootFolderResolver::new(None, &toml).resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/ews-test-toml-folder"));
}

#[test]
#[serial]
fn test_config_path_env_override() {
    env::set_var(ENV_CONFIG_PATH, "/tmp/ews-custom.toml");
    let path = resolve_config_path(None);
    env::remove_var(ENV_CONFIG_PATH);

    assert_eq!(path, Some(PathBuf::from("/tmp/ews-custom.toml")));
}

#[test]
fn test_initializer_creates_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("a").join("b");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join("ews.db"));
}

#[test]
fn test_missing_config_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = load_toml_config_or_default(Some(&dir.path().join("absent.toml")));
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_malformed_config_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ews.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    assert!(load_toml_config(&path).is_err());
    assert_eq!(load_toml_config_or_default(Some(&path)), TomlConfig::default());
}

#[test]
fn test_config_source_reports_parse_failure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ews.toml");
    std::fs::write(&path, "port = \"oops").unwrap();

    let (config, source) = load_toml_config_with_source(Some(&path));

    assert_eq!(config, TomlConfig::default());
    match source {
        ConfigSource::Invalid { path: reported, error } => {
            assert_eq!(reported, path);
            assert!(error.contains("Parse"));
        }
        other => panic!("expected Invalid, got {:?}", other),
    }
}

#[test]
fn test_config_source_distinguishes_missing_and_loaded() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("absent.toml");
    let present = dir.path().join("ews.toml");
    std::fs::write(&present, "port = 6000\n").unwrap();

    let (_, source) = load_toml_config_with_source(Some(&absent));
    assert_eq!(source, ConfigSource::NotFound(absent));

    let (config, source) = load_toml_config_with_source(Some(&present));
    assert_eq!(config.port, Some(6000));
    assert_eq!(source, ConfigSource::Loaded(present));

    let (_, source) = load_toml_config_with_source(None);
    assert_eq!(source, ConfigSource::NoLocation);
}

#[test]
fn test_full_config_file_parses() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ews.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/ews"
bind_address = "0.0.0.0"
port = 8080

[logging]
level = "debug"

[gateway]
base_url = "https://sms.example.test"
timeout_secs = 10
sender_id = "EWS"
client_id = "client"
client_secret = "secret"
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/ews")));
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.gateway.base_url(), "https://sms.example.test");
    assert_eq!(config.gateway.timeout().as_secs(), 10);
    assert_eq!(config.gateway.sender_id.as_deref(), Some("EWS"));
    assert_eq!(config.gateway.client_secret.as_deref(), Some("secret"));
}
