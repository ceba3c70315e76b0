use shortener::config::StaticConfig;
use shortener::errors::ShortenerError;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = StaticConfig::default();

    assert_eq!(config.shortener.default_length, 8);
    assert!(config.database.database_url.is_empty());
    assert_eq!(config.storage.snapshot_path, "shortlinks.json");
    assert!(!config.batch.flush_on_shutdown);
    assert!(config.batch.delete_flush_interval_ms > 0);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_load_from_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(
        &path,
        r#"
[shortener]
base_url = "https://sho.rt/"
default_length = 10

[database]
database_url = "sqlite://links.db?mode=rwc"
retry_count = 5

[batch]
flush_on_shutdown = true
"#,
    )
    .unwrap();

    let config = StaticConfig::load(Some(path.to_str().unwrap())).unwrap();

    assert_eq!(config.shortener.base_url, "https://sho.rt/");
    assert_eq!(config.shortener.default_length, 10);
    assert_eq!(config.database.database_url, "sqlite://links.db?mode=rwc");
    assert_eq!(config.database.retry_count, 5);
    // 未出现的字段使用默认值
    assert_eq!(config.database.pool_size, 10);
    assert!(config.batch.flush_on_shutdown);
    assert_eq!(config.storage.snapshot_path, "shortlinks.json");
}

#[test]
fn test_missing_file_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let config = StaticConfig::load(Some(path.to_str().unwrap())).unwrap();
    assert_eq!(config.shortener.default_length, 8);
}

#[test]
fn test_sample_config_parses_back() {
    let sample = StaticConfig::generate_sample_config();
    assert!(sample.contains("[shortener]"));
    assert!(sample.contains("[batch]"));

    let parsed: StaticConfig = toml::from_str(&sample).unwrap();
    assert_eq!(parsed.shortener.default_length, 8);
    assert_eq!(
        parsed.batch.delete_flush_interval_ms,
        StaticConfig::default().batch.delete_flush_interval_ms
    );
}

#[test]
fn test_update_config_replaces_global() {
    let mut config = StaticConfig::default();
    config.shortener.default_length = 12;
    shortener::config::update_config(config);

    assert_eq!(shortener::config::get_config().shortener.default_length, 12);
}

#[test]
fn test_malformed_file_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[shortener\ndefault_length = ").unwrap();

    let err = StaticConfig::load(Some(path.to_str().unwrap())).unwrap_err();
    assert!(matches!(err, ShortenerError::Config(_)));
}

#[test]
fn test_wrong_value_type_is_config_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("typed.toml");
    std::fs::write(&path, "[shortener]\ndefault_length = \"eight\"\n").unwrap();

    let err = StaticConfig::load(Some(path.to_str().unwrap())).unwrap_err();
    assert!(matches!(err, ShortenerError::Config(_)));
}

#[test]
fn test_zero_default_length_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("zero.toml");
    std::fs::write(&path, "[shortener]\ndefault_length = 0\n").unwrap();

    let err = StaticConfig::load(Some(path.to_str().unwrap())).unwrap_err();
    assert!(matches!(err, ShortenerError::Config(_)));
    assert!(err.message().contains("default_length"));
}

#[test]
fn test_validate_accepts_defaults() {
    assert!(StaticConfig::default().validate().is_ok());
}
