use signkit_settings::{Config, SettingsError, SettingsPersistence};
use tempfile::TempDir;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let persistence = SettingsPersistence::new(dir.path().join("config.toml"));
    assert!(!persistence.exists());
    assert_eq!(persistence.load_or_default().unwrap(), Config::default());
}

#[test]
fn test_toml_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let persistence = SettingsPersistence::new(dir.path().join("nested").join("config.toml"));

    let mut config = Config::new();
    config.server.base_url = "https://sign.example.com/api".to_string();
    config.signer.full_name = "Grace Hopper".to_string();
    config.editor.zoom_step = 1.25;
    persistence.save(&config).unwrap();

    assert!(persistence.exists());
    assert_eq!(persistence.load_or_default().unwrap(), config);
}

#[test]
fn test_json_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    let mut config = Config::new();
    config.capture.max_file_bytes = 1024 * 1024;
    config.save_to_file(&path).unwrap();

    let loaded = Config::load_from_file(&path).unwrap();
    assert_eq!(loaded.capture.max_file_bytes, 1024 * 1024);
}

#[test]
fn test_invalid_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[server]\ntimeout_secs = 0\n").unwrap();

    let err = SettingsPersistence::new(&path).load_or_default().unwrap_err();
    assert!(matches!(err, SettingsError::InvalidSetting { .. }));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let err = Config::new()
        .save_to_file(&dir.path().join("config.yaml"))
        .unwrap_err();
    assert!(matches!(err, SettingsError::UnsupportedFormat(_)));
}
