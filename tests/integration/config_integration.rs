//! Layered configuration with isolated XDG directories

use super::test_utils::with_xdg_env;
use tempfile::TempDir;
use upspin_ui::config::{ConfigLoader, DEFAULT_PATH};

#[test]
fn test_defaults_without_any_file() {
    let dir = TempDir::new().unwrap();
    with_xdg_env(&dir, || {
        let config = ConfigLoader::load().unwrap();
        assert!(config.user_name.is_none());
        assert_eq!(config.default_path, DEFAULT_PATH);
        assert_eq!(
            config.storage.resolve_store_path().unwrap(),
            dir.path().join("data").join("upspin-ui").join("store")
        );
    });
}

#[test]
fn test_env_overrides_global_file() {
    let dir = TempDir::new().unwrap();
    with_xdg_env(&dir, || {
        let path = ConfigLoader::global_config_path().unwrap();
        assert_eq!(path, dir.path().join("upspin-ui").join("config.toml"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "user_name = \"ann@example.com\"\n").unwrap();

        assert_eq!(
            ConfigLoader::load().unwrap().user_name.as_deref(),
            Some("ann@example.com")
        );

        std::env::set_var("UPSPIN_UI__USER_NAME", "bob@example.com");
        assert_eq!(
            ConfigLoader::load().unwrap().user_name.as_deref(),
            Some("bob@example.com")
        );
    });
}

#[test]
fn test_invalid_global_file_fails_load() {
    let dir = TempDir::new().unwrap();
    with_xdg_env(&dir, || {
        let path = ConfigLoader::global_config_path().unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[storage]\nblock_size = 0\n").unwrap();
        let err = ConfigLoader::load().unwrap_err();
        assert!(err.to_string().contains("block_size"));
    });
}
