//! CLI route table over a sled store in a temp directory

use super::test_utils::with_xdg_env;
use clap::Parser;
use tempfile::TempDir;
use upspin_ui::cli::{Cli, RunContext};
use upspin_ui::config::{ConfigLoader, UiConfig};
use upspin_ui::error::ApiError;

fn context(dir: &TempDir, user: Option<&str>) -> RunContext {
    let mut config = UiConfig::default();
    config.user_name = user.map(str::to_string);
    config.storage.store_path = Some(dir.path().join("store"));
    RunContext::from_config(config, Some(dir.path().join("config.toml"))).unwrap()
}

fn run(ctx: &RunContext, args: &[&str]) -> Result<String, ApiError> {
    let mut argv = vec!["upspin-ui"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    ctx.execute(&cli.command)
}

#[test]
fn test_init_writes_config_and_root() {
    let dir = TempDir::new().unwrap();
    with_xdg_env(&dir, || {
        let ctx = context(&dir, None);
        let out = run(&ctx, &["init", "ann@example.com"]).unwrap();
        assert!(out.contains("ann@example.com"));

        let written = ConfigLoader::load_from_file(&dir.path().join("config.toml")).unwrap();
        assert_eq!(written.user_name.as_deref(), Some("ann@example.com"));

        let err = run(&ctx, &["init", "ann@example.com"]).unwrap_err();
        assert!(matches!(err, ApiError::ConfigError(_)));
        run(&ctx, &["init", "ann@example.com", "--force"]).unwrap();
    });
}

#[test]
fn test_namespace_commands_need_a_user() {
    let dir = TempDir::new().unwrap();
    with_xdg_env(&dir, || {
        let ctx = context(&dir, None);
        let err = run(&ctx, &["ls", "ann@example.com/"]).unwrap_err();
        assert!(matches!(err, ApiError::NoConfiguration));
    });
}

#[test]
fn test_put_cp_ls_get_rm() {
    let dir = TempDir::new().unwrap();
    with_xdg_env(&dir, || {
        let ctx = context(&dir, Some("ann@example.com"));
        run(&ctx, &["init", "ann@example.com"]).unwrap();
        run(&ctx, &["mkdir", "ann@example.com/docs"]).unwrap();
        run(&ctx, &["mkdir", "ann@example.com/backup"]).unwrap();

        let local = dir.path().join("note.txt");
        std::fs::write(&local, "remember the milk").unwrap();
        run(&ctx, &["put", "ann@example.com/docs/note.txt", local.to_str().unwrap()]).unwrap();

        run(&ctx, &["cp", "ann@example.com/docs", "ann@example.com/backup"]).unwrap();
        let listing = run(&ctx, &["ls", "ann@example.com/backup/docs", "--format", "json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&listing).unwrap();
        assert_eq!(value[0]["name"], "ann@example.com/backup/docs/note.txt");

        let content = run(&ctx, &["get", "ann@example.com/backup/docs/note.txt"]).unwrap();
        assert_eq!(content, "remember the milk");

        run(&ctx, &["rm", "ann@example.com/docs"]).unwrap();
        let err = run(&ctx, &["ls", "ann@example.com/docs"]).unwrap_err();
        assert_eq!(err.status_code(), 404);
    });
}

#[test]
fn test_ln_and_config_show() {
    let dir = TempDir::new().unwrap();
    with_xdg_env(&dir, || {
        let ctx = context(&dir, Some("ann@example.com"));
        run(&ctx, &["init", "ann@example.com"]).unwrap();
        run(&ctx, &["mkdir", "ann@example.com/real"]).unwrap();
        run(&ctx, &["ln", "ann@example.com/real", "ann@example.com/alias"]).unwrap();

        let listing = run(&ctx, &["ls", "ann@example.com/"]).unwrap();
        assert!(listing.contains("ann@example.com/alias -> ann@example.com/real"));

        let shown = run(&ctx, &["config"]).unwrap();
        assert!(shown.contains("user_name = \"ann@example.com\""));
    });
}
