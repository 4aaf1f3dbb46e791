use super::settings::Settings;
use super::load_config;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.coap_port, 5683);
    assert_eq!(settings.server.api_port, 8080);
    assert_eq!(settings.broker.dedup_window_secs, 145);
}

#[test]
fn test_load_config_from_file_overrides_defaults() {
    use std::{env, fs};
    use tempfile::TempDir;

    // Run load_config from a temp dir holding a config/default.toml.
    let tmp = TempDir::new().expect("create tempdir");
    let orig = env::current_dir().expect("current_dir");
    env::set_current_dir(tmp.path()).expect("set current dir");

    fs::create_dir_all("config").expect("create config dir");
    let toml = r#"
        [server]
        host = "0.0.0.0"
        coap_port = 9683

        [broker]
        dedup_window_secs = 10
    "#;
    fs::write("config/default.toml", toml).expect("write config file");

    let cfg = load_config().expect("load_config failed");
    assert_eq!(cfg.server.host, "0.0.0.0");
    assert_eq!(cfg.server.coap_port, 9683);
    // unspecified fields fall back to defaults
    assert_eq!(cfg.server.api_port, 8080);
    assert_eq!(cfg.broker.dedup_window_secs, 10);

    env::set_current_dir(orig).expect("restore cwd");
}
