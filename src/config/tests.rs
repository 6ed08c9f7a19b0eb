use std::io::Write;

use serial_test::serial;
use tempfile::NamedTempFile;

use super::*;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("tmp file");
    file.write_all(contents.as_bytes()).expect("write tmp");
    file
}

#[test]
fn defaults_cover_every_section() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.api.base_url.as_str(), "http://localhost:8000/");
    assert_eq!(settings.api.timeout, Duration::from_secs(30));
    assert_eq!(settings.session.path, PathBuf::from(".quillpad/session.json"));
    assert_eq!(settings.listing.page_size, 10);
    assert_eq!(settings.listing.base_path, "/posts");
    assert_eq!(settings.search.debounce, Duration::from_millis(500));
    assert_eq!(settings.logging.level, LevelFilter::WARN);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("http://file.example".to_string());
    raw.logging.level = Some("info".to_string());

    let overrides = ConfigArgs {
        api_url: Some("https://cli.example".to_string()),
        log_level: Some("debug".to_string()),
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_cli_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.api.base_url.as_str(), "https://cli.example/");
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn rejects_non_http_base_url() {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("ftp://files.example".to_string());
    let err = Settings::from_raw(raw).expect_err("ftp is not an API origin");
    assert!(matches!(err, LoadError::Invalid { key: "api.base_url", .. }));
}

#[test]
fn rejects_zero_values() {
    let mut raw = RawSettings::default();
    raw.listing.page_size = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero page size");
    assert!(matches!(err, LoadError::Invalid { key: "listing.page_size", .. }));

    let mut raw = RawSettings::default();
    raw.search.debounce_ms = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero debounce");
    assert!(matches!(err, LoadError::Invalid { key: "search.debounce_ms", .. }));
}

#[test]
fn rejects_unknown_log_level() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
#[serial]
fn config_file_then_environment() {
    let file = config_file(
        "[api]\nbase_url = \"http://file.example:9000\"\n\n[listing]\npage_size = 5\n",
    );
    // SAFETY: serialised with the other environment tests.
    unsafe { std::env::set_var("QUILLPAD__LISTING__PAGE_SIZE", "25") };

    let args = ConfigArgs {
        config_file: Some(file.path().to_path_buf()),
        ..Default::default()
    };
    let settings = load(&args);

    // SAFETY: as above.
    unsafe { std::env::remove_var("QUILLPAD__LISTING__PAGE_SIZE") };

    let settings = settings.expect("settings");
    assert_eq!(settings.api.base_url.as_str(), "http://file.example:9000/");
    assert_eq!(settings.listing.page_size, 25);
}

#[test]
#[serial]
fn missing_explicit_config_file_fails() {
    let args = ConfigArgs {
        config_file: Some(PathBuf::from("/nonexistent/quillpad.toml")),
        ..Default::default()
    };
    assert!(matches!(load(&args), Err(LoadError::Build(_))));
}
