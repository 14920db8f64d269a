use std::collections::HashMap;

use super::*;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_store_url("./data/learner.db"),
        "sqlite://./data/learner.db"
    );
    assert_eq!(normalize_store_url("sqlite:state.db"), "sqlite://state.db");
    assert_eq!(normalize_store_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(normalize_store_url("  "), "sqlite://./data/learner.db");
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
            graphql_url = "https://learn.example.com/graphql/"
            store_url = "sqlite::memory:"
            request_timeout_secs = 12
        "#,
    )
    .expect("valid toml");

    assert_eq!(settings.graphql_url, "https://learn.example.com/graphql/");
    assert_eq!(settings.store_url, "sqlite::memory:");
    assert_eq!(settings.request_timeout(), Duration::from_secs(12));
}

#[test]
fn broken_file_leaves_settings_alone() {
    let mut settings = Settings::default();
    assert!(apply_file(&mut settings, "graphql_url = ").is_err());
    assert_eq!(settings, Settings::default());
}

#[test]
fn prefixed_env_vars_win_over_plain_ones() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_of(&[
            ("GRAPHQL_URL", "http://plain/graphql/"),
            ("APP__GRAPHQL_URL", "http://prefixed/graphql/"),
            ("LEARNER_STORE_URL", "./mine.db"),
            ("APP__REQUEST_TIMEOUT_SECS", "not-a-number"),
        ]),
    );

    assert_eq!(settings.graphql_url, "http://prefixed/graphql/");
    assert_eq!(settings.store_url, "./mine.db");
    assert_eq!(settings.request_timeout_secs, 30);
}

#[test]
fn endpoint_must_be_http() {
    let mut settings = Settings::default();
    assert_eq!(
        settings.endpoint().expect("default").as_str(),
        DEFAULT_GRAPHQL_URL
    );

    settings.graphql_url = "ftp://files.example.com/".into();
    assert!(settings.endpoint().is_err());
    settings.graphql_url = "not a url".into();
    assert!(settings.endpoint().is_err());
}

#[test]
fn config_file_on_disk_is_read() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("learner.toml");
    fs::write(&path, "store_url = \"./custom/learner.db\"\n").expect("write");

    let settings = load_settings(&path);

    // Env overrides may be present on the host; only the normalization is fixed.
    assert!(settings.store_url.starts_with("sqlite:"));
}
