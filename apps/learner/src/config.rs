use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use url::Url;

pub const DEFAULT_GRAPHQL_URL: &str = "http://localhost:8000/graphql/";
const FALLBACK_STORE_URL: &str = "sqlite://./data/learner.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub graphql_url: String,
    pub store_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graphql_url: DEFAULT_GRAPHQL_URL.into(),
            store_url: default_store_url(),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Checks the endpoint is an absolute http(s) URL.
    pub fn endpoint(&self) -> anyhow::Result<Url> {
        let url = Url::parse(&self.graphql_url)
            .with_context(|| format!("invalid graphql_url '{}'", self.graphql_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("graphql_url must use http or https, got '{}'", url.scheme());
        }
        Ok(url)
    }
}

fn default_store_url() -> String {
    dirs::data_dir()
        .map(|dir| dir.join("learner").join("learner.db"))
        .map(|path| normalize_store_url(&path.to_string_lossy()))
        .unwrap_or_else(|| FALLBACK_STORE_URL.to_string())
}

/// Defaults, then `config_path` when it exists, then the environment.
pub fn load_settings(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match apply_file(&mut settings, &raw) {
            Ok(()) => tracing::debug!(path = %config_path.display(), "loaded config file"),
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring unreadable config file")
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings.store_url = normalize_store_url(&settings.store_url);
    settings
}

pub(crate) fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let table = raw.parse::<toml::Table>().context("invalid toml")?;

    if let Some(v) = table.get("graphql_url").and_then(|v| v.as_str()) {
        settings.graphql_url = v.to_string();
    }
    if let Some(v) = table.get("store_url").and_then(|v| v.as_str()) {
        settings.store_url = v.to_string();
    }
    match table.get("request_timeout_secs") {
        Some(toml::Value::Integer(secs)) if *secs > 0 => {
            settings.request_timeout_secs = *secs as u64;
        }
        Some(toml::Value::String(secs)) => {
            if let Ok(parsed) = secs.trim().parse::<u64>() {
                settings.request_timeout_secs = parsed;
            }
        }
        _ => {}
    }
    Ok(())
}

pub(crate) fn apply_env<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("GRAPHQL_URL") {
        settings.graphql_url = v;
    }
    if let Some(v) = lookup("APP__GRAPHQL_URL") {
        settings.graphql_url = v;
    }

    if let Some(v) = lookup("LEARNER_STORE_URL") {
        settings.store_url = v;
    }
    if let Some(v) = lookup("APP__STORE_URL") {
        settings.store_url = v;
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

/// Turns a bare path into a sqlite URL; URLs pass through.
pub fn normalize_store_url(raw: &str) -> String {
    let raw = raw.trim();

    if raw.is_empty() {
        return FALLBACK_STORE_URL.to_string();
    }

    if raw.starts_with("sqlite::memory:") || raw.contains("://") {
        return raw.to_string();
    }

    if let Some(path) = raw.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
