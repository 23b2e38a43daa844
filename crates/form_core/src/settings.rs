use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use serde::Deserialize;
use shared::catalog::HazardCatalog;
use thiserror::Error;
use url::Url;

pub const SETTINGS_FILE: &str = "hazard.toml";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("no API base URL configured; set HAZARD_API_URL or api_url in hazard.toml")]
    MissingApiUrl,
    #[error("invalid API base URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("API base URL must use http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("invalid request timeout '{0}'")]
    InvalidTimeout(String),
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    request_timeout_seconds: Option<u64>,
    catalog_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_url: Option<String>,
    pub request_timeout_seconds: Option<u64>,
    pub catalog_path: Option<PathBuf>,
}

/// Defaults, then `hazard.toml` in the working directory, then environment.
pub fn load_settings() -> Result<ClientSettings, SettingsError> {
    let mut settings = ClientSettings::default();
    if let Ok(raw) = fs::read_to_string(SETTINGS_FILE) {
        settings.apply_file(&raw);
    }
    settings.apply_env(|key| std::env::var(key).ok())?;
    Ok(settings)
}

impl ClientSettings {
    /// Unparsable files are ignored, matching a missing file.
    pub fn apply_file(&mut self, raw: &str) {
        let Ok(file_cfg) = toml::from_str::<FileSettings>(raw) else {
            return;
        };
        if let Some(v) = file_cfg.api_url {
            self.api_url = Some(v);
        }
        if let Some(v) = file_cfg.request_timeout_seconds {
            self.request_timeout_seconds = Some(v);
        }
        if let Some(v) = file_cfg.catalog_path {
            self.catalog_path = Some(v);
        }
    }

    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SettingsError> {
        if let Some(v) = lookup("HAZARD_API_URL") {
            self.api_url = Some(v);
        }
        if let Some(v) = lookup("APP__API_URL") {
            self.api_url = Some(v);
        }

        if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECONDS") {
            let parsed = v
                .trim()
                .parse::<u64>()
                .map_err(|_| SettingsError::InvalidTimeout(v.clone()))?;
            self.request_timeout_seconds = Some(parsed);
        }

        if let Some(v) = lookup("APP__CATALOG_PATH") {
            self.catalog_path = Some(PathBuf::from(v));
        }

        Ok(())
    }

    /// Validated base URL with any trailing slash removed.
    pub fn api_url(&self) -> Result<String, SettingsError> {
        let raw = self.api_url.as_deref().unwrap_or_default();
        normalize_api_url(raw)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn load_catalog(&self) -> anyhow::Result<HazardCatalog> {
        match &self.catalog_path {
            Some(path) => load_catalog_file(path),
            None => Ok(HazardCatalog::site_default()),
        }
    }
}

pub fn load_catalog_file(path: &Path) -> anyhow::Result<HazardCatalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog '{}'", path.display()))?;
    HazardCatalog::from_toml_str(&raw)
        .with_context(|| format!("invalid catalog '{}'", path.display()))
}

fn normalize_api_url(raw: &str) -> Result<String, SettingsError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SettingsError::MissingApiUrl);
    }

    let url = Url::parse(raw).map_err(|err| SettingsError::InvalidApiUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SettingsError::UnsupportedScheme(url.scheme().to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(SettingsError::InvalidApiUrl {
            url: raw.to_string(),
            reason: "query strings and fragments are not allowed in a base URL".to_string(),
        });
    }

    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
