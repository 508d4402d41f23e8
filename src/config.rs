use anyhow::{anyhow, Result};
use std::path::PathBuf;
use url::Url;

use crate::logging::{log, obj, v_str, Domain, Level};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Http,
    File,
}

impl SourceKind {
    /// Case-insensitive `http` / `file`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "http" => Some(SourceKind::Http),
            "file" => Some(SourceKind::File),
            _ => None,
        }
    }
}

/// Unset means http; anything unrecognised falls back to http with a warning.
fn source_from_env() -> SourceKind {
    let raw = match std::env::var("DASHBOARD_SOURCE") {
        Ok(raw) => raw,
        Err(_) => return SourceKind::Http,
    };
    SourceKind::parse(&raw).unwrap_or_else(|| {
        log(
            Level::Warn,
            Domain::System,
            "unknown_source",
            obj(&[
                ("msg", v_str("unrecognised DASHBOARD_SOURCE, using http")),
                ("value", v_str(&raw)),
            ]),
        );
        SourceKind::Http
    })
}

#[derive(Clone, Debug)]
pub struct Config {
    pub source: SourceKind,
    pub base_url: String,
    pub data_dir: PathBuf,
    pub total_volume_path: String,
    pub non_hlp_volume_path: String,
    pub fetch_timeout_secs: u64,
    /// Extra attempts per resource; 0 means a single try.
    pub fetch_retries: u32,
    pub default_range: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            source: source_from_env(),
            base_url: std::env::var("DASHBOARD_BASE_URL").unwrap_or_else(|_| "http://127.0.0.1:8080/".to_string()),
            data_dir: std::env::var("DASHBOARD_DATA_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./data")),
            total_volume_path: std::env::var("TOTAL_VOLUME_PATH").unwrap_or_else(|_| "total_volume.json".to_string()),
            non_hlp_volume_path: std::env::var("NON_HLP_VOLUME_PATH").unwrap_or_else(|_| "non_hlp_volume.json".to_string()),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(10),
            fetch_retries: std::env::var("FETCH_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(0),
            default_range: std::env::var("DEFAULT_RANGE").unwrap_or_else(|_| "all".to_string()),
        }
    }

    /// Base URL with a trailing slash so relative paths join under it.
    pub fn base(&self) -> Result<Url> {
        let mut raw = self.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| anyhow!("invalid DASHBOARD_BASE_URL {:?}: {}", self.base_url, e))
    }
}
