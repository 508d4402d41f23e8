use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Non-success HTTP status for a resource.
#[derive(Debug)]
pub struct HttpStatusError {
    pub url: String,
    pub status: u16,
}

impl fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GET {} returned HTTP {}", self.url, self.status)
    }
}

impl std::error::Error for HttpStatusError {}

/// Where the two JSON resources live.
#[async_trait]
pub trait Source: Send + Sync {
    /// Raw document body at a path relative to the source's base.
    async fn fetch_text(&self, path: &str) -> Result<String>;

    /// Human-readable location for logs and errors.
    fn locate(&self, path: &str) -> String;
}

pub struct HttpSource {
    client: Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base: Url, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building http client")?;
        Ok(Self { client, base })
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .with_context(|| format!("joining {:?} onto {}", path, self.base))
    }
}

#[async_trait]
impl Source for HttpSource {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let url = self.resolve(path)?;
        let resp = self.client.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        Ok(resp.text().await?)
    }

    fn locate(&self, path: &str) -> String {
        self.resolve(path)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{}{}", self.base, path))
    }
}

/// Reads the resources from a local directory.
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl Source for FileSource {
    async fn fetch_text(&self, path: &str) -> Result<String> {
        let full = self.dir.join(path);
        tokio::fs::read_to_string(&full)
            .await
            .with_context(|| format!("reading {}", full.display()))
    }

    fn locate(&self, path: &str) -> String {
        self.dir.join(path).display().to_string()
    }
}
