//! Loading of the two volume resources.
//!
//! Both documents are requested together and joined; the first failure
//! fails the whole load and no partial data is returned.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::config::{Config, SourceKind};
use crate::logging::{log_fetch, ProfileScope};
use crate::types::{ChartPayload, RawNonHlpPoint, RawVolumePoint};

pub mod retry;
pub mod source;

use retry::{is_retryable, retry_async_if, RetryConfig};
pub use source::{FileSource, HttpSource, HttpStatusError, Source};

/// Both raw series, decoded.
#[derive(Debug, Clone, Default)]
pub struct RawSeries {
    pub volume: Vec<RawVolumePoint>,
    pub non_hlp: Vec<RawNonHlpPoint>,
}

/// Resource paths relative to a source's base.
#[derive(Debug, Clone)]
pub struct Resources {
    pub total_volume: String,
    pub non_hlp_volume: String,
}

impl Resources {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            total_volume: cfg.total_volume_path.clone(),
            non_hlp_volume: cfg.non_hlp_volume_path.clone(),
        }
    }
}

pub fn source_from_config(cfg: &Config) -> Result<Box<dyn Source>> {
    match cfg.source {
        SourceKind::Http => Ok(Box::new(HttpSource::new(cfg.base()?, cfg.fetch_timeout_secs)?)),
        SourceKind::File => Ok(Box::new(FileSource::new(cfg.data_dir.clone()))),
    }
}

pub fn decode<T: DeserializeOwned>(resource: &str, body: &str) -> Result<Vec<T>> {
    let payload: ChartPayload<T> =
        serde_json::from_str(body).with_context(|| format!("decoding {}", resource))?;
    Ok(payload.chart_data)
}

async fn fetch_series<T: DeserializeOwned>(
    source: &dyn Source,
    resource: &str,
    path: &str,
    retry: &RetryConfig,
) -> Result<Vec<T>> {
    let scope = ProfileScope::new("fetch_series");
    let body = retry_async_if(retry, resource, is_retryable, || source.fetch_text(path))
        .await
        .with_context(|| format!("fetching {} from {}", resource, source.locate(path)))?;
    let points = decode::<T>(resource, &body)?;
    log_fetch(resource, &source.locate(path), points.len(), scope.elapsed_ms());
    Ok(points)
}

/// Fetch both series concurrently; fails if either fails.
pub async fn load(source: &dyn Source, resources: &Resources, retry: &RetryConfig) -> Result<RawSeries> {
    let (volume, non_hlp) = tokio::try_join!(
        fetch_series::<RawVolumePoint>(source, "total_volume", &resources.total_volume, retry),
        fetch_series::<RawNonHlpPoint>(source, "non_hlp_volume", &resources.non_hlp_volume, retry),
    )?;
    Ok(RawSeries { volume, non_hlp })
}
