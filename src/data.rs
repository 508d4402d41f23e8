use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::{AggregateReport, ClampedDay};
use crate::types::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

/// Calendar hole between two consecutive records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub after: NaiveDate,
    pub before: NaiveDate,
    pub missing_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesManifest {
    pub records: usize,
    pub bounds: Option<DateBounds>,
    pub gaps: Vec<Gap>,
    pub clamped: Vec<ClampedDay>,
    pub only_total: usize,
    pub only_non_hlp: usize,
    pub hash_sha256: String,
    pub generated_at: String,
}

pub fn date_bounds(series: &Series) -> Option<DateBounds> {
    match (series.first(), series.last()) {
        (Some(first), Some(last)) => Some(DateBounds {
            min: first.date,
            max: last.date,
        }),
        _ => None,
    }
}

pub fn find_gaps(series: &Series) -> Vec<Gap> {
    series
        .records()
        .windows(2)
        .filter_map(|w| {
            let step = (w[1].date - w[0].date).num_days();
            (step > 1).then(|| Gap {
                after: w[0].date,
                before: w[1].date,
                missing_days: step - 1,
            })
        })
        .collect()
}

/// SHA-256 over the series' JSON rendering.
pub fn series_digest(series: &Series) -> Result<String> {
    let bytes = serde_json::to_vec(series)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(hex::encode(hasher.finalize()))
}

pub fn build_manifest(series: &Series, report: &AggregateReport, generated_at: String) -> Result<SeriesManifest> {
    Ok(SeriesManifest {
        records: series.len(),
        bounds: date_bounds(series),
        gaps: find_gaps(series),
        clamped: report.clamped.clone(),
        only_total: report.only_total.len(),
        only_non_hlp: report.only_non_hlp.len(),
        hash_sha256: series_digest(series)?,
        generated_at,
    })
}

pub fn default_manifest_path(out_base: &Path) -> PathBuf {
    let mut p = out_base.to_path_buf();
    let fname = out_base
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("series");
    p.set_file_name(format!("{}.manifest.json", fname));
    p
}

/// Write `body` to `path`, creating missing parent directories.
pub fn write_manifest(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}
