//! Structured JSON-lines logging.
//!
//! Every record carries `ts`, `run_id`, `seq`, `lvl`, `component`, `event`
//! and a `data` object. Records go to stderr so stdout stays free for the
//! rendered dashboard, and are appended to `LOG_FILE` when it is set.
//!
//! Filtering:
//! - `LOG_LEVEL`: minimum level (trace, debug, info, warn, error)
//! - `LOG_DOMAINS`: comma-separated domains, or `all`
//!
//! Both are read once, with `RUN_ID` and `LOG_FILE`, on the first record.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

// =============================================================================
// Log Levels
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl Level {
    pub fn from_env() -> Self {
        Self::parse(std::env::var("LOG_LEVEL").ok().as_deref())
    }

    /// Unset or unrecognised values mean `info`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("trace") => Level::Trace,
            Some("debug") => Level::Debug,
            Some("info") => Level::Info,
            Some("warn") => Level::Warn,
            Some("error") => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

// =============================================================================
// Log Domains
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Feed,      // Resource fetches and decoding
    Aggregate, // Date merge, clamping
    Range,     // Window selection
    Present,   // Rendering
    System,    // Startup, config, shutdown
    Profile,   // Timing scopes
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Feed => "feed",
            Domain::Aggregate => "aggregate",
            Domain::Range => "range",
            Domain::Present => "present",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }

    /// `None` lets every domain through.
    pub fn enabled_in(&self, filter: Option<&[String]>) -> bool {
        match filter {
            None => true,
            Some(domains) => domains.iter().any(|d| d == self.as_str()),
        }
    }
}

/// Parse `LOG_DOMAINS`; unset or `all` disables filtering.
pub fn domain_filter(raw: Option<&str>) -> Option<Vec<String>> {
    match raw.map(str::trim) {
        None | Some("all") => None,
        Some(list) => Some(
            list.split(',')
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .collect(),
        ),
    }
}

// =============================================================================
// Run context
// =============================================================================

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);
static RUN_CONTEXT: OnceLock<RunContext> = OnceLock::new();

fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst)
}

/// Resolved once per process; filters are not re-read per record.
struct RunContext {
    run_id: String,
    min_level: Level,
    domains: Option<Vec<String>>,
    file: Option<Mutex<BufWriter<File>>>,
}

fn ensure_run_context() -> &'static RunContext {
    RUN_CONTEXT.get_or_init(|| {
        let run_id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("r-{}-{}", ts_epoch_ms(), process::id()));
        let file = std::env::var("LOG_FILE").ok().and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(f) => Some(Mutex::new(BufWriter::new(f))),
                Err(err) => {
                    eprintln!("[log] failed to open {}: {}", path, err);
                    None
                }
            }
        });
        RunContext {
            run_id,
            min_level: Level::from_env(),
            domains: domain_filter(std::env::var("LOG_DOMAINS").ok().as_deref()),
            file,
        }
    })
}

// =============================================================================
// Core logging functions
// =============================================================================

/// RFC3339 timestamp with milliseconds
pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

/// Emit a structured log entry
pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    let ctx = ensure_run_context();
    if level < ctx.min_level || !domain.enabled_in(ctx.domains.as_deref()) {
        return;
    }
    let line = format_record(level, domain, event, fields);
    if let Some(file) = &ctx.file {
        if let Ok(mut w) = file.lock() {
            let _ = writeln!(w, "{}", line);
            let _ = w.flush();
        }
    }
    eprintln!("{}", line);
}

fn format_record(level: Level, domain: Domain, event: &str, mut fields: Map<String, Value>) -> String {
    let ctx = ensure_run_context();
    let msg = fields.remove("msg").unwrap_or(Value::String(String::new()));
    let mut entry = Map::new();
    entry.insert("ts".to_string(), json!(ts_now()));
    entry.insert("run_id".to_string(), json!(ctx.run_id.clone()));
    entry.insert("seq".to_string(), json!(next_seq()));
    entry.insert("lvl".to_string(), json!(level.as_str().to_uppercase()));
    entry.insert("component".to_string(), json!(domain.as_str()));
    entry.insert("event".to_string(), json!(event));
    entry.insert("msg".to_string(), msg);
    entry.insert("data".to_string(), Value::Object(fields));
    Value::Object(entry).to_string()
}

// =============================================================================
// Domain-Specific Logging Helpers
// =============================================================================

pub fn log_fetch(resource: &str, location: &str, points: usize, elapsed_ms: f64) {
    log(
        Level::Debug,
        Domain::Feed,
        "fetched",
        obj(&[
            ("resource", v_str(resource)),
            ("location", v_str(location)),
            ("points", json!(points)),
            ("elapsed_ms", v_num(elapsed_ms)),
        ]),
    );
}

/// The load routine's single failure path.
pub fn log_load_failure(err: &anyhow::Error) {
    log(
        Level::Error,
        Domain::Feed,
        "load_failed",
        obj(&[
            ("msg", v_str("failed to load volume data")),
            ("error", v_str(&format!("{:#}", err))),
        ]),
    );
}

/// A date whose non-HLP share exceeded the total and was capped at 100%.
pub fn log_clamped(date: NaiveDate, raw_pct: f64, total: f64, non_hlp: f64) {
    log(
        Level::Warn,
        Domain::Aggregate,
        "share_clamped",
        obj(&[
            ("date", v_str(&date.to_string())),
            ("raw_pct", v_num(raw_pct)),
            ("total_volume", v_num(total)),
            ("non_hlp_volume", v_num(non_hlp)),
        ]),
    );
}

pub fn log_aggregate_summary(
    records: usize,
    volume_points: usize,
    non_hlp_points: usize,
    only_total: usize,
    only_non_hlp: usize,
    clamped: usize,
) {
    log(
        Level::Info,
        Domain::Aggregate,
        "merged",
        obj(&[
            ("records", json!(records)),
            ("volume_points", json!(volume_points)),
            ("non_hlp_points", json!(non_hlp_points)),
            ("only_total", json!(only_total)),
            ("only_non_hlp", json!(only_non_hlp)),
            ("clamped", json!(clamped)),
        ]),
    );
}

/// One rendered view; `format` is `table` or `json`.
pub fn log_render(format: &str, selection: &str, rows: usize, bytes: usize) {
    log(
        Level::Debug,
        Domain::Present,
        "rendered",
        obj(&[
            ("format", v_str(format)),
            ("selection", v_str(selection)),
            ("rows", json!(rows)),
            ("bytes", json!(bytes)),
        ]),
    );
}

pub fn log_selection(selection: &str, kept: usize, of: usize) {
    log(
        Level::Debug,
        Domain::Range,
        "projected",
        obj(&[
            ("selection", v_str(selection)),
            ("kept", json!(kept)),
            ("of", json!(of)),
        ]),
    );
}

// =============================================================================
// Utility Functions
// =============================================================================

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    map
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

// =============================================================================
// Profiling Scope
// =============================================================================

/// Emits structured timing on drop.
pub struct ProfileScope {
    label: &'static str,
    started: Instant,
}

impl ProfileScope {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            started: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        log(
            Level::Trace,
            Domain::Profile,
            "profile",
            obj(&[
                ("label", v_str(self.label)),
                ("elapsed_ms", v_num(self.elapsed_ms())),
            ]),
        );
    }
}
