use hlpvolume::config::Config;
use hlpvolume::dashboard::load_series;
use hlpvolume::data::{build_manifest, default_manifest_path, write_manifest};
use hlpvolume::feed::retry::RetryConfig;
use hlpvolume::feed::{source_from_config, Resources};
use hlpvolume::logging::ts_now;
use serde_json::json;
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let out_base = env::args()
        .nth(1)
        .unwrap_or_else(|| "out/hlp_volume".to_string());
    let cfg = Config::from_env();

    let source = match source_from_config(&cfg) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("bad source config: {:#}", err);
            std::process::exit(1);
        }
    };
    let resources = Resources::from_config(&cfg);
    let retry = RetryConfig::with_retries(cfg.fetch_retries);

    let (series, report) = match load_series(source.as_ref(), &resources, &retry).await {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("load failed: {:#}", err);
            std::process::exit(2);
        }
    };

    let manifest = match build_manifest(&series, &report, ts_now()) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("manifest failed: {:#}", err);
            std::process::exit(3);
        }
    };

    let out_path = default_manifest_path(PathBuf::from(&out_base).as_path());
    let payload = json!({
        "manifest": manifest,
        "report": report,
    });
    let body = match serde_json::to_string_pretty(&payload) {
        Ok(b) => b,
        Err(err) => {
            eprintln!("encode failed: {}", err);
            std::process::exit(4);
        }
    };
    if let Err(err) = write_manifest(&out_path, &body) {
        eprintln!("failed to write manifest: {:#}", err);
        std::process::exit(4);
    }
    println!("wrote manifest {} ({} records)", out_path.display(), series.len());
}
