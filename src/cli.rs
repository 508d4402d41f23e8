use anyhow::{anyhow, Result};
use chrono::NaiveDate;

use crate::aggregate::parse_date_key;
use crate::range::DateRangeSelection;

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub selection: DateRangeSelection,
    pub json: bool,
    pub chart: bool,
    pub help: bool,
}

/// Parse flags (without the program name). `--start`/`--end` win over
/// `--range` and build a custom selection.
pub fn parse_args(args: &[String], default_range: &str) -> Result<CliArgs> {
    let mut range: Option<String> = None;
    let mut start: Option<NaiveDate> = None;
    let mut end: Option<NaiveDate> = None;
    let mut json = false;
    let mut chart = false;
    let mut help = false;

    for arg in args {
        if let Some(v) = arg.strip_prefix("--range=") {
            range = Some(v.to_string());
        } else if let Some(v) = arg.strip_prefix("--start=") {
            start = Some(parse_date_key(v)?);
        } else if let Some(v) = arg.strip_prefix("--end=") {
            end = Some(parse_date_key(v)?);
        } else if arg == "--json" {
            json = true;
        } else if arg == "--chart" {
            chart = true;
        } else if arg == "--help" || arg == "-h" {
            help = true;
        } else {
            return Err(anyhow!("unknown argument {:?}", arg));
        }
    }

    let selection = if start.is_some() || end.is_some() {
        DateRangeSelection::Custom { start, end }
    } else {
        DateRangeSelection::parse(range.as_deref().unwrap_or(default_range))?
    };

    Ok(CliArgs {
        selection,
        json,
        chart,
        help,
    })
}

pub fn usage() -> String {
    let rolling: Vec<String> = DateRangeSelection::ROLLING.iter().map(|s| s.to_string()).collect();
    format!(
        "Usage: hlpvolume [--range=<all|{}|custom:START:END>] [--start=YYYY-MM-DD] [--end=YYYY-MM-DD] [--json] [--chart]\n\
         \n\
         Environment:\n\
         \x20 DASHBOARD_SOURCE     http | file (default http)\n\
         \x20 DASHBOARD_BASE_URL   base URL for http (default http://127.0.0.1:8080/)\n\
         \x20 DASHBOARD_DATA_DIR   base directory for file (default ./data)\n\
         \x20 TOTAL_VOLUME_PATH    total volume resource (default total_volume.json)\n\
         \x20 NON_HLP_VOLUME_PATH  non-HLP volume resource (default non_hlp_volume.json)\n\
         \x20 FETCH_TIMEOUT_SECS   http timeout (default 10)\n\
         \x20 FETCH_RETRIES        extra attempts per resource (default 0)\n\
         \x20 DEFAULT_RANGE        range when no flag is given (default all)\n",
        rolling.join("|")
    )
}
