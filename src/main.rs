use anyhow::Result;
use chrono::Utc;
use hlpvolume::cli::{parse_args, usage};
use hlpvolume::config::Config;
use hlpvolume::dashboard::Dashboard;
use hlpvolume::feed::retry::RetryConfig;
use hlpvolume::feed::{source_from_config, Resources};
use hlpvolume::logging::{log, obj, v_str, Domain, Level};
use hlpvolume::present::{render_dashboard, render_empty, render_json};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&argv, &cfg.default_range) {
        Ok(a) => a,
        Err(err) => {
            eprintln!("{:#}", err);
            eprint!("{}", usage());
            std::process::exit(2);
        }
    };
    if args.help {
        print!("{}", usage());
        return Ok(());
    }

    let source = source_from_config(&cfg)?;
    let resources = Resources::from_config(&cfg);
    let retry = RetryConfig::with_retries(cfg.fetch_retries);

    log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("total_volume", v_str(&source.locate(&resources.total_volume))),
            ("non_hlp_volume", v_str(&source.locate(&resources.non_hlp_volume))),
            ("range", v_str(&args.selection.to_string())),
            ("retries", json!(cfg.fetch_retries)),
        ]),
    );

    let mut dashboard = Dashboard::load(source.as_ref(), &resources, &retry).await;
    if dashboard.failed() {
        print!("{}", render_empty(args.selection));
        std::process::exit(1);
    }

    // "now" is taken once per render
    let today = Utc::now().date_naive();
    let records = dashboard.view(args.selection, today);

    if args.json {
        println!("{}", render_json(args.selection, records)?);
    } else {
        print!("{}", render_dashboard(args.selection, records, args.chart));
    }
    Ok(())
}
