//! # Histral News
//!
//! Turns one outlet's raw article drafts into canonical records and merges
//! them into the shared per-day, per-category document store.
//!
//! ## Usage
//!
//! ```sh
//! histral_news --drafts ./drafts/ndtv.json --outlet ndtv --store-dir ./store
//! ```
//!
//! ## Pipeline
//!
//! 1. **Load**: read the configuration and the outlet's draft file
//! 2. **Normalize**: parse publication dates into the reference zone
//! 3. **Filter**: keep drafts inside the trailing 24 hour window
//! 4. **Assemble**: summarize and encode (parallel, `workers` at a time)
//! 5. **Store**: replace the outlet's slice of today's document

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use histral_news::config::PipelineConfig;
use histral_news::pipeline::{OutletRun, run_source};
use histral_news::source::JsonDraftSource;
use histral_news::store::AggregationStore;
use histral_news::store::json::JsonDirStore;
use histral_news::utils::ensure_writable_dir;
use histral_news::window::TimeWindow;

mod cli;

use cli::Cli;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("histral_news starting up");

    let args = Cli::parse();
    debug!(?args.drafts, %args.outlet, ?args.store_dir, "Parsed CLI arguments");

    let config = PipelineConfig::load(&args.config).await?;

    // CLI flags win over the outlet's config entry.
    let entry = config.outlet(args.outlet);
    let Some(category) = args.category.or(entry.map(|o| o.category)) else {
        error!(outlet = %args.outlet, "No category given and none configured for outlet");
        return Err(format!("no category for outlet {}", args.outlet).into());
    };
    let Some(date_format) = args
        .date_format
        .clone()
        .or_else(|| entry.map(|o| o.date_format.clone()))
    else {
        error!(outlet = %args.outlet, "No date format given and none configured for outlet");
        return Err(format!("no date format for outlet {}", args.outlet).into());
    };

    if let Err(e) = ensure_writable_dir(&args.store_dir).await {
        error!(
            path = %args.store_dir,
            error = %e,
            "Store directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let zone = config
        .reference_zone()
        .ok_or("reference offset out of range")?;
    let window = TimeWindow::current(zone, config.window_anchor_hour)
        .ok_or("window anchor hour out of range")?;
    info!(%window, date = %window.date(), "Publication window");

    let source = JsonDraftSource::new(&args.drafts, args.outlet, category, date_format);
    let store = AggregationStore::new(Arc::new(JsonDirStore::new(&args.store_dir)));
    let run = OutletRun::for_source(&config, &source, window, store)?;

    let report = match run_source(&source, &run).await {
        Ok(report) => report,
        Err(e) => {
            error!(outlet = %args.outlet, error = %e, "Unable to obtain drafts; run aborted");
            return Err(e.into());
        }
    };
    if !report.stored {
        warn!(outlet = %args.outlet, "Batch was not stored; it is lost for this run");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        received = report.received,
        assembled = report.assembled,
        "Execution complete"
    );

    Ok(())
}
