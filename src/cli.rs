//! Command-line interface for `histral_news`.
//!
//! One invocation processes one outlet's draft file. Directories and the
//! config path can also come from the environment.

use clap::Parser;

use histral_news::dates::DateFormat;
use histral_news::models::{Category, OutletCode};

/// Summarize one outlet's drafts into the daily aggregation store.
///
/// # Examples
///
/// ```sh
/// # Category and date format taken from the outlet's config entry
/// histral_news --drafts ./drafts/ndtv.json --outlet ndtv -s ./store
///
/// # Everything on the command line
/// histral_news --drafts hindu.json --outlet hindu --category bharat \
///     --date-format day_short_month --store-dir ./store
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON array of article drafts produced by the outlet's extractor
    #[arg(short, long)]
    pub drafts: String,

    /// Outlet code (fp, ndtv, hindu, isn, ys)
    #[arg(short, long)]
    pub outlet: OutletCode,

    /// Category collection; overrides the outlet's config entry
    #[arg(long)]
    pub category: Option<Category>,

    /// Date layout name (e.g. day_short_month, iso8601) or a strftime pattern
    #[arg(long)]
    pub date_format: Option<DateFormat>,

    /// Root directory of the document store
    #[arg(short, long, env = "HISTRAL_STORE_DIR")]
    pub store_dir: String,

    /// Path to the YAML configuration file
    #[arg(short, long, env = "HISTRAL_CONFIG", default_value = "config.yaml")]
    pub config: String,
}
