//! One outlet's run: normalize, filter, assemble, store.
//!
//! ```text
//! drafts ─► DateNormalizer ─► TimeWindow ─► ArticleAssembler ─► AggregationStore
//!              │ None              │ outside       (× workers)
//!              ▼                   ▼
//!          rejected_date     outside_window
//! ```
//!
//! Assembly is CPU-bound and side-effect free, so articles are summarized on
//! the blocking pool `workers` at a time and put back in draft order before
//! the single store write. The pipeline takes no locks of its own; the only
//! shared state is the store document, guarded by its merge primitive.

use chrono::{DateTime, FixedOffset};
use futures::stream::{self, StreamExt};
use std::fmt;
use tracing::{debug, error, info, instrument, warn};

use crate::assembler::{ArticleAssembler, Rejection};
use crate::config::{ConfigError, PipelineConfig};
use crate::dates::{DateFormat, DateNormalizer};
use crate::models::{ArticleDraft, CanonicalArticle, Category, OutletCode};
use crate::source::{SourceAdapter, SourceError};
use crate::store::{AggregationStore, DocumentStore};
use crate::summarizer::Summarizer;
use crate::utils::truncate_for_log;
use crate::window::TimeWindow;

/// Everything a run for one `(outlet, category)` needs, fixed up front.
#[derive(Debug)]
pub struct OutletRun<S> {
    pub outlet: OutletCode,
    pub category: Category,
    pub date_format: DateFormat,
    pub normalizer: DateNormalizer,
    pub window: TimeWindow,
    pub assembler: ArticleAssembler,
    pub workers: usize,
    pub store: AggregationStore<S>,
}

impl<S: DocumentStore> OutletRun<S> {
    /// Build a run from `config`, applying the outlet's budget overrides.
    pub fn from_config(
        config: &PipelineConfig,
        outlet: OutletCode,
        category: Category,
        date_format: DateFormat,
        window: TimeWindow,
        store: AggregationStore<S>,
    ) -> Result<Self, ConfigError> {
        let zone = config.reference_zone().ok_or_else(|| ConfigError::Invalid {
            field: "reference_offset_minutes",
            reason: format!("{} is not a valid UTC offset", config.reference_offset_minutes),
        })?;
        let overrides = config.outlet(outlet);
        let body_budget = overrides
            .and_then(|o| o.body_budget)
            .unwrap_or(config.body_budget);
        let subheading_budget = overrides
            .and_then(|o| o.subheading_budget)
            .unwrap_or(config.subheading_budget);

        Ok(Self {
            outlet,
            category,
            date_format,
            normalizer: DateNormalizer::new(zone),
            window,
            assembler: ArticleAssembler::new(
                Summarizer::new(config.summary_cap, config.initial_sentences),
                body_budget,
                subheading_budget,
            ),
            workers: config.workers.max(1),
            store,
        })
    }

    /// Build the run for whatever outlet, category and date layout
    /// `adapter` declares.
    pub fn for_source<A: SourceAdapter>(
        config: &PipelineConfig,
        adapter: &A,
        window: TimeWindow,
        store: AggregationStore<S>,
    ) -> Result<Self, ConfigError> {
        Self::from_config(
            config,
            adapter.outlet(),
            adapter.category(),
            adapter.date_format().clone(),
            window,
            store,
        )
    }

    fn serves<A: SourceAdapter>(&self, adapter: &A) -> bool {
        adapter.outlet() == self.outlet
            && adapter.category() == self.category
            && *adapter.date_format() == self.date_format
    }
}

/// What happened to one outlet's drafts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub received: usize,
    pub rejected_date: usize,
    pub outside_window: usize,
    pub assembled: usize,
    /// The batch reached the store.
    pub stored: bool,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "received={} rejected_date={} outside_window={} assembled={} stored={}",
            self.received, self.rejected_date, self.outside_window, self.assembled, self.stored
        )
    }
}

/// Run the pipeline over `drafts` and write the batch for the window's date.
///
/// Never fails: every per-draft problem is counted in the report, and a store
/// failure leaves `stored == false`.
#[instrument(
    level = "info",
    skip_all,
    fields(outlet = %run.outlet, category = %run.category, window = %run.window)
)]
pub async fn run_outlet<S: DocumentStore>(
    drafts: Vec<ArticleDraft>,
    run: &OutletRun<S>,
) -> RunReport {
    let mut report = RunReport {
        received: drafts.len(),
        ..RunReport::default()
    };

    let mut accepted = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let Some(ts) = run.normalizer.normalize(&draft.raw_date, &run.date_format) else {
            let rejection = Rejection::UnparseableDate { raw: draft.raw_date };
            warn!(url = %draft.source_url, error = %rejection, "Draft rejected");
            report.rejected_date += 1;
            continue;
        };
        if !run.window.contains(&ts) {
            debug!(url = %draft.source_url, timestamp = %ts, "Outside publication window");
            report.outside_window += 1;
            continue;
        }
        accepted.push((draft, ts));
    }

    info!(accepted = accepted.len(), workers = run.workers, "Assembling articles");
    let records = assemble_all(accepted, run.assembler, run.workers).await;
    report.assembled = records.len();

    report.stored = run
        .store
        .upsert(run.window.date(), run.category, run.outlet, &records)
        .await
        .is_ok();

    info!(%report, "Outlet run complete");
    report
}

/// Fetch the adapter's drafts and run them.
///
/// Failing to obtain the drafts is the one error that aborts an outlet's run.
/// An adapter that declares a different outlet, category or date layout than
/// `run` is refused before anything is read.
pub async fn run_source<A, S>(adapter: &A, run: &OutletRun<S>) -> Result<RunReport, SourceError>
where
    A: SourceAdapter,
    S: DocumentStore,
{
    if !run.serves(adapter) {
        let err = SourceError::Mismatch {
            adapter: format!("{}/{}", adapter.outlet(), adapter.category()),
            run: format!("{}/{}", run.outlet, run.category),
        };
        error!(error = %err, "Refusing to run adapter");
        return Err(err);
    }
    let drafts = adapter.drafts().await?;
    Ok(run_outlet(drafts, run).await)
}

async fn assemble_all(
    accepted: Vec<(ArticleDraft, DateTime<FixedOffset>)>,
    assembler: ArticleAssembler,
    workers: usize,
) -> Vec<CanonicalArticle> {
    let mut results: Vec<(usize, CanonicalArticle)> = stream::iter(accepted.into_iter().enumerate())
        .map(|(i, (draft, ts))| async move {
            let url = draft.source_url.clone();
            match tokio::task::spawn_blocking(move || assembler.assemble_dated(draft, ts)).await {
                Ok(article) => {
                    debug!(
                        index = i,
                        title = %truncate_for_log(&article.title, 80),
                        "Assembled article"
                    );
                    Some((i, article))
                }
                Err(e) => {
                    error!(index = i, %url, error = %e, "Assembly task failed; skipping article");
                    None
                }
            }
        })
        .buffer_unordered(workers.max(1))
        .filter_map(|r| async move { r })
        .collect()
        .await;

    results.sort_by_key(|(i, _)| *i);
    results.into_iter().map(|(_, article)| article).collect()
}
