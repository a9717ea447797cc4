// tests/pipeline.rs
//
// End-to-end runs through the public API: draft files on disk, the JSON
// document store in a temp dir, and the summary/encoding guarantees.

use std::sync::Arc;

use chrono::NaiveDate;
use histral_news::config::PipelineConfig;
use histral_news::dates::{DateFormat, DateNormalizer};
use histral_news::encode::decode;
use histral_news::models::{Category, OutletCode};
use histral_news::pipeline::{OutletRun, RunReport, run_source};
use histral_news::source::{JsonDraftSource, SourceError};
use histral_news::store::json::JsonDirStore;
use histral_news::store::{AggregationStore, DocumentStore};
use histral_news::summarizer::sentences::split_sentences;
use histral_news::summarizer::{Summarizer, SummaryBudget};
use histral_news::window::TimeWindow;
use serde_json::Value;

fn window() -> TimeWindow {
    let zone = histral_news::dates::reference_zone(330).unwrap();
    TimeWindow::for_date(NaiveDate::from_ymd_opt(2024, 9, 15).unwrap(), zone, 20).unwrap()
}

fn outlet_run(store: &Arc<JsonDirStore>, source: &JsonDraftSource) -> OutletRun<JsonDirStore> {
    OutletRun::for_source(
        &PipelineConfig::default(),
        source,
        window(),
        AggregationStore::new(Arc::clone(store)),
    )
    .unwrap()
}

fn write_drafts(dir: &std::path::Path, name: &str, json: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, json).unwrap();
    path
}

const NDTV_DRAFTS: &str = r#"[
    {"title": "India win toss", "raw_date": "September 15, 2024,12:52:19",
     "raw_body": "India won the toss in Chennai. They chose to bat first on a dry pitch. The openers walked out at half past nine.",
     "raw_subheading": "Rohit calls correctly.",
     "authors": ["Sports Desk", null], "tags": ["india", "toss"],
     "source_url": "https://ndtv.example/toss"},
    {"title": "Old preview", "raw_date": "September 12, 2024,08:00:00",
     "raw_body": "A preview from earlier in the week.",
     "source_url": "https://ndtv.example/preview"},
    {"raw_date": "sometime", "raw_body": "No usable date.",
     "source_url": "https://ndtv.example/undated"}
]"#;

const FP_DRAFTS: &str = r#"[
    {"title": "Pitch report", "raw_date": "15 Sep 2024 09:15 IST",
     "raw_body": "The surface looks firm. Groundstaff expect turn later.",
     "source_url": "https://fp.example/pitch"}
]"#;

#[tokio::test]
async fn two_outlets_share_one_document_on_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonDirStore::new(tmp.path().join("store")));

    let ndtv = JsonDraftSource::new(
        write_drafts(tmp.path(), "ndtv.json", NDTV_DRAFTS),
        OutletCode::Ndtv,
        Category::Cricket,
        DateFormat::LongMonthSecondsTight,
    );
    let fp = JsonDraftSource::new(
        write_drafts(tmp.path(), "fp.json", FP_DRAFTS),
        OutletCode::Fp,
        Category::Cricket,
        DateFormat::DayShortMonth,
    );

    let ndtv_report = run_source(&ndtv, &outlet_run(&store, &ndtv)).await.unwrap();
    assert_eq!(
        ndtv_report,
        RunReport {
            received: 3,
            rejected_date: 1,
            outside_window: 1,
            assembled: 1,
            stored: true,
        }
    );
    let fp_report = run_source(&fp, &outlet_run(&store, &fp)).await.unwrap();
    assert_eq!(fp_report.assembled, 1);

    let path = tmp.path().join("store/cricket/15-9-2024_cricket.json");
    let doc: Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

    let toss = &doc["ndtv"][0];
    assert_eq!(toss["title"], "India win toss");
    assert_eq!(toss["timestamp"], "2024-09-15T12:52:19+05:30");
    assert_eq!(toss["author"], serde_json::json!(["Sports Desk"]));
    assert_eq!(toss["tags"], serde_json::json!(["india", "toss"]));
    assert_eq!(toss["src"], "https://ndtv.example/toss");
    // 112 characters at the default 0.34 share.
    let body = decode(toss["body"].as_str().unwrap());
    assert!(!body.is_empty());
    assert!(body.chars().count() <= 38);

    let pitch = &doc["fp"][0];
    assert_eq!(pitch["timestamp"], "2024-09-15T09:15:00+05:30");
    assert_eq!(pitch["title"], "Pitch report");
    assert_eq!(pitch["sub_heading"], "");
}

#[tokio::test]
async fn rerun_replaces_only_the_outlets_slice() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonDirStore::new(tmp.path().join("store")));

    let fp = JsonDraftSource::new(
        write_drafts(tmp.path(), "fp.json", FP_DRAFTS),
        OutletCode::Fp,
        Category::Cricket,
        DateFormat::DayShortMonth,
    );
    let ndtv = JsonDraftSource::new(
        write_drafts(tmp.path(), "ndtv.json", NDTV_DRAFTS),
        OutletCode::Ndtv,
        Category::Cricket,
        DateFormat::LongMonthSecondsTight,
    );
    let fp_run = outlet_run(&store, &fp);
    let ndtv_run = outlet_run(&store, &ndtv);

    run_source(&fp, &fp_run).await.unwrap();
    run_source(&ndtv, &ndtv_run).await.unwrap();
    run_source(&fp, &fp_run).await.unwrap();

    let doc = store.get("cricket", "15-9-2024_cricket").await.unwrap().unwrap();
    assert_eq!(doc.len(), 2);
    assert_eq!(doc["fp"].as_array().unwrap().len(), 1);
    assert_eq!(doc["ndtv"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn missing_draft_file_aborts_the_outlet() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Arc::new(JsonDirStore::new(tmp.path().join("store")));
    let source = JsonDraftSource::new(
        tmp.path().join("absent.json"),
        OutletCode::Isn,
        Category::Cricket,
        DateFormat::Iso8601,
    );
    let err = run_source(&source, &outlet_run(&store, &source)).await.unwrap_err();
    assert!(matches!(err, SourceError::Io { .. }));
    assert!(store.get("cricket", "15-9-2024_cricket").await.unwrap().is_none());
}

#[test]
fn documented_date_examples() {
    let normalizer = DateNormalizer::default();
    assert_eq!(
        normalizer
            .normalize_iso("September 13, 2024,12:52:19", &DateFormat::LongMonthSecondsTight)
            .as_deref(),
        Some("2024-09-13T12:52:19+05:30")
    );
    assert_eq!(
        normalizer
            .normalize_iso("15 Sep 2024 23:59 IST", &DateFormat::DayShortMonth)
            .as_deref(),
        Some("2024-09-15T23:59:00+05:30")
    );
}

#[test]
fn long_body_summary_is_whole_sentences_within_budget() {
    let topics = ["water supply", "road repairs", "school meals", "bus routes", "park lighting"];
    let body = (0..50)
        .map(|i| {
            let topic = topics[i % topics.len()];
            format!("The council met on day {i} to discuss the {topic} plan.")
        })
        .collect::<Vec<_>>()
        .join(" ");
    let len = body.chars().count();
    let budget = SummaryBudget::Fraction(0.34).resolve(&body, 1200);
    assert_eq!(budget, (len as f64 * 0.34).floor() as usize);

    let summary = Summarizer::default().summarize_with(&body, SummaryBudget::Fraction(0.34));
    assert!(summary.chars().count() <= budget);

    let originals = split_sentences(&body);
    let picked = split_sentences(&summary);
    assert!(!picked.is_empty());
    let mut cursor = 0;
    for sentence in &picked {
        let at = originals[cursor..]
            .iter()
            .position(|s| s == sentence)
            .expect("summary sentence must come from the body, in order");
        cursor += at + 1;
    }
}
