//! Pipeline configuration loaded from YAML.
//!
//! Every field has a default, so a missing file or a partial file is fine:
//!
//! ```yaml
//! reference_offset_minutes: 330   # Asia/Kolkata
//! window_anchor_hour: 20
//! summary_cap: 1200
//! initial_sentences: 6
//! body_budget: { fraction: 0.34 }
//! subheading_budget: { fraction: 0.8 }
//! workers: 12
//! outlets:
//!   - code: ndtv
//!     category: cricket
//!     date_format: iso8601
//!     body_budget: { chars: 1000 }
//! ```

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

use crate::dates::{DEFAULT_REFERENCE_OFFSET_MINUTES, DateFormat, reference_zone};
use crate::models::{Category, OutletCode};
use crate::summarizer::{DEFAULT_CAP, DEFAULT_SENTENCES, SummaryBudget};
use crate::window::DEFAULT_ANCHOR_HOUR;

/// Default body budget: a third of the article.
pub const DEFAULT_BODY_FRACTION: f64 = 0.34;
pub const DEFAULT_SUBHEADING_FRACTION: f64 = 0.8;
pub const DEFAULT_WORKERS: usize = 12;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Per-outlet settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutletConfig {
    pub code: OutletCode,
    pub category: Category,
    pub date_format: DateFormat,
    #[serde(default)]
    pub body_budget: Option<SummaryBudget>,
    #[serde(default)]
    pub subheading_budget: Option<SummaryBudget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// UTC offset of the reference zone, in minutes.
    pub reference_offset_minutes: i32,
    pub window_anchor_hour: u32,
    pub summary_cap: usize,
    pub initial_sentences: usize,
    pub body_budget: SummaryBudget,
    pub subheading_budget: SummaryBudget,
    /// Articles summarized concurrently.
    pub workers: usize,
    pub outlets: Vec<OutletConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            reference_offset_minutes: DEFAULT_REFERENCE_OFFSET_MINUTES,
            window_anchor_hour: DEFAULT_ANCHOR_HOUR,
            summary_cap: DEFAULT_CAP,
            initial_sentences: DEFAULT_SENTENCES,
            body_budget: SummaryBudget::Fraction(DEFAULT_BODY_FRACTION),
            subheading_budget: SummaryBudget::Fraction(DEFAULT_SUBHEADING_FRACTION),
            workers: DEFAULT_WORKERS,
            outlets: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`; a missing file yields the defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(raw) => {
                let config = Self::from_yaml(&raw)?;
                info!(outlets = config.outlets.len(), "Loaded configuration");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No configuration file; using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reference_zone().is_none() {
            return Err(ConfigError::Invalid {
                field: "reference_offset_minutes",
                reason: format!("{} is not a valid UTC offset", self.reference_offset_minutes),
            });
        }
        if self.window_anchor_hour > 23 {
            return Err(ConfigError::Invalid {
                field: "window_anchor_hour",
                reason: format!("{} is not an hour of the day", self.window_anchor_hour),
            });
        }
        if self.summary_cap == 0 {
            return Err(ConfigError::Invalid {
                field: "summary_cap",
                reason: "must be positive".to_string(),
            });
        }
        let budgets = [
            Some(self.body_budget),
            Some(self.subheading_budget),
        ]
        .into_iter()
        .chain(self.outlets.iter().flat_map(|o| [o.body_budget, o.subheading_budget]))
        .flatten();
        for budget in budgets {
            if let SummaryBudget::Fraction(share) = budget {
                if !(share.is_finite() && share > 0.0) {
                    return Err(ConfigError::Invalid {
                        field: "budget",
                        reason: format!("fraction {share} must be positive"),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn reference_zone(&self) -> Option<FixedOffset> {
        reference_zone(self.reference_offset_minutes)
    }

    /// Settings registered for `code`, if any.
    pub fn outlet(&self, code: OutletCode) -> Option<&OutletConfig> {
        self.outlets.iter().find(|o| o.code == code)
    }
}
