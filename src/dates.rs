//! Date normalization for source-specific publication strings.
//!
//! Every outlet prints its dates differently. [`DateNormalizer`] turns them
//! into timezone-aware timestamps:
//!
//! - trailing timezone labels such as `IST` are stripped before parsing
//! - strings without an offset are localized to the reference zone
//! - ISO strings that already carry an offset keep it untouched
//! - date-only formats resolve to midnight in the reference zone
//!
//! Failures never escape: [`DateNormalizer::normalize`] returns `None`.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, SubsecRound, TimeZone,
    Utc,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::models::TIMESTAMP_FORMAT;

/// Asia/Kolkata, the zone all outlets publish in.
pub const DEFAULT_REFERENCE_OFFSET_MINUTES: i32 = 330;

static TRAILING_TZ_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<rest>.*?[^A-Za-z])\s*(?P<label>[A-Z]{2,5})$").unwrap());

/// ISO layouts tried after RFC 3339 fails.
const ISO_OFFSET_LAYOUTS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];
const ISO_NAIVE_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// The date layouts used by the supported outlets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFormat {
    /// `September 13, 2024,12:52:19`
    LongMonthSecondsTight,
    /// `September 13, 2024, 12:52:19`
    LongMonthSeconds,
    /// `September 13, 2024 4:05 PM`
    LongMonthMeridiem,
    /// `15 Sep 2024 23:59`
    DayShortMonth,
    /// `Monday September 16 2024`, no time of day.
    WeekdayLongMonth,
    /// `Sep 16, 2024`, no time of day.
    ShortMonthDate,
    /// ISO 8601 / RFC 3339. An embedded offset is preserved.
    Iso8601,
    /// Any chrono strftime layout.
    Custom {
        pattern: String,
        #[serde(default)]
        date_only: bool,
    },
}

impl DateFormat {
    /// strftime layout and whether it lacks a time of day.
    fn layout(&self) -> Option<(&str, bool)> {
        match self {
            DateFormat::LongMonthSecondsTight => Some(("%B %d, %Y,%H:%M:%S", false)),
            DateFormat::LongMonthSeconds => Some(("%B %d, %Y, %H:%M:%S", false)),
            DateFormat::LongMonthMeridiem => Some(("%B %d, %Y %I:%M %p", false)),
            DateFormat::DayShortMonth => Some(("%d %b %Y %H:%M", false)),
            DateFormat::WeekdayLongMonth => Some(("%A %B %d %Y", true)),
            DateFormat::ShortMonthDate => Some(("%b %d, %Y", true)),
            DateFormat::Iso8601 => None,
            DateFormat::Custom { pattern, date_only } => Some((pattern.as_str(), *date_only)),
        }
    }
}

impl FromStr for DateFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "long_month_seconds_tight" => Ok(DateFormat::LongMonthSecondsTight),
            "long_month_seconds" => Ok(DateFormat::LongMonthSeconds),
            "long_month_meridiem" => Ok(DateFormat::LongMonthMeridiem),
            "day_short_month" => Ok(DateFormat::DayShortMonth),
            "weekday_long_month" => Ok(DateFormat::WeekdayLongMonth),
            "short_month_date" => Ok(DateFormat::ShortMonthDate),
            "iso8601" | "iso" => Ok(DateFormat::Iso8601),
            other if other.contains('%') => Ok(DateFormat::Custom {
                pattern: other.to_string(),
                date_only: !(other.contains("%H") || other.contains("%I") || other.contains("%T")),
            }),
            other => Err(format!("unknown date format '{other}'")),
        }
    }
}

/// Removes one trailing timezone label (`IST`, `GMT`, ...). `AM`/`PM` stay.
pub fn strip_timezone_label(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(caps) = TRAILING_TZ_LABEL.captures(trimmed) {
        let label = caps.name("label").map(|m| m.as_str()).unwrap_or_default();
        if label != "AM" && label != "PM" {
            if let Some(rest) = caps.name("rest") {
                return rest.as_str().trim();
            }
        }
    }
    trimmed
}

/// Parses source date strings into timestamps in a fixed reference zone.
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    zone: FixedOffset,
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(reference_zone(DEFAULT_REFERENCE_OFFSET_MINUTES).unwrap_or(Utc.fix()))
    }
}

impl DateNormalizer {
    pub fn new(zone: FixedOffset) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> FixedOffset {
        self.zone
    }

    /// Parse `raw` with `format`. Returns `None` on any failure.
    pub fn normalize(&self, raw: &str, format: &DateFormat) -> Option<DateTime<FixedOffset>> {
        let parsed = match format.layout() {
            None => self.parse_iso(raw.trim()),
            Some((layout, date_only)) => {
                self.parse_layout(strip_timezone_label(raw), layout, date_only)
            }
        };
        if parsed.is_none() {
            debug!(raw, ?format, "Date did not match source layout");
        }
        parsed.map(|ts| ts.trunc_subsecs(0))
    }

    /// Same as [`normalize`](Self::normalize), rendered as an ISO 8601 string.
    pub fn normalize_iso(&self, raw: &str, format: &DateFormat) -> Option<String> {
        self.normalize(raw, format)
            .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
    }

    fn parse_layout(
        &self,
        raw: &str,
        layout: &str,
        date_only: bool,
    ) -> Option<DateTime<FixedOffset>> {
        if raw.is_empty() {
            return None;
        }
        let naive = if date_only {
            NaiveDate::parse_from_str(raw, layout)
                .ok()?
                .and_time(NaiveTime::MIN)
        } else {
            NaiveDateTime::parse_from_str(raw, layout).ok()?
        };
        self.localize(naive)
    }

    fn parse_iso(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        if raw.is_empty() {
            return None;
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts);
        }
        for layout in ISO_OFFSET_LAYOUTS {
            if let Ok(ts) = DateTime::parse_from_str(raw, layout) {
                return Some(ts);
            }
        }
        for layout in ISO_NAIVE_LAYOUTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, layout) {
                return self.localize(naive);
            }
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| self.localize(d.and_time(NaiveTime::MIN)))
    }

    fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        self.zone.from_local_datetime(&naive).single()
    }
}

/// Builds the reference zone from a UTC offset in minutes.
pub fn reference_zone(offset_minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(offset_minutes.checked_mul(60)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ist() -> DateNormalizer {
        DateNormalizer::new(reference_zone(330).unwrap())
    }

    #[test]
    fn test_tight_long_month_with_seconds() {
        let got =
            ist().normalize_iso("September 13, 2024,12:52:19", &DateFormat::LongMonthSecondsTight);
        assert_eq!(got.as_deref(), Some("2024-09-13T12:52:19+05:30"));
    }

    #[test]
    fn test_label_is_stripped_before_parsing() {
        let got = ist().normalize_iso("15 Sep 2024 23:59 IST", &DateFormat::DayShortMonth);
        assert_eq!(got.as_deref(), Some("2024-09-15T23:59:00+05:30"));

        let got =
            ist().normalize_iso("September 13, 2024, 12:52:19 IST", &DateFormat::LongMonthSeconds);
        assert_eq!(got.as_deref(), Some("2024-09-13T12:52:19+05:30"));
    }

    #[test]
    fn test_meridiem_keeps_pm() {
        let got =
            ist().normalize_iso("September 13, 2024 4:05 PM IST", &DateFormat::LongMonthMeridiem);
        assert_eq!(got.as_deref(), Some("2024-09-13T16:05:00+05:30"));
        assert_eq!(
            strip_timezone_label("September 13, 2024 4:05 PM"),
            "September 13, 2024 4:05 PM"
        );
    }

    #[test]
    fn test_date_only_defaults_to_midnight() {
        let got = ist().normalize_iso("Monday September 16 2024", &DateFormat::WeekdayLongMonth);
        assert_eq!(got.as_deref(), Some("2024-09-16T00:00:00+05:30"));

        let got = ist().normalize_iso("Sep 16, 2024", &DateFormat::ShortMonthDate);
        assert_eq!(got.as_deref(), Some("2024-09-16T00:00:00+05:30"));
    }

    #[test]
    fn test_wrong_weekday_is_rejected() {
        let got = ist().normalize("Tuesday September 16 2024", &DateFormat::WeekdayLongMonth);
        assert!(got.is_none());
    }

    #[test]
    fn test_iso_offset_is_preserved() {
        let got = ist().normalize_iso("2024-09-13T07:22:19+00:00", &DateFormat::Iso8601);
        assert_eq!(got.as_deref(), Some("2024-09-13T07:22:19+00:00"));

        let got = ist().normalize_iso("2024-09-13T07:22:19Z", &DateFormat::Iso8601);
        assert_eq!(got.as_deref(), Some("2024-09-13T07:22:19+00:00"));
    }

    #[test]
    fn test_naive_iso_is_localized() {
        let got = ist().normalize_iso("2024-09-13T07:22:19.125", &DateFormat::Iso8601);
        assert_eq!(got.as_deref(), Some("2024-09-13T07:22:19+05:30"));
    }

    #[test]
    fn test_garbage_returns_none() {
        for raw in ["", "   ", "yesterday", "13/09/2024", "IST"] {
            assert!(ist().normalize(raw, &DateFormat::DayShortMonth).is_none(), "{raw}");
            assert!(ist().normalize(raw, &DateFormat::Iso8601).is_none(), "{raw}");
        }
    }

    #[test]
    fn test_custom_layout_from_str() {
        let format: DateFormat = "%d/%m/%Y %H:%M".parse().unwrap();
        assert_eq!(
            format,
            DateFormat::Custom { pattern: "%d/%m/%Y %H:%M".to_string(), date_only: false }
        );
        let got = ist().normalize_iso("13/09/2024 08:15", &format);
        assert_eq!(got.as_deref(), Some("2024-09-13T08:15:00+05:30"));
        assert!("nonsense".parse::<DateFormat>().is_err());
    }
}
