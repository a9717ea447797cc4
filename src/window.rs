//! The trailing 24 hour publication window.
//!
//! A run only keeps articles published between yesterday's anchor hour and
//! today's anchor hour (20:00 by default), both measured in the reference
//! zone. The window is computed once per run and then only read.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use std::fmt;

/// Hour of day both window bounds are anchored to.
pub const DEFAULT_ANCHOR_HOUR: u32 = 20;

/// Inclusive `[lower, upper]` range of publication instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    lower: DateTime<FixedOffset>,
    upper: DateTime<FixedOffset>,
}

impl TimeWindow {
    /// Window for the reference-zone day that contains `now`.
    ///
    /// Returns `None` for an anchor hour outside `0..24`.
    pub fn ending_on_day_of(
        now: DateTime<Utc>,
        zone: FixedOffset,
        anchor_hour: u32,
    ) -> Option<Self> {
        let today = now.with_timezone(&zone).date_naive();
        Self::for_date(today, zone, anchor_hour)
    }

    /// Window whose upper bound is `date` at the anchor hour.
    pub fn for_date(date: NaiveDate, zone: FixedOffset, anchor_hour: u32) -> Option<Self> {
        let anchor = NaiveTime::from_hms_opt(anchor_hour, 0, 0)?;
        let upper = zone.from_local_datetime(&date.and_time(anchor)).single()?;
        let lower = upper - Duration::days(1);
        Some(Self { lower, upper })
    }

    /// Window for the current instant.
    pub fn current(zone: FixedOffset, anchor_hour: u32) -> Option<Self> {
        Self::ending_on_day_of(Utc::now(), zone, anchor_hour)
    }

    pub fn lower(&self) -> DateTime<FixedOffset> {
        self.lower
    }

    pub fn upper(&self) -> DateTime<FixedOffset> {
        self.upper
    }

    /// Reference-zone calendar date the window closes on.
    pub fn date(&self) -> NaiveDate {
        self.upper.date_naive()
    }

    /// `lower <= ts <= upper`, compared in the reference zone.
    pub fn contains(&self, ts: &DateTime<FixedOffset>) -> bool {
        let local = ts.with_timezone(&self.upper.timezone());
        self.lower <= local && local <= self.upper
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower.to_rfc3339(), self.upper.to_rfc3339())
    }
}
