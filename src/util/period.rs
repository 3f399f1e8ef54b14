//! Timestamps and calendar-month windows used by the reports.
//!
//! Every stored timestamp is RFC 3339 UTC with millisecond precision, so the
//! strings have a fixed width and sort the same way the instants do. Month
//! windows are half-open: `[start, next month start)`.

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.with_timezone(&Utc))
}

/// Whole days elapsed since `created_at`, rounded up. Unparseable or future
/// timestamps count as 0.
pub fn days_overdue(created_at: Option<&str>, now: DateTime<Utc>) -> i64 {
    let Some(created) = created_at.and_then(parse_timestamp) else {
        return 0;
    };
    let elapsed = (now - created).num_milliseconds();
    if elapsed <= 0 {
        return 0;
    }
    (elapsed + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthWindow {
    year: i32,
    month: u32,
}

impl MonthWindow {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(MonthWindow { year, month })
    }

    pub fn containing(dt: DateTime<Utc>) -> Self {
        MonthWindow { year: dt.year(), month: dt.month() }
    }

    /// Parses `YYYY-MM`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (year, month) = raw.trim().split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    pub fn shift(self, months: i32) -> Self {
        let index = self.year * 12 + (self.month as i32 - 1) + months;
        MonthWindow {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn previous(self) -> Self {
        self.shift(-1)
    }

    pub fn start(&self) -> DateTime<Utc> {
        // month is always 1..=12, so the first of the month at midnight exists
        Utc.with_ymd_and_hms(self.year, self.month, 1, 0, 0, 0)
            .single()
            .unwrap_or_default()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.shift(1).start()
    }

    /// Formatted `[start, end)` bounds for store range queries.
    pub fn bounds(&self) -> (String, String) {
        (format_timestamp(self.start()), format_timestamp(self.end()))
    }

    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }

    /// The `count` months ending with the one containing `now`, oldest first.
    pub fn trailing(now: DateTime<Utc>, count: u32) -> Vec<MonthWindow> {
        let current = Self::containing(now);
        (0..count as i32).rev().map(|back| current.shift(-back)).collect()
    }
}
