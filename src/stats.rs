//! Time-bucketed event counts for the stats screen.
//!
//! A series is built in two phases: [`bucket_skeleton`] lays out every bucket
//! for the range (zeroed, labeled, ascending) and [`accumulate`] folds events
//! into it. Bucket alignment follows the wall clock of the chosen zone.

use crate::models::{EventKind, RawEvent};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime,
    TimeZone, Timelike, Utc,
};
use serde::Serialize;
use std::{fmt, str::FromStr};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeRange {
    Day,
    Week,
    Month,
    Year,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Day,
        TimeRange::Week,
        TimeRange::Month,
        TimeRange::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }

    pub fn bucket_count(self) -> usize {
        match self {
            TimeRange::Day => 24,
            TimeRange::Week => 7,
            TimeRange::Month => 30,
            TimeRange::Year => 12,
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|range| range.as_str() == value)
            .ok_or_else(|| format!("unknown time range '{value}'"))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub emotional: u64,
    pub background: u64,
}

impl KindCounts {
    pub fn get(&self, kind: EventKind) -> u64 {
        match kind {
            EventKind::Emotional => self.emotional,
            EventKind::Background => self.background,
        }
    }

    pub fn increment(&mut self, kind: EventKind) {
        let slot = match kind {
            EventKind::Emotional => &mut self.emotional,
            EventKind::Background => &mut self.background,
        };
        *slot = slot.saturating_add(1);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub bucket_start: DateTime<Utc>,
    pub label: String,
    #[serde(flatten)]
    pub counts: KindCounts,
}

/// Which wall clock buckets are aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BucketZone {
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl BucketZone {
    /// Aggregates with a range given by name; an unknown name yields no buckets.
    pub fn aggregate_named(self, events: &[RawEvent], range: &str, now: DateTime<Utc>) -> Vec<Bucket> {
        let Ok(range) = range.parse::<TimeRange>() else {
            debug!(range, "unknown time range requested");
            return Vec::new();
        };
        match self {
            BucketZone::Local => aggregate_in(events, range, now, &Local),
            BucketZone::Fixed(offset) => aggregate_in(events, range, now, &offset),
        }
    }
}

/// Buckets `events` for `range` ending at `now`, aligned to local time.
pub fn aggregate(events: &[RawEvent], range: TimeRange, now: DateTime<Utc>) -> Vec<Bucket> {
    aggregate_in(events, range, now, &Local)
}

pub fn aggregate_named(events: &[RawEvent], range: &str, now: DateTime<Utc>) -> Vec<Bucket> {
    BucketZone::Local.aggregate_named(events, range, now)
}

pub fn aggregate_in<Tz: TimeZone>(
    events: &[RawEvent],
    range: TimeRange,
    now: DateTime<Utc>,
    zone: &Tz,
) -> Vec<Bucket> {
    let mut buckets = bucket_skeleton(range, now, zone);
    accumulate(&mut buckets, events, range, now, zone);
    buckets
}

/// Every bucket of the range with zero counts, ascending by start.
pub fn bucket_skeleton<Tz: TimeZone>(range: TimeRange, now: DateTime<Utc>, zone: &Tz) -> Vec<Bucket> {
    let today = now.with_timezone(zone).date_naive();

    let mut anchors: Vec<DateTime<Utc>> = (0..range.bucket_count() as i64)
        .map(|step| match range {
            TimeRange::Day => bucket_anchor(range, now - Duration::hours(step), zone),
            TimeRange::Week | TimeRange::Month => local_midnight(zone, today - Duration::days(step)),
            TimeRange::Year => local_midnight(zone, months_before(today, step)),
        })
        .collect();
    anchors.sort();

    anchors
        .into_iter()
        .map(|anchor| Bucket {
            bucket_start: anchor,
            label: bucket_label(range, anchor, zone),
            counts: KindCounts::default(),
        })
        .collect()
}

/// Adds every usable event after the lookback boundary to its bucket.
///
/// `buckets` must be sorted by `bucket_start`, as [`bucket_skeleton`] returns
/// them. Malformed events and events whose anchor has no bucket are skipped.
pub fn accumulate<Tz: TimeZone>(
    buckets: &mut [Bucket],
    events: &[RawEvent],
    range: TimeRange,
    now: DateTime<Utc>,
    zone: &Tz,
) {
    let boundary = lookback_boundary(range, now, zone);
    let mut malformed = 0usize;

    for event in events {
        let Some((kind, at)) = event.parsed_in(zone) else {
            malformed += 1;
            continue;
        };
        if at <= boundary {
            continue;
        }

        let anchor = bucket_anchor(range, at, zone);
        if let Ok(index) = buckets.binary_search_by_key(&anchor, |bucket| bucket.bucket_start) {
            buckets[index].counts.increment(kind);
        }
    }

    if malformed > 0 {
        debug!(malformed, range = %range, "skipped malformed events");
    }
}

/// Events at or before this instant fall outside the range.
pub fn lookback_boundary<Tz: TimeZone>(range: TimeRange, now: DateTime<Utc>, zone: &Tz) -> DateTime<Utc> {
    match range {
        TimeRange::Day => now - Duration::hours(24),
        TimeRange::Week => now - Duration::days(7),
        TimeRange::Month => now - Duration::days(30),
        TimeRange::Year => {
            let today = now.with_timezone(zone).date_naive();
            local_midnight(zone, one_year_earlier(today))
        }
    }
}

/// Rounds `at` down to the start of its bucket in `zone`.
pub fn bucket_anchor<Tz: TimeZone>(range: TimeRange, at: DateTime<Utc>, zone: &Tz) -> DateTime<Utc> {
    let local = at.with_timezone(zone);
    match range {
        TimeRange::Day => {
            let into_hour = Duration::minutes(i64::from(local.minute()))
                + Duration::seconds(i64::from(local.second()))
                + Duration::nanoseconds(i64::from(local.nanosecond()));
            at - into_hour
        }
        TimeRange::Week | TimeRange::Month => local_midnight(zone, local.date_naive()),
        TimeRange::Year => {
            let date = local.date_naive();
            local_midnight(zone, date.with_day(1).unwrap_or(date))
        }
    }
}

fn bucket_label<Tz: TimeZone>(range: TimeRange, anchor: DateTime<Utc>, zone: &Tz) -> String {
    let local = anchor.with_timezone(zone).naive_local();
    match range {
        TimeRange::Day => local.format("%H").to_string(),
        TimeRange::Week => local.format("%a").to_string(),
        TimeRange::Month => local.day().to_string(),
        TimeRange::Year => local.format("%b").to_string(),
    }
}

// A midnight skipped by a DST jump resolves to the first instant an hour on.
fn local_midnight<Tz: TimeZone>(zone: &Tz, date: NaiveDate) -> DateTime<Utc> {
    resolve_local(zone, date.and_time(NaiveTime::MIN))
}

pub(crate) fn resolve_local<Tz: TimeZone>(zone: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    zone.from_local_datetime(&local)
        .earliest()
        .or_else(|| zone.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|resolved| resolved.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

fn months_before(date: NaiveDate, months: i64) -> NaiveDate {
    let index = i64::from(date.year()) * 12 + i64::from(date.month0()) - months;
    let year = index.div_euclid(12) as i32;
    let month = index.rem_euclid(12) as u32 + 1;
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

// Feb 29 has no counterpart a year earlier and rolls over to Mar 1.
fn one_year_earlier(date: NaiveDate) -> NaiveDate {
    let year = date.year() - 1;
    NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
        .unwrap_or(date - Duration::days(365))
}
