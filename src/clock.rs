// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! All things time-related.

pub use chrono::{DateTime, Local, TimeDelta, Utc};
use chrono::{Months, SubsecRound};
use std::ops::Sub;

/// Tells time and returns the time.
///
/// Generally you will want to retrieve time using [`SystemClock`],
/// but it tests you may want to implement a `Clock` with a fixed time.
pub trait Clock {
    /// The current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Interacts with the system clock to get the current time.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Marks a thing that has a notion of its age.
pub trait HasAge {
    /// The date the item was created, in UTC.
    fn created_utc(&self) -> DateTime<Utc>;

    /// The date the item was created, in local time.
    fn created_local(&self) -> DateTime<Local> {
        self.created_utc().with_timezone(&Local)
    }

    /// The age of the item.
    ///
    /// `now` is the moment from which the age is measured, generally
    /// [`SystemClock::now()`].
    fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now.sub(self.created_utc())
    }

    /// The age of the item, relative to `now`, as a compact human-readable
    /// string like "3d 4h ago".
    fn relative_age(&self, now: DateTime<Utc>) -> String {
        human_timedelta(self.created_utc(), now, true)
    }
}

/// Converts a Reddit timestamp (fractional seconds since the epoch) into a
/// UTC date.
///
/// Timestamps that cannot be represented fall back to the epoch.
pub fn from_epoch(timestamp: f64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp.trunc() as i64, 0).unwrap_or_default()
}

const UNITS: usize = 5;

/// Describes the distance between `then` and `now` in compact units, such as
/// `1y 2mo 1w 3d 4h`.
///
/// Years and months are counted on the calendar rather than as a fixed
/// number of days, so January 15 to February 15 is "1mo" even though it
/// spans 31 days. At most five units are shown, largest first.
/// When `suffix` is true and `then` lies in the past, " ago" is appended.
///
/// # Examples
///
/// ```
/// use automodder::clock::{human_timedelta, DateTime, Utc};
/// let then = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
/// let now = DateTime::parse_from_rfc3339("2025-03-15T06:30:00Z").unwrap().with_timezone(&Utc);
/// assert_eq!(human_timedelta(then, now, true), "2mo 2w 6h 30m ago");
/// assert_eq!(human_timedelta(then, now, false), "2mo 2w 6h 30m");
/// ```
///
/// Identical times are "now":
///
/// ```
/// use automodder::clock::{human_timedelta, Utc};
/// let now = Utc::now();
/// assert_eq!(human_timedelta(now, now, true), "now");
/// ```
pub fn human_timedelta(then: DateTime<Utc>, now: DateTime<Utc>, suffix: bool) -> String {
    let then = then.trunc_subsecs(0);
    let now = now.trunc_subsecs(0);
    let (start, end, past) = if then > now {
        (now, then, false)
    } else {
        (then, now, true)
    };

    let mut months = 0u32;
    while let Some(next) = start.checked_add_months(Months::new(months + 1)) {
        if next > end {
            break;
        }
        months += 1;
    }
    let cursor = start
        .checked_add_months(Months::new(months))
        .unwrap_or(start);
    let rest = end - cursor;

    let days = rest.num_days();
    let parts = [
        (i64::from(months / 12), "y"),
        (i64::from(months % 12), "mo"),
        (days / 7, "w"),
        (days % 7, "d"),
        (rest.num_hours() % 24, "h"),
        (rest.num_minutes() % 60, "m"),
        (rest.num_seconds() % 60, "s"),
    ];

    let output: Vec<String> = parts
        .iter()
        .filter(|(n, _)| *n > 0)
        .take(UNITS)
        .map(|(n, unit)| format!("{n}{unit}"))
        .collect();

    if output.is_empty() {
        String::from("now")
    } else if suffix && past {
        format!("{} ago", output.join(" "))
    } else {
        output.join(" ")
    }
}
