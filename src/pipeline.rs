// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! The select-then-act shape shared by bulk moderation commands.
//!
//! Items are first narrowed down with [`select()`], then an action is
//! applied to each selected item with [`apply()`]. A failed action is
//! recorded in the [`Report`] and the remaining items are still processed.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

/// An action that could not be applied to an item.
#[derive(Clone, Debug, PartialEq)]
pub struct Failure {
    /// Describes the item, usually its log prefix.
    pub item: String,

    pub reason: String,
}

/// Counts of what happened during a bulk moderation run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    pub scanned: usize,
    pub matched: usize,
    pub actioned: usize,
    pub skipped: usize,
    pub failures: Vec<Failure>,
}

impl Report {
    /// A report for `scanned` items of which `matched` were selected.
    pub fn new(scanned: usize, matched: usize) -> Self {
        Self {
            scanned,
            matched,
            ..Self::default()
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Adds the counts from `other` to this report.
    pub fn merge(&mut self, other: Report) {
        self.scanned += other.scanned;
        self.matched += other.matched;
        self.actioned += other.actioned;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }
}

/// What happened when an action was applied.
#[derive(Clone, Debug, PartialEq)]
pub enum Applied {
    /// The action was taken; the label is logged, e.g. "Removed".
    Done(&'static str),

    /// The main action was taken but a follow-up step failed. The item
    /// counts as actioned and the error is recorded as a failure.
    Partial(&'static str, String),

    /// The item was deliberately left alone.
    Skipped(String),
}

/// The items for which `predicate` holds, in their original order.
///
/// Only the first item with any given key is kept, so no item is acted on
/// twice in a single run.
pub fn select<T, K, F, P>(items: impl IntoIterator<Item = T>, key: F, mut predicate: P) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
    P: FnMut(&T) -> bool,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .filter(|item| predicate(item))
        .collect()
}

/// Applies `action` to each item in order, recording the results in
/// `report`.
///
/// `describe` produces the prefix for each item's log messages.
pub async fn apply<T, E: Display>(
    report: &mut Report,
    items: &[T],
    describe: impl Fn(&T) -> String,
    action: impl AsyncFn(&T) -> Result<Applied, E>,
) {
    for item in items {
        let prefix = describe(item);
        match action(item).await {
            Ok(Applied::Done(label)) => {
                log::info!("{prefix}: {label}");
                report.actioned += 1;
            }
            Ok(Applied::Partial(label, error)) => {
                log::info!("{prefix}: {label}");
                log::error!("{prefix}: {error}");
                report.actioned += 1;
                report.failures.push(Failure {
                    item: prefix,
                    reason: error,
                });
            }
            Ok(Applied::Skipped(reason)) => {
                log::info!("{prefix}: {reason}");
                report.skipped += 1;
            }
            Err(err) => {
                log::error!("{prefix}: {err}");
                report.failures.push(Failure {
                    item: prefix,
                    reason: err.to_string(),
                });
            }
        }
    }
}
