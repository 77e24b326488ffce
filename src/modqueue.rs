// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Bulk removal of modqueue items.
//!
//! A [`Modqueue`] scans one subreddit's modqueue, sorting items into those
//! that should be removed (and locked) and those a moderator already
//! approved, which are simply approved again to clear them from the queue.

use crate::check::Criteria;
use crate::clock::{DateTime, Utc};
use crate::pipeline::{Applied, Report, apply, select};
use crate::reddit::client::{Error, Reddit};
use crate::reddit::service::Service;
use crate::reddit::thing::{ItemKind, QueueItem};
use crate::text::plural;

/// Scans and cleans up a single subreddit's modqueue.
#[derive(Debug)]
pub struct Modqueue<'a, S: Service> {
    reddit: &'a Reddit<S>,
    subreddit: String,
    criteria: &'a Criteria<QueueItem>,
    only: Option<ItemKind>,
    reapprove: bool,
    now: DateTime<Utc>,
    scanned: usize,
    to_remove: Vec<QueueItem>,
    to_reapprove: Vec<QueueItem>,
}

impl<'a, S: Service> Modqueue<'a, S> {
    /// Prepares to scan `subreddit`'s modqueue.
    ///
    /// When `reapprove` is true, items a moderator already approved are
    /// approved again instead of being checked against `criteria`. `now` is
    /// the moment item ages are measured from.
    pub fn new(
        reddit: &'a Reddit<S>,
        subreddit: impl Into<String>,
        criteria: &'a Criteria<QueueItem>,
        only: Option<ItemKind>,
        reapprove: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            reddit,
            subreddit: subreddit.into(),
            criteria,
            only,
            reapprove,
            now,
            scanned: 0,
            to_remove: Vec::new(),
            to_reapprove: Vec::new(),
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    /// Items selected for removal.
    pub fn to_remove(&self) -> &[QueueItem] {
        &self.to_remove
    }

    /// Previously approved items selected for re-approval.
    pub fn to_reapprove(&self) -> &[QueueItem] {
        &self.to_reapprove
    }

    /// Fetches the modqueue and sorts its items.
    pub async fn scan(&mut self) -> Result<(), Error> {
        let items = self.reddit.modqueue(&self.subreddit, self.only).await?;
        self.scan_items(items);
        Ok(())
    }

    /// Sorts `items` into removal and re-approval candidates.
    pub fn scan_items(&mut self, items: Vec<QueueItem>) {
        self.scanned += items.len();
        let items = select(items, |item| item.fullname().to_string(), |_| true);

        for item in items {
            let prefix = item.log_prefix(self.now);
            match &item.data().approved_by {
                Some(moderator) if self.reapprove => {
                    log::info!("{prefix}: Previously approved by u/{moderator}");
                    self.to_reapprove.push(item);
                }
                _ => {
                    let verdict = self.criteria.evaluate(&item);
                    if verdict.selected {
                        log::info!("{prefix}: {}", verdict.reasons.join(" | "));
                        self.to_remove.push(item);
                    } else {
                        log::debug!("{prefix}: Keeping");
                    }
                }
            }
        }

        log::info!(
            "r/{} | Found {} to remove",
            self.subreddit,
            plural(self.to_remove.len(), "item")
        );
        log::info!(
            "r/{} | Found {} to re-approve",
            self.subreddit,
            plural(self.to_reapprove.len(), "item")
        );
    }

    /// A report of the scan, before anything has been actioned.
    pub fn report(&self) -> Report {
        Report::new(
            self.scanned,
            self.to_remove.len() + self.to_reapprove.len(),
        )
    }

    /// Removes and locks every item selected for removal.
    ///
    /// An item that is removed but cannot be locked still counts as
    /// actioned, and the lock failure is recorded in `report`.
    pub async fn remove_found(&self, report: &mut Report) {
        let now = self.now;
        apply(
            report,
            &self.to_remove,
            |item| item.log_prefix(now),
            async |item: &QueueItem| -> Result<Applied, Error> {
                self.reddit.remove(item.fullname()).await?;
                if let Err(err) = self.reddit.lock(item.fullname()).await {
                    return Ok(Applied::Partial("Removed", format!("Failed to lock: {err}")));
                }
                Ok(Applied::Done("Removed and locked"))
            },
        )
        .await;
    }

    /// Approves every previously approved item again.
    pub async fn reapprove_found(&self, report: &mut Report) {
        let now = self.now;
        apply(
            report,
            &self.to_reapprove,
            |item| item.log_prefix(now),
            async |item: &QueueItem| -> Result<Applied, Error> {
                self.reddit.approve(item.fullname()).await?;
                Ok(Applied::Done("Re-approved"))
            },
        )
        .await;
    }
}
