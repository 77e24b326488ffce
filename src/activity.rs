// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Moderator activity, measured from each subreddit's mod log.

use crate::clock::{DateTime, HasAge, Utc};
use crate::count::ModeratorCounter;
use crate::reddit::client::{Error, Reddit};
use crate::reddit::service::Service;
use crate::reddit::thing::{ModAction, Moderator, SubredditInfo};
use crate::text::plural;

/// A moderator's place on a mod list and how much they did.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeratorActivity {
    pub name: String,

    /// 1-based position on the mod list. Lower is more senior.
    pub position: usize,

    /// Number of mod log entries in the window.
    pub actions: usize,
}

impl ModeratorActivity {
    /// A moderator is active if they took any action in the window.
    pub fn is_active(&self) -> bool {
        self.actions > 0
    }
}

/// Activity for every moderator of a subreddit.
#[derive(Clone, Debug)]
pub struct SubredditActivity {
    pub subreddit: SubredditInfo,

    /// Moderators in mod list order.
    pub moderators: Vec<ModeratorActivity>,

    /// Mod log entries per moderator, including accounts that are no
    /// longer (or never were) on the mod list, such as AutoModerator.
    pub tally: ModeratorCounter,
}

impl SubredditActivity {
    /// Combines a mod list with the mod log entries in the window.
    pub fn from_parts(subreddit: SubredditInfo, moderators: Vec<Moderator>, log: &[ModAction]) -> Self {
        let tally = ModeratorCounter::from_iter(log.iter());
        let moderators = moderators
            .into_iter()
            .enumerate()
            .map(|(i, moderator)| ModeratorActivity {
                actions: tally.get(&moderator.name),
                name: moderator.name,
                position: i + 1,
            })
            .collect();
        Self {
            subreddit,
            moderators,
            tally,
        }
    }

    pub fn name(&self) -> &str {
        &self.subreddit.display_name
    }

    /// The entry for `redditor`, if they moderate the subreddit.
    pub fn moderator(&self, redditor: &str) -> Option<&ModeratorActivity> {
        self.moderators
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(redditor))
    }

    /// True if any listed moderator was active.
    pub fn has_active_moderators(&self) -> bool {
        self.moderators.iter().any(ModeratorActivity::is_active)
    }
}

/// Gathers activity for a set of subreddits.
#[derive(Debug)]
pub struct ActivityCollector<'a, S: Service> {
    reddit: &'a Reddit<S>,
    since: DateTime<Utc>,
}

impl<'a, S: Service> ActivityCollector<'a, S> {
    /// Counts mod log entries created at or after `since`.
    pub fn new(reddit: &'a Reddit<S>, since: DateTime<Utc>) -> Self {
        Self { reddit, since }
    }

    /// Activity for each subreddit, in order.
    ///
    /// A subreddit whose mod list or mod log cannot be read is logged and
    /// left out.
    pub async fn collect(&self, subreddits: &[SubredditInfo]) -> Vec<SubredditActivity> {
        let mut activity = Vec::with_capacity(subreddits.len());
        for subreddit in subreddits {
            match self.collect_one(subreddit.clone()).await {
                Ok(sub) => activity.push(sub),
                Err(err) => log::warn!(
                    "Error getting moderator activity for r/{}: {err}",
                    subreddit.display_name
                ),
            }
        }
        activity
    }

    /// Activity for a single subreddit.
    pub async fn collect_one(&self, subreddit: SubredditInfo) -> Result<SubredditActivity, Error> {
        let name = subreddit.display_name.clone();
        let moderators = self.reddit.moderators(&name).await?;
        let log = self.reddit.mod_log(&name, self.since).await?;
        let log: Vec<ModAction> = log
            .into_iter()
            .filter(|entry| entry.created_utc() >= self.since)
            .collect();
        log::info!(
            "r/{name:<21} | {} | {}",
            plural(moderators.len(), "moderator"),
            plural(log.len(), "action")
        );
        Ok(SubredditActivity::from_parts(subreddit, moderators, &log))
    }
}
