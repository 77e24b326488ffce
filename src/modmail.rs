// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Bulk archiving of modmail conversations.
//!
//! Unlike the modqueue, the checks used here are protective: a conversation
//! is archived only when none of them flag it.

use crate::check::Criteria;
use crate::pipeline::{Applied, Report, apply};
use crate::reddit::client::{Error, Reddit};
use crate::reddit::service::Service;
use crate::reddit::thing::{ConversationState, ModmailConversation};
use crate::text::plural;
use clap::ValueEnum;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// A modmail folder that can be scanned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum MailState {
    #[default]
    All,
    New,
    #[value(name = "inprogress")]
    InProgress,
    Archived,
    Appeals,
    #[value(name = "join_requests")]
    JoinRequests,
    Highlighted,
    Mod,
    Notifications,
    Filtered,
}

impl MailState {
    /// The value of the API's `state` parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            MailState::All => "all",
            MailState::New => "new",
            MailState::InProgress => "inprogress",
            MailState::Archived => "archived",
            MailState::Appeals => "appeals",
            MailState::JoinRequests => "join_requests",
            MailState::Highlighted => "highlighted",
            MailState::Mod => "mod",
            MailState::Notifications => "notifications",
            MailState::Filtered => "filtered",
        }
    }
}

impl fmt::Display for MailState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Conversation counts by subreddit, then by the folder they were found in.
pub type Tallies = BTreeMap<String, BTreeMap<MailState, usize>>;

/// Scans and archives modmail for a set of subreddits.
#[derive(Debug)]
pub struct Modmail<'a, S: Service> {
    reddit: &'a Reddit<S>,
    subreddits: Vec<String>,
    states: Vec<MailState>,
    criteria: &'a Criteria<ModmailConversation>,
    scanned: usize,
    seen: HashSet<String>,
    to_archive: Vec<ModmailConversation>,
    tallies: Tallies,
}

impl<'a, S: Service> Modmail<'a, S> {
    /// Prepares to scan the `states` folders of `subreddits`.
    ///
    /// Conversations flagged by any check in `criteria` are kept.
    pub fn new(
        reddit: &'a Reddit<S>,
        subreddits: Vec<String>,
        states: Vec<MailState>,
        criteria: &'a Criteria<ModmailConversation>,
    ) -> Self {
        let states = if states.is_empty() {
            vec![MailState::All]
        } else {
            states
        };
        Self {
            reddit,
            subreddits,
            states,
            criteria,
            scanned: 0,
            seen: HashSet::new(),
            to_archive: Vec::new(),
            tallies: Tallies::new(),
        }
    }

    /// Conversations selected for archiving.
    pub fn to_archive(&self) -> &[ModmailConversation] {
        &self.to_archive
    }

    pub fn tallies(&self) -> &Tallies {
        &self.tallies
    }

    /// Fetches conversations in each folder and selects those to archive.
    pub async fn scan(&mut self) -> Result<(), Error> {
        for state in self.states.clone() {
            let conversations = self
                .reddit
                .conversations(&self.subreddits, state.as_query())
                .await?;
            self.scan_conversations(state, conversations);
        }

        log::info!(
            "Found {} to archive",
            plural(self.to_archive.len(), "conversation")
        );
        for (subreddit, counts) in &self.tallies {
            log::info!("r/{subreddit}:");
            for (state, count) in counts {
                log::info!("    {state}: {count}");
            }
        }
        Ok(())
    }

    /// Tallies conversations found in `state` and selects those to archive.
    pub fn scan_conversations(&mut self, state: MailState, conversations: Vec<ModmailConversation>) {
        for convo in conversations {
            self.scanned += 1;
            *self
                .tallies
                .entry(convo.subreddit().to_string())
                .or_default()
                .entry(state)
                .or_default() += 1;

            if convo.state == ConversationState::Archived {
                log::debug!("{}: Already archived", convo.log_prefix());
            } else if convo.is_internal {
                log::debug!("{}: Skipping internal conversation", convo.log_prefix());
            } else if let Some(outcome) = self.criteria.first_match(&convo) {
                log::info!("{}: {}", convo.log_prefix(), outcome.message);
            } else if self.seen.insert(convo.id.clone()) {
                self.to_archive.push(convo);
            }
        }
    }

    /// A report of the scan, before anything has been archived.
    pub fn report(&self) -> Report {
        Report::new(self.scanned, self.to_archive.len())
    }

    /// Archives every selected conversation.
    pub async fn archive_found(&self, report: &mut Report) {
        apply(
            report,
            &self.to_archive,
            ModmailConversation::log_prefix,
            async |convo: &ModmailConversation| -> Result<Applied, Error> {
                log::debug!("{}: Archiving", convo.log_prefix());
                self.reddit.archive(&convo.id).await?;
                Ok(Applied::Done("Archived"))
            },
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{check_pending_response, check_unanswered};
    use crate::test_utils::{FakeService, conversation};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    const EARLY: Option<&str> = Some("2025-05-01T10:00:00+00:00");
    const LATE: Option<&str> = Some("2025-05-02T10:00:00+00:00");

    fn criteria(ignore_unanswered: bool) -> Criteria<ModmailConversation> {
        Criteria::new(vec![
            check_unanswered(ignore_unanswered),
            check_pending_response(false),
        ])
    }

    fn inbox() -> Vec<Value> {
        let mut internal = conversation("internal", "rust", LATE, EARLY, 1);
        internal["isInternal"] = serde_json::json!(true);
        vec![
            conversation("answered", "rust", LATE, EARLY, 1),
            conversation("unanswered", "rust", None, EARLY, 0),
            conversation("pending", "golang", EARLY, LATE, 1),
            conversation("archived", "golang", LATE, EARLY, 2),
            internal,
        ]
    }

    fn parse(values: Vec<Value>) -> Vec<ModmailConversation> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    fn ids(conversations: &[ModmailConversation]) -> Vec<&str> {
        conversations.iter().map(|c| c.id.as_str()).collect()
    }

    fn subreddits() -> Vec<String> {
        vec![String::from("rust"), String::from("golang")]
    }

    #[test]
    fn it_keeps_flagged_conversations() {
        let criteria = criteria(false);
        let reddit = Reddit::new(FakeService::default());
        let mut modmail = Modmail::new(&reddit, subreddits(), vec![], &criteria);
        modmail.scan_conversations(MailState::All, parse(inbox()));
        assert_eq!(ids(modmail.to_archive()), vec!["answered"]);
        assert_eq!(modmail.report(), Report::new(5, 1));
    }

    #[test]
    fn it_can_archive_unanswered_conversations() {
        let criteria = criteria(true);
        let reddit = Reddit::new(FakeService::default());
        let mut modmail = Modmail::new(&reddit, subreddits(), vec![], &criteria);
        modmail.scan_conversations(MailState::All, parse(inbox()));
        assert_eq!(
            ids(modmail.to_archive()),
            vec!["answered", "unanswered"]
        );
    }

    #[test]
    fn it_never_selects_internal_conversations() {
        let criteria = criteria(true);
        let reddit = Reddit::new(FakeService::default());
        let mut modmail = Modmail::new(&reddit, subreddits(), vec![], &criteria);
        let mut internal = conversation("internal", "rust", None, EARLY, 0);
        internal["isInternal"] = serde_json::json!(true);
        modmail.scan_conversations(MailState::All, parse(vec![internal]));
        assert!(modmail.to_archive().is_empty());
        assert_eq!(modmail.report(), Report::new(1, 0));
        assert_eq!(modmail.tallies()["rust"][&MailState::All], 1);
    }

    #[test]
    fn it_tallies_conversations_by_subreddit_and_state() {
        let criteria = criteria(false);
        let reddit = Reddit::new(FakeService::default());
        let mut modmail = Modmail::new(&reddit, subreddits(), vec![], &criteria);
        modmail.scan_conversations(MailState::All, parse(inbox()));
        assert_eq!(modmail.tallies()["rust"][&MailState::All], 3);
        assert_eq!(modmail.tallies()["golang"][&MailState::All], 2);
    }

    #[test]
    fn it_selects_conversations_once_across_states() {
        let criteria = criteria(false);
        let reddit = Reddit::new(FakeService::default());
        let mut modmail = Modmail::new(&reddit, subreddits(), vec![], &criteria);
        let answered = parse(vec![conversation("answered", "rust", LATE, EARLY, 1)]);
        modmail.scan_conversations(MailState::All, answered.clone());
        modmail.scan_conversations(MailState::InProgress, answered);
        assert_eq!(ids(modmail.to_archive()), vec!["answered"]);
    }

    #[tokio::test]
    async fn it_archives_selected_conversations() {
        let criteria = criteria(false);
        let reddit = Reddit::new(FakeService::default().with_conversations(inbox()));
        let mut modmail = Modmail::new(&reddit, subreddits(), vec![MailState::All], &criteria);
        modmail.scan().await.unwrap();
        let mut report = modmail.report();
        modmail.archive_found(&mut report).await;
        assert_eq!(report.actioned, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(reddit.service().actions(), vec![String::from("archive answered")]);
        assert_eq!(reddit.service().conversation_state("internal"), Some(1));
        assert_eq!(reddit.service().conversation_state("answered"), Some(2));
    }

    #[tokio::test]
    async fn it_does_nothing_on_a_second_run() {
        let criteria = criteria(false);
        let reddit = Reddit::new(FakeService::default().with_conversations(inbox()));

        let mut first = Modmail::new(&reddit, subreddits(), vec![], &criteria);
        first.scan().await.unwrap();
        let mut report = first.report();
        first.archive_found(&mut report).await;

        let mut second = Modmail::new(&reddit, subreddits(), vec![], &criteria);
        second.scan().await.unwrap();
        assert!(second.to_archive().is_empty());
        let mut report = second.report();
        assert_eq!(report.matched, 0);
        second.archive_found(&mut report).await;
        assert_eq!(report.actioned, 0);
        assert_eq!(reddit.service().actions().len(), 1);
    }
}
