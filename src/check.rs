// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Criteria for selecting items for bulk moderation.
//!
//! A [`Check`] is a named predicate over an item. Checks are qualified as
//! either [`Qualifier::All`], meaning every such check must match for the
//! item to be selected, or [`Qualifier::Any`], meaning a single match is
//! enough to select the item regardless of the other checks.

use crate::clock::{DateTime, HasAge, TimeDelta, Utc, human_timedelta};
use crate::reddit::thing::{BannedBy, ModmailConversation, QueueItem};
use colored::Colorize;
use std::fmt;

/// How a check combines with the other checks in a [`Criteria`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Qualifier {
    /// The check must match along with every other `All` check.
    All,

    /// The check alone selects the item when it matches.
    Any,
}

/// The result of running a check against an item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Outcome {
    pub matched: bool,

    /// Explains the match. Empty if the check did not match.
    pub message: String,
}

impl Outcome {
    pub fn matched(message: impl Into<String>) -> Self {
        Self {
            matched: true,
            message: message.into(),
        }
    }

    pub fn unmatched() -> Self {
        Self::default()
    }
}

type Predicate<T> = Box<dyn Fn(&T) -> Outcome + Send + Sync>;

/// A named predicate over items of type `T`.
pub struct Check<T> {
    name: &'static str,
    qualifier: Qualifier,
    test: Predicate<T>,
}

impl<T> Check<T> {
    pub fn new(
        name: &'static str,
        qualifier: Qualifier,
        test: impl Fn(&T) -> Outcome + Send + Sync + 'static,
    ) -> Self {
        let test = Box::new(test);
        Self {
            name,
            qualifier,
            test,
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn qualifier(&self) -> Qualifier {
        self.qualifier
    }

    /// Runs the check against `item`.
    pub fn run(&self, item: &T) -> Outcome {
        (self.test)(item)
    }
}

impl<T> fmt::Debug for Check<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Check({}, {:?})", self.name, self.qualifier)
    }
}

/// Whether an item was selected, and why.
#[derive(Debug, Default, PartialEq)]
pub struct Verdict {
    pub selected: bool,

    /// Messages from every check that matched before evaluation stopped.
    pub reasons: Vec<String>,
}

/// An ordered list of checks.
///
/// An item is selected when any `Any` check matches, or when every `All`
/// check matches. With no `All` checks, every item is selected.
#[derive(Debug)]
pub struct Criteria<T> {
    checks: Vec<Check<T>>,
}

impl<T> Criteria<T> {
    pub fn new(checks: Vec<Check<T>>) -> Self {
        Self { checks }
    }

    pub fn checks(&self) -> &[Check<T>] {
        &self.checks
    }

    /// Evaluates the checks against `item` in order.
    ///
    /// Evaluation stops at the first matching `Any` check.
    pub fn evaluate(&self, item: &T) -> Verdict {
        let mut all_matched = true;
        let mut reasons = Vec::new();

        for check in &self.checks {
            let outcome = check.run(item);
            if outcome.matched {
                reasons.push(outcome.message);
            }
            match check.qualifier {
                Qualifier::All => all_matched &= outcome.matched,
                Qualifier::Any if outcome.matched => {
                    return Verdict {
                        selected: true,
                        reasons,
                    };
                }
                Qualifier::Any => {}
            }
        }

        Verdict {
            selected: all_matched,
            reasons,
        }
    }

    /// True if `item` is selected.
    pub fn matches(&self, item: &T) -> bool {
        self.evaluate(item).selected
    }

    /// The outcome of the first check that matches `item`, if any.
    pub fn first_match(&self, item: &T) -> Option<Outcome> {
        self.checks
            .iter()
            .map(|check| check.run(item))
            .find(|outcome| outcome.matched)
    }
}

/// Matches items scoring below `min_score`.
pub fn check_score(min_score: i64) -> Check<QueueItem> {
    Check::new("check_score", Qualifier::All, move |item: &QueueItem| {
        let score = item.data().score;
        if score < min_score {
            Outcome::matched(format!(
                "{} {} {}",
                score.to_string().red(),
                "<".yellow(),
                min_score.to_string().cyan()
            ))
        } else {
            Outcome::unmatched()
        }
    })
}

/// Matches items at least `min_age` old as of `now`.
pub fn check_age(min_age: TimeDelta, now: DateTime<Utc>) -> Check<QueueItem> {
    Check::new("check_age", Qualifier::All, move |item: &QueueItem| {
        if item.age(now) >= min_age {
            let threshold = now.checked_sub_signed(min_age).unwrap_or_default();
            Outcome::matched(format!(
                "{} {} {}",
                human_timedelta(item.created_utc(), now, false).red(),
                ">=".yellow(),
                human_timedelta(threshold, now, false).cyan()
            ))
        } else {
            Outcome::unmatched()
        }
    })
}

/// Matches items Reddit's automated systems removed as spam.
pub fn check_removed_by_automated_spam() -> Check<QueueItem> {
    Check::new(
        "check_removed_by_automated_spam",
        Qualifier::Any,
        |item: &QueueItem| {
            let data = item.data();
            let by_reddit = data.removed_by_category.as_deref() == Some("reddit");
            let by_filter = data.banned_by == Some(BannedBy::Flag(true))
                && data.ban_note.as_deref() == Some("spam");
            if by_reddit || by_filter {
                Outcome::matched("automated system marked it as spam".red().to_string())
            } else {
                Outcome::unmatched()
            }
        },
    )
}

/// Flags conversations no moderator has replied to.
///
/// Never matches when `ignore` is true.
pub fn check_unanswered(ignore: bool) -> Check<ModmailConversation> {
    Check::new(
        "check_unanswered",
        Qualifier::All,
        move |convo: &ModmailConversation| {
            if !ignore && convo.last_mod_update.is_none() {
                Outcome::matched("unanswered".red().to_string())
            } else {
                Outcome::unmatched()
            }
        },
    )
}

/// Flags conversations where the user wrote after the last moderator reply.
///
/// Conversations no moderator has replied to are left to
/// [`check_unanswered()`]. Never matches when `ignore` is true.
pub fn check_pending_response(ignore: bool) -> Check<ModmailConversation> {
    Check::new(
        "check_pending_response",
        Qualifier::All,
        move |convo: &ModmailConversation| {
            let pending = match (convo.last_mod_update, convo.last_user_update) {
                (Some(moderator), Some(user)) => moderator < user,
                _ => false,
            };
            if !ignore && pending {
                Outcome::matched("needs mod response".red().to_string())
            } else {
                Outcome::unmatched()
            }
        },
    )
}
