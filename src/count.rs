// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! General-purpose counting capabilities.

use crate::reddit::thing::ModAction;
use counter::Counter;
use itertools::Itertools;
use std::vec::IntoIter;

/// A thing that was done by a moderator.
pub trait HasModerator {
    /// The moderator responsible for the thing.
    fn moderator(&self) -> &str;
}

impl HasModerator for ModAction {
    fn moderator(&self) -> &str {
        &self.moderator
    }
}

impl<T: HasModerator> HasModerator for &T {
    fn moderator(&self) -> &str {
        (*self).moderator()
    }
}

/// Differentiates between the different sorting algorithms used to
/// return moderator counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortAlgorithm {
    /// Sort counts by name of moderator.
    #[default]
    Lexicographically,

    /// Sort counts by number of actions taken by each moderator.
    Numerically,
}

/// A pair of moderator name and count.
pub type ModeratorCount = (String, usize);

/// Groups mod log entries by moderator and provides a count of the number
/// of entries for each moderator.
#[derive(Clone, Debug, Default)]
pub struct ModeratorCounter {
    counts: Counter<String>,
}

impl ModeratorCounter {
    /// Groups and counts mod log entries.
    ///
    /// `iter` is an iterator of `ModAction`s, or anything that has a
    /// moderator attached to it.
    pub fn from_iter<T: HasModerator>(iter: impl Iterator<Item = T>) -> Self {
        let counts = ModeratorCounter::count(iter);
        ModeratorCounter { counts }
    }

    /// The number of entries for `moderator`.
    pub fn get(&self, moderator: &str) -> usize {
        self.counts.get(moderator).copied().unwrap_or_default()
    }

    /// The number of entries counted.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sorts the moderator counts by moderator name or the count of
    /// entries for each moderator.
    ///
    /// Returns an iterator over the (moderator name, count) pairs.
    pub fn sort_by(&self, algo: &SortAlgorithm) -> IntoIter<ModeratorCount> {
        match algo {
            SortAlgorithm::Numerically => self
                .counts
                .most_common_tiebreaker(|lhs, rhs| {
                    Ord::cmp(&lhs.to_lowercase(), &rhs.to_lowercase())
                })
                .into_iter(),
            SortAlgorithm::Lexicographically => self.sort_lexicographically(),
        }
    }

    fn count<T: HasModerator>(iter: impl Iterator<Item = T>) -> Counter<String> {
        iter.map(|item| String::from(item.moderator()))
            .collect::<Counter<_>>()
    }

    fn sort_lexicographically(&self) -> IntoIter<ModeratorCount> {
        self.counts
            .iter()
            .sorted_by(|(lhs, _), (rhs, _)| Ord::cmp(&lhs.to_lowercase(), &rhs.to_lowercase()))
            .map(|(key, count)| (key.to_owned(), *count))
            .collect::<Vec<_>>()
            .into_iter()
    }
}
