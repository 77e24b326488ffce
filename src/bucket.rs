// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Groups subreddits by a redditor's standing on their mod lists.
//!
//! Each subreddit lands in one or more [`BucketKind`]s depending on the
//! redditor's position, whether they were active, and the activity of the
//! moderators listed above and below them. Some buckets also carry the
//! moderators that explain the placement, e.g. the inactive moderators
//! ranked above an active redditor.

use crate::activity::{ModeratorActivity, SubredditActivity};
use std::fmt;

/// A named group of subreddits sharing an activity situation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BucketKind {
    AllSubreddits,
    Inactive,
    TopModAndActive,
    HighestActiveMod,
    OnlyOneActive,
    NobodyActive,
    InactiveTopMod,
    InactiveTop2,
    InactiveTop3,
    InactiveTop5,
    InactiveTop10,
    ActiveWithInactiveAbove,
    InactiveWithActiveBelow,
}

impl BucketKind {
    /// Every kind, in display order.
    pub const ALL: [BucketKind; 13] = [
        BucketKind::AllSubreddits,
        BucketKind::Inactive,
        BucketKind::TopModAndActive,
        BucketKind::HighestActiveMod,
        BucketKind::OnlyOneActive,
        BucketKind::NobodyActive,
        BucketKind::InactiveTopMod,
        BucketKind::InactiveTop2,
        BucketKind::InactiveTop3,
        BucketKind::InactiveTop5,
        BucketKind::InactiveTop10,
        BucketKind::ActiveWithInactiveAbove,
        BucketKind::InactiveWithActiveBelow,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            BucketKind::AllSubreddits => "All Subreddits",
            BucketKind::Inactive => "Inactive",
            BucketKind::TopModAndActive => "Top Mod and Active",
            BucketKind::HighestActiveMod => "Highest Active Mod",
            BucketKind::OnlyOneActive => "Only One Active",
            BucketKind::NobodyActive => "Subreddits Where Nobody Is Active",
            BucketKind::InactiveTopMod => "Inactive and Top Mod",
            BucketKind::InactiveTop2 => "Inactive and In The Top 2",
            BucketKind::InactiveTop3 => "Inactive and In The Top 3",
            BucketKind::InactiveTop5 => "Inactive and In The Top 5",
            BucketKind::InactiveTop10 => "Inactive and In The Top 10",
            BucketKind::ActiveWithInactiveAbove => "Active with Inactive Above",
            BucketKind::InactiveWithActiveBelow => "Inactive with Active Below",
        }
    }
}

impl fmt::Display for BucketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// A subreddit placed in a bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketEntry {
    pub subreddit: String,
    pub subscribers: u64,

    /// The redditor's position, or `None` if they are not a moderator.
    pub position: Option<usize>,

    pub active: bool,

    /// The redditor's mod log entries in the window.
    pub actions: usize,

    /// Moderators explaining the placement.
    pub moderators: Vec<ModeratorActivity>,
}

/// All subreddits of one kind.
#[derive(Clone, Debug)]
pub struct SubredditBucket {
    pub kind: BucketKind,
    pub entries: Vec<BucketEntry>,
}

impl SubredditBucket {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every bucket for one redditor.
#[derive(Clone, Debug)]
pub struct Buckets {
    redditor: String,
    buckets: Vec<SubredditBucket>,
}

impl Buckets {
    /// Sorts each subreddit into buckets according to `redditor`'s standing.
    pub fn classify(activity: &[SubredditActivity], redditor: &str) -> Self {
        let mut buckets: Vec<SubredditBucket> = BucketKind::ALL
            .iter()
            .map(|&kind| SubredditBucket {
                kind,
                entries: Vec::new(),
            })
            .collect();

        for sub in activity {
            for (kind, moderators) in placements(sub, redditor) {
                let me = sub.moderator(redditor);
                let entry = BucketEntry {
                    subreddit: sub.name().to_string(),
                    subscribers: sub.subreddit.subscribers,
                    position: me.map(|m| m.position),
                    active: me.is_some_and(ModeratorActivity::is_active),
                    actions: me.map(|m| m.actions).unwrap_or_default(),
                    moderators,
                };
                if let Some(bucket) = buckets.iter_mut().find(|b| b.kind == kind) {
                    bucket.entries.push(entry);
                }
            }
        }

        Self {
            redditor: redditor.to_string(),
            buckets,
        }
    }

    pub fn redditor(&self) -> &str {
        &self.redditor
    }

    /// The bucket of the given kind.
    pub fn get(&self, kind: BucketKind) -> Option<&SubredditBucket> {
        self.buckets.iter().find(|b| b.kind == kind)
    }

    /// Every bucket, in display order.
    pub fn iter(&self) -> impl Iterator<Item = &SubredditBucket> {
        self.buckets.iter()
    }

    /// Buckets containing at least one subreddit.
    pub fn non_empty(&self) -> impl Iterator<Item = &SubredditBucket> {
        self.iter().filter(|b| !b.is_empty())
    }
}

fn any_active(moderators: &[&ModeratorActivity]) -> bool {
    moderators.iter().any(|m| m.is_active())
}

fn all_active(moderators: &[&ModeratorActivity]) -> bool {
    moderators.iter().all(|m| m.is_active())
}

fn all_inactive(moderators: &[&ModeratorActivity]) -> bool {
    !any_active(moderators)
}

fn inactive(moderators: &[&ModeratorActivity]) -> Vec<ModeratorActivity> {
    moderators
        .iter()
        .filter(|m| !m.is_active())
        .map(|m| (*m).clone())
        .collect()
}

/// The buckets `sub` belongs in, with the moderators listed for each.
fn placements(sub: &SubredditActivity, redditor: &str) -> Vec<(BucketKind, Vec<ModeratorActivity>)> {
    let me = sub.moderator(redditor);
    let position = me.map(|m| m.position);
    let active = me.is_some_and(ModeratorActivity::is_active);
    let (above, below): (Vec<&ModeratorActivity>, Vec<&ModeratorActivity>) = sub
        .moderators
        .iter()
        .filter(|m| Some(m.position) != position)
        .partition(|m| position.is_none_or(|p| m.position < p));

    let mut kinds = vec![(BucketKind::AllSubreddits, vec![])];

    if !sub.has_active_moderators() {
        kinds.push((BucketKind::NobodyActive, vec![]));
    }

    match (position, active) {
        (Some(1), true) => kinds.push((BucketKind::TopModAndActive, vec![])),
        (Some(1), false) => kinds.push((BucketKind::InactiveTopMod, inactive(&above))),
        (Some(2), false) => kinds.push((BucketKind::InactiveTop2, inactive(&above))),
        (Some(3), false) => kinds.push((BucketKind::InactiveTop3, inactive(&above))),
        (Some(4..=5), false) => kinds.push((BucketKind::InactiveTop5, inactive(&above))),
        (Some(6..=10), false) => kinds.push((BucketKind::InactiveTop10, inactive(&above))),
        _ => {}
    }

    if !active {
        kinds.push((BucketKind::Inactive, vec![]));
    }
    if active && !all_active(&above) {
        kinds.push((BucketKind::ActiveWithInactiveAbove, inactive(&above)));
    }
    if active && all_inactive(&above) {
        kinds.push((BucketKind::HighestActiveMod, inactive(&above)));
    }
    if active && all_inactive(&above) && all_inactive(&below) {
        let others: Vec<&ModeratorActivity> = above.iter().chain(below.iter()).copied().collect();
        kinds.push((BucketKind::OnlyOneActive, inactive(&others)));
    }
    if !active && any_active(&below) {
        let active_below = below
            .iter()
            .filter(|m| m.is_active())
            .map(|m| (*m).clone())
            .collect();
        kinds.push((BucketKind::InactiveWithActiveBelow, active_below));
    }

    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reddit::thing::{ModAction, Moderator, SubredditInfo};

    fn activity(name: &str, mods: &[(&str, usize)]) -> SubredditActivity {
        let moderators = mods
            .iter()
            .map(|(name, _)| Moderator {
                name: name.to_string(),
                mod_permissions: vec![],
            })
            .collect();
        let log: Vec<ModAction> = mods
            .iter()
            .flat_map(|(name, count)| {
                (0..*count).map(move |i| ModAction {
                    id: format!("{name}_{i}"),
                    moderator: name.to_string(),
                    action: String::from("approvelink"),
                    created_utc: 1747000000.0,
                    target_fullname: None,
                })
            })
            .collect();
        let info = SubredditInfo {
            display_name: name.to_string(),
            subscribers: 5000,
        };
        SubredditActivity::from_parts(info, moderators, &log)
    }

    fn kinds(sub: &SubredditActivity, redditor: &str) -> Vec<BucketKind> {
        placements(sub, redditor).into_iter().map(|(k, _)| k).collect()
    }

    #[test]
    fn it_places_an_active_top_mod() {
        let sub = activity("rust", &[("me", 3), ("bob", 0)]);
        assert_eq!(
            kinds(&sub, "me"),
            vec![
                BucketKind::AllSubreddits,
                BucketKind::TopModAndActive,
                BucketKind::HighestActiveMod,
                BucketKind::OnlyOneActive,
            ]
        );
    }

    #[test]
    fn it_places_an_inactive_third_mod() {
        let sub = activity("rust", &[("alice", 0), ("bob", 2), ("me", 0), ("carol", 1)]);
        let placed = placements(&sub, "me");
        let kinds: Vec<BucketKind> = placed.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                BucketKind::AllSubreddits,
                BucketKind::InactiveTop3,
                BucketKind::Inactive,
                BucketKind::InactiveWithActiveBelow,
            ]
        );
        let above: Vec<&str> = placed[1].1.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(above, vec!["alice"]);
        let below: Vec<&str> = placed[3].1.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(below, vec!["carol"]);
    }

    #[test]
    fn it_places_an_active_mod_below_inactive_mods() {
        let sub = activity("rust", &[("alice", 0), ("me", 1), ("bob", 4)]);
        assert_eq!(
            kinds(&sub, "me"),
            vec![
                BucketKind::AllSubreddits,
                BucketKind::ActiveWithInactiveAbove,
                BucketKind::HighestActiveMod,
            ]
        );
    }

    #[test]
    fn it_places_subreddits_where_nobody_is_active() {
        let sub = activity("rust", &[("alice", 0), ("bob", 0), ("me", 0)]);
        assert_eq!(
            kinds(&sub, "me"),
            vec![
                BucketKind::AllSubreddits,
                BucketKind::NobodyActive,
                BucketKind::InactiveTop3,
                BucketKind::Inactive,
            ]
        );
    }

    #[test]
    fn it_treats_non_moderators_as_inactive() {
        let sub = activity("rust", &[("alice", 1)]);
        assert_eq!(
            kinds(&sub, "me"),
            vec![BucketKind::AllSubreddits, BucketKind::Inactive]
        );
    }

    #[test]
    fn it_collects_entries_per_bucket() {
        let subs = vec![
            activity("rust", &[("me", 3)]),
            activity("golang", &[("alice", 1), ("me", 0)]),
        ];
        let buckets = Buckets::classify(&subs, "me");
        assert_eq!(buckets.get(BucketKind::AllSubreddits).unwrap().len(), 2);
        let top2 = buckets.get(BucketKind::InactiveTop2).unwrap();
        assert_eq!(top2.entries[0].subreddit, "golang");
        assert_eq!(top2.entries[0].position, Some(2));
        assert!(buckets.get(BucketKind::NobodyActive).unwrap().is_empty());
        assert_eq!(buckets.iter().count(), 13);
        assert!(buckets.non_empty().all(|b| !b.is_empty()));
    }
}
