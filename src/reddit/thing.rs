// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! A "thing" in the Reddit sense.
//!
//! Historically in the Reddit API and its old source code, a "Thing" was
//! any element of the Reddit system: users, posts, comments, etc. This
//! module encapsulates that idea and provides an easy way to more or less
//! work with JSON data from the Reddit API.

use crate::clock::{DateTime, HasAge, Utc, from_epoch};
use crate::text::convert_html_entities;
use serde::Deserialize;
use std::collections::HashMap;

/// A paginated listing of things.
#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

/// The contents of a [`Listing`].
#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    /// Cursor for the next page, if there is one.
    #[serde(default)]
    pub after: Option<String>,

    pub children: Vec<T>,
}

/// Wraps a thing's `data` with its `kind`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// The kind of item found in a modqueue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    Comment,
    Submission,
}

impl ItemKind {
    /// The value of the modqueue's `only` parameter for this kind.
    pub fn as_query(&self) -> &'static str {
        match self {
            ItemKind::Comment => "comments",
            ItemKind::Submission => "links",
        }
    }
}

/// The `banned_by` field of a removed item.
///
/// Reddit reports either the moderator who removed the item, or `true` when
/// the item was removed by an automated system.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BannedBy {
    Flag(bool),
    Moderator(String),
}

/// Fields shared by comments and submissions.
#[derive(Clone, Debug, Deserialize)]
pub struct ItemData {
    pub id: String,

    /// Fullname, e.g. `t3_abc123`.
    pub name: String,

    pub subreddit: String,

    #[serde(default)]
    pub author: Option<String>,

    pub created_utc: f64,

    #[serde(default)]
    pub score: i64,

    #[serde(default)]
    pub approved_by: Option<String>,

    #[serde(default)]
    pub banned_by: Option<BannedBy>,

    #[serde(default)]
    pub ban_note: Option<String>,

    #[serde(default)]
    pub removed_by_category: Option<String>,

    #[serde(default)]
    pub locked: bool,

    #[serde(default)]
    pub removed: bool,

    #[serde(default)]
    pub permalink: String,
}

/// A Reddit comment.
#[derive(Clone, Debug, Deserialize)]
pub struct Comment {
    #[serde(flatten)]
    pub data: ItemData,

    /// Fullname of the submission the comment belongs to.
    pub link_id: String,

    #[serde(default)]
    pub body: String,
}

/// A Reddit post.
#[derive(Clone, Debug, Deserialize)]
pub struct Submission {
    #[serde(flatten)]
    pub data: ItemData,

    #[serde(default)]
    pub title: String,
}

/// An item waiting in a subreddit's modqueue.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum QueueItem {
    #[serde(rename = "t1")]
    Comment(Comment),

    #[serde(rename = "t3")]
    Submission(Submission),
}

impl QueueItem {
    /// Fields shared by all kinds of items.
    pub fn data(&self) -> &ItemData {
        match self {
            QueueItem::Comment(comment) => &comment.data,
            QueueItem::Submission(submission) => &submission.data,
        }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            QueueItem::Comment(_) => ItemKind::Comment,
            QueueItem::Submission(_) => ItemKind::Submission,
        }
    }

    /// The item's fullname, which identifies it in moderation calls.
    pub fn fullname(&self) -> &str {
        &self.data().name
    }

    /// The author's username, or `[deleted]`.
    pub fn author(&self) -> &str {
        self.data().author.as_deref().unwrap_or("[deleted]")
    }

    /// A prefix identifying the item in log messages.
    pub fn log_prefix(&self, now: DateTime<Utc>) -> String {
        let data = self.data();
        let id = match self {
            QueueItem::Comment(comment) => {
                let submission = comment
                    .link_id
                    .strip_prefix("t3_")
                    .unwrap_or(&comment.link_id);
                format!("s: {submission} c: {}", data.id)
            }
            QueueItem::Submission(_) => data.id.clone(),
        };
        format!(
            "r/{} | u/{} | {} | {}",
            data.subreddit,
            self.author(),
            id,
            self.relative_age(now)
        )
    }
}

impl HasAge for QueueItem {
    fn created_utc(&self) -> DateTime<Utc> {
        from_epoch(self.data().created_utc)
    }
}

/// The subreddit owning a modmail conversation.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationOwner {
    pub display_name: String,
}

/// The non-moderator side of a modmail conversation.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(default)]
    pub name: Option<String>,

    /// Set when the other side is a subreddit rather than a redditor.
    #[serde(default)]
    pub is_participant_subreddit: bool,
}

impl Participant {
    /// The participant's name with its `u/` or `r/` prefix.
    pub fn prefixed_name(&self) -> String {
        match &self.name {
            Some(name) if self.is_participant_subreddit => format!("r/{name}"),
            Some(name) => format!("u/{name}"),
            None => String::from("u/[deleted]"),
        }
    }
}

/// The state a modmail conversation is filed under.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(from = "u8")]
pub enum ConversationState {
    #[default]
    New,
    InProgress,
    Archived,
    Appeal,
    JoinRequest,
    Filtered,
    Other(u8),
}

impl From<u8> for ConversationState {
    fn from(value: u8) -> Self {
        match value {
            0 => ConversationState::New,
            1 => ConversationState::InProgress,
            2 => ConversationState::Archived,
            3 => ConversationState::Appeal,
            4 => ConversationState::JoinRequest,
            5 => ConversationState::Filtered,
            n => ConversationState::Other(n),
        }
    }
}

/// A modmail conversation.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModmailConversation {
    pub id: String,

    #[serde(default)]
    pub subject: String,

    pub owner: ConversationOwner,

    #[serde(default)]
    pub participant: Option<Participant>,

    #[serde(default)]
    pub is_internal: bool,

    #[serde(default)]
    pub last_mod_update: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_user_update: Option<DateTime<Utc>>,

    #[serde(default)]
    pub state: ConversationState,
}

impl ModmailConversation {
    /// Name of the subreddit the conversation belongs to.
    pub fn subreddit(&self) -> &str {
        &self.owner.display_name
    }

    /// A prefix identifying the conversation in log messages.
    pub fn log_prefix(&self) -> String {
        let participant = self
            .participant
            .as_ref()
            .map_or_else(|| String::from("u/[deleted]"), Participant::prefixed_name);
        format!(
            "Modmail | r/{} | {} | {} | {}",
            self.subreddit(),
            self.id,
            participant,
            convert_html_entities(&self.subject)
        )
    }
}

/// One page of modmail conversations.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPage {
    #[serde(default)]
    pub conversations: HashMap<String, ModmailConversation>,

    /// Conversation ids in display order.
    #[serde(default)]
    pub conversation_ids: Vec<String>,
}

impl ConversationPage {
    /// Conversations in display order.
    pub fn into_ordered(mut self) -> Vec<ModmailConversation> {
        self.conversation_ids
            .iter()
            .filter_map(|id| self.conversations.remove(id))
            .collect()
    }
}

/// A moderator as listed in a subreddit's mod list.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Moderator {
    pub name: String,

    #[serde(default)]
    pub mod_permissions: Vec<String>,
}

/// A mod log entry.
#[derive(Clone, Debug, Deserialize)]
pub struct ModAction {
    pub id: String,

    /// The moderator who performed the action.
    #[serde(rename = "mod")]
    pub moderator: String,

    pub action: String,

    pub created_utc: f64,

    #[serde(default)]
    pub target_fullname: Option<String>,
}

impl HasAge for ModAction {
    fn created_utc(&self) -> DateTime<Utc> {
        from_epoch(self.created_utc)
    }
}

/// Basic information about a subreddit.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SubredditInfo {
    pub display_name: String,

    #[serde(default)]
    pub subscribers: u64,
}

/// The authenticated account.
#[derive(Clone, Debug, Deserialize)]
pub struct Account {
    pub name: String,
}
