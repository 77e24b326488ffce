// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Clients for reading and moderating Reddit content.

use crate::clock::{DateTime, HasAge, Utc};
use crate::conf::RedditCredentials;
use crate::http;
use crate::reddit::listing::{PAGE_SIZE, Page, paginate};
use crate::reddit::service::{RedditService, Service};
use crate::reddit::thing::{
    Account, ConversationPage, Envelope, ItemKind, Listing, ModAction, ModmailConversation,
    Moderator, QueueItem, SubredditInfo,
};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// A Reddit API client acting on behalf of a moderator.
#[derive(Debug)]
pub struct Reddit<S: Service = RedditService> {
    service: S,
}

impl Reddit<RedditService> {
    /// Connects to reddit.com with the given credentials.
    pub fn connect(credentials: RedditCredentials) -> Result<Self, Error> {
        let service = RedditService::new(credentials)?;
        Ok(Self::new(service))
    }
}

impl<S: Service> Reddit<S> {
    /// Creates a new client backed by `service`.
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// The underlying service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// The authenticated account.
    pub async fn me(&self) -> Result<Account, Error> {
        let body = self.service.get("/api/v1/me", &[]).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Information about a single subreddit.
    pub async fn subreddit(&self, name: &str) -> Result<SubredditInfo, Error> {
        let body = self.service.get(&format!("/r/{name}/about"), &[]).await?;
        let envelope: Envelope<SubredditInfo> = serde_json::from_str(&body)?;
        Ok(envelope.data)
    }

    /// Every subreddit the authenticated account moderates.
    pub async fn moderated_subreddits(&self) -> Result<Vec<SubredditInfo>, Error> {
        let query = [("limit", PAGE_SIZE.to_string())];
        let subreddits: Vec<Envelope<SubredditInfo>> =
            self.listing("/subreddits/mine/moderator", &query, |_| true).await?;
        Ok(subreddits.into_iter().map(|e| e.data).collect())
    }

    /// Items waiting in a subreddit's modqueue, optionally restricted to
    /// one kind of item.
    pub async fn modqueue(
        &self,
        subreddit: &str,
        only: Option<ItemKind>,
    ) -> Result<Vec<QueueItem>, Error> {
        let mut query = vec![("limit", PAGE_SIZE.to_string())];
        if let Some(kind) = only {
            query.push(("only", kind.as_query().to_string()));
        }
        let path = format!("/r/{subreddit}/about/modqueue");
        self.listing(&path, &query, |_| true).await
    }

    /// A subreddit's moderators, in order of seniority.
    pub async fn moderators(&self, subreddit: &str) -> Result<Vec<Moderator>, Error> {
        let path = format!("/r/{subreddit}/about/moderators");
        let body = self.service.get(&path, &[]).await?;
        let listing: Listing<Moderator> = serde_json::from_str(&body)?;
        Ok(listing.data.children)
    }

    /// Mod log entries, newest first, back to `since`.
    pub async fn mod_log(
        &self,
        subreddit: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ModAction>, Error> {
        let query = [("limit", PAGE_SIZE.to_string())];
        let path = format!("/r/{subreddit}/about/log");
        let actions: Vec<Envelope<ModAction>> = self
            .listing(&path, &query, |e: &Envelope<ModAction>| {
                e.data.created_utc() >= since
            })
            .await?;
        Ok(actions.into_iter().map(|e| e.data).collect())
    }

    /// Modmail conversations for the given subreddits in `state`, most
    /// recent first.
    ///
    /// All subreddits are fetched with a single query.
    pub async fn conversations(
        &self,
        subreddits: &[String],
        state: &str,
    ) -> Result<Vec<ModmailConversation>, Error> {
        let query = [
            ("entity", subreddits.join(",")),
            ("state", state.to_string()),
            ("sort", String::from("recent")),
            ("limit", PAGE_SIZE.to_string()),
        ];
        let query = &query;
        paginate(
            move |after| async move {
                let mut query = query.to_vec();
                if let Some(after) = after {
                    query.push(("after", after));
                }
                let body = self.service.get("/api/mod/conversations", &query).await?;
                let page: ConversationPage = serde_json::from_str(&body)?;
                let items = page.into_ordered();
                let after = if items.len() >= PAGE_SIZE {
                    items.last().map(|c| c.id.clone())
                } else {
                    None
                };
                Ok::<_, Error>(Page { items, after })
            },
            |_| true,
        )
        .await
    }

    /// Removes a comment or submission. Items are never marked as spam.
    pub async fn remove(&self, fullname: &str) -> Result<(), Error> {
        let form = [("id", fullname.to_string()), ("spam", String::from("false"))];
        self.service.post("/api/remove", &form).await?;
        Ok(())
    }

    /// Locks a comment or submission.
    pub async fn lock(&self, fullname: &str) -> Result<(), Error> {
        self.service
            .post("/api/lock", &[("id", fullname.to_string())])
            .await?;
        Ok(())
    }

    /// Approves a comment or submission.
    pub async fn approve(&self, fullname: &str) -> Result<(), Error> {
        self.service
            .post("/api/approve", &[("id", fullname.to_string())])
            .await?;
        Ok(())
    }

    /// Archives a modmail conversation.
    pub async fn archive(&self, conversation_id: &str) -> Result<(), Error> {
        let path = format!("/api/mod/conversations/{conversation_id}/archive");
        self.service.post(&path, &[]).await?;
        Ok(())
    }

    async fn listing<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        keep_going: impl FnMut(&T) -> bool,
    ) -> Result<Vec<T>, Error> {
        paginate(
            move |after| async move {
                let mut query = query.to_vec();
                if let Some(after) = after {
                    query.push(("after", after));
                }
                let body = self.service.get(path, &query).await?;
                let listing: Listing<T> = serde_json::from_str(&body)?;
                Ok::<_, Error>(Page {
                    items: listing.data.children,
                    after: listing.data.after,
                })
            },
            keep_going,
        )
        .await
    }
}

/// A client error.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the underlying HTTP service.
    #[error("Service error: {0}")]
    Service(#[from] http::HTTPError),

    /// An error parsing data.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
