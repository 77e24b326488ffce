// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! HTTPS connector for the Reddit API.
//!
//! Service structures in this module provide a low-level way to interact
//! with the Reddit API over HTTPS, essentially a specialized HTTPS client
//! specifically for Reddit. Every request is authenticated with an OAuth
//! bearer token, which is fetched on first use and refreshed when it
//! expires.

use crate::clock::{Clock, SystemClock};
use crate::conf::RedditCredentials;
use crate::http::{HTTPResult, HTTPService, json_body};
use crate::reddit::auth::{self, Token};
use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tokio::sync::Mutex;

/// Base URL for authenticated API calls.
pub const API_BASE: &str = "https://oauth.reddit.com";

/// A service for reading and moderating Reddit content.
///
/// Using this trait, clients can implement different ways of connecting
/// to the Reddit API, such as an actual connector for production code,
/// and a stateful fake for testing purposes. Paths are relative to the API
/// base, e.g. `/r/rust/about/modqueue`.
pub trait Service {
    /// Performs a GET request and returns the raw JSON body.
    fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = HTTPResult<String>> + Send;

    /// Performs a form-encoded POST request and returns the raw JSON body.
    fn post(
        &self,
        path: &str,
        form: &[(&str, String)],
    ) -> impl Future<Output = HTTPResult<String>> + Send;
}

/// A service that contacts the Reddit API directly.
#[derive(Debug)]
pub struct RedditService {
    client: Client,
    credentials: RedditCredentials,
    api_base: String,
    token_url: String,
    token: Mutex<Option<Token>>,
}

impl RedditService {
    /// Creates a service that talks to reddit.com.
    pub fn new(credentials: RedditCredentials) -> HTTPResult<Self> {
        Self::with_endpoints(credentials, API_BASE, auth::TOKEN_URL)
    }

    /// Creates a service that talks to the given endpoints instead of
    /// reddit.com.
    pub fn with_endpoints(
        credentials: RedditCredentials,
        api_base: impl Into<String>,
        token_url: impl Into<String>,
    ) -> HTTPResult<Self> {
        let client = match &credentials.user_agent {
            Some(user_agent) => Self::client_with_user_agent(user_agent)?,
            None => Self::client()?,
        };
        Ok(Self {
            client,
            credentials,
            api_base: api_base.into(),
            token_url: token_url.into(),
            token: Mutex::new(None),
        })
    }

    fn uri(&self, path: &str) -> String {
        format!("{}{path}", self.api_base.trim_end_matches('/'))
    }

    async fn bearer(&self) -> HTTPResult<String> {
        let now = SystemClock.now();
        let mut token = self.token.lock().await;
        match token.as_ref() {
            Some(current) if !current.is_expired(now) => Ok(current.access_token().to_string()),
            _ => {
                log::debug!("Requesting access token for u/{}", self.credentials.username);
                let fresh =
                    auth::password_grant(&self.client, &self.token_url, &self.credentials, now)
                        .await?;
                let access_token = fresh.access_token().to_string();
                *token = Some(fresh);
                Ok(access_token)
            }
        }
    }

    async fn send(&self, request: RequestBuilder) -> HTTPResult<String> {
        let bearer = self.bearer().await?;
        let resp = request.bearer_auth(bearer).send().await?;
        let delay = throttle_delay(&resp);
        if let Some(delay) = delay {
            log::warn!("Rate limit reached, sleeping for {} seconds", delay.as_secs());
            tokio::time::sleep(delay).await;
        }
        json_body(resp).await
    }
}

impl HTTPService for RedditService {}

impl Service for RedditService {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> HTTPResult<String> {
        let uri = self.uri(path);
        log::trace!("GET {uri} {query:?}");
        let mut query = query.to_vec();
        query.push(("raw_json", String::from("1")));
        self.send(self.client.get(uri).query(&query)).await
    }

    async fn post(&self, path: &str, form: &[(&str, String)]) -> HTTPResult<String> {
        let uri = self.uri(path);
        log::trace!("POST {uri} {form:?}");
        self.send(self.client.post(uri).form(form)).await
    }
}

/// Seconds to wait before the next request, if the rate limit is used up.
fn rate_limit_delay(remaining: Option<&str>, reset: Option<&str>) -> Option<Duration> {
    let remaining: f64 = remaining?.trim().parse().ok()?;
    if remaining >= 1.0 {
        return None;
    }
    let reset: f64 = reset?.trim().parse().ok()?;
    Some(Duration::from_secs_f64(reset.max(0.0)))
}

fn throttle_delay(resp: &Response) -> Option<Duration> {
    let header = |name: &str| resp.headers().get(name).and_then(|v| v.to_str().ok());
    rate_limit_delay(header("x-ratelimit-remaining"), header("x-ratelimit-reset"))
}
