// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! OAuth access tokens for "script" applications.

use crate::clock::{DateTime, TimeDelta, Utc};
use crate::conf::RedditCredentials;
use crate::http::{HTTPError, HTTPResult, json_body};
use reqwest::Client;
use serde::Deserialize;

/// Where Reddit grants access tokens.
pub const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Tokens are refreshed this long before they actually expire.
const EXPIRY_MARGIN: TimeDelta = TimeDelta::seconds(60);

/// A bearer token for the Reddit API.
#[derive(Clone)]
pub struct Token {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        let access_token = access_token.into();
        Self {
            access_token,
            expires_at,
        }
    }

    /// The token value sent in the Authorization header.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// True if the token has expired, or is about to, as of `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now + EXPIRY_MARGIN >= self.expires_at
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenResponse {
    Granted {
        access_token: String,
        expires_in: i64,
    },
    Denied {
        error: String,
    },
}

/// Requests a token using the OAuth password grant.
///
/// Reddit answers a bad username or password with a successful response
/// containing an `error` field, which is reported as [`HTTPError::Auth`].
pub async fn password_grant(
    client: &Client,
    token_url: &str,
    credentials: &RedditCredentials,
    now: DateTime<Utc>,
) -> HTTPResult<Token> {
    let form = [
        ("grant_type", "password"),
        ("username", credentials.username.as_str()),
        ("password", credentials.password.as_str()),
    ];
    let resp = client
        .post(token_url)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&form)
        .send()
        .await?;
    let body = json_body(resp).await?;
    parse_token(&body, now)
}

fn parse_token(body: &str, now: DateTime<Utc>) -> HTTPResult<Token> {
    let resp: TokenResponse =
        serde_json::from_str(body).map_err(|err| HTTPError::Auth(err.to_string()))?;
    match resp {
        TokenResponse::Granted {
            access_token,
            expires_in,
        } => {
            let lifetime = TimeDelta::try_seconds(expires_in).unwrap_or(TimeDelta::zero());
            Ok(Token::new(access_token, now + lifetime))
        }
        TokenResponse::Denied { error } => Err(HTTPError::Auth(error)),
    }
}
