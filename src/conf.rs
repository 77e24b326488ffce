// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Settings and credentials.
//!
//! Two files are read at startup:
//!
//! - `config.json` holds defaults for the scan criteria. If it does not
//!   exist, the user is prompted for each value and the file is written.
//! - `credentials.toml` holds the Reddit OAuth credentials and, optionally,
//!   the path to a Google service-account key used for spreadsheet output.

use chrono::TimeDelta;
use inquire::{CustomType, Text};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::{fmt, fs, io};
use thiserror::Error;

/// Default criteria and scan options.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Settings {
    /// The minimum age of an item, in hours, to be considered for removal.
    pub min_age: u64,

    /// Items scoring below this are considered for removal.
    pub min_score: i64,

    /// The minimum subscriber count of a moderated subreddit to be scanned
    /// when no subreddits are given on the command line.
    pub min_subscriber_count: u64,

    /// The default username.
    pub username: String,

    /// Number of days of mod log considered when collecting activity.
    #[serde(default = "default_activity_window_days")]
    pub activity_window_days: u32,
}

fn default_activity_window_days() -> u32 {
    30
}

impl Settings {
    /// Default location of the settings file.
    pub const FILE: &'static str = "config.json";

    /// Loads settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data)
    }

    /// Parses settings from a JSON string.
    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(data)?)
    }

    /// Loads settings from `path`, or prompts for them and saves them to
    /// `path` if the file does not exist yet.
    pub fn load_or_prompt(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        log::info!("{} not found, creating it", path.display());
        let settings = Self::prompt()?;
        settings.save(path)?;
        Ok(settings)
    }

    fn prompt() -> Result<Self, ConfigError> {
        let min_age = CustomType::<u64>::new("Enter the minimum item age in hours")
            .with_help_message("The minimum age of a post to be considered by the bot.")
            .prompt()?;
        let min_score = CustomType::<i64>::new("Enter the min_score")
            .with_help_message("The minimum score of a post to be considered by the bot.")
            .prompt()?;
        let min_subscriber_count = CustomType::<u64>::new("Enter the min_subscriber_count")
            .with_help_message(
                "The minimum subscriber count of a subreddit for the bot to consider.",
            )
            .prompt()?;
        let username = Text::new("Enter the username")
            .with_help_message("The default username.")
            .prompt()?;

        Ok(Self {
            min_age,
            min_score,
            min_subscriber_count,
            username,
            activity_window_days: default_activity_window_days(),
        })
    }

    /// Saves the settings as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The minimum item age as a duration.
    pub fn min_age(&self) -> TimeDelta {
        hours(self.min_age)
    }
}

/// Converts a number of hours into a duration, saturating on overflow.
pub fn hours(n: u64) -> TimeDelta {
    TimeDelta::try_hours(i64::try_from(n).unwrap_or(i64::MAX)).unwrap_or(TimeDelta::MAX)
}

/// API credentials.
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    /// Reddit script-app credentials.
    pub reddit: RedditCredentials,

    /// Google service-account credentials, needed only for spreadsheet output.
    #[serde(default)]
    pub google: Option<GoogleCredentials>,
}

impl Credentials {
    /// Default location of the credentials file.
    pub const FILE: &'static str = "credentials.toml";

    /// Loads credentials from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data)
    }

    /// Parses credentials from a TOML string.
    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        let credentials: Self = toml::from_str(data)?;
        credentials.reddit.validate()?;
        Ok(credentials)
    }
}

/// Credentials for a Reddit "script" application, used with the OAuth
/// password grant.
#[derive(Clone, Deserialize)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,

    /// Overrides the default user agent sent to Reddit.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl RedditCredentials {
    fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("reddit.client_id", &self.client_id),
            ("reddit.client_secret", &self.client_secret),
            ("reddit.username", &self.username),
            ("reddit.password", &self.password),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ConfigError::Missing(*name)),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Credentials for the Google Sheets API.
#[derive(Clone, Debug, Deserialize)]
pub struct GoogleCredentials {
    /// Path to a service-account key in JSON format.
    pub service_account_key: PathBuf,
}

/// An error loading settings or credentials.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("could not write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid credentials: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("missing value for {0}")]
    Missing(&'static str),

    #[error("prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),
}

#[cfg(test)]
mod tests {
    mod settings {
        use super::super::*;
        use pretty_assertions::assert_eq;
        use tempfile::TempDir;

        const DATA: &str = r#"{
            "min_age": 24,
            "min_score": 1,
            "min_subscriber_count": 500,
            "username": "automodder"
        }"#;

        #[test]
        fn it_parses_settings() {
            let settings = Settings::parse(DATA).unwrap();
            assert_eq!(settings.min_age, 24);
            assert_eq!(settings.min_score, 1);
            assert_eq!(settings.min_subscriber_count, 500);
            assert_eq!(settings.username, "automodder");
        }

        #[test]
        fn it_defaults_the_activity_window() {
            let settings = Settings::parse(DATA).unwrap();
            assert_eq!(settings.activity_window_days, 30);
        }

        #[test]
        fn it_converts_min_age_to_a_duration() {
            let settings = Settings::parse(DATA).unwrap();
            assert_eq!(settings.min_age(), TimeDelta::hours(24));
        }

        #[test]
        fn it_saturates_huge_ages() {
            assert_eq!(hours(u64::MAX), TimeDelta::MAX);
        }

        #[test]
        fn it_round_trips_through_a_file() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("config.json");
            let settings = Settings::parse(DATA).unwrap();
            settings.save(&path).unwrap();
            assert_eq!(Settings::load(&path).unwrap(), settings);
        }

        #[test]
        fn it_loads_an_existing_file_without_prompting() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("config.json");
            fs::write(&path, DATA).unwrap();
            let settings = Settings::load_or_prompt(&path).unwrap();
            assert_eq!(settings.username, "automodder");
        }

        #[test]
        fn it_reports_missing_files() {
            let err = Settings::load("/nonexistent/config.json").unwrap_err();
            assert!(matches!(err, ConfigError::Read { .. }));
            assert!(err.to_string().contains("/nonexistent/config.json"));
        }

        #[test]
        fn it_rejects_incomplete_settings() {
            let err = Settings::parse(r#"{"min_age": 24}"#).unwrap_err();
            assert!(matches!(err, ConfigError::Json(_)));
        }
    }

    mod credentials {
        use super::super::*;
        use indoc::indoc;

        const DATA: &str = indoc! {r#"
            [reddit]
            client_id = "client"
            client_secret = "secret"
            username = "automodder"
            password = "hunter2"

            [google]
            service_account_key = "service-account.json"
        "#};

        #[test]
        fn it_parses_credentials() {
            let credentials = Credentials::parse(DATA).unwrap();
            assert_eq!(credentials.reddit.client_id, "client");
            assert_eq!(credentials.reddit.username, "automodder");
            assert_eq!(credentials.reddit.user_agent, None);
            assert_eq!(
                credentials.google.unwrap().service_account_key,
                PathBuf::from("service-account.json")
            );
        }

        #[test]
        fn it_treats_google_credentials_as_optional() {
            let data = indoc! {r#"
                [reddit]
                client_id = "client"
                client_secret = "secret"
                username = "automodder"
                password = "hunter2"
            "#};
            let credentials = Credentials::parse(data).unwrap();
            assert!(credentials.google.is_none());
        }

        #[test]
        fn it_rejects_blank_values() {
            let data = indoc! {r#"
                [reddit]
                client_id = "client"
                client_secret = ""
                username = "automodder"
                password = "hunter2"
            "#};
            let err = Credentials::parse(data).unwrap_err();
            assert!(matches!(err, ConfigError::Missing("reddit.client_secret")));
        }

        #[test]
        fn it_rejects_missing_sections() {
            let err = Credentials::parse("[google]\nservice_account_key = \"x\"\n").unwrap_err();
            assert!(matches!(err, ConfigError::Toml(_)));
        }

        #[test]
        fn it_redacts_secrets_when_debugging() {
            let credentials = Credentials::parse(DATA).unwrap();
            let debug = format!("{:?}", credentials.reddit);
            assert!(!debug.contains("hunter2"));
            assert!(!debug.contains("\"secret\""));
            assert!(debug.contains("<redacted>"));
        }
    }
}
