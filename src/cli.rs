// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Drives the command-line program.

use crate::activity::ActivityCollector;
use crate::check::{
    Criteria, check_age, check_pending_response, check_removed_by_automated_spam, check_score,
    check_unanswered,
};
use crate::clock::{Clock, SystemClock, TimeDelta};
use crate::conf::{ConfigError, Credentials, Settings, hours};
use crate::count::SortAlgorithm;
use crate::http::HTTPError;
use crate::modmail::{MailState, Modmail};
use crate::modqueue::Modqueue;
use crate::pipeline::Report;
use crate::reddit::client::{self, Reddit};
use crate::reddit::service::{RedditService, Service};
use crate::reddit::thing::{ItemKind, SubredditInfo};
use crate::sheets::{SheetsClient, SheetsError};
use crate::text::plural;
use crate::view::{ViewOptions, Viewable};
use crate::writer::{ActivityReport, ConsoleWriter, SheetsWriter};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use inquire::Confirm;
use itertools::Itertools;
use regex::Regex;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Program configuration.
#[derive(Debug, Parser)]
#[command(version)]
#[command(about = "Performs bulk moderator actions in the subreddits you moderate", long_about = None)]
pub struct Config {
    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,

    /// Subreddits to act on, as a comma-separated list
    #[arg(short = 'S', long, value_delimiter = ',', global = true)]
    subreddits: Vec<String>,

    /// Only act on moderated subreddits with at least this many subscribers
    #[arg(short = 'c', long, value_name = "COUNT", global = true)]
    min_subscriber_count: Option<u64>,

    /// Don't action anything, just scan
    #[arg(short = 'd', long, default_value_t = false, global = true)]
    dry_run: bool,

    /// Path to the settings file
    #[arg(long, value_name = "FILE", default_value = Settings::FILE, global = true)]
    config: PathBuf,

    /// Path to the credentials file
    #[arg(long, value_name = "FILE", default_value = Credentials::FILE, global = true)]
    credentials: PathBuf,

    #[command(subcommand)]
    command: Command,
}

impl Config {
    pub fn verbosity(&self) -> Verbosity<InfoLevel> {
        self.verbosity
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Remove and lock low-quality items in the modqueue
    Modqueue(ModqueueConfig),

    /// Archive modmail conversations that need no further attention
    Modmail(ModmailConfig),

    /// Report moderator activity and inactivity
    Inactive(InactiveConfig),
}

#[derive(Args, Debug)]
struct ModqueueConfig {
    /// Remove items scoring below this [default: min_score setting]
    #[arg(short = 's', long, allow_negative_numbers = true)]
    min_score: Option<i64>,

    /// Remove items at least this many hours old [default: min_age setting]
    #[arg(short = 'a', long, value_name = "HOURS")]
    min_age: Option<u64>,

    /// Only scan this kind of item
    #[arg(short = 'o', long)]
    only: Option<Only>,

    /// Leave previously approved items in the queue
    #[arg(long, default_value_t = false)]
    no_reapprove: bool,
}

/// Kinds of modqueue items that can be scanned on their own.
#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum Only {
    Links,
    Comments,
}

impl From<Only> for ItemKind {
    fn from(only: Only) -> Self {
        match only {
            Only::Links => ItemKind::Submission,
            Only::Comments => ItemKind::Comment,
        }
    }
}

#[derive(Args, Debug)]
struct ModmailConfig {
    /// Modmail folders to scan; may be given more than once
    #[arg(short = 's', long = "state", value_name = "STATE")]
    states: Vec<MailState>,

    /// Archive conversations no moderator has answered
    #[arg(short = 'a', long, default_value_t = false)]
    ignore_unanswered: bool,

    /// Archive conversations where the user replied after the last moderator
    #[arg(short = 'r', long, default_value_t = false)]
    ignore_pending_response: bool,

    /// Archive without asking for confirmation
    #[arg(short = 'y', long, default_value_t = false)]
    yes: bool,
}

#[derive(Args, Debug)]
struct InactiveConfig {
    /// Redditor to check [default: username setting, or the authenticated account]
    #[arg(short = 'r', long)]
    redditor: Option<String>,

    /// Where to write the results
    #[arg(short = 'o', long, default_value = "console")]
    output: Output,

    /// Number of days of mod log to consider [default: activity_window_days setting]
    #[arg(short = 'w', long = "days", value_name = "DAYS")]
    days: Option<u32>,

    /// Sort moderator tallies by number of actions instead of by name
    #[arg(long, default_value_t = false)]
    sort_by_count: bool,
}

impl InactiveConfig {
    fn sort_algorithm(&self) -> SortAlgorithm {
        if self.sort_by_count {
            SortAlgorithm::Numerically
        } else {
            SortAlgorithm::Lexicographically
        }
    }
}

/// Destination of the inactivity report.
#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum Output {
    #[default]
    Console,
    Sheets,
}

/// An error that stops the program.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Reddit error: {0}")]
    Reddit(#[from] client::Error),

    #[error("Could not connect to Reddit: {0}")]
    Http(#[from] HTTPError),

    #[error("Google Sheets error: {0}")]
    Sheets(#[from] SheetsError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("No subreddits to act on")]
    NoSubreddits,

    #[error("Invalid subreddit name: {0}")]
    InvalidSubreddit(String),

    #[error("Invalid subreddit pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("No [google] section in the credentials file; it is needed for spreadsheet output")]
    MissingGoogleCredentials,
}

/// Validates a subreddit name, stripping any leading `r/`.
///
/// # Examples
///
/// ```
/// use automodder::cli::normalize_subreddit;
/// assert_eq!(normalize_subreddit("r/rust").unwrap(), "rust");
/// assert!(normalize_subreddit("not a subreddit").is_err());
/// ```
pub fn normalize_subreddit(name: &str) -> Result<String, Error> {
    let trimmed = name.trim();
    let bare = trimmed
        .strip_prefix("/r/")
        .or_else(|| trimmed.strip_prefix("r/"))
        .unwrap_or(trimmed);
    let re = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_]{1,20}$")?;
    if re.is_match(bare) {
        Ok(bare.to_string())
    } else {
        Err(Error::InvalidSubreddit(name.to_string()))
    }
}

/// Strips any leading `u/` from a username.
fn normalize_redditor(name: &str) -> &str {
    let name = name.trim();
    name.strip_prefix("/u/")
        .or_else(|| name.strip_prefix("u/"))
        .unwrap_or(name)
}

/// Moderated subreddits with at least `min_subscribers` subscribers.
fn large_enough(subreddits: Vec<SubredditInfo>, min_subscribers: u64) -> Vec<SubredditInfo> {
    subreddits
        .into_iter()
        .filter(|sub| sub.subscribers >= min_subscribers)
        .collect()
}

fn log_scan_error(subreddit: &str, err: &client::Error) {
    match err {
        client::Error::Service(HTTPError::Http(status)) if *status == StatusCode::FORBIDDEN => {
            log::error!("r/{subreddit}: Forbidden to scan modqueue")
        }
        _ => log::error!("r/{subreddit}: Error scanning modqueue: {err}"),
    }
}

/// Runs the command-line program.
#[derive(Debug)]
pub struct Runner<S: Service = RedditService> {
    config: Config,
    settings: Settings,
    credentials: Credentials,
    reddit: Reddit<S>,
}

impl Runner<RedditService> {
    /// Create a new program runner using the given `config`.
    ///
    /// Reddit credentials are loaded and settings are read, or prompted for,
    /// from the paths named in `config`.
    pub fn new(config: Config) -> Result<Self, Error> {
        let credentials = Credentials::load(&config.credentials)?;
        let settings = Settings::load_or_prompt(&config.config)?;
        let reddit = Reddit::connect(credentials.reddit.clone())?;
        Ok(Self::with_reddit(config, settings, credentials, reddit))
    }
}

impl<S: Service> Runner<S> {
    /// A runner that talks to Reddit through `reddit`.
    pub fn with_reddit(
        config: Config,
        settings: Settings,
        credentials: Credentials,
        reddit: Reddit<S>,
    ) -> Self {
        Self {
            config,
            settings,
            credentials,
            reddit,
        }
    }

    /// Run the command-line program using its stored configuration options.
    pub async fn run(&self) -> Result<(), Error> {
        if self.config.dry_run {
            log::info!("Dry run, nothing will be changed");
        }
        match &self.config.command {
            Command::Modqueue(opts) => self.run_modqueue(opts).await,
            Command::Modmail(opts) => self.run_modmail(opts).await,
            Command::Inactive(opts) => self.run_inactive(opts).await,
        }
    }

    async fn run_modqueue(&self, opts: &ModqueueConfig) -> Result<(), Error> {
        let now = SystemClock.now();
        let min_score = opts.min_score.unwrap_or(self.settings.min_score);
        let min_age = opts
            .min_age
            .map(hours)
            .unwrap_or_else(|| self.settings.min_age());
        let criteria = Criteria::new(vec![
            check_score(min_score),
            check_age(min_age, now),
            check_removed_by_automated_spam(),
        ]);

        let mut total = Report::default();
        for subreddit in self.subreddit_names().await? {
            let mut modqueue = Modqueue::new(
                &self.reddit,
                subreddit.as_str(),
                &criteria,
                opts.only.map(ItemKind::from),
                !opts.no_reapprove,
                now,
            );
            if let Err(err) = modqueue.scan().await {
                log_scan_error(&subreddit, &err);
                continue;
            }
            let mut report = modqueue.report();
            if !self.config.dry_run {
                modqueue.remove_found(&mut report).await;
                modqueue.reapprove_found(&mut report).await;
            }
            total.merge(report);
        }

        let opts = ViewOptions::build().show_failures(true).build();
        println!("{}", total.view(&opts));
        Ok(())
    }

    async fn run_modmail(&self, opts: &ModmailConfig) -> Result<(), Error> {
        let criteria = Criteria::new(vec![
            check_unanswered(opts.ignore_unanswered),
            check_pending_response(opts.ignore_pending_response),
        ]);
        let subreddits = self.subreddit_names().await?;
        let mut modmail = Modmail::new(&self.reddit, subreddits, opts.states.clone(), &criteria);
        modmail.scan().await?;
        println!("{}", modmail.tallies().view(&ViewOptions::default()));

        let mut report = modmail.report();
        let selected = modmail.to_archive().len();
        if !self.config.dry_run && selected > 0 && (opts.yes || confirm_archive(selected)?) {
            modmail.archive_found(&mut report).await;
        }

        let view_opts = ViewOptions::build().show_failures(true).build();
        println!("{}", report.view(&view_opts));
        Ok(())
    }

    async fn run_inactive(&self, opts: &InactiveConfig) -> Result<(), Error> {
        let report = self.activity_report(opts).await?;
        match opts.output {
            Output::Console => {
                let view_opts = ViewOptions::build().sort(opts.sort_algorithm()).build();
                ConsoleWriter::new(view_opts).write(&report);
            }
            Output::Sheets => {
                let google = self
                    .credentials
                    .google
                    .as_ref()
                    .ok_or(Error::MissingGoogleCredentials)?;
                let client = SheetsClient::connect(&google.service_account_key).await?;
                let url = SheetsWriter::new(&client, opts.sort_algorithm())
                    .write(&report)
                    .await?;
                println!("Spreadsheet created: {url}");
            }
        }
        Ok(())
    }

    /// Collects mod log activity and sorts the subreddits into buckets.
    async fn activity_report(&self, opts: &InactiveConfig) -> Result<ActivityReport, Error> {
        let redditor = self.redditor(opts).await?;
        let days = opts.days.unwrap_or(self.settings.activity_window_days);
        let since = SystemClock.now() - TimeDelta::days(i64::from(days));
        log::info!(
            "Checking activity of u/{redditor} over the last {}",
            plural(days as usize, "day")
        );

        let subreddits = self.subreddit_infos().await?;
        let activity = ActivityCollector::new(&self.reddit, since)
            .collect(&subreddits)
            .await;
        Ok(ActivityReport::new(activity, &redditor))
    }

    /// The redditor whose activity is checked: `--redditor`, then the
    /// `username` setting, then the authenticated account.
    async fn redditor(&self, opts: &InactiveConfig) -> Result<String, Error> {
        let name = opts
            .redditor
            .as_deref()
            .unwrap_or(self.settings.username.as_str());
        let name = normalize_redditor(name);
        if name.is_empty() {
            Ok(self.reddit.me().await?.name)
        } else {
            Ok(name.to_string())
        }
    }

    /// Subreddits named with `--subreddits`, validated, each listed once.
    ///
    /// Names are compared without regard to case and the first spelling
    /// given is kept.
    fn requested_subreddits(&self) -> Result<Vec<String>, Error> {
        let names: Vec<String> = self
            .config
            .subreddits
            .iter()
            .map(|name| normalize_subreddit(name))
            .collect::<Result<_, _>>()?;
        Ok(names
            .into_iter()
            .unique_by(|name| name.to_lowercase())
            .collect())
    }

    /// Names of the subreddits to act on.
    async fn subreddit_names(&self) -> Result<Vec<String>, Error> {
        if self.config.subreddits.is_empty() {
            let subreddits = self.subreddit_infos().await?;
            Ok(subreddits.into_iter().map(|sub| sub.display_name).collect())
        } else {
            self.requested_subreddits()
        }
    }

    /// The subreddits to act on, with their subscriber counts.
    ///
    /// Without `--subreddits`, these are the moderated subreddits with at
    /// least the minimum number of subscribers.
    async fn subreddit_infos(&self) -> Result<Vec<SubredditInfo>, Error> {
        let subreddits = if self.config.subreddits.is_empty() {
            let min = self
                .config
                .min_subscriber_count
                .unwrap_or(self.settings.min_subscriber_count);
            let moderated = self.reddit.moderated_subreddits().await?;
            let count = moderated.len();
            let selected = large_enough(moderated, min);
            log::debug!(
                "{} of {} have at least {min} subscribers",
                selected.len(),
                plural(count, "moderated subreddit")
            );
            selected
        } else {
            let mut subreddits = Vec::new();
            for name in self.requested_subreddits()? {
                match self.reddit.subreddit(&name).await {
                    Ok(info) => subreddits.push(info),
                    Err(err) => log::warn!("r/{name}: Could not get subreddit information: {err}"),
                }
            }
            subreddits
        };

        if subreddits.is_empty() {
            Err(Error::NoSubreddits)
        } else {
            Ok(subreddits)
        }
    }
}

fn confirm_archive(count: usize) -> Result<bool, Error> {
    let answer = Confirm::new(&format!(
        "Are you sure you want to archive {}?",
        plural(count, "conversation")
    ))
    .with_default(false)
    .prompt()?;
    Ok(answer)
}
