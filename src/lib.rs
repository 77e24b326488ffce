// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! automodder performs bulk moderator actions in the subreddits you
//! moderate and reports on how active each subreddit's moderators are.
//!
//! # Examples
//!
//! Remove and lock low-scoring, old items from the modqueues of every
//! moderated subreddit with at least the configured number of subscribers:
//!
//! ```bash
//! automodder modqueue
//! ```
//!
//! Only look at comments in two specific subreddits, and only report what
//! would be done:
//!
//! ```bash
//! automodder -S rust,golang -d modqueue -o comments
//! ```
//!
//! Archive answered modmail in the "new" and "in progress" folders without
//! asking for confirmation:
//!
//! ```bash
//! automodder modmail -s new -s inprogress -y
//! ```
//!
//! Show where a moderator has been inactive over the last two weeks:
//!
//! ```bash
//! automodder inactive -r some_moderator -w 14
//! ```
//!
//! Publish the same report as a shared Google spreadsheet:
//!
//! ```bash
//! automodder inactive -r some_moderator -o sheets
//! ```
//!
//! # Setup
//!
//! automodder reads two files from the current directory:
//!
//! - `credentials.toml` holds the client ID and secret of a Reddit "script"
//!   application, along with the moderator account's username and password.
//!   An optional `[google]` section names a service account key, which is
//!   needed only for `inactive -o sheets`.
//! - `config.json` holds default criteria. If it does not exist, you will be
//!   prompted for each value the first time automodder runs.
//!
//! See [`conf`] for the format of each file.
//!
//! # License
//!
//! automodder is licensed under the terms of the [Apache License 2.0]. Please
//! see the LICENSE file accompanying this source code or visit the previous
//! link for more information on licensing.
//!
//! [Apache License 2.0]: https://www.apache.org/licenses/LICENSE-2.0

pub mod activity;
pub mod bucket;
pub mod check;
pub mod cli;
pub mod clock;
pub mod conf;
pub mod count;
pub mod http;
pub mod modmail;
pub mod modqueue;
pub mod pipeline;
pub mod reddit;
pub mod sheets;
pub mod text;
pub mod view;
pub mod writer;

#[cfg(test)]
mod test_utils;
