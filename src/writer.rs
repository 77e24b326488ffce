// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Writes moderator activity to the terminal or to a spreadsheet.

use crate::activity::SubredditActivity;
use crate::bucket::{Buckets, SubredditBucket};
use crate::count::SortAlgorithm;
use crate::sheets::{HEADER, SheetsClient, SheetsError, format_requests};
use crate::view::{ViewOptions, Viewable};
use serde_json::{Value, json};

/// Title of the worksheet holding per-moderator action counts.
pub const ACTIONS_SHEET: &str = "Moderator Actions";

/// Everything learned about a redditor's standing across subreddits.
#[derive(Clone, Debug)]
pub struct ActivityReport {
    pub buckets: Buckets,
    pub activity: Vec<SubredditActivity>,
}

impl ActivityReport {
    /// Classifies `activity` from the point of view of `redditor`.
    pub fn new(activity: Vec<SubredditActivity>, redditor: &str) -> Self {
        let buckets = Buckets::classify(&activity, redditor);
        Self { buckets, activity }
    }

    pub fn redditor(&self) -> &str {
        self.buckets.redditor()
    }

    pub fn title(&self) -> String {
        format!("Inactivity Information for u/{}", self.redditor())
    }
}

/// Spreadsheet rows for a bucket, header first.
///
/// Each subreddit gets a row for the inspected redditor followed by a row
/// for every moderator that explains the subreddit's placement.
pub fn bucket_rows(bucket: &SubredditBucket, redditor: &str) -> Vec<Vec<Value>> {
    let mut rows = vec![HEADER.iter().map(|h| json!(h)).collect()];
    for entry in &bucket.entries {
        rows.push(vec![
            json!(entry.subreddit),
            json!(entry.subscribers),
            json!(redditor),
            entry.position.map_or(json!(""), |p| json!(p)),
            json!(entry.active),
            json!(entry.actions),
        ]);
        for moderator in &entry.moderators {
            rows.push(vec![
                json!(entry.subreddit),
                json!(entry.subscribers),
                json!(moderator.name),
                json!(moderator.position),
                json!(moderator.is_active()),
                json!(moderator.actions),
            ]);
        }
    }
    rows
}

/// Spreadsheet rows with the number of actions per moderator in each
/// subreddit, header first.
pub fn tally_rows(activity: &[SubredditActivity], sort: SortAlgorithm) -> Vec<Vec<Value>> {
    let mut rows = vec![vec![json!("Subreddit"), json!("Moderator"), json!("Actions")]];
    for sub in activity {
        rows.extend(
            sub.tally
                .sort_by(&sort)
                .map(|(moderator, count)| vec![json!(sub.name()), json!(moderator), json!(count)]),
        );
    }
    rows
}

/// Prints reports to standard output.
#[derive(Debug, Default)]
pub struct ConsoleWriter {
    opts: ViewOptions,
}

impl ConsoleWriter {
    pub fn new(opts: ViewOptions) -> Self {
        Self { opts }
    }

    /// Every non-empty bucket followed by every subreddit's tally.
    pub fn render(&self, report: &ActivityReport) -> String {
        report
            .buckets
            .non_empty()
            .map(|bucket| bucket.view(&self.opts) + "\n")
            .chain(report.activity.iter().map(|sub| sub.view(&self.opts) + "\n"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn write(&self, report: &ActivityReport) {
        print!("{}", self.render(report));
    }
}

/// Publishes reports as a shared Google spreadsheet.
#[derive(Debug)]
pub struct SheetsWriter<'a> {
    client: &'a SheetsClient,
    sort: SortAlgorithm,
}

impl<'a> SheetsWriter<'a> {
    pub fn new(client: &'a SheetsClient, sort: SortAlgorithm) -> Self {
        Self { client, sort }
    }

    /// Creates the spreadsheet and returns its URL.
    ///
    /// One worksheet is added per non-empty bucket, plus a worksheet with
    /// every moderator's action count.
    pub async fn write(&self, report: &ActivityReport) -> Result<String, SheetsError> {
        let buckets: Vec<&SubredditBucket> = report.buckets.non_empty().collect();
        let mut titles: Vec<&str> = buckets.iter().map(|b| b.kind.title()).collect();
        titles.push(ACTIONS_SHEET);

        let spreadsheet = self
            .client
            .create_spreadsheet(&report.title(), &titles)
            .await?;
        let id = &spreadsheet.spreadsheet_id;
        log::info!("Created spreadsheet {id}");

        let mut requests = Vec::new();
        for bucket in buckets {
            let title = bucket.kind.title();
            let rows = bucket_rows(bucket, report.redditor());
            self.client.append_rows(id, title, &rows).await?;
            match spreadsheet.sheet(title) {
                Some(sheet) => requests.extend(format_requests(sheet.sheet_id, rows.len())),
                None => log::warn!("Worksheet {title} is missing, not formatting it"),
            }
        }

        let tallies = tally_rows(&report.activity, self.sort);
        self.client.append_rows(id, ACTIONS_SHEET, &tallies).await?;
        if let Some(sheet) = spreadsheet.sheet(ACTIONS_SHEET) {
            requests.push(json!({
                "updateSheetProperties": {
                    "properties": {"sheetId": sheet.sheet_id, "gridProperties": {"frozenRowCount": 1}},
                    "fields": "gridProperties.frozenRowCount",
                }
            }));
        }

        self.client.batch_update(id, requests).await?;
        self.client.share_with_link(id).await?;
        Ok(spreadsheet.spreadsheet_url)
    }
}
