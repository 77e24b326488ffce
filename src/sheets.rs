// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! A small client for the Google Sheets and Drive REST APIs.
//!
//! Only the handful of calls needed to publish a report are supported:
//! creating a spreadsheet, appending rows to its worksheets, formatting
//! them, and sharing the result with anyone who has the link. Access
//! tokens come from a service account key via `yup-oauth2`.

use crate::http::{HTTPError, HTTPService, json_body};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use std::path::Path;
use thiserror::Error;

/// Base URL of the Sheets API.
pub const SHEETS_BASE: &str = "https://sheets.googleapis.com";

/// Base URL of the Drive API.
pub const DRIVE_BASE: &str = "https://www.googleapis.com";

/// OAuth scopes needed to create and share spreadsheets.
pub const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive.file",
];

/// Column names of every bucket worksheet, in order.
pub const HEADER: [&str; 6] = [
    "Subreddit",
    "Subscribers",
    "Redditor",
    "Position",
    "Active",
    "Actions",
];

const WHITE: &str = "#ffffff";
const GREEN: &str = "#57bb8a";
const RED: &str = "#e67c73";
const YELLOW: &str = "#ffd666";
const BLUE: &str = "#73a4ff";
const MAGENTA: &str = "#ff73ff";

/// An error talking to Google.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Could not read service account key: {0}")]
    Key(#[source] std::io::Error),

    #[error("Could not authenticate with Google: {0}")]
    Auth(#[from] yup_oauth2::Error),

    #[error("Google did not return an access token")]
    NoToken,

    #[error("Invalid URL: {0}")]
    Url(String),

    #[error("Google API error: {0}")]
    Http(#[from] HTTPError),

    #[error("Could not parse Google API response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A worksheet within a spreadsheet.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SheetProperties {
    pub sheet_id: i64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    properties: SheetProperties,
}

/// A newly created spreadsheet.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Spreadsheet {
    pub spreadsheet_id: String,
    pub spreadsheet_url: String,
    #[serde(deserialize_with = "sheet_properties", default)]
    pub sheets: Vec<SheetProperties>,
}

impl Spreadsheet {
    /// The worksheet called `title`.
    pub fn sheet(&self, title: &str) -> Option<&SheetProperties> {
        self.sheets.iter().find(|sheet| sheet.title == title)
    }
}

fn sheet_properties<'de, D>(deserializer: D) -> Result<Vec<SheetProperties>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let sheets = Vec::<Sheet>::deserialize(deserializer)?;
    Ok(sheets.into_iter().map(|sheet| sheet.properties).collect())
}

/// Talks to the Sheets and Drive APIs with a bearer token.
#[derive(Debug)]
pub struct SheetsClient {
    client: Client,
    token: String,
    sheets_base: String,
    drive_base: String,
}

impl HTTPService for SheetsClient {}

impl SheetsClient {
    /// Authenticates with the service account key at `key_path`.
    pub async fn connect(key_path: impl AsRef<Path>) -> Result<Self, SheetsError> {
        let key = yup_oauth2::read_service_account_key(key_path.as_ref())
            .await
            .map_err(SheetsError::Key)?;
        let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(SheetsError::Key)?;
        let token = auth.token(&SCOPES).await?;
        let token = token.token().ok_or(SheetsError::NoToken)?;
        log::debug!("Authenticated with Google");
        Self::with_token(token, SHEETS_BASE, DRIVE_BASE)
    }

    /// A client that uses an existing access token and the given base URLs.
    pub fn with_token(
        token: impl Into<String>,
        sheets_base: impl Into<String>,
        drive_base: impl Into<String>,
    ) -> Result<Self, SheetsError> {
        Ok(Self {
            client: Self::client()?,
            token: token.into(),
            sheets_base: sheets_base.into(),
            drive_base: drive_base.into(),
        })
    }

    /// Creates a spreadsheet called `title` with one worksheet per entry in
    /// `sheet_titles`.
    pub async fn create_spreadsheet(
        &self,
        title: &str,
        sheet_titles: &[&str],
    ) -> Result<Spreadsheet, SheetsError> {
        let sheets: Vec<Value> = sheet_titles
            .iter()
            .map(|title| json!({"properties": {"title": title}}))
            .collect();
        let body = json!({"properties": {"title": title}, "sheets": sheets});
        let url = self.url(&self.sheets_base, &["v4", "spreadsheets"])?;
        let resp = self.post(url, &body).await?;
        Ok(serde_json::from_str(&resp)?)
    }

    /// Appends `rows` after the last row of the worksheet called `sheet`.
    pub async fn append_rows(
        &self,
        spreadsheet_id: &str,
        sheet: &str,
        rows: &[Vec<Value>],
    ) -> Result<(), SheetsError> {
        let range = format!("{}:append", a1_range(sheet));
        let mut url = self.url(
            &self.sheets_base,
            &["v4", "spreadsheets", spreadsheet_id, "values", &range],
        )?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        self.post(url, &json!({"values": rows})).await?;
        log::debug!("Appended {} rows to {sheet}", rows.len());
        Ok(())
    }

    /// Applies a batch of update requests to a spreadsheet.
    pub async fn batch_update(
        &self,
        spreadsheet_id: &str,
        requests: Vec<Value>,
    ) -> Result<(), SheetsError> {
        if requests.is_empty() {
            return Ok(());
        }
        let path = format!("{spreadsheet_id}:batchUpdate");
        let url = self.url(&self.sheets_base, &["v4", "spreadsheets", &path])?;
        self.post(url, &json!({"requests": requests})).await?;
        Ok(())
    }

    /// Lets anyone with the link view the spreadsheet.
    pub async fn share_with_link(&self, spreadsheet_id: &str) -> Result<(), SheetsError> {
        let url = self.url(
            &self.drive_base,
            &["drive", "v3", "files", spreadsheet_id, "permissions"],
        )?;
        self.post(url, &json!({"role": "reader", "type": "anyone"}))
            .await?;
        Ok(())
    }

    fn url(&self, base: &str, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url = Url::parse(base).map_err(|err| SheetsError::Url(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Url(base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post(&self, url: Url, body: &Value) -> Result<String, SheetsError> {
        log::trace!("POST {url}");
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(HTTPError::Request)?;
        Ok(json_body(resp).await?)
    }
}

/// An A1 range covering the whole of the worksheet called `sheet`.
pub fn a1_range(sheet: &str) -> String {
    format!("'{}'!A1", sheet.replace('\'', "''"))
}

/// Zero-based index of the column called `name`.
fn column(name: &str) -> usize {
    HEADER.iter().position(|h| *h == name).unwrap_or(0)
}

fn column_range(sheet_id: i64, name: &str) -> Value {
    let index = column(name);
    json!({
        "sheetId": sheet_id,
        "startColumnIndex": index,
        "endColumnIndex": index + 1,
    })
}

fn color(hex: &str) -> Value {
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .map_or(0.0, |c| f64::from(c) / 255.0)
    };
    json!({"red": channel(1), "green": channel(3), "blue": channel(5)})
}

fn rule(sheet_id: i64, column: &str, condition: &str, value: &str, background: &str) -> Value {
    json!({
        "addConditionalFormatRule": {
            "index": 0,
            "rule": {
                "ranges": [column_range(sheet_id, column)],
                "booleanRule": {
                    "condition": {
                        "type": condition,
                        "values": [{"userEnteredValue": value}],
                    },
                    "format": {"backgroundColor": color(background)},
                },
            },
        }
    })
}

/// Requests that format a bucket worksheet with `rows` rows, header
/// included.
///
/// The header row is frozen, positions and subscriber counts are colored by
/// tier, activity is colored green or red, subscriber counts get thousands
/// separators, and a filter is added over the data.
pub fn format_requests(sheet_id: i64, rows: usize) -> Vec<Value> {
    // Rules are inserted at index 0, so the last one added is evaluated
    // first. List the narrowest tier last.
    let rules = [
        ("Position", "NUMBER_LESS", "10", YELLOW),
        ("Position", "NUMBER_LESS", "5", RED),
        ("Position", "NUMBER_EQ", "1", MAGENTA),
        ("Subscribers", "NUMBER_GREATER_THAN_EQ", "10000000", MAGENTA),
        ("Subscribers", "NUMBER_LESS", "10000000", RED),
        ("Subscribers", "NUMBER_LESS", "1000000", YELLOW),
        ("Subscribers", "NUMBER_LESS", "100000", GREEN),
        ("Subscribers", "NUMBER_LESS", "10000", BLUE),
        ("Subscribers", "NUMBER_LESS", "5000", WHITE),
        ("Active", "TEXT_EQ", "TRUE", GREEN),
        ("Active", "TEXT_EQ", "FALSE", RED),
    ];

    let mut requests = vec![json!({
        "updateSheetProperties": {
            "properties": {"sheetId": sheet_id, "gridProperties": {"frozenRowCount": 1}},
            "fields": "gridProperties.frozenRowCount",
        }
    })];
    requests.extend(
        rules
            .iter()
            .map(|(column, condition, value, background)| {
                rule(sheet_id, column, condition, value, background)
            }),
    );
    requests.push(json!({
        "repeatCell": {
            "range": column_range(sheet_id, "Subscribers"),
            "cell": {"userEnteredFormat": {"numberFormat": {"type": "NUMBER", "pattern": "#,##0"}}},
            "fields": "userEnteredFormat.numberFormat",
        }
    }));
    requests.push(json!({
        "setBasicFilter": {
            "filter": {
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": 0,
                    "endRowIndex": rows,
                    "startColumnIndex": 0,
                    "endColumnIndex": HEADER.len(),
                }
            }
        }
    }));
    requests
}
