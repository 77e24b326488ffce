// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

use crate::clock::{Clock, DateTime, Utc};
use crate::http::{HTTPError, HTTPResult};
use crate::reddit::service::Service;
use crate::reddit::thing::QueueItem;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub fn do_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub struct FrozenClock {
    datetime: DateTime<Utc>,
}

impl FrozenClock {
    pub fn new(datetime: DateTime<Utc>) -> Self {
        FrozenClock { datetime }
    }
}

impl Default for FrozenClock {
    fn default() -> Self {
        let datetime = DateTime::parse_from_rfc3339("2025-05-23T10:13:00-07:00")
            .expect("invalid date supplied")
            .with_timezone(&Utc);
        Self::new(datetime)
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.datetime
    }
}

/// A Reddit service that keeps a modqueue and modmail in memory and
/// updates them as moderation actions are taken.
#[derive(Debug, Default)]
pub struct FakeService {
    queue: Mutex<Vec<Value>>,
    conversations: Mutex<Vec<Value>>,
    responses: HashMap<String, Value>,
    rejected: HashSet<String>,
    rejected_paths: HashSet<String>,
    unreadable: HashSet<String>,
    requests: Mutex<Vec<String>>,
    actions: Mutex<Vec<String>>,
}

impl FakeService {
    pub fn with_queue(mut self, items: Vec<Value>) -> Self {
        self.queue = Mutex::new(items);
        self
    }

    pub fn with_conversations(mut self, conversations: Vec<Value>) -> Self {
        self.conversations = Mutex::new(conversations);
        self
    }

    pub fn with_response(mut self, path: &str, body: Value) -> Self {
        self.responses.insert(path.to_string(), body);
        self
    }

    /// Moderation actions on `id` fail with HTTP 403.
    pub fn reject(mut self, id: &str) -> Self {
        self.rejected.insert(id.to_string());
        self
    }

    /// Every POST to `path` fails with HTTP 403.
    pub fn reject_path(mut self, path: &str) -> Self {
        self.rejected_paths.insert(path.to_string());
        self
    }

    /// Every GET under `/r/{subreddit}/` fails with HTTP 403.
    pub fn unreadable(mut self, subreddit: &str) -> Self {
        self.unreadable.insert(subreddit.to_lowercase());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn conversation_state(&self, id: &str) -> Option<u64> {
        self.conversations
            .lock()
            .unwrap()
            .iter()
            .find(|c| c["id"] == id)
            .and_then(|c| c["state"].as_u64())
    }

    fn record(&self, method: &str, path: &str, params: &[(&str, String)]) {
        let params: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        self.requests
            .lock()
            .unwrap()
            .push(format!("{method} {path}?{}", params.join("&")));
    }

    fn param<'a>(params: &'a [(&str, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    fn modqueue(&self, subreddit: &str, only: Option<&str>) -> Value {
        let kind = match only {
            Some("comments") => Some("t1"),
            Some("links") => Some("t3"),
            _ => None,
        };
        let children: Vec<Value> = self
            .queue
            .lock()
            .unwrap()
            .iter()
            .filter(|item| {
                item["data"]["subreddit"]
                    .as_str()
                    .is_some_and(|s| s.eq_ignore_ascii_case(subreddit))
            })
            .filter(|item| kind.is_none_or(|kind| item["kind"] == kind))
            .cloned()
            .collect();
        json!({"kind": "Listing", "data": {"after": null, "children": children}})
    }

    fn modmail(&self, entity: &str, state: &str) -> Value {
        let subreddits: Vec<&str> = entity.split(',').collect();
        let wanted = match state {
            "new" => Some(0),
            "inprogress" => Some(1),
            "archived" => Some(2),
            "appeals" => Some(3),
            "join_requests" => Some(4),
            "filtered" => Some(5),
            _ => None,
        };
        let mut conversations = serde_json::Map::new();
        let mut ids = Vec::new();
        for convo in self.conversations.lock().unwrap().iter() {
            let owner = convo["owner"]["displayName"].as_str().unwrap_or_default();
            let in_state = wanted.is_none_or(|s| convo["state"].as_u64() == Some(s));
            if subreddits.contains(&owner) && in_state {
                let id = convo["id"].as_str().unwrap_or_default().to_string();
                ids.push(id.clone());
                conversations.insert(id, convo.clone());
            }
        }
        json!({"conversations": conversations, "conversationIds": ids})
    }

    fn act(&self, action: &str, id: &str) -> HTTPResult<String> {
        if self.rejected.contains(id) {
            return Err(HTTPError::Http(StatusCode::FORBIDDEN));
        }
        self.actions.lock().unwrap().push(action.to_string());
        Ok(String::from("{}"))
    }
}

impl Service for FakeService {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> HTTPResult<String> {
        self.record("GET", path, query);
        let forbidden = path
            .strip_prefix("/r/")
            .and_then(|p| p.split('/').next())
            .is_some_and(|sub| self.unreadable.contains(&sub.to_lowercase()));
        if forbidden {
            return Err(HTTPError::Http(StatusCode::FORBIDDEN));
        }
        let body = if let Some(body) = self.responses.get(path) {
            body.clone()
        } else if path == "/api/mod/conversations" {
            self.modmail(
                Self::param(query, "entity").unwrap_or_default(),
                Self::param(query, "state").unwrap_or("all"),
            )
        } else if let Some(subreddit) = path
            .strip_prefix("/r/")
            .and_then(|p| p.strip_suffix("/about/modqueue"))
        {
            self.modqueue(subreddit, Self::param(query, "only"))
        } else {
            return Err(HTTPError::Http(StatusCode::NOT_FOUND));
        };
        Ok(body.to_string())
    }

    async fn post(&self, path: &str, form: &[(&str, String)]) -> HTTPResult<String> {
        self.record("POST", path, form);
        if self.rejected_paths.contains(path) {
            return Err(HTTPError::Http(StatusCode::FORBIDDEN));
        }
        let id = Self::param(form, "id").unwrap_or_default();
        match path {
            "/api/remove" => {
                let spam = Self::param(form, "spam").unwrap_or("true");
                let result = self.act(&format!("remove {id} spam={spam}"), id)?;
                self.queue.lock().unwrap().retain(|item| item["data"]["name"] != id);
                Ok(result)
            }
            "/api/lock" => self.act(&format!("lock {id}"), id),
            "/api/approve" => {
                let result = self.act(&format!("approve {id}"), id)?;
                self.queue.lock().unwrap().retain(|item| item["data"]["name"] != id);
                Ok(result)
            }
            _ => {
                let convo_id = path
                    .strip_prefix("/api/mod/conversations/")
                    .and_then(|p| p.strip_suffix("/archive"))
                    .ok_or(HTTPError::Http(StatusCode::NOT_FOUND))?;
                let result = self.act(&format!("archive {convo_id}"), convo_id)?;
                for convo in self.conversations.lock().unwrap().iter_mut() {
                    if convo["id"] == convo_id {
                        convo["state"] = json!(2);
                    }
                }
                Ok(result)
            }
        }
    }
}

fn item(kind: &str, id: &str, subreddit: &str, score: i64, created: DateTime<Utc>) -> Value {
    json!({
        "kind": kind,
        "data": {
            "id": id,
            "name": format!("{kind}_{id}"),
            "subreddit": subreddit,
            "author": "someone",
            "created_utc": created.timestamp() as f64,
            "score": score,
            "approved_by": null,
            "banned_by": null,
            "ban_note": null,
            "removed_by_category": null,
            "locked": false,
            "permalink": format!("/r/{subreddit}/comments/post/{id}/"),
        }
    })
}

/// A modqueue comment on the submission `t3_post`.
pub fn comment(id: &str, subreddit: &str, score: i64, created: DateTime<Utc>) -> Value {
    let mut value = item("t1", id, subreddit, score, created);
    value["data"]["link_id"] = json!("t3_post");
    value["data"]["body"] = json!("Some text");
    value
}

/// A modqueue submission.
pub fn submission(id: &str, subreddit: &str, score: i64, created: DateTime<Utc>) -> Value {
    let mut value = item("t3", id, subreddit, score, created);
    value["data"]["title"] = json!("A title");
    value
}

/// A modmail conversation with the user `someone`.
pub fn conversation(
    id: &str,
    subreddit: &str,
    last_mod_update: Option<&str>,
    last_user_update: Option<&str>,
    state: u8,
) -> Value {
    json!({
        "id": id,
        "subject": "Question &amp; answer",
        "owner": {"displayName": subreddit},
        "participant": {"name": "someone"},
        "isInternal": false,
        "lastModUpdate": last_mod_update,
        "lastUserUpdate": last_user_update,
        "state": state,
    })
}

pub fn queue_item(value: Value) -> QueueItem {
    serde_json::from_value(value).expect("invalid queue item")
}
