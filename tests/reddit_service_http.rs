// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

// These tests run the real HTTP service against a local mock of the Reddit
// API, so they check the requests we send as much as the responses we parse.

use automodder::conf::RedditCredentials;
use automodder::http::HTTPError;
use automodder::reddit::Reddit;
use automodder::reddit::client::Error;
use automodder::reddit::service::RedditService;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> RedditCredentials {
    RedditCredentials {
        client_id: String::from("client"),
        client_secret: String::from("secret"),
        username: String::from("automodder"),
        password: String::from("hunter2"),
        user_agent: Some(String::from("automodder tests")),
    }
}

fn reddit(server: &MockServer) -> Reddit {
    let token_url = format!("{}/api/v1/access_token", server.uri());
    let service = RedditService::with_endpoints(credentials(), server.uri(), token_url)
        .expect("could not build service");
    Reddit::new(service)
}

async fn grant_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=automodder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "token-123",
            "token_type": "bearer",
            "expires_in": 86400,
            "scope": "*",
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn comment(id: &str) -> Value {
    json!({"kind": "t1", "data": {
        "id": id,
        "name": format!("t1_{id}"),
        "subreddit": "rust",
        "author": "someone",
        "created_utc": 1_748_000_000.0,
        "score": -3,
        "link_id": "t3_post",
        "body": "text",
        "permalink": format!("/r/rust/comments/post/{id}/"),
    }})
}

#[tokio::test]
async fn it_pages_through_the_modqueue_with_one_token() {
    let server = MockServer::start().await;
    grant_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/r/rust/about/modqueue"))
        .and(header("authorization", "Bearer token-123"))
        .and(query_param("raw_json", "1"))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": {"after": "t1_b", "children": [comment("a"), comment("b")]},
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r/rust/about/modqueue"))
        .and(query_param("after", "t1_b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": {"after": null, "children": [comment("c")]},
        })))
        .mount(&server)
        .await;

    let items = reddit(&server).modqueue("rust", None).await.unwrap();
    let names: Vec<&str> = items.iter().map(|item| item.fullname()).collect();
    assert_eq!(names, vec!["t1_a", "t1_b", "t1_c"]);
}

#[tokio::test]
async fn it_reports_rejected_passwords() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "invalid_grant"})))
        .mount(&server)
        .await;

    let err = reddit(&server).me().await.unwrap_err();
    assert!(
        matches!(err, Error::Service(HTTPError::Auth(ref reason)) if reason == "invalid_grant"),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn it_reports_forbidden_subreddits() {
    let server = MockServer::start().await;
    grant_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/r/private/about/modqueue"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
        .mount(&server)
        .await;

    let err = reddit(&server).modqueue("private", None).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Service(HTTPError::Http(status)) if status.as_u16() == 403
    ));
}

#[tokio::test]
async fn it_removes_without_marking_spam() {
    let server = MockServer::start().await;
    grant_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/remove"))
        .and(body_string_contains("id=t1_a"))
        .and(body_string_contains("spam=false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    reddit(&server).remove("t1_a").await.unwrap();
}

#[tokio::test]
async fn it_keeps_going_when_the_rate_limit_resets() {
    let server = MockServer::start().await;
    grant_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/v1/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "0")
                .set_body_json(json!({"name": "automodder"})),
        )
        .mount(&server)
        .await;

    let me = reddit(&server).me().await.unwrap();
    assert_eq!(me.name, "automodder");
}
