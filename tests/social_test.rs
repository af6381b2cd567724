// ABOUTME: Integration tests for reviews, helpful votes, bookmarks, and follows
// ABOUTME: Checks validation, duplicate handling, counts, and social achievement unlocks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{bearer, create_test_resources, create_test_trail, create_test_user};
use helpers::axum_test::AxumTestRequest;
use kilele_server::models::Difficulty;
use kilele_server::routes::build_router;
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn test_review_rating_and_helpful_votes() {
    let (resources, _) = create_test_resources().await.unwrap();
    let author = create_test_user(&resources.database, "muthoni").await.unwrap();
    let reader = create_test_user(&resources.database, "ochieng").await.unwrap();
    let author_token = bearer(&resources.auth_manager, &author);
    let reader_token = bearer(&resources.auth_manager, &reader);
    let trail = create_test_trail(
        &resources.database,
        "Elephant Hill",
        "Nyandarua",
        Difficulty::Hard,
        None,
    )
    .await
    .unwrap();
    let app = build_router(resources);
    let reviews_uri = format!("/api/trails/{}/reviews", trail.id);

    for rating in [0, 6] {
        AxumTestRequest::post(&reviews_uri)
            .auth(&author_token)
            .json(&json!({"rating": rating}))
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    let created: Value = AxumTestRequest::post(&reviews_uri)
        .auth(&author_token)
        .json(&json!({"rating": 5, "comment": "Steep but worth it"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(created["review"]["helpful_count"], 0);
    let review_id = created["review"]["id"].as_str().unwrap().to_owned();
    let helpful_uri = format!("/api/reviews/{review_id}/helpful");

    AxumTestRequest::post(&helpful_uri)
        .auth(&author_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let voted: Value = AxumTestRequest::post(&helpful_uri)
        .auth(&reader_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(voted["helpful_count"], 1);

    AxumTestRequest::post(&helpful_uri)
        .auth(&reader_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CONFLICT);

    let listed: Vec<Value> = AxumTestRequest::get(&reviews_uri)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["helpful_count"], 1);

    let counts: Value = AxumTestRequest::get(&format!("/api/users/{}/social", author.id))
        .auth(&reader_token)
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(counts["reviews_written"], 1);
    assert_eq!(counts["helpful_votes"], 1);
}

#[tokio::test]
async fn test_fifth_review_unlocks_critics_choice() {
    let (resources, notifier) = create_test_resources().await.unwrap();
    let user = create_test_user(&resources.database, "kiprono").await.unwrap();
    let token = bearer(&resources.auth_manager, &user);
    let mut trails = Vec::new();
    for index in 0..5 {
        trails.push(
            create_test_trail(
                &resources.database,
                &format!("Ridge {index}"),
                "Nakuru",
                Difficulty::Moderate,
                None,
            )
            .await
            .unwrap(),
        );
    }
    let app = build_router(resources);

    let mut last = Value::Null;
    for trail in &trails {
        last = AxumTestRequest::post(&format!("/api/trails/{}/reviews", trail.id))
            .auth(&token)
            .json(&json!({"rating": 4}))
            .send(app.clone())
            .await
            .assert_status(StatusCode::CREATED)
            .json();
    }
    let unlocked: Vec<&str> = last["unlocked"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["name"].as_str())
        .collect();
    assert_eq!(unlocked, vec!["Critic's Choice"]);
    assert_eq!(notifier.names_for(user.id), vec!["Critic's Choice".to_owned()]);
}

#[tokio::test]
async fn test_bookmarks_reject_duplicates() {
    let (resources, _) = create_test_resources().await.unwrap();
    let user = create_test_user(&resources.database, "adhiambo").await.unwrap();
    let token = bearer(&resources.auth_manager, &user);
    let trail = create_test_trail(
        &resources.database,
        "Karura Waterfall",
        "Nairobi",
        Difficulty::Easy,
        None,
    )
    .await
    .unwrap();
    let app = build_router(resources);
    let body = json!({"trail_id": trail.id});

    AxumTestRequest::post("/api/bookmarks")
        .auth(&token)
        .json(&body)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED);
    AxumTestRequest::post("/api/bookmarks")
        .auth(&token)
        .json(&body)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CONFLICT);
    AxumTestRequest::post("/api/bookmarks")
        .auth(&token)
        .json(&json!({"trail_id": Uuid::new_v4()}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let listed: Vec<Value> = AxumTestRequest::get("/api/bookmarks")
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(listed.len(), 1);

    let uri = format!("/api/bookmarks/{}", trail.id);
    AxumTestRequest::delete(&uri)
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    AxumTestRequest::delete(&uri)
        .auth(&token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_follow_rules_and_counts() {
    let (resources, _) = create_test_resources().await.unwrap();
    let follower = create_test_user(&resources.database, "njoroge").await.unwrap();
    let target = create_test_user(&resources.database, "wambui").await.unwrap();
    let token = bearer(&resources.auth_manager, &follower);
    let app = build_router(resources);

    AxumTestRequest::post(&format!("/api/users/{}/follow", follower.id))
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    AxumTestRequest::post(&format!("/api/users/{}/follow", Uuid::new_v4()))
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let follow_uri = format!("/api/users/{}/follow", target.id);
    let counts: Value = AxumTestRequest::post(&follow_uri)
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(counts["followers"], 1);

    AxumTestRequest::post(&follow_uri)
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CONFLICT);

    let mine: Value = AxumTestRequest::get(&format!("/api/users/{}/social", follower.id))
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(mine["following"], 1);
    assert_eq!(mine["followers"], 0);

    AxumTestRequest::delete(&follow_uri)
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    AxumTestRequest::delete(&follow_uri)
        .auth(&token)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
