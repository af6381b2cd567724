// ABOUTME: Integration tests for registration, login, profile, and trail administration routes
// ABOUTME: Checks credential handling, admin-only trail writes, filtering, and health endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Kilele Trails
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;
mod helpers;

use axum::http::StatusCode;
use common::{
    bearer, create_test_admin, create_test_resources, create_test_trail, create_test_user,
    trail_input,
};
use helpers::axum_test::AxumTestRequest;
use kilele_server::models::Difficulty;
use kilele_server::routes::build_router;
use serde_json::{json, Value};

#[tokio::test]
async fn test_register_login_and_profile() {
    let (resources, _) = create_test_resources().await.unwrap();
    let app = build_router(resources);

    let registered: Value = AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "username": "wanjiku",
            "email": "Wanjiku@Example.com",
            "password": "kilimanjaro-2025",
            "display_name": "Wanjiku M."
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(registered["token_type"], "Bearer");
    assert_eq!(registered["user"]["username"], "wanjiku");
    assert_eq!(registered["user"]["is_admin"], false);
    assert!(registered["user"].get("password_hash").is_none());

    AxumTestRequest::post("/api/auth/register")
        .json(&json!({
            "username": "wanjiku2",
            "email": "wanjiku@example.com",
            "password": "kilimanjaro-2025"
        }))
        .send(app.clone())
        .await
        .assert_status(StatusCode::CONFLICT);

    AxumTestRequest::post("/api/auth/login")
        .json(&json!({"email": "wanjiku@example.com", "password": "wrong-password"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let login: Value = AxumTestRequest::post("/api/auth/login")
        .json(&json!({"email": "wanjiku@example.com", "password": "kilimanjaro-2025"}))
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let token = format!("Bearer {}", login["token"].as_str().unwrap());

    let me: Value = AxumTestRequest::get("/api/users/me")
        .auth(&token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(me["display_name"], "Wanjiku M.");

    AxumTestRequest::get("/api/users/me")
        .auth("Bearer not-a-token")
        .send(app)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_validation() {
    let (resources, _) = create_test_resources().await.unwrap();
    let app = build_router(resources);

    for body in [
        json!({"username": "", "email": "a@example.com", "password": "longenough"}),
        json!({"username": "amani", "email": "not-an-email", "password": "longenough"}),
        json!({"username": "amani", "email": "amani@example.com", "password": "short"}),
    ] {
        AxumTestRequest::post("/api/auth/register")
            .json(&body)
            .send(app.clone())
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_only_admins_write_trails() {
    let (resources, _) = create_test_resources().await.unwrap();
    let hiker = create_test_user(&resources.database, "baraka").await.unwrap();
    let admin = create_test_admin(&resources.database, "ranger").await.unwrap();
    let hiker_token = bearer(&resources.auth_manager, &hiker);
    let admin_token = bearer(&resources.auth_manager, &admin);
    let app = build_router(resources);

    let input = trail_input("Mount Longonot Crater", "Naivasha", Difficulty::Hard, Some((-0.914, 36.446)));

    AxumTestRequest::post("/api/trails")
        .auth(&hiker_token)
        .json(&input)
        .send(app.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let trail: Value = AxumTestRequest::post("/api/trails")
        .auth(&admin_token)
        .json(&input)
        .send(app.clone())
        .await
        .assert_status(StatusCode::CREATED)
        .json();
    assert_eq!(trail["difficulty"], "hard");
    let uri = format!("/api/trails/{}", trail["id"].as_str().unwrap());

    let mut half_located = input.clone();
    half_located.longitude = None;
    AxumTestRequest::put(&uri)
        .auth(&admin_token)
        .json(&half_located)
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    AxumTestRequest::delete(&uri)
        .auth(&hiker_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::FORBIDDEN);
    AxumTestRequest::delete(&uri)
        .auth(&admin_token)
        .send(app.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    AxumTestRequest::get(&uri)
        .send(app)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trail_listing_filters() {
    let (resources, _) = create_test_resources().await.unwrap();
    let database = &resources.database;
    create_test_trail(database, "Karura Waterfall", "Nairobi", Difficulty::Easy, None)
        .await
        .unwrap();
    create_test_trail(database, "Oloolua Nature Trail", "Nairobi", Difficulty::Easy, None)
        .await
        .unwrap();
    create_test_trail(database, "Hell's Gate Gorge", "Naivasha", Difficulty::Moderate, None)
        .await
        .unwrap();
    let app = build_router(resources);

    let all: Value = AxumTestRequest::get("/api/trails")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(all["count"], 3);

    let easy: Value = AxumTestRequest::get("/api/trails?difficulty=easy&location=nairobi")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(easy["count"], 2);

    let paged: Value = AxumTestRequest::get("/api/trails?limit=1&offset=1")
        .send(app.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(paged["trails"].as_array().unwrap().len(), 1);
    assert_eq!(paged["limit"], 1);
    assert_eq!(paged["offset"], 1);

    AxumTestRequest::get("/api/trails/not-a-uuid")
        .send(app.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let health: Value = AxumTestRequest::get("/health")
        .send(app)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(health["status"], "healthy");
}
