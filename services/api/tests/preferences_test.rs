//! Saving genre and preference selections.

mod common;

use axum::http::{header, StatusCode};
use common::TestApp;
use shelfmate_core::ports::DatabaseService;

#[tokio::test]
async fn page_lists_every_genre_and_option() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("alice").await;

    let response = app
        .server
        .get("/preferences_and_genres")
        .add_header(header::COOKIE, cookie)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let html = response.text();
    let genre_boxes = html.matches("name=\"genre_").count();
    let preference_boxes = html.matches("name=\"pref_").count();
    assert_eq!(genre_boxes, shelfmate_core::catalog::GENRES.len());
    assert_eq!(preference_boxes, shelfmate_core::catalog::PREFERENCE_OPTIONS.len());
}

#[tokio::test]
async fn saving_replaces_previous_selections() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("alice").await;
    let user_id = app.db.user_id("alice");

    let fantasy = format!("genre_{}", app.db.genre_id("Fantasy"));
    let horror = format!("genre_{}", app.db.genre_id("Horror"));
    let mystery = format!("genre_{}", app.db.genre_id("Mystery"));

    app.server
        .post("/preferences_and_genres")
        .add_header(header::COOKIE, cookie.clone())
        .form(&[
            (fantasy.as_str(), "on"),
            (horror.as_str(), "on"),
            ("pref_Classics", "on"),
        ])
        .await;

    let response = app
        .server
        .post("/preferences_and_genres")
        .add_header(header::COOKIE, cookie.clone())
        .form(&[(mystery.as_str(), "on"), ("pref_Series", "on")])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let saved = app.db.get_user_selections(user_id).await.unwrap();
    assert_eq!(saved.genres, vec!["Mystery".to_string()]);
    assert_eq!(saved.preferences, vec!["Series".to_string()]);

    // The session copy feeds the recommendation page.
    let response = app
        .server
        .get("/recommendation")
        .add_header(header::COOKIE, cookie)
        .await;
    let html = response.text();
    assert!(html.contains("Mystery"));
    assert!(html.contains("Series"));
    assert!(!html.contains("Fantasy"));
}

#[tokio::test]
async fn unknown_boxes_are_ignored() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("alice").await;
    let user_id = app.db.user_id("alice");

    app.server
        .post("/preferences_and_genres")
        .add_header(header::COOKIE, cookie)
        .form(&[("genre_999999", "on"), ("pref_Poetry Slams", "on")])
        .await;

    let saved = app.db.get_user_selections(user_id).await.unwrap();
    assert!(saved.genres.is_empty());
    assert!(saved.preferences.is_empty());
}

#[tokio::test]
async fn selections_are_kept_per_user() {
    let app = TestApp::spawn().await;
    let alice = app.signed_in("alice").await;
    let _bob = app.signed_in("bob").await;

    let fantasy = format!("genre_{}", app.db.genre_id("Fantasy"));
    app.server
        .post("/preferences_and_genres")
        .add_header(header::COOKIE, alice)
        .form(&[(fantasy.as_str(), "on")])
        .await;

    let bob_id = app.db.user_id("bob");
    let saved = app.db.get_user_selections(bob_id).await.unwrap();
    assert!(saved.genres.is_empty());
}

#[tokio::test]
async fn failed_save_leaves_the_session_untouched() {
    let app = TestApp::spawn().await;
    let cookie = app.signed_in("alice").await;
    let user_id = app.db.user_id("alice");

    let fantasy = format!("genre_{}", app.db.genre_id("Fantasy"));
    app.server
        .post("/preferences_and_genres")
        .add_header(header::COOKIE, cookie.clone())
        .form(&[(fantasy.as_str(), "on")])
        .await;

    app.db.fail_selection_writes(true);
    let horror = format!("genre_{}", app.db.genre_id("Horror"));
    let response = app
        .server
        .post("/preferences_and_genres")
        .add_header(header::COOKIE, cookie.clone())
        .form(&[(horror.as_str(), "on")])
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    let saved = app.db.get_user_selections(user_id).await.unwrap();
    assert_eq!(saved.genres, vec!["Fantasy".to_string()]);

    let html = app
        .server
        .get("/recommendation")
        .add_header(header::COOKIE, cookie)
        .await
        .text();
    assert!(html.contains("Selected genres: Fantasy"));
    assert!(!html.contains("Horror"));
}
