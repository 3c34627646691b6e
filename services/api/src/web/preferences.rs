//! services/api/src/web/preferences.rs
//!
//! The genre and preference selection page.

use axum::{
    extract::State,
    response::Html,
    Extension, Form,
};
use shelfmate_core::catalog::PREFERENCE_OPTIONS;
use shelfmate_core::domain::{AuthSession, BookSelections, Genre};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::error::AppResult;
use crate::web::state::AppState;
use crate::web::views;

/// Picks the checked genres and preference options out of the submitted form.
///
/// Only known genre ids and listed preference options are accepted.
pub fn checked_selections(genres: &[Genre], form: &HashMap<String, String>) -> (Vec<Genre>, Vec<String>) {
    let checked_genres = genres
        .iter()
        .filter(|genre| form.contains_key(&format!("genre_{}", genre.id)))
        .cloned()
        .collect();

    let checked_preferences = PREFERENCE_OPTIONS
        .iter()
        .filter(|option| form.contains_key(&format!("pref_{}", option)))
        .map(|option| option.to_string())
        .collect();

    (checked_genres, checked_preferences)
}

/// GET /preferences_and_genres
pub async fn preferences_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> AppResult<Html<String>> {
    let genres = state.db.list_genres().await?;
    let selections = state.db.get_user_selections(session.user_id).await?;

    Ok(Html(views::preferences_page(&genres, PREFERENCE_OPTIONS, &selections)))
}

/// POST /preferences_and_genres
pub async fn save_preferences(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Html<String>> {
    let genres = state.db.list_genres().await?;
    let (checked_genres, checked_preferences) = checked_selections(&genres, &form);

    let selections = BookSelections {
        genres: checked_genres.iter().map(|genre| genre.name.clone()).collect(),
        preferences: checked_preferences,
    };

    // The session copy follows only once the stored rows are replaced.
    let genre_ids: Vec<i64> = checked_genres.iter().map(|genre| genre.id).collect();
    state
        .db
        .replace_user_selections(session.user_id, &genre_ids, &selections.preferences)
        .await?;

    state
        .db
        .update_session_selections(&session.id, &selections)
        .await?;

    info!(
        user_id = session.user_id,
        genres = selections.genres.len(),
        preferences = selections.preferences.len(),
        "Saved preferences"
    );

    Ok(Html(views::preferences_page(&genres, PREFERENCE_OPTIONS, &selections)))
}
