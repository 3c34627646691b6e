//! services/api/src/web/rest.rs
//!
//! Contains the JSON reaction endpoints and the master definition for the
//! OpenAPI specification.

use crate::error::{AppError, AppResult};
use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension, Form,
};
use serde::{Deserialize, Serialize};
use shelfmate_core::domain::{AuthSession, NewReaction};
use std::sync::Arc;
use tracing::info;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        react_handler,
        delete_reaction_handler,
    ),
    components(
        schemas(ReactionForm, DeleteReactionForm, StatusResponse)
    ),
    tags(
        (name = "Shelfmate API", description = "JSON endpoints for recording reactions to recommended books.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The form posted when a user likes or dislikes a recommended book.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReactionForm {
    #[serde(default)]
    pub book_title: String,
    #[serde(default)]
    pub book_author: String,
    /// `"true"` records a like; anything else records a dislike.
    pub like: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteReactionForm {
    pub book_id: Option<String>,
}

/// The small status object both endpoints answer with.
#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Record a like or dislike for a book.
#[utoipa::path(
    post,
    path = "/reaction",
    request_body(content = ReactionForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Reaction saved", body = StatusResponse),
        (status = 303, description = "Not logged in; redirected to /login"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn react_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Form(form): Form<ReactionForm>,
) -> AppResult<impl IntoResponse> {
    let reaction = NewReaction {
        book_title: form.book_title,
        book_author: form.book_author,
        is_liked: form.like.as_deref() == Some("true"),
    };

    let saved = state.db.create_reaction(session.user_id, reaction).await?;
    info!(
        user_id = session.user_id,
        reaction_id = saved.id,
        liked = saved.is_liked,
        "Recorded reaction"
    );

    Ok((StatusCode::OK, Json(StatusResponse::success())))
}

/// Delete one of the user's reactions.
#[utoipa::path(
    post,
    path = "/delete_reaction",
    request_body(content = DeleteReactionForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Reaction deleted", body = StatusResponse),
        (status = 404, description = "No such reaction", body = StatusResponse),
        (status = 303, description = "Not logged in; redirected to /login")
    )
)]
pub async fn delete_reaction_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Form(form): Form<DeleteReactionForm>,
) -> AppResult<impl IntoResponse> {
    let reaction_id = form
        .book_id
        .as_deref()
        .and_then(|id| id.trim().parse::<i64>().ok())
        .ok_or_else(|| AppError::NotFound("reaction id missing or invalid".to_string()))?;

    state.db.delete_reaction(session.user_id, reaction_id).await?;
    info!(user_id = session.user_id, reaction_id, "Deleted reaction");

    Ok((StatusCode::OK, Json(StatusResponse::success())))
}
