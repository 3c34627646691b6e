//! services/api/src/web/library.rs
//!
//! Pages built from the user's saved reactions: history, cart, and the
//! like/dislike toggle.

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::HeaderMap,
    response::{Html, Redirect},
    Extension,
};
use shelfmate_core::domain::AuthSession;
use shelfmate_core::ports::PortError;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::web::middleware::current_session;
use crate::web::state::AppState;
use crate::web::views;

/// GET /
pub async fn home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> AppResult<Html<String>> {
    let logged_in = current_session(&state, &headers).await?.is_some();
    Ok(Html(views::home_page(logged_in)))
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /history
pub async fn history_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> AppResult<Html<String>> {
    let liked = state.db.list_reactions(session.user_id, true).await?;
    let disliked = state.db.list_reactions(session.user_id, false).await?;
    Ok(Html(views::history_page(&liked, &disliked)))
}

/// GET /cart
pub async fn cart_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> AppResult<Html<String>> {
    let liked = state.db.list_reactions(session.user_id, true).await?;
    Ok(Html(views::cart_page(&liked)))
}

/// GET /change_reaction/{id}
///
/// A missing reaction is ignored; the user always lands back on the history page.
/// An id that is not a number matches no route and answers 404.
pub async fn change_reaction(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    reaction_id: Result<Path<i64>, PathRejection>,
) -> AppResult<Redirect> {
    let Path(reaction_id) =
        reaction_id.map_err(|rejection| AppError::NotFound(rejection.body_text()))?;
    match state.db.toggle_reaction(session.user_id, reaction_id).await {
        Ok(reaction) => {
            info!(
                user_id = session.user_id,
                reaction_id,
                liked = reaction.is_liked,
                "Toggled reaction"
            );
        }
        Err(PortError::NotFound(_)) => {
            warn!(user_id = session.user_id, reaction_id, "Toggle for unknown reaction ignored");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/history"))
}
