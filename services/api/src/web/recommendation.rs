//! services/api/src/web/recommendation.rs
//!
//! The recommendation conversation page. The transcript is kept on the
//! session row: `submit` appends one exchange, `clear` empties it.

use axum::{
    extract::State,
    response::Html,
    Extension, Form,
};
use serde::Deserialize;
use shelfmate_core::domain::AuthSession;
use shelfmate_core::flow::{append_exchange, build_user_input, parse_suggestion, FlowAction};
use shelfmate_core::ports::RecommendationRequest;
use std::sync::Arc;
use tracing::info;

use crate::error::AppResult;
use crate::web::state::AppState;
use crate::web::views;

#[derive(Debug, Deserialize)]
pub struct RecommendationForm {
    pub button_text: Option<String>,
}

/// Renders the page for a transcript, offering reactions to the newest reply.
fn render(session: &AuthSession, chat_history: &str, latest_reply: Option<&str>) -> Html<String> {
    let suggestion = latest_reply.and_then(parse_suggestion);
    Html(views::recommendation_page(
        &session.selections(),
        chat_history,
        suggestion.as_ref(),
    ))
}

/// GET /recommendation
pub async fn recommendation_page(Extension(session): Extension<AuthSession>) -> Html<String> {
    render(&session, &session.chat_history, None)
}

/// POST /recommendation
pub async fn recommendation_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Form(form): Form<RecommendationForm>,
) -> AppResult<Html<String>> {
    match FlowAction::from_button_text(form.button_text.as_deref()) {
        FlowAction::Idle => Ok(render(&session, &session.chat_history, None)),
        FlowAction::Clear => {
            state.db.update_session_chat_history(&session.id, "").await?;
            Ok(render(&session, "", None))
        }
        FlowAction::Submit => {
            let selections = session.selections();
            let liked = state.db.list_reactions(session.user_id, true).await?;
            let disliked = state.db.list_reactions(session.user_id, false).await?;
            let user_input = build_user_input(&selections, &liked, &disliked);

            let request = RecommendationRequest {
                user_input,
                chat_history: session.chat_history.clone(),
                selected_genres: selections.genres,
                selected_preferences: selections.preferences,
            };
            let reply = state.recommender.recommend(&request).await?;

            let mut chat_history = request.chat_history;
            append_exchange(&mut chat_history, &request.user_input, &reply);
            state
                .db
                .update_session_chat_history(&session.id, &chat_history)
                .await?;

            info!(user_id = session.user_id, "Appended recommendation to transcript");
            Ok(render(&session, &chat_history, Some(&reply)))
        }
    }
}
