//! crates/shelfmate_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AuthSession, BookSelections, Genre, NewReaction, Reaction, User, UserCredentials};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Username is already taken")]
    DuplicateUsername,
    #[error("{0}")]
    RateLimited(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(&self, username: &str, password_hash: &str) -> PortResult<User>;

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the live session for the id, or `Unauthorized` when it is
    /// missing or expired. An expired session is deleted on the way.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    /// Deletes every expired session. Returns how many were removed.
    async fn purge_expired_sessions(&self) -> PortResult<u64>;

    async fn update_session_selections(
        &self,
        session_id: &str,
        selections: &BookSelections,
    ) -> PortResult<()>;

    async fn update_session_chat_history(&self, session_id: &str, chat_history: &str) -> PortResult<()>;

    // --- Genres & Preferences ---
    /// Inserts every name not already present. Returns how many rows were added.
    async fn seed_genres(&self, names: &[&str]) -> PortResult<usize>;

    async fn list_genres(&self) -> PortResult<Vec<Genre>>;

    async fn get_user_selections(&self, user_id: i64) -> PortResult<BookSelections>;

    /// Replaces the user's saved genres and preferences in one transaction.
    async fn replace_user_selections(
        &self,
        user_id: i64,
        genre_ids: &[i64],
        preferences: &[String],
    ) -> PortResult<()>;

    // --- Reactions ---
    async fn create_reaction(&self, user_id: i64, reaction: NewReaction) -> PortResult<Reaction>;

    async fn list_reactions(&self, user_id: i64, liked: bool) -> PortResult<Vec<Reaction>>;

    async fn delete_reaction(&self, user_id: i64, reaction_id: i64) -> PortResult<()>;

    /// Flips `is_liked` and returns the updated row.
    async fn toggle_reaction(&self, user_id: i64, reaction_id: i64) -> PortResult<Reaction>;
}

/// Everything the chat-completion call needs to produce one recommendation.
#[derive(Debug, Clone, Default)]
pub struct RecommendationRequest {
    pub user_input: String,
    pub chat_history: String,
    pub selected_genres: Vec<String>,
    pub selected_preferences: Vec<String>,
}

#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Asks the language model for a recommendation and returns its free text.
    async fn recommend(&self, request: &RecommendationRequest) -> PortResult<String>;
}
