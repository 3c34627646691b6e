//! crates/shelfmate_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};

// Represents a user - used throughout app
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
}

// Only used internally for login/register - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Represents a browser login session (auth cookie) together with the
/// transient selections and transcript that belong to it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub selected_genres: Vec<String>,
    pub selected_preferences: Vec<String>,
    pub chat_history: String,
}

impl AuthSession {
    /// A session is over once `now` reaches its expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn selections(&self) -> BookSelections {
        BookSelections {
            genres: self.selected_genres.clone(),
            preferences: self.selected_preferences.clone(),
        }
    }
}

/// A catalog entry from the fixed genre list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// The genre names and preference tags a user has chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookSelections {
    pub genres: Vec<String>,
    pub preferences: Vec<String>,
}

/// A user's recorded like or dislike for a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub id: i64,
    pub user_id: i64,
    pub book_title: String,
    pub book_author: String,
    pub is_liked: bool,
}

/// The payload for recording a new reaction.
#[derive(Debug, Clone)]
pub struct NewReaction {
    pub book_title: String,
    pub book_author: String,
    pub is_liked: bool,
}
