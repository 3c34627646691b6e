//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shelfmate_core::domain::{
    AuthSession, BookSelections, Genre, NewReaction, Reaction, User, UserCredentials,
};
use shelfmate_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Closes every pooled connection. Called once the server has stopped.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    username: String,
    password_hash: String,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            username: self.username,
        }
    }

    fn to_credentials(self) -> UserCredentials {
        UserCredentials {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    id: String,
    user_id: i64,
    expires_at: DateTime<Utc>,
    selected_genres: Vec<String>,
    selected_preferences: Vec<String>,
    chat_history: String,
}
impl AuthSessionRecord {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            id: self.id,
            user_id: self.user_id,
            expires_at: self.expires_at,
            selected_genres: self.selected_genres,
            selected_preferences: self.selected_preferences,
            chat_history: self.chat_history,
        }
    }
}

#[derive(FromRow)]
struct GenreRecord {
    id: i64,
    name: String,
}
impl GenreRecord {
    fn to_domain(self) -> Genre {
        Genre {
            id: self.id,
            name: self.name,
        }
    }
}

#[derive(FromRow)]
struct ReactionRecord {
    id: i64,
    user_id: i64,
    book_title: String,
    book_author: String,
    is_liked: bool,
}
impl ReactionRecord {
    fn to_domain(self) -> Reaction {
        Reaction {
            id: self.id,
            user_id: self.user_id,
            book_title: self.book_title,
            book_author: self.book_author,
            is_liked: self.is_liked,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(&self, username: &str, password_hash: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                PortError::DuplicateUsername
            }
            _ => unexpected(e),
        })?;

        Ok(record.to_domain())
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", username)),
            _ => unexpected(e),
        })?;

        Ok(record.to_credentials())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            r#"
            SELECT id, user_id, expires_at, selected_genres, selected_preferences, chat_history
            FROM auth_sessions
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        let session = record
            .map(AuthSessionRecord::to_domain)
            .ok_or(PortError::Unauthorized)?;

        if session.is_expired(Utc::now()) {
            self.delete_auth_session(&session.id).await?;
            return Err(PortError::Unauthorized);
        }
        Ok(session)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn purge_expired_sessions(&self) -> PortResult<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }

    async fn update_session_selections(
        &self,
        session_id: &str,
        selections: &BookSelections,
    ) -> PortResult<()> {
        sqlx::query(
            "UPDATE auth_sessions SET selected_genres = $1, selected_preferences = $2 WHERE id = $3",
        )
        .bind(&selections.genres)
        .bind(&selections.preferences)
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn update_session_chat_history(&self, session_id: &str, chat_history: &str) -> PortResult<()> {
        sqlx::query("UPDATE auth_sessions SET chat_history = $1 WHERE id = $2")
            .bind(chat_history)
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn seed_genres(&self, names: &[&str]) -> PortResult<usize> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;
        let mut inserted = 0;

        for name in names {
            let result = sqlx::query("INSERT INTO genres (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
                .bind(*name)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
            inserted += result.rows_affected() as usize;
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(inserted)
    }

    async fn list_genres(&self) -> PortResult<Vec<Genre>> {
        let records = sqlx::query_as::<_, GenreRecord>("SELECT id, name FROM genres ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_user_selections(&self, user_id: i64) -> PortResult<BookSelections> {
        let genres = sqlx::query_as::<_, (String,)>(
            r#"
            SELECT g.name
            FROM user_genres ug
            JOIN genres g ON g.id = ug.genre_id
            WHERE ug.user_id = $1
            ORDER BY ug.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let preferences = sqlx::query_as::<_, (String,)>(
            "SELECT preference FROM user_preferences WHERE user_id = $1 ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(BookSelections {
            genres: genres.into_iter().map(|(name,)| name).collect(),
            preferences: preferences.into_iter().map(|(preference,)| preference).collect(),
        })
    }

    async fn replace_user_selections(
        &self,
        user_id: i64,
        genre_ids: &[i64],
        preferences: &[String],
    ) -> PortResult<()> {
        // Dropping the transaction on any early return rolls it back.
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        sqlx::query("DELETE FROM user_preferences WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        for preference in preferences {
            sqlx::query("INSERT INTO user_preferences (user_id, preference) VALUES ($1, $2)")
                .bind(user_id)
                .bind(preference)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
        }

        sqlx::query("DELETE FROM user_genres WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(unexpected)?;

        for genre_id in genre_ids {
            sqlx::query("INSERT INTO user_genres (user_id, genre_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(*genre_id)
                .execute(&mut *tx)
                .await
                .map_err(unexpected)?;
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(())
    }

    async fn create_reaction(&self, user_id: i64, reaction: NewReaction) -> PortResult<Reaction> {
        let record = sqlx::query_as::<_, ReactionRecord>(
            r#"
            INSERT INTO reactions (user_id, book_title, book_author, is_liked)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, book_title, book_author, is_liked
            "#,
        )
        .bind(user_id)
        .bind(&reaction.book_title)
        .bind(&reaction.book_author)
        .bind(reaction.is_liked)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn list_reactions(&self, user_id: i64, liked: bool) -> PortResult<Vec<Reaction>> {
        let records = sqlx::query_as::<_, ReactionRecord>(
            r#"
            SELECT id, user_id, book_title, book_author, is_liked
            FROM reactions
            WHERE user_id = $1 AND is_liked = $2
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .bind(liked)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_reaction(&self, user_id: i64, reaction_id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM reactions WHERE id = $1 AND user_id = $2")
            .bind(reaction_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Reaction {} not found", reaction_id)));
        }
        Ok(())
    }

    async fn toggle_reaction(&self, user_id: i64, reaction_id: i64) -> PortResult<Reaction> {
        let record = sqlx::query_as::<_, ReactionRecord>(
            r#"
            UPDATE reactions SET is_liked = NOT is_liked
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, book_title, book_author, is_liked
            "#,
        )
        .bind(reaction_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record
            .map(ReactionRecord::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("Reaction {} not found", reaction_id)))
    }
}
