//! # Common Test Utilities
//!
//! Test harness shared by the integration tests:
//!
//! - `InMemoryDb`: a `DatabaseService` kept in process memory, seeded with the
//!   real genre catalog.
//! - `StubRecommender`: a `RecommendationService` that replies with canned text
//!   (or a rate-limit failure) and records every request it receives.
//! - `TestApp`: the real router wrapped in an `axum_test::TestServer`.

// Not every test file uses every helper.
#![allow(unused)]

use api_lib::{
    config::Config,
    web::{build_router, AppState},
};
use async_trait::async_trait;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use chrono::{DateTime, Utc};
use shelfmate_core::catalog::GENRES;
use shelfmate_core::domain::{
    AuthSession, BookSelections, Genre, NewReaction, Reaction, User, UserCredentials,
};
use shelfmate_core::ports::{
    DatabaseService, PortError, PortResult, RecommendationRequest, RecommendationService,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

// --- In-memory storage ---

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<UserCredentials>,
    sessions: HashMap<String, AuthSession>,
    genres: Vec<Genre>,
    user_genres: Vec<(i64, i64)>,
    user_preferences: Vec<(i64, String)>,
    reactions: Vec<Reaction>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct InMemoryDb {
    tables: Mutex<Tables>,
    fail_selection_writes: AtomicBool,
}

impl InMemoryDb {
    pub async fn seeded() -> Arc<Self> {
        let db = Arc::new(Self::default());
        db.seed_genres(GENRES).await.unwrap();
        db
    }

    pub fn genre_id(&self, name: &str) -> i64 {
        let tables = self.tables.lock().unwrap();
        tables.genres.iter().find(|g| g.name == name).unwrap().id
    }

    /// Makes `replace_user_selections` fail until switched off again.
    pub fn fail_selection_writes(&self, fail: bool) {
        self.fail_selection_writes.store(fail, Ordering::SeqCst);
    }

    pub fn session_count(&self) -> usize {
        self.tables.lock().unwrap().sessions.len()
    }

    pub fn all_reactions(&self) -> Vec<Reaction> {
        self.tables.lock().unwrap().reactions.clone()
    }

    pub fn user_id(&self, username: &str) -> i64 {
        let tables = self.tables.lock().unwrap();
        tables.users.iter().find(|u| u.username == username).unwrap().id
    }
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn create_user(&self, username: &str, password_hash: &str) -> PortResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables.users.iter().any(|u| u.username == username) {
            return Err(PortError::DuplicateUsername);
        }
        let id = tables.next_id();
        tables.users.push(UserCredentials {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
        });
        Ok(User {
            id,
            username: username.to_string(),
        })
    }

    async fn get_user_by_username(&self, username: &str) -> PortResult<UserCredentials> {
        let tables = self.tables.lock().unwrap();
        tables
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", username)))
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        tables.sessions.insert(
            session_id.to_string(),
            AuthSession {
                id: session_id.to_string(),
                user_id,
                expires_at,
                selected_genres: Vec::new(),
                selected_preferences: Vec::new(),
                chat_history: String::new(),
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession> {
        let mut tables = self.tables.lock().unwrap();
        let session = tables
            .sessions
            .get(session_id)
            .cloned()
            .ok_or(PortError::Unauthorized)?;
        if session.is_expired(Utc::now()) {
            tables.sessions.remove(session_id);
            return Err(PortError::Unauthorized);
        }
        Ok(session)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.tables.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }

    async fn purge_expired_sessions(&self) -> PortResult<u64> {
        let now = Utc::now();
        let mut tables = self.tables.lock().unwrap();
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - tables.sessions.len()) as u64)
    }

    async fn update_session_selections(
        &self,
        session_id: &str,
        selections: &BookSelections,
    ) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(session) = tables.sessions.get_mut(session_id) {
            session.selected_genres = selections.genres.clone();
            session.selected_preferences = selections.preferences.clone();
        }
        Ok(())
    }

    async fn update_session_chat_history(&self, session_id: &str, chat_history: &str) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(session) = tables.sessions.get_mut(session_id) {
            session.chat_history = chat_history.to_string();
        }
        Ok(())
    }

    async fn seed_genres(&self, names: &[&str]) -> PortResult<usize> {
        let mut tables = self.tables.lock().unwrap();
        let mut inserted = 0;
        for name in names {
            if tables.genres.iter().any(|g| g.name == *name) {
                continue;
            }
            let id = tables.next_id();
            tables.genres.push(Genre {
                id,
                name: name.to_string(),
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn list_genres(&self) -> PortResult<Vec<Genre>> {
        Ok(self.tables.lock().unwrap().genres.clone())
    }

    async fn get_user_selections(&self, user_id: i64) -> PortResult<BookSelections> {
        let tables = self.tables.lock().unwrap();
        let genres = tables
            .user_genres
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, gid)| tables.genres.iter().find(|g| g.id == *gid))
            .map(|g| g.name.clone())
            .collect();
        let preferences = tables
            .user_preferences
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .map(|(_, p)| p.clone())
            .collect();
        Ok(BookSelections { genres, preferences })
    }

    async fn replace_user_selections(
        &self,
        user_id: i64,
        genre_ids: &[i64],
        preferences: &[String],
    ) -> PortResult<()> {
        if self.fail_selection_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("selection write failed".to_string()));
        }
        let mut tables = self.tables.lock().unwrap();
        tables.user_preferences.retain(|(uid, _)| *uid != user_id);
        tables
            .user_preferences
            .extend(preferences.iter().map(|p| (user_id, p.clone())));
        tables.user_genres.retain(|(uid, _)| *uid != user_id);
        tables
            .user_genres
            .extend(genre_ids.iter().map(|gid| (user_id, *gid)));
        Ok(())
    }

    async fn create_reaction(&self, user_id: i64, reaction: NewReaction) -> PortResult<Reaction> {
        let mut tables = self.tables.lock().unwrap();
        let id = tables.next_id();
        let saved = Reaction {
            id,
            user_id,
            book_title: reaction.book_title,
            book_author: reaction.book_author,
            is_liked: reaction.is_liked,
        };
        tables.reactions.push(saved.clone());
        Ok(saved)
    }

    async fn list_reactions(&self, user_id: i64, liked: bool) -> PortResult<Vec<Reaction>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .reactions
            .iter()
            .filter(|r| r.user_id == user_id && r.is_liked == liked)
            .cloned()
            .collect())
    }

    async fn delete_reaction(&self, user_id: i64, reaction_id: i64) -> PortResult<()> {
        let mut tables = self.tables.lock().unwrap();
        let before = tables.reactions.len();
        tables
            .reactions
            .retain(|r| !(r.id == reaction_id && r.user_id == user_id));
        if tables.reactions.len() == before {
            return Err(PortError::NotFound(format!("Reaction {} not found", reaction_id)));
        }
        Ok(())
    }

    async fn toggle_reaction(&self, user_id: i64, reaction_id: i64) -> PortResult<Reaction> {
        let mut tables = self.tables.lock().unwrap();
        let reaction = tables
            .reactions
            .iter_mut()
            .find(|r| r.id == reaction_id && r.user_id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("Reaction {} not found", reaction_id)))?;
        reaction.is_liked = !reaction.is_liked;
        Ok(reaction.clone())
    }
}

// --- Stub recommendation service ---

pub enum StubReply {
    Text(String),
    RateLimited(String),
}

pub struct StubRecommender {
    reply: Mutex<StubReply>,
    requests: Mutex<Vec<RecommendationRequest>>,
}

pub const STUB_RECOMMENDATION: &str =
    "Title: The Left Hand of Darkness\nAuthor: Ursula K. Le Guin\nDescription: An envoy on a frozen world.";

impl StubRecommender {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            reply: Mutex::new(StubReply::Text(STUB_RECOMMENDATION.to_string())),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn set_reply(&self, reply: StubReply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn requests(&self) -> Vec<RecommendationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationService for StubRecommender {
    async fn recommend(&self, request: &RecommendationRequest) -> PortResult<String> {
        self.requests.lock().unwrap().push(request.clone());
        match &*self.reply.lock().unwrap() {
            StubReply::Text(text) => Ok(text.clone()),
            StubReply::RateLimited(message) => Err(PortError::RateLimited(message.clone())),
        }
    }
}

// --- Full application harness ---

pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<InMemoryDb>,
    pub recommender: Arc<StubRecommender>,
}

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("postgres://unused/for-tests".to_string()),
        _ => None,
    })
    .unwrap()
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db = InMemoryDb::seeded().await;
        let recommender = StubRecommender::new();
        let app_state = Arc::new(AppState {
            db: db.clone(),
            config: Arc::new(test_config()),
            recommender: recommender.clone(),
        });
        let server = TestServer::new(build_router(app_state)).unwrap();

        Self {
            server,
            db,
            recommender,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> TestResponse {
        self.server
            .post("/register")
            .form(&[
                ("username", username),
                ("password", password),
                ("confirm_password", password),
            ])
            .await
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        self.server
            .post("/login")
            .form(&[("username", username), ("password", password)])
            .await
    }

    /// Registers and logs in, returning the `Cookie` header value to send.
    pub async fn signed_in(&self, username: &str) -> HeaderValue {
        self.register(username, "correct horse").await;
        let response = self.login(username, "correct horse").await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        session_cookie(&response).expect("login should set a session cookie")
    }
}

/// Turns a `Set-Cookie: session=...` response header into a `Cookie` request header.
pub fn session_cookie(response: &TestResponse) -> Option<HeaderValue> {
    let set_cookie = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let pair = set_cookie.split(';').next()?.trim();
    let value = pair.strip_prefix("session=")?;
    if value.is_empty() {
        return None;
    }
    HeaderValue::from_str(&format!("session={}", value)).ok()
}

pub fn location(response: &TestResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}
