//! services/api/src/web/auth.rs
//!
//! Authentication pages and handlers for registration, login, and logout.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use shelfmate_core::domain::AuthSession;
use shelfmate_core::ports::PortError;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::web::middleware::{current_session, SESSION_COOKIE};
use crate::web::state::AppState;
use crate::web::views;

//=========================================================================================
// Form Types
//=========================================================================================

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

//=========================================================================================
// Helpers
//=========================================================================================

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            AppError::Storage("Failed to hash password".to_string())
        })
}

fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        AppError::Storage("Authentication error".to_string())
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn session_cookie(state: &AppState, auth_session_id: &str, max_age_seconds: i64) -> String {
    let secure = if state.config.secure_cookies { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        SESSION_COOKIE, auth_session_id, max_age_seconds, secure
    )
}

/// Renders a form page again with the error's message.
fn form_error(page: fn(Option<&str>) -> String, err: AppError) -> Response {
    Html(page(Some(&err.to_string()))).into_response()
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /register
pub async fn register_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Response> {
    if current_session(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(views::register_page(None)).into_response())
}

/// POST /register - Create a new user account
pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if current_session(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    // 1. Check the confirmation before touching storage
    if form.password != form.confirm_password {
        return Ok(form_error(views::register_page, AppError::PasswordMismatch));
    }

    // 2. Reject taken usernames
    match state.db.get_user_by_username(&form.username).await {
        Ok(_) => return Ok(form_error(views::register_page, AppError::DuplicateUsername)),
        Err(PortError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    // 3. Create user in database
    let password_hash = hash_password(&form.password)?;
    match state.db.create_user(&form.username, &password_hash).await {
        Ok(user) => {
            info!(user_id = user.id, "Registered new user");
            Ok(Redirect::to("/login").into_response())
        }
        Err(PortError::DuplicateUsername) => {
            Ok(form_error(views::register_page, AppError::DuplicateUsername))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /login
pub async fn login_page(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Response> {
    if current_session(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }
    Ok(Html(views::login_page(None)).into_response())
}

/// POST /login - Login with existing account
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if current_session(&state, &headers).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    // 1. Get user by username
    let user_creds = match state.db.get_user_by_username(&form.username).await {
        Ok(creds) => creds,
        Err(PortError::NotFound(_)) => {
            return Ok(form_error(views::login_page, AppError::InvalidCredentials))
        }
        Err(e) => return Err(e.into()),
    };

    // 2. Verify password
    if !verify_password(&form.password, &user_creds.password_hash)? {
        return Ok(form_error(views::login_page, AppError::InvalidCredentials));
    }

    // 3. Sweep sessions that ran out, then generate the new ID and expiration
    let purged = state.db.purge_expired_sessions().await?;
    if purged > 0 {
        info!(purged, "Removed expired auth sessions");
    }

    let auth_session_id = Uuid::new_v4().to_string();
    let ttl = Duration::days(state.config.session_ttl_days);
    let expires_at = Utc::now() + ttl;

    // 4. Create auth session in database
    state
        .db
        .create_auth_session(&auth_session_id, user_creds.id, expires_at)
        .await?;
    info!(user_id = user_creds.id, username = %user_creds.username, "User logged in");

    // 5. Set the session cookie and go home
    let cookie = session_cookie(&state, &auth_session_id, ttl.num_seconds());
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}

/// GET /logout - Logout and invalidate session
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> AppResult<Response> {
    state.db.delete_auth_session(&session.id).await?;
    info!(user_id = session.user_id, "User logged out");

    let cookie = session_cookie(&state, "", 0);
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
}
