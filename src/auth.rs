use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use chrono::{Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{session::Session, user::User},
    state::AppState,
};

pub const SESSION_COOKIE: &str = "offroad_session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

impl From<User> for AuthenticatedUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// The user behind the request's session cookie, if any. Handlers pass the
/// inner user explicitly to whatever needs an identity.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser(pub Option<AuthenticatedUser>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>() {
            return Ok(Self(Some(user.clone())));
        }

        let jar =
            PrivateCookieJar::<Key>::from_headers(&parts.headers, state.cookie_key.clone());
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(Self(None));
        };
        let user = load_session_user(state, cookie.value()).await?;
        if let Some(user) = &user {
            parts.extensions.insert(user.clone());
        }
        Ok(Self(user))
    }
}

impl CurrentUser {
    pub fn require_user(&self) -> Result<&AuthenticatedUser, AppError> {
        self.0.as_ref().ok_or(AppError::Unauthorized)
    }

    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::Other(anyhow::anyhow!("failed to hash password: {err}")))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| AppError::Other(anyhow::anyhow!("invalid password hash: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

pub async fn register_user(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required.".into()));
    }
    if password.is_empty() {
        return Err(AppError::BadRequest("Password is required.".into()));
    }

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(username_taken());
    }

    let password_hash = hash_password(password)?;
    let inserted = sqlx::query_scalar::<_, i64>(
        r#"INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?) RETURNING id"#,
    )
    .bind(username)
    .bind(&password_hash)
    .bind(Utc::now())
    .fetch_one(&state.db)
    .await;

    let id = match inserted {
        Ok(id) => id,
        Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
            return Err(username_taken())
        }
        Err(err) => return Err(err.into()),
    };

    info!(user_id = id, %username, "user registered");
    Ok(AuthenticatedUser {
        id,
        username: username.to_string(),
    })
}

/// Checks credentials. Unknown users and wrong passwords both yield
/// [`AppError::Unauthorized`].
pub async fn authenticate_user(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<AuthenticatedUser, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"SELECT id, username, password_hash, created_at, last_login_at
           FROM users WHERE username = ?"#,
    )
    .bind(username.trim())
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::Unauthorized)?;

    if !verify_password(password, &user.password_hash)? {
        warn!(username = %user.username, "rejected login");
        return Err(AppError::Unauthorized);
    }

    sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(user.id)
        .execute(&state.db)
        .await?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok(user.into())
}

pub async fn create_session(state: &AppState, user_id: i64) -> Result<String, AppError> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let expires_at = now + Duration::days(state.config.session_ttl_days);
    sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(&state.db)
        .await?;
    sqlx::query(
        r#"INSERT INTO sessions (id, user_id, created_at, last_seen_at, expires_at)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(&id)
    .bind(user_id)
    .bind(now)
    .bind(now)
    .bind(expires_at)
    .execute(&state.db)
    .await?;
    Ok(id)
}

pub async fn destroy_session(state: &AppState, session_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(&state.db)
        .await?;
    Ok(())
}

/// Resolves a session id to its user. Expired sessions are removed and
/// treated as absent.
pub async fn load_session_user(
    state: &AppState,
    session_id: &str,
) -> Result<Option<AuthenticatedUser>, AppError> {
    let session = sqlx::query_as::<_, Session>(
        r#"SELECT id, user_id, created_at, last_seen_at, expires_at FROM sessions WHERE id = ?"#,
    )
    .bind(session_id)
    .fetch_optional(&state.db)
    .await?;
    let Some(session) = session else {
        return Ok(None);
    };

    let now = Utc::now();
    if session.is_expired(now) {
        destroy_session(state, &session.id).await?;
        return Ok(None);
    }

    sqlx::query("UPDATE sessions SET last_seen_at = ? WHERE id = ?")
        .bind(now)
        .bind(&session.id)
        .execute(&state.db)
        .await?;

    let user = sqlx::query_as::<_, User>(
        r#"SELECT id, username, password_hash, created_at, last_login_at
           FROM users WHERE id = ?"#,
    )
    .bind(session.user_id)
    .fetch_optional(&state.db)
    .await?;
    Ok(user.map(AuthenticatedUser::from))
}

pub fn apply_session_cookie(
    jar: PrivateCookieJar,
    session_id: &str,
    ttl_days: i64,
) -> PrivateCookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(ttl_days));
    jar.add(cookie)
}

pub fn clear_session_cookie(jar: PrivateCookieJar) -> PrivateCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

fn username_taken() -> AppError {
    AppError::BadRequest("Username already exists.".into())
}
