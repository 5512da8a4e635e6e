use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use time::{Duration, OffsetDateTime};
use tracing::warn;
use uuid::Uuid;

use crate::auth::repo::{User, UserRole};
use crate::error::ApiError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "ded.sid";

#[derive(Debug, Clone)]
struct Session {
    user_id: Uuid,
    expires_at: OffsetDateTime,
}

/// Server-held session registry: opaque token -> user identity.
///
/// A token is valid only while it exists here and is unexpired. Sessions of
/// deleted users are not swept; their tokens fail at the next user lookup.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Issue a fresh token bound to `user_id`.
    pub fn create(&self, user_id: Uuid) -> String {
        let token = Uuid::new_v4().to_string();
        let session = Session {
            user_id,
            expires_at: OffsetDateTime::now_utc() + self.ttl,
        };
        self.inner
            .write()
            .expect("session store lock poisoned")
            .insert(token.clone(), session);
        token
    }

    /// Resolve a token to its user id. Expired entries are dropped on touch.
    pub fn resolve(&self, token: &str) -> Option<Uuid> {
        let mut sessions = self.inner.write().expect("session store lock poisoned");
        match sessions.get(token) {
            Some(s) if s.expires_at > OffsetDateTime::now_utc() => Some(s.user_id),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    /// Destroy a session. No-op when the token is unknown.
    pub fn destroy(&self, token: &str) {
        self.inner
            .write()
            .expect("session store lock poisoned")
            .remove(token);
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Set-Cookie value establishing a session.
pub fn session_cookie(token: &str, max_age: Duration) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        max_age.whole_seconds()
    )
}

/// Set-Cookie value clearing the session cookie.
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    )
}

/// Pull the session token out of a Cookie header, if present.
pub fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|part| {
            part.trim()
                .strip_prefix(SESSION_COOKIE)
                .and_then(|rest| rest.strip_prefix('='))
        })
}

/// Session-authenticated caller, resolved to a user id.
///
/// Rejects with 401 when the cookie is missing or the token is
/// unknown/expired.
#[derive(Debug)]
pub struct SessionUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(ApiError::Unauthenticated)?;
        match state.sessions.resolve(token) {
            Some(user_id) => Ok(SessionUser(user_id)),
            None => {
                warn!("unknown or expired session token");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}

/// Admin-authenticated caller: a valid session whose user holds the admin
/// role. Loads the full user record so handlers can log who acted.
#[derive(Debug)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let SessionUser(user_id) = SessionUser::from_request_parts(parts, state).await?;

        let user = User::find_by_id(&state.db, user_id)
            .await?
            .ok_or(ApiError::Unauthenticated)?;

        if user.role != UserRole::Admin {
            warn!(user_id = %user.id, "admin route denied");
            return Err(ApiError::Unauthorized("Admin access required".into()));
        }

        Ok(AdminUser(user))
    }
}
