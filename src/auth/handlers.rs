use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            LoginRequest, OtpSent, ProfileUpdated, RegisterRequest, RegisterResponse,
            SendOtpRequest, SessionEstablished, UpdateProfileRequest, VerifyOtpRequest,
        },
        password::{hash_password, verify_password},
        repo::{User, UserRole},
        session::{self, SessionUser},
    },
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/update", put(update_profile))
        .route("/auth/logout", get(logout))
        .route("/auth/send-otp", post(send_otp))
        .route("/auth/verify-otp", post(verify_otp))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Role is derived from the email suffix once, at account creation.
fn role_for_email(email: &str, admin_domain: &str) -> UserRole {
    if email.ends_with(&format!("@{admin_domain}")) {
        UserRole::Admin
    } else {
        UserRole::User
    }
}

fn session_cookie_for(state: &AppState, user_id: Uuid) -> String {
    let token = state.sessions.create(user_id);
    session::session_cookie(&token, state.sessions.ttl())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::InvalidArgument("Invalid email".into()));
    }

    if payload.password.is_empty() {
        warn!("register with empty password");
        return Err(ApiError::InvalidArgument("Password is required".into()));
    }

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("User already exists".into()));
    }

    let hash = hash_password(&payload.password)?;
    let role = role_for_email(&payload.email, &state.config.admin_email_domain);

    let user = User::create_local(
        &state.db,
        payload.name.as_deref(),
        &payload.email,
        &hash,
        payload.phone.as_deref(),
        role,
    )
    .await?;

    // auto-login the fresh account
    let cookie = session_cookie_for(&state, user.id);
    info!(user_id = %user.id, email = %payload.email, role = ?role, "user registered");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(RegisterResponse {
            message: "User created successfully".into(),
            role: user.role,
            user,
            success: true,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    payload.email = payload.email.trim().to_lowercase();

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::InvalidCredentials("User not found".into()));
        }
    };

    let ok = match user.password_hash.as_deref() {
        Some(hash) => verify_password(&payload.password, hash)?,
        // phone-provider accounts carry no password
        None => false,
    };

    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials("Invalid password".into()));
    }

    let cookie = session_cookie_for(&state, user.id);
    info!(user_id = %user.id, "user logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SessionEstablished {
            success: true,
            role: user.role,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
) -> ApiResult<Json<User>> {
    match User::find_by_id(&state.db, user_id).await? {
        Some(user) => Ok(Json(user)),
        None => {
            // session outlived its user (deleted by an admin)
            warn!(%user_id, "session user no longer exists");
            Err(ApiError::Unauthenticated)
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    SessionUser(user_id): SessionUser,
    Json(mut payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileUpdated>> {
    if let Some(email) = payload.email.as_mut() {
        *email = email.trim().to_lowercase();
        if !is_valid_email(email) {
            warn!(email = %email, "invalid email");
            return Err(ApiError::InvalidArgument("Invalid email".into()));
        }
    }

    let password_hash = match payload.password.as_deref() {
        Some(p) if !p.is_empty() => Some(hash_password(p)?),
        _ => None,
    };

    let user = User::update_profile(
        &state.db,
        user_id,
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.phone.as_deref(),
        password_hash.as_deref(),
    )
    .await?
    .ok_or(ApiError::Unauthenticated)?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(ProfileUpdated {
        success: true,
        user,
    }))
}

/// Destroys the session if one is attached; a no-op otherwise.
#[instrument(skip(state, headers))]
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session::token_from_headers(&headers) {
        state.sessions.destroy(token);
    }

    (
        StatusCode::OK,
        [(header::SET_COOKIE, session::clear_session_cookie())],
    )
}

/// Always reports success so callers cannot probe which phones exist.
#[instrument(skip(state, payload))]
pub async fn send_otp(
    State(state): State<AppState>,
    Json(payload): Json<SendOtpRequest>,
) -> Json<OtpSent> {
    if payload.phone == state.config.demo_phone {
        info!(phone = %payload.phone, code = %state.config.demo_otp_code, "demo otp requested");
        return Json(OtpSent {
            success: true,
            message: format!("OTP sent (Demo: {})", state.config.demo_otp_code),
        });
    }

    let code = state.otp.issue(&payload.phone);
    // delivery is a log line; there is no SMS integration
    info!(phone = %payload.phone, %code, "otp issued");

    Json(OtpSent {
        success: true,
        message: "OTP sent successfully".into(),
    })
}

#[instrument(skip(state, payload))]
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> ApiResult<impl IntoResponse> {
    let demo_login =
        payload.phone == state.config.demo_phone && payload.otp == state.config.demo_otp_code;

    if !demo_login && !state.otp.verify(&payload.phone, &payload.otp) {
        warn!(phone = %payload.phone, "otp mismatch or stale");
        return Err(ApiError::InvalidArgument("Invalid OTP".into()));
    }

    let user = match User::find_by_phone(&state.db, &payload.phone).await? {
        Some(u) => u,
        None => User::create_phone(&state.db, &payload.phone).await?,
    };

    let cookie = session_cookie_for(&state, user.id);
    info!(user_id = %user.id, phone = %payload.phone, "otp login");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SessionEstablished {
            success: true,
            role: user.role,
        }),
    ))
}
