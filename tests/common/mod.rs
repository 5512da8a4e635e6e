//! Shared test harness.
//!
//! Tests drive the real router against the database named by DATABASE_URL.
//! They share tables, so every test takes the global lock before touching
//! state. When DATABASE_URL is unset the suite skips instead of failing.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::{Mutex, MutexGuard};

use ded_backend::config::AppConfig;
use ded_backend::state::AppState;

static TEST_LOCK: Mutex<()> = Mutex::const_new(());

pub async fn lock() -> MutexGuard<'static, ()> {
    TEST_LOCK.lock().await
}

/// Connect, migrate, and wipe state. None when DATABASE_URL is unset.
pub async fn try_setup() -> Option<AppState> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return None;
    };

    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("connect to test database");

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("run migrations");

    sqlx::query("TRUNCATE TABLE users, expenses")
        .execute(&db)
        .await
        .expect("truncate tables");

    let config = Arc::new(AppConfig {
        database_url,
        admin_email_domain: "ded.com".into(),
        session_ttl_minutes: 60,
        otp_ttl_minutes: 5,
        demo_phone: "1234567890".into(),
        demo_otp_code: "123456".into(),
        cors_origins: vec!["http://localhost:5500".into()],
    });

    Some(AppState::from_parts(db, config))
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn authed_request(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn authed_json_request(method: &str, uri: &str, cookie: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// "ded.sid=<token>" from a Set-Cookie header, ready to send back.
pub fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("response should set a session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}
