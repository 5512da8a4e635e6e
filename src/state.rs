use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use time::Duration;

use crate::auth::otp::OtpStore;
use crate::auth::session::SessionStore;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    /// Server-held session registry; tokens travel via the session cookie.
    pub sessions: SessionStore,
    /// Pending one-time codes, keyed by phone. Process-local and non-durable.
    pub otp: OtpStore,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;
        Ok(Self::from_parts(db, config))
    }

    pub fn from_parts(db: PgPool, config: Arc<AppConfig>) -> Self {
        let sessions = SessionStore::new(Duration::minutes(config.session_ttl_minutes));
        let otp = OtpStore::new(Duration::minutes(config.otp_ttl_minutes));
        Self {
            db,
            config,
            sessions,
            otp,
        }
    }
}
