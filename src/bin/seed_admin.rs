//! Bootstrap a fixed admin account for demos and local testing.
//!
//! Idempotent: exits cleanly when the account already exists.

use sqlx::postgres::PgPoolOptions;

use ded_backend::auth::password::hash_password;
use ded_backend::auth::repo::{User, UserRole};

const ADMIN_NAME: &str = "Super Admin";
const ADMIN_EMAIL: &str = "admin@test.com";
const ADMIN_PASSWORD: &str = "admin123";
const ADMIN_PHONE: &str = "0000000000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "seed_admin=info,ded_backend=info".into()),
        )
        .init();

    let database_url = std::env::var("DATABASE_URL")?;
    let db = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    if let Some(existing) = User::find_by_email(&db, ADMIN_EMAIL).await? {
        tracing::info!(user_id = %existing.id, email = ADMIN_EMAIL, "admin user already exists");
        return Ok(());
    }

    let hash = hash_password(ADMIN_PASSWORD)?;
    let user = User::create_local(
        &db,
        Some(ADMIN_NAME),
        ADMIN_EMAIL,
        &hash,
        Some(ADMIN_PHONE),
        UserRole::Admin,
    )
    .await?;

    tracing::info!(user_id = %user.id, email = ADMIN_EMAIL, "admin user created");
    Ok(())
}
