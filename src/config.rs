use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Email domain whose registrations get the admin role (without the "@").
    pub admin_email_domain: String,
    pub session_ttl_minutes: i64,
    pub otp_ttl_minutes: i64,
    /// Phone number that always verifies against `demo_otp_code`.
    pub demo_phone: String,
    pub demo_otp_code: String,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        Ok(Self {
            database_url,
            admin_email_domain: std::env::var("ADMIN_EMAIL_DOMAIN")
                .unwrap_or_else(|_| "ded.com".into()),
            session_ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 30),
            otp_ttl_minutes: std::env::var("OTP_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(5),
            demo_phone: std::env::var("DEMO_PHONE").unwrap_or_else(|_| "1234567890".into()),
            demo_otp_code: std::env::var("DEMO_OTP_CODE").unwrap_or_else(|_| "123456".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:5500,http://127.0.0.1:5500".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}
