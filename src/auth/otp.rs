use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use rand::Rng;
use time::{Duration, OffsetDateTime};

#[derive(Debug, Clone)]
struct PendingOtp {
    code: String,
    expires_at: OffsetDateTime,
}

/// Pending one-time codes keyed by phone number.
///
/// At most one code is outstanding per phone: issuing overwrites any prior
/// pending code. A code is consumed exactly once on successful verification
/// and cannot be replayed. Everything here is process-local and lost on
/// restart.
#[derive(Clone)]
pub struct OtpStore {
    inner: Arc<RwLock<HashMap<String, PendingOtp>>>,
    ttl: Duration,
}

impl OtpStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Generate and store a fresh code for `phone`, replacing any pending one.
    pub fn issue(&self, phone: &str) -> String {
        let code = generate_code();
        let pending = PendingOtp {
            code: code.clone(),
            expires_at: OffsetDateTime::now_utc() + self.ttl,
        };
        self.inner
            .write()
            .expect("otp store lock poisoned")
            .insert(phone.to_string(), pending);
        code
    }

    /// Consume the pending code for `phone` if it matches and is unexpired.
    ///
    /// A mismatch leaves the pending code in place so the caller may retry;
    /// a match or an expired entry removes it.
    pub fn verify(&self, phone: &str, code: &str) -> bool {
        let mut pending = self.inner.write().expect("otp store lock poisoned");
        match pending.get(phone) {
            Some(p) if p.expires_at <= OffsetDateTime::now_utc() => {
                pending.remove(phone);
                false
            }
            Some(p) if p.code == code => {
                pending.remove(phone);
                true
            }
            _ => false,
        }
    }
}

fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}
