use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::models::auth::SessionUser;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "dunes.session";
pub const SESSION_TTL_HOURS: i64 = 24;

struct SessionEntry {
    user: SessionUser,
    expires_at: DateTime<Utc>,
}

/// Server-side session store. The cookie carries an opaque token plus an
/// HMAC tag over it (the session secret), so a forged or truncated cookie
/// never reaches the map lookup.
pub struct SessionStore {
    sessions: DashMap<String, SessionEntry>,
    secret: String,
}

impl SessionStore {
    pub fn new(secret: String) -> Self {
        Self {
            sessions: DashMap::new(),
            secret,
        }
    }

    /// Creates a session and returns the signed cookie value.
    pub fn create(&self, user: SessionUser) -> String {
        self.purge_expired();

        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            SessionEntry {
                user,
                expires_at: Utc::now() + Duration::hours(SESSION_TTL_HOURS),
            },
        );
        let tag = self.sign(&token);
        format!("{token}.{tag}")
    }

    /// Resolves a cookie value to its session user. Bad signature, unknown
    /// token and expired session all look the same to the caller.
    pub fn get(&self, cookie_value: &str) -> Option<SessionUser> {
        let (token, tag) = cookie_value.split_once('.')?;
        if !self.verify(token, tag) {
            return None;
        }

        let expired = {
            let entry = self.sessions.get(token)?;
            if entry.expires_at < Utc::now() {
                true
            } else {
                return Some(entry.user.clone());
            }
        };
        if expired {
            self.sessions.remove(token);
        }
        None
    }

    pub fn destroy(&self, cookie_value: &str) {
        if let Some((token, _)) = cookie_value.split_once('.') {
            self.sessions.remove(token);
        }
    }

    fn purge_expired(&self) {
        let now = Utc::now();
        self.sessions.retain(|_, entry| entry.expires_at >= now);
    }

    fn mac(&self, token: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(token.as_bytes());
        mac
    }

    fn sign(&self, token: &str) -> String {
        URL_SAFE_NO_PAD.encode(self.mac(token).finalize().into_bytes())
    }

    fn verify(&self, token: &str, tag: &str) -> bool {
        let Ok(tag) = URL_SAFE_NO_PAD.decode(tag) else {
            return false;
        };
        // Constant-time comparison via the Mac verifier.
        self.mac(token).verify_slice(&tag).is_ok()
    }
}
