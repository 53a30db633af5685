use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{DateTime, Utc};
use rand::RngCore;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use shared::cache_key;
use std::time::Duration;

pub const COOKIE_NAME: &str = "dashboard_session";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: i32,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Server-side sessions in Redis, keyed by an opaque random id.
#[derive(Clone)]
pub struct SessionStore {
    conn: ConnectionManager,
    ttl: Duration,
    secure_cookie: bool,
}

pub fn new_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn session_key(id: &str) -> String {
    cache_key(["session", id])
}

impl SessionStore {
    pub fn new(conn: ConnectionManager, ttl: Duration, secure_cookie: bool) -> Self {
        Self {
            conn,
            ttl,
            secure_cookie,
        }
    }

    pub async fn create(&self, user_id: i32, username: &str) -> shared::Result<String> {
        let id = new_session_id();
        let data = SessionData {
            user_id,
            username: username.to_string(),
            created_at: Utc::now(),
        };
        let raw = serde_json::to_string(&data)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(session_key(&id), raw, self.ttl.as_secs().max(1))
            .await?;
        Ok(id)
    }

    pub async fn get(&self, id: &str) -> shared::Result<Option<SessionData>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(session_key(id)).await?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: &str) -> shared::Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(session_key(id)).await?;
        Ok(())
    }

    pub fn cookie(&self, id: String) -> Cookie<'static> {
        session_cookie(id, self.secure_cookie)
    }

    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(COOKIE_NAME).path("/").build()
    }
}

pub fn session_cookie(id: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_random_hex() {
        let a = new_session_id();
        let b = new_session_id();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn cookie_flags() {
        let cookie = session_cookie("abc".to_string(), false);
        assert_eq!(cookie.name(), COOKIE_NAME);
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_ne!(cookie.secure(), Some(true));
    }

    #[test]
    fn keys_are_namespaced() {
        assert_eq!(session_key("abc"), "docker-project:session:abc");
    }
}
