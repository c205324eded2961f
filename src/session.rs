//! Cookie-keyed server-side sessions.
//!
//! Session data lives in an in-memory store; the signed `todo_session` cookie
//! only names the session. Sessions expire after a period and a background
//! task sweeps expired ones out of the store.

use std::time::Duration;

use axum_sessions::{async_session::MemoryStore, PersistencePolicy, SameSite, SessionLayer};
use tokio::task::JoinHandle;

pub const COOKIE_NAME: &str = "todo_session";
/// `SessionLayer` refuses signing keys shorter than this.
pub const MIN_SECRET_LEN: usize = 64;

#[derive(Clone)]
pub struct SessionSettings {
    pub store: MemoryStore,
    pub secret: Vec<u8>,
    pub ttl: Duration,
}

impl SessionSettings {
    pub fn new(secret: Vec<u8>, ttl: Duration) -> Self {
        Self {
            store: MemoryStore::new(),
            secret,
            ttl,
        }
    }

    // Sessions are only stored, and the cookie only sent, once a handler writes to them
    pub fn layer(&self) -> SessionLayer<MemoryStore> {
        SessionLayer::new(self.store.clone(), &self.secret)
            .with_cookie_name(COOKIE_NAME)
            .with_same_site_policy(SameSite::Lax)
            .with_secure(false)
            .with_session_ttl(Some(self.ttl))
            .with_persistence_policy(PersistencePolicy::ChangedOnly)
    }
}

/// Periodically drops expired sessions from the store.
pub fn spawn_session_sweeper(store: MemoryStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            if let Err(e) = store.cleanup().await {
                tracing::warn!("session cleanup failed: {}", e);
            }
        }
    })
}
