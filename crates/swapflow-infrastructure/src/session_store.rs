//! Key-value backed session repositories.
//!
//! The whole session collection lives under one key as a JSON array, read
//! and rewritten on every mutation. A second key holds the current-session
//! pointer. Read paths fail closed: absent, unreadable, or corrupt data
//! degrades to an empty collection (or no pointer) with a diagnostic,
//! never an error to the caller.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use swapflow_core::session::{
    CurrentSessionRepository, Session, SessionPointer, SessionRepository, SessionStatus,
    WorkflowKind, MAX_SESSIONS,
};
use tracing::{debug, warn};

use crate::kv::KeyValueStore;

/// Key holding the serialized session collection.
const SESSIONS_KEY: &str = "oves-sessions";

/// Key holding the serialized current-session pointer.
const CURRENT_SESSION_KEY: &str = "oves-current-session";

/// Session collection stored as a single JSON blob in a [`KeyValueStore`].
pub struct KvSessionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvSessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads the full collection, degrading to empty on any failure.
    async fn read_all(&self) -> Vec<Session> {
        let raw = match self.store.get(SESSIONS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("[KvSessionRepository] Failed to read session store: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Session>>(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(
                    "[KvSessionRepository] Corrupt session store, starting empty: {}",
                    e
                );
                Vec::new()
            }
        }
    }

    async fn write_all(&self, sessions: &[Session]) -> Result<()> {
        let capped = &sessions[..sessions.len().min(MAX_SESSIONS)];
        let raw =
            serde_json::to_string(capped).context("Failed to serialize session collection")?;
        self.store.set(SESSIONS_KEY, &raw).await
    }
}

#[async_trait]
impl SessionRepository for KvSessionRepository {
    async fn list_all(&self) -> Result<Vec<Session>> {
        Ok(self.read_all().await)
    }

    async fn save_all(&self, sessions: &[Session]) -> Result<()> {
        self.write_all(sessions).await
    }

    async fn upsert(&self, session: &Session) -> Result<()> {
        let mut sessions = self.read_all().await;
        if let Some(existing) = sessions.iter_mut().find(|s| s.id == session.id) {
            *existing = session.clone();
        } else {
            // New sessions go to the head; eviction happens here, not on update.
            sessions.insert(0, session.clone());
            sessions.truncate(MAX_SESSIONS);
        }
        self.write_all(&sessions).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Session>> {
        Ok(self.read_all().await.into_iter().find(|s| s.id == id))
    }

    async fn find_by_kind(&self, kind: WorkflowKind) -> Result<Vec<Session>> {
        Ok(self
            .read_all()
            .await
            .into_iter()
            .filter(|s| s.kind == kind)
            .collect())
    }

    async fn find_by_status(&self, status: SessionStatus) -> Result<Vec<Session>> {
        Ok(self
            .read_all()
            .await
            .into_iter()
            .filter(|s| s.status == status)
            .collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<Session>> {
        Ok(self
            .read_all()
            .await
            .into_iter()
            .filter(|s| s.matches_term(term))
            .collect())
    }
}

/// Current-session pointer stored as a JSON blob in a [`KeyValueStore`].
pub struct KvCurrentSessionRepository {
    store: Arc<dyn KeyValueStore>,
}

impl KvCurrentSessionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CurrentSessionRepository for KvCurrentSessionRepository {
    async fn get_current(&self) -> Result<Option<SessionPointer>> {
        let raw = match self.store.get(CURRENT_SESSION_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(
                    "[KvCurrentSessionRepository] Failed to read pointer: {}",
                    e
                );
                return Ok(None);
            }
        };
        match serde_json::from_str::<SessionPointer>(&raw) {
            Ok(pointer) => Ok(Some(pointer)),
            Err(e) => {
                warn!(
                    "[KvCurrentSessionRepository] Corrupt pointer, treating as absent: {}",
                    e
                );
                Ok(None)
            }
        }
    }

    async fn set_current(&self, pointer: &SessionPointer) -> Result<()> {
        let raw = serde_json::to_string(pointer).context("Failed to serialize session pointer")?;
        debug!("[KvCurrentSessionRepository] Pointer set to {}", pointer.id);
        self.store.set(CURRENT_SESSION_KEY, &raw).await
    }

    async fn clear_current(&self) -> Result<()> {
        debug!("[KvCurrentSessionRepository] Pointer cleared");
        self.store.remove(CURRENT_SESSION_KEY).await
    }
}
