//! In-memory repositories for session tests.

use super::model::{Session, SessionPointer, SessionStatus, WorkflowKind, MAX_SESSIONS};
use super::repository::{CurrentSessionRepository, SessionRepository};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Ordered in-memory session collection, newest insertion first.
pub(crate) struct MockSessionRepository {
    sessions: Mutex<Vec<Session>>,
}

impl MockSessionRepository {
    pub(crate) fn new() -> Self {
        Self {
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Direct peek at a stored record, bypassing the trait.
    pub(crate) fn stored(&self, session_id: &str) -> Option<Session> {
        self.sessions
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == session_id)
            .cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepository {
    async fn list_all(&self) -> Result<Vec<Session>> {
        Ok(self.sessions.lock().unwrap().clone())
    }

    async fn save_all(&self, sessions: &[Session]) -> Result<()> {
        let mut stored = self.sessions.lock().unwrap();
        *stored = sessions.iter().take(MAX_SESSIONS).cloned().collect();
        Ok(())
    }

    async fn upsert(&self, session: &Session) -> Result<()> {
        let mut stored = self.sessions.lock().unwrap();
        if let Some(existing) = stored.iter_mut().find(|s| s.id == session.id) {
            *existing = session.clone();
        } else {
            stored.insert(0, session.clone());
            stored.truncate(MAX_SESSIONS);
        }
        Ok(())
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.stored(session_id))
    }

    async fn find_by_kind(&self, kind: WorkflowKind) -> Result<Vec<Session>> {
        let stored = self.sessions.lock().unwrap();
        Ok(stored.iter().filter(|s| s.kind == kind).cloned().collect())
    }

    async fn find_by_status(&self, status: SessionStatus) -> Result<Vec<Session>> {
        let stored = self.sessions.lock().unwrap();
        Ok(stored
            .iter()
            .filter(|s| s.status == status)
            .cloned()
            .collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<Session>> {
        let stored = self.sessions.lock().unwrap();
        Ok(stored
            .iter()
            .filter(|s| s.matches_term(term))
            .cloned()
            .collect())
    }
}

/// In-memory pointer record.
pub(crate) struct MockCurrentSessionRepository {
    pointer: Mutex<Option<SessionPointer>>,
}

impl MockCurrentSessionRepository {
    pub(crate) fn new() -> Self {
        Self {
            pointer: Mutex::new(None),
        }
    }

    pub(crate) fn pointer(&self) -> Option<SessionPointer> {
        self.pointer.lock().unwrap().clone()
    }
}

#[async_trait]
impl CurrentSessionRepository for MockCurrentSessionRepository {
    async fn get_current(&self) -> Result<Option<SessionPointer>> {
        Ok(self.pointer())
    }

    async fn set_current(&self, pointer: &SessionPointer) -> Result<()> {
        *self.pointer.lock().unwrap() = Some(pointer.clone());
        Ok(())
    }

    async fn clear_current(&self) -> Result<()> {
        *self.pointer.lock().unwrap() = None;
        Ok(())
    }
}

/// Repository whose writes always fail; reads see an empty store.
pub(crate) struct FailingSessionRepository;

#[async_trait]
impl SessionRepository for FailingSessionRepository {
    async fn list_all(&self) -> Result<Vec<Session>> {
        Ok(Vec::new())
    }

    async fn save_all(&self, _sessions: &[Session]) -> Result<()> {
        Err(anyhow!("session storage offline"))
    }

    async fn upsert(&self, _session: &Session) -> Result<()> {
        Err(anyhow!("session storage offline"))
    }

    async fn find_by_id(&self, _session_id: &str) -> Result<Option<Session>> {
        Ok(None)
    }

    async fn find_by_kind(&self, _kind: WorkflowKind) -> Result<Vec<Session>> {
        Ok(Vec::new())
    }

    async fn find_by_status(&self, _status: SessionStatus) -> Result<Vec<Session>> {
        Ok(Vec::new())
    }

    async fn search(&self, _term: &str) -> Result<Vec<Session>> {
        Ok(Vec::new())
    }
}

/// Pointer repository whose writes always fail.
pub(crate) struct FailingCurrentSessionRepository;

#[async_trait]
impl CurrentSessionRepository for FailingCurrentSessionRepository {
    async fn get_current(&self) -> Result<Option<SessionPointer>> {
        Ok(None)
    }

    async fn set_current(&self, _pointer: &SessionPointer) -> Result<()> {
        Err(anyhow!("pointer storage offline"))
    }

    async fn clear_current(&self) -> Result<()> {
        Err(anyhow!("pointer storage offline"))
    }
}
