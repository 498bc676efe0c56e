//! Session lifecycle management.

use super::context::{SessionContext, SessionMode};
use super::model::{
    Session, SessionMetadata, SessionPointer, SessionSeed, SessionStatus, WorkflowKind,
};
use super::repository::{CurrentSessionRepository, SessionRepository};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Creates, resumes, reviews, and queries sessions.
///
/// `SessionManager` is the entry point of the session engine:
/// - Creating new sessions (stamped with the configured station metadata)
/// - Binding existing sessions for resume or read-only review
/// - Pausing or abandoning stored sessions by id
/// - Delegating collection queries to the repository
///
/// Contexts returned by this manager carry their own repository handles,
/// so they stay usable independently of the manager that produced them.
pub struct SessionManager {
    /// Persistent storage backend for the session collection
    sessions: Arc<dyn SessionRepository>,
    /// Durable current-session pointer
    current: Arc<dyn CurrentSessionRepository>,
    /// Operator/station identifiers stamped onto new sessions
    metadata: SessionMetadata,
}

impl SessionManager {
    /// Creates a new `SessionManager` with repository backends.
    ///
    /// # Arguments
    ///
    /// * `sessions` - The repository backend for the session collection
    /// * `current` - The repository backend for the current-session pointer
    /// * `metadata` - Station metadata stamped onto sessions created here
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        current: Arc<dyn CurrentSessionRepository>,
        metadata: SessionMetadata,
    ) -> Self {
        Self {
            sessions,
            current,
            metadata,
        }
    }

    /// Station metadata stamped onto new sessions.
    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    /// Creates a fresh in-progress session and binds it as current.
    ///
    /// The new record is persisted and the pointer set; both writes are
    /// best-effort (a storage failure is logged, and the returned context
    /// keeps working from memory).
    pub async fn create_session(&self, kind: WorkflowKind, seed: SessionSeed) -> SessionContext {
        let session = Session::new(kind, seed, self.metadata.clone());
        info!(
            "[SessionManager] Created session {} ({})",
            session.id, session.kind
        );

        if let Err(e) = self.sessions.upsert(&session).await {
            warn!(
                "[SessionManager] Failed to persist new session {}: {}",
                session.id, e
            );
        }
        self.bind_pointer(&session).await;

        SessionContext::new(
            session,
            SessionMode::Active,
            Arc::clone(&self.sessions),
            Arc::clone(&self.current),
        )
    }

    /// Resumes a stored session: forces its status to in-progress and
    /// binds it as current.
    ///
    /// Deliberately does not inspect the prior status; the policy that
    /// finished sessions are reviewed rather than resumed lives in the
    /// recovery coordinator.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no session with that id exists.
    pub async fn resume_session(&self, session_id: &str) -> Result<Option<SessionContext>> {
        let Some(mut session) = self.sessions.find_by_id(session_id).await? else {
            return Ok(None);
        };

        session.status = SessionStatus::InProgress;
        session.touch();
        if let Err(e) = self.sessions.upsert(&session).await {
            warn!(
                "[SessionManager] Failed to persist resumed session {}: {}",
                session.id, e
            );
        }
        self.bind_pointer(&session).await;
        info!(
            "[SessionManager] Resumed session {} at step {}",
            session.id, session.current_step
        );

        Ok(Some(SessionContext::new(
            session,
            SessionMode::Active,
            Arc::clone(&self.sessions),
            Arc::clone(&self.current),
        )))
    }

    /// Opens a stored session read-only.
    ///
    /// No status change, no pointer update: reviewing never reinstates a
    /// session as current.
    pub async fn review_session(&self, session_id: &str) -> Result<Option<SessionContext>> {
        let Some(session) = self.sessions.find_by_id(session_id).await? else {
            return Ok(None);
        };
        info!("[SessionManager] Reviewing session {}", session.id);

        Ok(Some(SessionContext::new(
            session,
            SessionMode::Review,
            Arc::clone(&self.sessions),
            Arc::clone(&self.current),
        )))
    }

    /// Pauses a stored session by id.
    ///
    /// Only an in-progress session is moved to paused; any other status is
    /// left as-is. The pointer is untouched: a paused session that is still
    /// bound stays recoverable the next time its workflow is entered.
    ///
    /// # Returns
    ///
    /// The (possibly updated) record, or `Ok(None)` when the id is unknown.
    pub async fn pause_session(&self, session_id: &str) -> Result<Option<Session>> {
        let Some(mut session) = self.sessions.find_by_id(session_id).await? else {
            return Ok(None);
        };

        if session.status == SessionStatus::InProgress {
            session.status = SessionStatus::Paused;
            session.touch();
            if let Err(e) = self.sessions.upsert(&session).await {
                warn!(
                    "[SessionManager] Failed to persist paused session {}: {}",
                    session.id, e
                );
            }
        }

        Ok(Some(session))
    }

    /// Abandons a stored session without binding it (explicit discard).
    ///
    /// In-progress and paused sessions move to abandoned; completed and
    /// already-abandoned records are left as-is. A matching pointer is
    /// cleared.
    ///
    /// # Returns
    ///
    /// The (possibly updated) record, or `Ok(None)` when the id is unknown.
    pub async fn abandon_session(&self, session_id: &str) -> Result<Option<Session>> {
        let Some(mut session) = self.sessions.find_by_id(session_id).await? else {
            return Ok(None);
        };

        if session.status.is_open() {
            session.status = SessionStatus::Abandoned;
            session.touch();
            if let Err(e) = self.sessions.upsert(&session).await {
                warn!(
                    "[SessionManager] Failed to persist abandoned session {}: {}",
                    session.id, e
                );
            }
            info!("[SessionManager] Abandoned session {}", session.id);
        }

        match self.current.get_current().await {
            Ok(Some(pointer)) if pointer.id == session_id => {
                if let Err(e) = self.current.clear_current().await {
                    warn!(
                        "[SessionManager] Failed to clear current-session pointer: {}",
                        e
                    );
                }
            }
            Ok(_) => {}
            Err(e) => warn!(
                "[SessionManager] Failed to read current-session pointer: {}",
                e
            ),
        }

        Ok(Some(session))
    }

    /// Reads the durable current-session pointer.
    pub async fn current_pointer(&self) -> Result<Option<SessionPointer>> {
        self.current.get_current().await
    }

    /// Finds a session by id.
    pub async fn find_session(&self, session_id: &str) -> Result<Option<Session>> {
        self.sessions.find_by_id(session_id).await
    }

    /// Lists all stored sessions, newest insertion first.
    pub async fn list_sessions(&self) -> Result<Vec<Session>> {
        self.sessions.list_all().await
    }

    /// Case-insensitive search over subscription id, customer id, and
    /// customer name.
    pub async fn search(&self, term: &str) -> Result<Vec<Session>> {
        self.sessions.search(term).await
    }

    /// Lists sessions of one workflow kind.
    pub async fn find_by_kind(&self, kind: WorkflowKind) -> Result<Vec<Session>> {
        self.sessions.find_by_kind(kind).await
    }

    /// Lists sessions in one status.
    pub async fn find_by_status(&self, status: SessionStatus) -> Result<Vec<Session>> {
        self.sessions.find_by_status(status).await
    }

    async fn bind_pointer(&self, session: &Session) {
        let pointer = SessionPointer::for_session(session);
        if let Err(e) = self.current.set_current(&pointer).await {
            warn!(
                "[SessionManager] Failed to persist current-session pointer for {}: {}",
                session.id, e
            );
        }
    }
}
