//! Workflow-entry session recovery.
//!
//! When a workflow screen is entered, an interrupted session of the same
//! workflow family may still be bound through the durable pointer. The
//! coordinator detects that case and holds off creating a fresh session
//! until the user has explicitly chosen between resuming and starting
//! over, so no progress is ever discarded silently.

use super::context::SessionContext;
use super::manager::SessionManager;
use super::model::{Session, SessionSeed, WorkflowKind};
use anyhow::{anyhow, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of entering a workflow.
pub enum WorkflowEntry {
    /// No recoverable prior session existed; a fresh one is already
    /// created and bound.
    Fresh(SessionContext),
    /// An interrupted session was found. Nothing has been created yet;
    /// the caller must resolve the choice via [`RecoverableSession`].
    Recoverable(RecoverableSession),
}

/// An interrupted session surfaced at workflow entry, awaiting the
/// resume-or-start-fresh decision.
pub struct RecoverableSession {
    session: Session,
    kind: WorkflowKind,
    manager: Arc<SessionManager>,
}

/// A session bound for continuation, with the step data the UI should
/// replay to rebuild its screens.
pub struct ResumedSession {
    pub context: SessionContext,
    /// `(step, payload)` pairs for steps 1..=current_step, in step order.
    pub restorable_steps: Vec<(u8, Value)>,
}

/// Result of explicitly opening a session from a list.
pub enum OpenedSession {
    /// The session was open (in-progress or paused) and has been resumed.
    Resumed(ResumedSession),
    /// The session was finished (completed or abandoned) and is bound
    /// read-only instead.
    Review(SessionContext),
}

/// Detects interrupted sessions on workflow entry and routes explicit
/// re-selection, enforcing that finished sessions are reviewed rather
/// than resumed.
pub struct RecoveryCoordinator {
    manager: Arc<SessionManager>,
}

impl RecoveryCoordinator {
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }

    /// Looks for a recoverable session for the given workflow kind.
    ///
    /// A session is recoverable when the pointer exists, its workflow
    /// family matches the entering kind, the referenced session is still
    /// in the store, and its status is in-progress or paused. Anything
    /// else means there is nothing to recover.
    pub async fn recoverable_session(&self, kind: WorkflowKind) -> Result<Option<Session>> {
        let Some(pointer) = self.manager.current_pointer().await? else {
            return Ok(None);
        };
        if !pointer.matches_kind(kind) {
            debug!(
                "[RecoveryCoordinator] Pointer workflow '{}' does not match '{}'",
                pointer.workflow,
                kind.family()
            );
            return Ok(None);
        }

        let Some(session) = self.manager.find_session(&pointer.id).await? else {
            debug!(
                "[RecoveryCoordinator] Pointer references missing session {}",
                pointer.id
            );
            return Ok(None);
        };
        if !session.status.is_open() {
            debug!(
                "[RecoveryCoordinator] Session {} is {} and not recoverable",
                session.id, session.status
            );
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Enters a workflow.
    ///
    /// With no recoverable prior session a fresh one is created and bound
    /// immediately. Otherwise the interrupted session is surfaced and
    /// session creation is suspended until the caller chooses.
    pub async fn enter_workflow(
        &self,
        kind: WorkflowKind,
        seed: SessionSeed,
    ) -> Result<WorkflowEntry> {
        if let Some(session) = self.recoverable_session(kind).await? {
            info!(
                "[RecoveryCoordinator] Found recoverable session {} for {}",
                session.id, kind
            );
            return Ok(WorkflowEntry::Recoverable(RecoverableSession {
                session,
                kind,
                manager: Arc::clone(&self.manager),
            }));
        }

        Ok(WorkflowEntry::Fresh(
            self.manager.create_session(kind, seed).await,
        ))
    }

    /// Opens a session picked explicitly from a list.
    ///
    /// Open sessions are resumed; finished ones are bound read-only. This
    /// is the layer that keeps completed and abandoned records from ever
    /// being resumed, since `resume_session` itself does not check.
    pub async fn open_session(&self, session_id: &str) -> Result<Option<OpenedSession>> {
        let Some(session) = self.manager.find_session(session_id).await? else {
            return Ok(None);
        };

        if session.status.is_open() {
            let Some(context) = self.manager.resume_session(session_id).await? else {
                return Ok(None);
            };
            let restorable_steps = context.session().restorable_steps();
            Ok(Some(OpenedSession::Resumed(ResumedSession {
                context,
                restorable_steps,
            })))
        } else {
            let Some(context) = self.manager.review_session(session_id).await? else {
                return Ok(None);
            };
            Ok(Some(OpenedSession::Review(context)))
        }
    }
}

impl RecoverableSession {
    /// The interrupted session record, for display in the recovery prompt.
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn kind(&self) -> WorkflowKind {
        self.kind
    }

    /// Resumes the interrupted session.
    ///
    /// The returned [`ResumedSession`] carries the step payloads recorded
    /// up to the current step so the UI can restore its state.
    pub async fn resume(self) -> Result<ResumedSession> {
        let context = self
            .manager
            .resume_session(&self.session.id)
            .await?
            .ok_or_else(|| anyhow!("Session not found: {}", self.session.id))?;
        let restorable_steps = context.session().restorable_steps();
        info!(
            "[RecoveryCoordinator] Resumed session {} with {} restorable steps",
            context.id(),
            restorable_steps.len()
        );
        Ok(ResumedSession {
            context,
            restorable_steps,
        })
    }

    /// Parks the interrupted session and creates a fresh one.
    ///
    /// The prior session is paused (when still in-progress) without being
    /// resumed, keeping its progress reachable from the session list.
    pub async fn start_fresh(self, seed: SessionSeed) -> Result<SessionContext> {
        self.manager.pause_session(&self.session.id).await?;
        info!(
            "[RecoveryCoordinator] Parked session {} and starting fresh",
            self.session.id
        );
        Ok(self.manager.create_session(self.kind, seed).await)
    }

    /// Discards the interrupted session entirely (status abandoned) and
    /// creates a fresh one.
    pub async fn discard(self, seed: SessionSeed) -> Result<SessionContext> {
        self.manager.abandon_session(&self.session.id).await?;
        Ok(self.manager.create_session(self.kind, seed).await)
    }
}
