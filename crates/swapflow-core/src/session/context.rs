//! Active-session context.
//!
//! A [`SessionContext`] is the explicit object handed to a workflow UI when
//! a session is created, resumed, or opened for review. It owns the bound
//! session record, knows whether the binding is read-only, and persists
//! every mutation through the repositories it carries. There is no global
//! "current session" variable; the durable pointer record plus a store
//! lookup are always enough to rebuild a context after a restart.

use super::model::{Session, SessionStatus, STEP_COUNT};
use super::repository::{CurrentSessionRepository, SessionRepository};
use crate::error::SwapflowError;
use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// How a session is bound to the workflow UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Normal binding: mutations apply and persist.
    Active,
    /// Read-only binding for inspecting historical records. All mutating
    /// operations are no-ops while in this mode.
    Review,
}

/// The session currently bound to a workflow UI.
///
/// Mutating operations follow one failure philosophy: persistence problems
/// are logged and swallowed, and the in-memory record stays authoritative
/// for the rest of the process lifetime. Session tracking must never block
/// the transactional flow it supports.
pub struct SessionContext {
    session: Session,
    mode: SessionMode,
    sessions: Arc<dyn SessionRepository>,
    current: Arc<dyn CurrentSessionRepository>,
}

impl SessionContext {
    pub(crate) fn new(
        session: Session,
        mode: SessionMode,
        sessions: Arc<dyn SessionRepository>,
        current: Arc<dyn CurrentSessionRepository>,
    ) -> Self {
        Self {
            session,
            mode,
            sessions,
            current,
        }
    }

    /// The bound session record.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Id of the bound session.
    pub fn id(&self) -> &str {
        &self.session.id
    }

    /// Current binding mode.
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Whether this context is a read-only review binding.
    pub fn is_review(&self) -> bool {
        self.mode == SessionMode::Review
    }

    /// Records a step payload.
    ///
    /// Stores the payload under `step`, moves `current_step` there, raises
    /// `highest_step` if the step is a new high-water mark, and bumps
    /// `last_updated`. At step 1 the identity fields (`id`,
    /// `subscriptionId`, `name`) are copied out of the payload into the
    /// session record.
    ///
    /// No-op in review mode. Steps outside [1, 6] are rejected before any
    /// mutation.
    pub async fn update_step_data(&mut self, step: u8, payload: Value) -> Result<()> {
        if self.is_review() {
            debug!(
                "[SessionContext] Ignoring step data for {} (review mode)",
                self.session.id
            );
            return Ok(());
        }
        if step == 0 || step > STEP_COUNT {
            return Err(SwapflowError::invalid_step(step, STEP_COUNT).into());
        }

        if step == 1 {
            self.session.absorb_identity(&payload);
        }
        self.session.data.insert(step, payload);
        self.session.current_step = step;
        self.session.highest_step = self.session.highest_step.max(step);
        self.session.touch();
        self.persist().await;
        Ok(())
    }

    /// Moves `current_step` without recording data (pure navigation).
    ///
    /// Navigation is only valid within already-reached steps, so `step`
    /// must lie in [1, highest_step]. No-op in review mode.
    pub async fn update_current_step(&mut self, step: u8) -> Result<()> {
        if self.is_review() {
            debug!(
                "[SessionContext] Ignoring navigation for {} (review mode)",
                self.session.id
            );
            return Ok(());
        }
        if step == 0 || step > self.session.highest_step {
            return Err(SwapflowError::invalid_step(step, self.session.highest_step).into());
        }

        self.session.current_step = step;
        self.session.touch();
        self.persist().await;
        Ok(())
    }

    /// Completes the session: status `Completed`, completion timestamp set,
    /// pointer cleared. Returns the final record.
    ///
    /// In review mode nothing is written and the record is returned as-is.
    pub async fn complete(mut self) -> Session {
        if self.is_review() {
            debug!(
                "[SessionContext] Ignoring completion of {} (review mode)",
                self.session.id
            );
            return self.session;
        }

        let now = Utc::now().to_rfc3339();
        self.session.status = SessionStatus::Completed;
        self.session.timestamps.completed = Some(now.clone());
        self.session.timestamps.last_updated = now;
        self.persist().await;
        self.clear_pointer().await;
        self.session
    }

    /// Pauses the session: status `Paused`, `last_updated` bumped,
    /// persisted. The pointer stays bound, so the session remains
    /// recoverable when its workflow is entered again.
    ///
    /// In review mode nothing is written and the record is returned as-is.
    pub async fn pause(mut self) -> Session {
        if self.is_review() {
            debug!(
                "[SessionContext] Ignoring pause of {} (review mode)",
                self.session.id
            );
            return self.session;
        }

        self.session.status = SessionStatus::Paused;
        self.session.touch();
        self.persist().await;
        self.session
    }

    /// Leaves the workflow screen: an in-progress session is parked as
    /// paused, and the pointer is unbound so the next entry starts clean.
    ///
    /// In review mode the record is untouched; the pointer is still
    /// cleared.
    pub async fn exit(mut self) -> Session {
        if !self.is_review() {
            self.session.status = SessionStatus::Paused;
            self.session.touch();
            self.persist().await;
        }
        self.clear_pointer().await;
        self.session
    }

    /// Abandons the session (explicit discard) and clears the pointer.
    ///
    /// In review mode the record is untouched; the pointer is still
    /// cleared.
    pub async fn abandon(mut self) -> Session {
        if !self.is_review() {
            self.session.status = SessionStatus::Abandoned;
            self.session.touch();
            self.persist().await;
        }
        self.clear_pointer().await;
        self.session
    }

    async fn persist(&self) {
        if let Err(e) = self.sessions.upsert(&self.session).await {
            warn!(
                "[SessionContext] Failed to persist session {}: {}",
                self.session.id, e
            );
        }
    }

    async fn clear_pointer(&self) {
        if let Err(e) = self.current.clear_current().await {
            warn!(
                "[SessionContext] Failed to clear current-session pointer: {}",
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::{SessionMetadata, SessionPointer, SessionSeed, WorkflowKind};
    use crate::session::testing::{
        FailingCurrentSessionRepository, FailingSessionRepository, MockCurrentSessionRepository,
        MockSessionRepository,
    };
    use serde_json::json;

    fn new_session(kind: WorkflowKind) -> Session {
        Session::new(
            kind,
            SessionSeed::default(),
            SessionMetadata {
                attendant_id: "ATT-001".to_string(),
                station_id: "STN-LOME-001".to_string(),
            },
        )
    }

    fn active_context(
        session: Session,
        sessions: &Arc<MockSessionRepository>,
        current: &Arc<MockCurrentSessionRepository>,
    ) -> SessionContext {
        SessionContext::new(
            session,
            SessionMode::Active,
            Arc::clone(sessions) as Arc<dyn SessionRepository>,
            Arc::clone(current) as Arc<dyn CurrentSessionRepository>,
        )
    }

    fn review_context(
        session: Session,
        sessions: &Arc<MockSessionRepository>,
        current: &Arc<MockCurrentSessionRepository>,
    ) -> SessionContext {
        SessionContext::new(
            session,
            SessionMode::Review,
            Arc::clone(sessions) as Arc<dyn SessionRepository>,
            Arc::clone(current) as Arc<dyn CurrentSessionRepository>,
        )
    }

    #[tokio::test]
    async fn test_step_data_tracks_current_and_highest() {
        let sessions = Arc::new(MockSessionRepository::new());
        let current = Arc::new(MockCurrentSessionRepository::new());
        let mut ctx = active_context(new_session(WorkflowKind::AttendantSwap), &sessions, &current);

        for step in [1u8, 2, 3, 2] {
            ctx.update_step_data(step, json!({"step": step})).await.unwrap();
        }

        assert_eq!(ctx.session().current_step, 2);
        assert_eq!(ctx.session().highest_step, 3);
        let stored = sessions.stored(ctx.id()).unwrap();
        assert_eq!(stored.current_step, 2);
        assert_eq!(stored.highest_step, 3);
    }

    #[tokio::test]
    async fn test_step_one_extracts_identity() {
        let sessions = Arc::new(MockSessionRepository::new());
        let current = Arc::new(MockCurrentSessionRepository::new());
        let mut ctx = active_context(new_session(WorkflowKind::AttendantSwap), &sessions, &current);

        ctx.update_step_data(
            1,
            json!({"id": "CUS-8847-KE", "subscriptionId": "SUB-2291-LX", "name": "James Mwangi"}),
        )
        .await
        .unwrap();

        let session = ctx.session();
        assert_eq!(session.customer_id.as_deref(), Some("CUS-8847-KE"));
        assert_eq!(session.subscription_id.as_deref(), Some("SUB-2291-LX"));
        assert_eq!(session.customer_name.as_deref(), Some("James Mwangi"));
    }

    #[tokio::test]
    async fn test_step_two_does_not_extract_identity() {
        let sessions = Arc::new(MockSessionRepository::new());
        let current = Arc::new(MockCurrentSessionRepository::new());
        let mut ctx = active_context(new_session(WorkflowKind::AttendantSwap), &sessions, &current);

        ctx.update_step_data(2, json!({"id": "BAT-2024-7829", "name": "not a customer"}))
            .await
            .unwrap();

        assert!(ctx.session().customer_id.is_none());
        assert!(ctx.session().customer_name.is_none());
    }

    #[tokio::test]
    async fn test_step_data_rejects_out_of_range_steps() {
        let sessions = Arc::new(MockSessionRepository::new());
        let current = Arc::new(MockCurrentSessionRepository::new());
        let mut ctx = active_context(new_session(WorkflowKind::AttendantSwap), &sessions, &current);

        for bad in [0u8, 7] {
            let err = ctx.update_step_data(bad, json!({})).await.unwrap_err();
            let typed = err.downcast_ref::<SwapflowError>().unwrap();
            assert!(typed.is_invalid_step());
        }
        assert!(ctx.session().data.is_empty());
    }

    #[tokio::test]
    async fn test_navigation_stays_within_reached_steps() {
        let sessions = Arc::new(MockSessionRepository::new());
        let current = Arc::new(MockCurrentSessionRepository::new());
        let mut ctx = active_context(new_session(WorkflowKind::AttendantSwap), &sessions, &current);

        ctx.update_step_data(1, json!({})).await.unwrap();
        ctx.update_step_data(2, json!({})).await.unwrap();
        ctx.update_step_data(3, json!({})).await.unwrap();

        ctx.update_current_step(1).await.unwrap();
        assert_eq!(ctx.session().current_step, 1);
        assert_eq!(ctx.session().highest_step, 3);

        let err = ctx.update_current_step(4).await.unwrap_err();
        assert!(err.downcast_ref::<SwapflowError>().unwrap().is_invalid_step());
    }

    #[tokio::test]
    async fn test_complete_sets_timestamp_and_clears_pointer() {
        let sessions = Arc::new(MockSessionRepository::new());
        let current = Arc::new(MockCurrentSessionRepository::new());
        let session = new_session(WorkflowKind::AttendantSwap);
        current
            .set_current(&SessionPointer::for_session(&session))
            .await
            .unwrap();

        let ctx = active_context(session, &sessions, &current);
        let completed = ctx.complete().await;

        assert_eq!(completed.status, SessionStatus::Completed);
        assert!(completed.timestamps.completed.is_some());
        assert!(current.pointer().is_none());
        assert_eq!(
            sessions.stored(&completed.id).unwrap().status,
            SessionStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_pause_persists_and_keeps_pointer_bound() {
        let sessions = Arc::new(MockSessionRepository::new());
        let current = Arc::new(MockCurrentSessionRepository::new());
        let session = new_session(WorkflowKind::SalesRegistration);
        current
            .set_current(&SessionPointer::for_session(&session))
            .await
            .unwrap();

        let ctx = active_context(session, &sessions, &current);
        let paused = ctx.pause().await;

        assert_eq!(paused.status, SessionStatus::Paused);
        assert!(paused.timestamps.completed.is_none());
        assert_eq!(
            sessions.stored(&paused.id).unwrap().status,
            SessionStatus::Paused
        );
        // The pointer survives a pause so the session can be recovered.
        assert_eq!(current.pointer().map(|p| p.id), Some(paused.id));
    }

    #[tokio::test]
    async fn test_exit_pauses_and_unbinds_pointer() {
        let sessions = Arc::new(MockSessionRepository::new());
        let current = Arc::new(MockCurrentSessionRepository::new());
        let session = new_session(WorkflowKind::SalesRegistration);
        current
            .set_current(&SessionPointer::for_session(&session))
            .await
            .unwrap();

        let ctx = active_context(session, &sessions, &current);
        let parked = ctx.exit().await;

        assert_eq!(parked.status, SessionStatus::Paused);
        assert_eq!(
            sessions.stored(&parked.id).unwrap().status,
            SessionStatus::Paused
        );
        assert!(current.pointer().is_none());
    }

    #[tokio::test]
    async fn test_review_mode_leaves_stored_record_untouched() {
        let sessions = Arc::new(MockSessionRepository::new());
        let current = Arc::new(MockCurrentSessionRepository::new());
        let mut session = new_session(WorkflowKind::AttendantSwap);
        session.status = SessionStatus::Completed;
        sessions.upsert(&session).await.unwrap();
        let before = serde_json::to_string(&sessions.stored(&session.id).unwrap()).unwrap();

        let mut ctx = review_context(session.clone(), &sessions, &current);
        ctx.update_step_data(2, json!({"mutation": true})).await.unwrap();
        ctx.update_current_step(1).await.unwrap();
        let after_update = serde_json::to_string(&sessions.stored(&session.id).unwrap()).unwrap();
        assert_eq!(before, after_update);

        let returned = ctx.complete().await;
        assert_eq!(returned.status, SessionStatus::Completed);
        let after_complete = serde_json::to_string(&sessions.stored(&session.id).unwrap()).unwrap();
        assert_eq!(before, after_complete);

        let ctx = review_context(session.clone(), &sessions, &current);
        ctx.pause().await;
        let after_pause = serde_json::to_string(&sessions.stored(&session.id).unwrap()).unwrap();
        assert_eq!(before, after_pause);

        let ctx = review_context(session.clone(), &sessions, &current);
        ctx.exit().await;
        let after_exit = serde_json::to_string(&sessions.stored(&session.id).unwrap()).unwrap();
        assert_eq!(before, after_exit);
    }

    #[tokio::test]
    async fn test_review_abandon_clears_pointer_without_status_change() {
        let sessions = Arc::new(MockSessionRepository::new());
        let current = Arc::new(MockCurrentSessionRepository::new());
        let mut session = new_session(WorkflowKind::AttendantSwap);
        session.status = SessionStatus::Completed;
        sessions.upsert(&session).await.unwrap();
        current
            .set_current(&SessionPointer {
                id: "some-other-session".to_string(),
                workflow: "attendant".to_string(),
            })
            .await
            .unwrap();

        let ctx = review_context(session.clone(), &sessions, &current);
        let returned = ctx.abandon().await;

        assert_eq!(returned.status, SessionStatus::Completed);
        assert_eq!(
            sessions.stored(&session.id).unwrap().status,
            SessionStatus::Completed
        );
        assert!(current.pointer().is_none());
    }

    #[tokio::test]
    async fn test_persistence_failures_never_block_the_flow() {
        let sessions: Arc<dyn SessionRepository> = Arc::new(FailingSessionRepository);
        let current: Arc<dyn CurrentSessionRepository> = Arc::new(FailingCurrentSessionRepository);
        let mut ctx = SessionContext::new(
            new_session(WorkflowKind::AttendantSwap),
            SessionMode::Active,
            sessions,
            current,
        );

        ctx.update_step_data(1, json!({"name": "Kofi Mensah"})).await.unwrap();
        ctx.update_step_data(2, json!({"id": "BAT-2024-7829"})).await.unwrap();
        assert_eq!(ctx.session().highest_step, 2);

        let completed = ctx.complete().await;
        assert_eq!(completed.status, SessionStatus::Completed);
        assert_eq!(completed.customer_name.as_deref(), Some("Kofi Mensah"));
    }
}
