//! Session domain module.
//!
//! Everything needed to track one multi-step station workflow: the session
//! record itself, the repositories it persists through, the lifecycle
//! operations, and crash/abandonment recovery.
//!
//! # Module Structure
//!
//! - `model`: Core session domain model (`Session`, `SessionStatus`,
//!   `WorkflowKind`, `SessionPointer`)
//! - `repository`: Repository traits for the session collection and the
//!   current-session pointer
//! - `context`: The explicit current-session object (`SessionContext`) with
//!   the mutation operations and the review write-guard
//! - `manager`: Session lifecycle entry points (`SessionManager`)
//! - `recovery`: Workflow-entry recovery (`RecoveryCoordinator`)
//!
//! # Usage
//!
//! ```ignore
//! use swapflow_core::session::{SessionManager, RecoveryCoordinator, WorkflowEntry};
//! use swapflow_core::session::{SessionSeed, WorkflowKind};
//!
//! let coordinator = RecoveryCoordinator::new(manager);
//! match coordinator.enter_workflow(WorkflowKind::AttendantSwap, SessionSeed::default()).await? {
//!     WorkflowEntry::Fresh(context) => { /* start at step 1 */ }
//!     WorkflowEntry::Recoverable(found) => { /* prompt resume / start fresh */ }
//! }
//! ```

mod context;
mod manager;
mod model;
mod recovery;
mod repository;

#[cfg(test)]
pub(crate) mod testing;

// Re-export public API
pub use context::{SessionContext, SessionMode};
pub use manager::SessionManager;
pub use model::{
    generate_session_id, Session, SessionMetadata, SessionPointer, SessionSeed, SessionStatus,
    SessionTimestamps, WorkflowKind, MAX_SESSIONS, STEP_COUNT,
};
pub use recovery::{
    OpenedSession, RecoverableSession, RecoveryCoordinator, ResumedSession, WorkflowEntry,
};
pub use repository::{CurrentSessionRepository, SessionRepository};
