//! Session repository traits.
//!
//! Defines the interfaces for session persistence and for the durable
//! current-session pointer.

use super::model::{Session, SessionPointer, SessionStatus, WorkflowKind};
use anyhow::Result;
use async_trait::async_trait;

/// An abstract repository over the stored session collection.
///
/// This trait defines the contract for persisting and querying sessions,
/// decoupling the lifecycle logic from the specific storage mechanism
/// (key-value blob, files, database).
///
/// # Implementation Notes
///
/// Implementations should handle:
/// - The 100-entry retention cap, applied at insertion time
/// - Corrupt stored data, read as an empty collection rather than an error
/// - Insertion ordering (newest first) with in-place updates
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Lists all stored sessions, newest insertion first.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<Session>)`: All stored sessions (empty when the backing
    ///   data is absent or unreadable)
    /// - `Err(_)`: Error occurred while reaching storage
    async fn list_all(&self) -> Result<Vec<Session>>;

    /// Replaces the stored collection with the given sequence, truncated
    /// to the retention cap.
    async fn save_all(&self, sessions: &[Session]) -> Result<()>;

    /// Inserts or replaces a session.
    ///
    /// A session with a known id is replaced in place; an unknown id is
    /// inserted at the head of the collection (and the cap applied).
    /// Repeating an upsert with an unchanged session is a no-op.
    async fn upsert(&self, session: &Session) -> Result<()>;

    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Lists sessions of one workflow kind, preserving store order.
    async fn find_by_kind(&self, kind: WorkflowKind) -> Result<Vec<Session>>;

    /// Lists sessions in one status, preserving store order.
    async fn find_by_status(&self, status: SessionStatus) -> Result<Vec<Session>>;

    /// Case-insensitive substring search over subscription id, customer id,
    /// and customer name. A session matches when the term appears in any of
    /// the three fields.
    async fn search(&self, term: &str) -> Result<Vec<Session>>;
}

/// An abstract repository for the current-session pointer.
///
/// The pointer is stored apart from the session bodies so the bound
/// session can be re-derived after a restart from the pointer plus a
/// store lookup.
#[async_trait]
pub trait CurrentSessionRepository: Send + Sync {
    /// Reads the pointer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(pointer))`: A session is bound
    /// - `Ok(None)`: No session bound (or the stored pointer is unreadable)
    /// - `Err(_)`: Error occurred while reaching storage
    async fn get_current(&self) -> Result<Option<SessionPointer>>;

    /// Writes the pointer.
    async fn set_current(&self, pointer: &SessionPointer) -> Result<()>;

    /// Clears the pointer. Clearing an absent pointer is not an error.
    async fn clear_current(&self) -> Result<()>;
}
