//! Session domain model.
//!
//! This module contains the core Session entity that represents one
//! multi-step workflow instance (a battery swap or a vehicle sale), plus
//! the small value types attached to it.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Number of steps in every station workflow.
pub const STEP_COUNT: u8 = 6;

/// Maximum number of sessions retained in the store.
///
/// Oldest entries beyond the cap are evicted at insertion time only;
/// updates never evict.
pub const MAX_SESSIONS: usize = 100;

/// The closed set of workflow kinds a session can track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowKind {
    /// Attendant-side battery swap flow.
    #[serde(rename = "attendant-swap")]
    AttendantSwap,
    /// Sales-side vehicle registration flow.
    #[serde(rename = "sales-registration")]
    SalesRegistration,
}

impl WorkflowKind {
    /// Stable string identifier, as stored in session records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AttendantSwap => "attendant-swap",
            Self::SalesRegistration => "sales-registration",
        }
    }

    /// Workflow family: the segment before the first `-`.
    ///
    /// The current-session pointer records the family rather than the full
    /// kind, so recovery matches on `attendant`/`sales`.
    pub fn family(&self) -> &'static str {
        match self {
            Self::AttendantSwap => "attendant",
            Self::SalesRegistration => "sales",
        }
    }

    /// Human-readable label for list displays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AttendantSwap => "Battery Swap",
            Self::SalesRegistration => "Registration",
        }
    }

    /// Number of steps in this workflow.
    pub fn step_count(&self) -> u8 {
        STEP_COUNT
    }

    /// Display name of a step, 1-based. `None` outside [1, step_count].
    pub fn step_name(&self, step: u8) -> Option<&'static str> {
        let names: [&'static str; STEP_COUNT as usize] = match self {
            Self::AttendantSwap => [
                "Customer",
                "Old Battery",
                "New Battery",
                "Review",
                "Payment",
                "Complete",
            ],
            Self::SalesRegistration => [
                "Registration",
                "Product",
                "Subscription",
                "Payment",
                "Battery",
                "Complete",
            ],
        };
        if step == 0 || step > STEP_COUNT {
            return None;
        }
        Some(names[(step - 1) as usize])
    }
}

impl fmt::Display for WorkflowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a session.
///
/// `InProgress` may move to any other status. `Paused` may resume to
/// `InProgress` or be discarded to `Abandoned`. `Completed` and `Abandoned`
/// are terminal: the record stays in the store for search and review but is
/// only ever loaded read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    InProgress,
    Paused,
    Completed,
    Abandoned,
}

impl SessionStatus {
    /// Stable string identifier, as stored in session records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in-progress",
            Self::Paused => "paused",
            Self::Completed => "completed",
            Self::Abandoned => "abandoned",
        }
    }

    /// Human-readable label for list displays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InProgress => "In Progress",
            Self::Paused => "Paused",
            Self::Completed => "Completed",
            Self::Abandoned => "Abandoned",
        }
    }

    /// Whether a session in this status is eligible for recovery.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::InProgress | Self::Paused)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Creation/update/completion times of a session (RFC 3339 strings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTimestamps {
    /// Set once at creation, immutable.
    pub created: String,
    /// Bumped on every mutation.
    pub last_updated: String,
    /// Set only on the transition to `Completed`.
    pub completed: Option<String>,
}

/// Operator and station identifiers attached at creation.
///
/// Opaque to the session layer; sourced from station configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub attendant_id: String,
    pub station_id: String,
}

/// Durable reference to the session bound to the active workflow UI.
///
/// Stored apart from the session bodies so that "what is currently bound"
/// and "what exists in history" stay independently queryable. A restart
/// re-derives the bound session purely from this pointer plus a store
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPointer {
    /// Id of the referenced session.
    pub id: String,
    /// Workflow family of the referenced session (`attendant`, `sales`).
    pub workflow: String,
}

impl SessionPointer {
    /// Builds the pointer for a session.
    pub fn for_session(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            workflow: session.kind.family().to_string(),
        }
    }

    /// Whether this pointer refers to the given workflow kind's family.
    pub fn matches_kind(&self, kind: WorkflowKind) -> bool {
        self.workflow == kind.family()
    }
}

/// Optional identity fields supplied when a session is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSeed {
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
    pub customer_name: Option<String>,
}

/// One workflow instance, tracked for progress and recovery.
///
/// The session layer treats step payloads as opaque JSON; the workflow
/// layer defines the concrete per-step schema. The only payload
/// interpretation done here is the step-1 identity extraction in
/// [`Session::absorb_identity`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique identifier, generated at creation, immutable.
    pub id: String,
    /// Workflow kind, immutable once set.
    #[serde(rename = "type")]
    pub kind: WorkflowKind,
    /// Current lifecycle status.
    pub status: SessionStatus,
    /// Step the workflow UI is currently on, in [1, 6].
    pub current_step: u8,
    /// Highest step ever reached, in [1, 6]. Never decreases; gates
    /// forward navigation in the UI.
    pub highest_step: u8,
    /// Customer identifier, populated opportunistically from step-1 data.
    pub customer_id: Option<String>,
    /// Subscription identifier, populated opportunistically from step-1 data.
    pub subscription_id: Option<String>,
    /// Customer display name, populated opportunistically from step-1 data.
    pub customer_name: Option<String>,
    /// Opaque step payloads keyed by step number (1..=6).
    #[serde(default)]
    pub data: BTreeMap<u8, Value>,
    /// Creation/update/completion times.
    pub timestamps: SessionTimestamps,
    /// Operator/station identifiers, immutable.
    pub metadata: SessionMetadata,
}

impl Session {
    /// Creates a fresh in-progress session at step 1.
    pub fn new(kind: WorkflowKind, seed: SessionSeed, metadata: SessionMetadata) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            id: generate_session_id(),
            kind,
            status: SessionStatus::InProgress,
            current_step: 1,
            highest_step: 1,
            customer_id: seed.customer_id,
            subscription_id: seed.subscription_id,
            customer_name: seed.customer_name,
            data: BTreeMap::new(),
            timestamps: SessionTimestamps {
                created: now.clone(),
                last_updated: now,
                completed: None,
            },
            metadata,
        }
    }

    /// Bumps `last_updated` to now.
    pub fn touch(&mut self) {
        self.timestamps.last_updated = Utc::now().to_rfc3339();
    }

    /// Copies identity fields out of a step-1 payload.
    ///
    /// `id`, `subscriptionId`, and `name` map to `customer_id`,
    /// `subscription_id`, and `customer_name`. Absent fields leave the
    /// existing values untouched; nothing is ever overwritten with `None`.
    pub fn absorb_identity(&mut self, payload: &Value) {
        if let Some(id) = payload.get("id").and_then(Value::as_str) {
            self.customer_id = Some(id.to_string());
        }
        if let Some(sub) = payload.get("subscriptionId").and_then(Value::as_str) {
            self.subscription_id = Some(sub.to_string());
        }
        if let Some(name) = payload.get("name").and_then(Value::as_str) {
            self.customer_name = Some(name.to_string());
        }
    }

    /// Step payloads recorded up to and including `current_step`, in step
    /// order. Used to replay state into the UI when a session is resumed.
    pub fn restorable_steps(&self) -> Vec<(u8, Value)> {
        self.data
            .iter()
            .filter(|(step, _)| **step <= self.current_step)
            .map(|(step, payload)| (*step, payload.clone()))
            .collect()
    }

    /// Whether a case-insensitive search term matches this session.
    ///
    /// The term matches when it appears as a substring of the subscription
    /// id, customer id, or customer name.
    pub fn matches_term(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        let hit = |field: &Option<String>| {
            field
                .as_deref()
                .is_some_and(|value| value.to_lowercase().contains(&needle))
        };
        hit(&self.subscription_id) || hit(&self.customer_id) || hit(&self.customer_name)
    }
}

/// Generates a session identifier.
///
/// Format: `SES-<creation millis, base 36>-<6 random alphanumerics>`,
/// uppercased. Collisions are negligible at station scale.
pub fn generate_session_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let suffix: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("SES-{}-{}", to_base36(millis), suffix).to_uppercase()
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    // base36 digits are ASCII
    String::from_utf8(out).unwrap_or_default()
}
