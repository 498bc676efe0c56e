//! Session list views for the recovery screens.
//!
//! Both workflows show a searchable, filterable list of past sessions
//! before entering the step flow. This module turns stored sessions into
//! display rows sorted by recency.

use anyhow::Result;
use chrono::{DateTime, Utc};
use swapflow_core::session::{Session, SessionRepository, SessionStatus, WorkflowKind};

/// Filters applied to a session list.
#[derive(Debug, Clone)]
pub struct SessionQuery {
    /// Substring matched against subscription id, customer id and name.
    pub term: Option<String>,
    pub status: Option<SessionStatus>,
    pub limit: usize,
}

impl Default for SessionQuery {
    fn default() -> Self {
        Self {
            term: None,
            status: None,
            limit: 10,
        }
    }
}

/// One row of the session list, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: String,
    pub workflow: &'static str,
    pub status: SessionStatus,
    pub status_label: &'static str,
    pub customer: String,
    pub subscription: String,
    /// e.g. `Step 3 of 6 (New Battery)`.
    pub progress: String,
    /// e.g. `12m ago`.
    pub last_activity: String,
    /// Open sessions can be resumed; finished ones only reviewed.
    pub resumable: bool,
}

impl SessionSummary {
    pub fn from_session(session: &Session) -> Self {
        let step_name = session
            .kind
            .step_name(session.current_step)
            .unwrap_or("Unknown");
        Self {
            id: session.id.clone(),
            workflow: session.kind.label(),
            status: session.status,
            status_label: session.status.label(),
            customer: session
                .customer_name
                .clone()
                .or_else(|| session.customer_id.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            subscription: session
                .subscription_id
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            progress: format!(
                "Step {} of {} ({})",
                session.current_step,
                session.kind.step_count(),
                step_name
            ),
            last_activity: format_relative(&session.timestamps.last_updated),
            resumable: session.status.is_open(),
        }
    }
}

/// Loads, filters and sorts sessions of one workflow, newest first.
pub async fn list_sessions(
    repo: &dyn SessionRepository,
    kind: WorkflowKind,
    query: &SessionQuery,
) -> Result<Vec<SessionSummary>> {
    let mut sessions = repo.find_by_kind(kind).await?;

    if let Some(term) = query.term.as_deref() {
        let term = term.trim();
        if !term.is_empty() {
            sessions.retain(|session| session.matches_term(term));
        }
    }
    if let Some(status) = query.status {
        sessions.retain(|session| session.status == status);
    }

    // Timestamps are RFC 3339, so the string fallback still sorts sanely.
    sessions.sort_by(|a, b| {
        let left = DateTime::parse_from_rfc3339(&a.timestamps.last_updated);
        let right = DateTime::parse_from_rfc3339(&b.timestamps.last_updated);
        match (left, right) {
            (Ok(left), Ok(right)) => right.cmp(&left),
            _ => b.timestamps.last_updated.cmp(&a.timestamps.last_updated),
        }
    });
    sessions.truncate(query.limit);

    Ok(sessions.iter().map(SessionSummary::from_session).collect())
}

/// Relative "time ago" for a stored timestamp.
///
/// Falls back to the raw string when it does not parse.
pub fn format_relative(timestamp: &str) -> String {
    let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let elapsed = Utc::now().signed_duration_since(parsed.with_timezone(&Utc));

    if elapsed.num_minutes() < 1 {
        "Just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d ago", elapsed.num_days())
    } else {
        parsed.format("%b %-d, %H:%M").to_string()
    }
}
