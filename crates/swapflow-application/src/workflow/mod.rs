//! Station workflows built on top of the session engine.
//!
//! # Module Structure
//!
//! - `attendant`: six-step battery swap driven by an attendant
//! - `sales`: six-step customer registration with vehicle and plan sale
//!
//! Each workflow owns its step payload schemas and wraps a
//! [`SessionContext`](swapflow_core::session::SessionContext) so the
//! engine stays agnostic of what the steps mean.

use chrono::Utc;
use serde::{Deserialize, Serialize};

pub mod attendant;
pub mod sales;

pub use attendant::{AttendantFlow, AttendantStepData, SwapCost};
pub use sales::{SalesFlow, SalesStepData};

/// Final-step marker shared by both workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMark {
    pub completed: bool,
    pub timestamp: String,
}

impl CompletionMark {
    pub fn now() -> Self {
        Self {
            completed: true,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}
