//! Application layer for Swapflow.
//!
//! This crate builds the station-facing features on top of the session
//! engine: the attendant and sales step workflows, session list views,
//! rider self-service data, demo seeding, and process wiring.

pub mod listing;
pub mod rider;
pub mod seed;
pub mod station;
pub mod workflow;

pub use listing::{SessionQuery, SessionSummary};
pub use station::StationApp;
pub use workflow::{AttendantFlow, SalesFlow};
