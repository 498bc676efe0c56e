pub mod config_service;
pub mod kv;
pub mod paths;
pub mod session_store;

pub use crate::config_service::StationConfigService;
pub use crate::kv::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use crate::paths::SwapflowPaths;
pub use crate::session_store::{KvCurrentSessionRepository, KvSessionRepository};
