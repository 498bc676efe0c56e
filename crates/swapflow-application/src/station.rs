//! Station process wiring.
//!
//! Builds the session engine on top of the on-disk key-value store and
//! station config, and hands out the handles the UI layers work with.

use std::sync::Arc;

use anyhow::Result;
use swapflow_core::config::StationConfig;
use swapflow_core::session::{
    RecoveryCoordinator, SessionManager, SessionRepository, WorkflowKind,
};
use swapflow_infrastructure::{
    FileKeyValueStore, KeyValueStore, KvCurrentSessionRepository, KvSessionRepository,
    StationConfigService, SwapflowPaths,
};
use tracing::info;

use crate::listing::{self, SessionQuery, SessionSummary};
use crate::seed;

/// Composition root for one station terminal.
pub struct StationApp {
    sessions: Arc<dyn SessionRepository>,
    manager: Arc<SessionManager>,
    coordinator: RecoveryCoordinator,
    config: StationConfig,
}

impl StationApp {
    /// Builds the app against the on-disk store and station config.
    pub fn init() -> Result<Self> {
        let store_dir = SwapflowPaths::store_dir()?;
        let store: Arc<dyn KeyValueStore> = Arc::new(FileKeyValueStore::new(&store_dir)?);
        let config = StationConfigService::new()?.get_config();
        info!(
            "[StationApp] Initialized station {} with store at {}",
            config.station_id,
            store_dir.display()
        );
        Ok(Self::with_store(store, config))
    }

    /// Builds the app against an explicit store, e.g. an in-memory one.
    pub fn with_store(store: Arc<dyn KeyValueStore>, config: StationConfig) -> Self {
        let sessions: Arc<dyn SessionRepository> =
            Arc::new(KvSessionRepository::new(store.clone()));
        let manager = Arc::new(SessionManager::new(
            sessions.clone(),
            Arc::new(KvCurrentSessionRepository::new(store)),
            config.metadata(),
        ));
        let coordinator = RecoveryCoordinator::new(manager.clone());
        Self {
            sessions,
            manager,
            coordinator,
            config,
        }
    }

    pub fn manager(&self) -> &Arc<SessionManager> {
        &self.manager
    }

    pub fn coordinator(&self) -> &RecoveryCoordinator {
        &self.coordinator
    }

    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Session rows for the recovery list of one workflow.
    pub async fn recent_sessions(
        &self,
        kind: WorkflowKind,
        query: &SessionQuery,
    ) -> Result<Vec<SessionSummary>> {
        listing::list_sessions(self.sessions.as_ref(), kind, query).await
    }

    /// Seeds demo sessions for `kind` on first run.
    pub async fn seed_demo(&self, kind: WorkflowKind) -> Result<usize> {
        seed::seed_demo_sessions(self.sessions.as_ref(), kind, self.manager.metadata()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swapflow_core::session::SessionSeed;
    use swapflow_infrastructure::MemoryKeyValueStore;

    fn app() -> StationApp {
        StationApp::with_store(Arc::new(MemoryKeyValueStore::new()), StationConfig::default())
    }

    #[tokio::test]
    async fn test_sessions_created_by_manager_show_up_in_lists() {
        let app = app();
        let context = app
            .manager()
            .create_session(WorkflowKind::AttendantSwap, SessionSeed::default())
            .await;
        let id = context.id().to_string();
        context.pause().await;

        let rows = app
            .recent_sessions(WorkflowKind::AttendantSwap, &SessionQuery::default())
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert!(rows[0].resumable);
    }

    #[tokio::test]
    async fn test_seed_then_list_respects_limit() {
        let app = app();
        let seeded = app.seed_demo(WorkflowKind::SalesRegistration).await.unwrap();
        assert_eq!(seeded, 10);

        let rows = app
            .recent_sessions(
                WorkflowKind::SalesRegistration,
                &SessionQuery {
                    limit: 4,
                    ..SessionQuery::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[tokio::test]
    async fn test_metadata_comes_from_station_config() {
        let app = app();
        let context = app
            .manager()
            .create_session(WorkflowKind::AttendantSwap, SessionSeed::default())
            .await;
        assert_eq!(context.session().metadata.station_id, "STN-LOME-001");
        assert_eq!(context.session().metadata.attendant_id, "ATT-001");
        context.abandon().await;
    }
}
