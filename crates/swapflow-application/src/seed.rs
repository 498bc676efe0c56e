//! Demo session seeding for showroom and training stations.
//!
//! A fresh install shows an empty recovery list, which makes the session
//! screens hard to demonstrate. Seeding writes ten plausible past
//! sessions for a workflow, once, and never touches a store that already
//! holds real sessions of that workflow.

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{Duration, Utc};
use rand::Rng;
use serde_json::json;
use swapflow_core::session::{
    Session, SessionMetadata, SessionRepository, SessionStatus, SessionTimestamps, WorkflowKind,
};
use tracing::{debug, info};

const DEMO_NAMES: [&str; 10] = [
    "Kofi Mensah",
    "Ama Owusu",
    "Kwame Asante",
    "Akua Boateng",
    "Yaw Darko",
    "Abena Osei",
    "Kojo Appiah",
    "Adwoa Mensah",
    "Kwesi Agyeman",
    "Efua Nyamaa",
];

const DEMO_STATUSES: [SessionStatus; 10] = [
    SessionStatus::Completed,
    SessionStatus::Completed,
    SessionStatus::Completed,
    SessionStatus::Paused,
    SessionStatus::Completed,
    SessionStatus::Completed,
    SessionStatus::InProgress,
    SessionStatus::Completed,
    SessionStatus::Paused,
    SessionStatus::Completed,
];

/// Seeds demo sessions for `kind` unless some already exist.
///
/// Returns the number of sessions written. Sessions of other workflows
/// are preserved.
pub async fn seed_demo_sessions(
    repo: &dyn SessionRepository,
    kind: WorkflowKind,
    metadata: &SessionMetadata,
) -> Result<usize> {
    let mut all = repo.list_all().await?;
    if all.iter().any(|session| session.kind == kind) {
        debug!("[SessionSeeder] {} sessions already present, skipping", kind);
        return Ok(0);
    }

    let seeded = demo_sessions(kind, metadata);
    let count = seeded.len();
    all.extend(seeded);
    repo.save_all(&all).await?;
    info!("[SessionSeeder] Seeded {} demo sessions", count);
    Ok(count)
}

fn demo_sessions(kind: WorkflowKind, metadata: &SessionMetadata) -> Vec<Session> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();

    (0..DEMO_NAMES.len())
        .map(|i| {
            let name = DEMO_NAMES[i];
            let status = DEMO_STATUSES[i];
            let hours_ago = (i as i64) * 4 + rng.gen_range(0..3);
            let created = now - Duration::hours(hours_ago);
            let last_updated = created + Duration::seconds(rng.gen_range(0..3600));
            let current_step = if status == SessionStatus::Completed {
                6
            } else {
                rng.gen_range(2..6)
            };
            let customer_id = format!("CUS-{}-KE", 8800 + i);
            let tier = ["WK", "MO", "LX"][i % 3];

            let suffix: String = (&mut rng)
                .sample_iter(&rand::distributions::Alphanumeric)
                .take(4)
                .map(char::from)
                .collect();

            Session {
                id: format!("SES-{:03}{}", i, suffix.to_uppercase()),
                kind,
                status,
                current_step,
                highest_step: current_step,
                customer_id: Some(customer_id.clone()),
                subscription_id: Some(format!("SUB-{}-{}", 7700 + i, tier)),
                customer_name: Some(name.to_string()),
                data: BTreeMap::from([(1, json!({ "name": name, "id": customer_id }))]),
                timestamps: SessionTimestamps {
                    created: created.to_rfc3339(),
                    last_updated: last_updated.to_rfc3339(),
                    completed: (status == SessionStatus::Completed)
                        .then(|| (created + Duration::minutes(30)).to_rfc3339()),
                },
                metadata: metadata.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use swapflow_core::session::SessionSeed;
    use swapflow_infrastructure::{KvSessionRepository, MemoryKeyValueStore};

    fn metadata() -> SessionMetadata {
        SessionMetadata {
            attendant_id: "ATT-001".to_string(),
            station_id: "STN-LOME-001".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_populates_empty_store() {
        let repo = KvSessionRepository::new(Arc::new(MemoryKeyValueStore::new()));
        let count = seed_demo_sessions(&repo, WorkflowKind::AttendantSwap, &metadata())
            .await
            .unwrap();
        assert_eq!(count, 10);

        let sessions = repo.find_by_kind(WorkflowKind::AttendantSwap).await.unwrap();
        assert_eq!(sessions.len(), 10);

        for session in &sessions {
            assert!(session.id.starts_with("SES-"));
            assert!((2..=6).contains(&session.current_step));
            assert_eq!(session.highest_step, session.current_step);
            assert!(session.data.contains_key(&1));
            if session.status == SessionStatus::Completed {
                assert_eq!(session.current_step, 6);
                assert!(session.timestamps.completed.is_some());
            } else {
                assert!(session.timestamps.completed.is_none());
            }
        }

        let names: Vec<_> = sessions
            .iter()
            .filter_map(|session| session.customer_name.as_deref())
            .collect();
        assert!(names.contains(&"Kofi Mensah"));
        assert!(names.contains(&"Efua Nyamaa"));
    }

    #[tokio::test]
    async fn test_seed_skips_store_with_real_sessions() {
        let repo = KvSessionRepository::new(Arc::new(MemoryKeyValueStore::new()));
        let real = Session::new(
            WorkflowKind::AttendantSwap,
            SessionSeed::default(),
            metadata(),
        );
        repo.upsert(&real).await.unwrap();

        let count = seed_demo_sessions(&repo, WorkflowKind::AttendantSwap, &metadata())
            .await
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seed_is_scoped_per_workflow() {
        let repo = KvSessionRepository::new(Arc::new(MemoryKeyValueStore::new()));
        seed_demo_sessions(&repo, WorkflowKind::AttendantSwap, &metadata())
            .await
            .unwrap();
        let count = seed_demo_sessions(&repo, WorkflowKind::SalesRegistration, &metadata())
            .await
            .unwrap();
        assert_eq!(count, 10);
        assert_eq!(repo.list_all().await.unwrap().len(), 20);
    }
}
