//! PostgreSQL tests for the session repository.
//!
//! These run against the database named by `DATABASE_URL` and are skipped
//! when it is unset. Every test works on its own random user, so they can
//! share one database and run in parallel.

use chrono::{Duration, Utc};
use uuid::Uuid;

use fleethub_core::config::DatabaseConfig;
use fleethub_core::error::ErrorKind;
use fleethub_core::types::SessionLimit;
use fleethub_database::connection::DatabasePool;
use fleethub_database::migration::run_migrations;
use fleethub_database::repositories::SessionRepository;
use fleethub_entity::session::NewSession;

/// Connect to the test database and bring its schema up to date.
async fn test_pool() -> Option<DatabasePool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL session tests");
        return None;
    };
    let config = DatabaseConfig {
        url,
        max_connections: 5,
        min_connections: 1,
        ..DatabaseConfig::default()
    };

    let pool = DatabasePool::connect(&config)
        .await
        .expect("Failed to connect to test database");
    run_migrations(pool.pool())
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

fn new_session(user_id: Uuid, refresh_in: Duration) -> NewSession {
    let now = Utc::now();
    let refresh_expires_at = now + refresh_in;
    NewSession {
        id: Uuid::now_v7(),
        user_id,
        access_digest: format!("access-{}", Uuid::new_v4()),
        refresh_digest: format!("refresh-{}", Uuid::new_v4()),
        source_address: "192.0.2.44".to_string(),
        client_descriptor: "FleetHub-Android/4.2".to_string(),
        access_expires_at: refresh_expires_at - Duration::days(6),
        refresh_expires_at,
    }
}

fn live(user_id: Uuid) -> NewSession {
    new_session(user_id, Duration::days(7))
}

async fn active_count(repo: &SessionRepository, user_id: Uuid) -> usize {
    repo.list_active(user_id).await.unwrap().len()
}

#[tokio::test]
async fn test_create_writes_projection_row() {
    let Some(db) = test_pool().await else { return };
    let repo = db.sessions();

    let session = repo.create(&live(Uuid::new_v4())).await.unwrap();

    let projection = repo.find_projection(session.id).await.unwrap().unwrap();
    assert!(projection.active);
    assert!(projection.agrees_with(&session));
    assert_eq!(projection.snapshot["source_address"], "192.0.2.44");
}

#[tokio::test]
async fn test_revoke_twice_keeps_tables_in_step() {
    let Some(db) = test_pool().await else { return };
    let repo = db.sessions();
    let session = repo.create(&live(Uuid::new_v4())).await.unwrap();

    assert!(repo.revoke(session.id).await.unwrap());
    assert!(!repo.revoke(session.id).await.unwrap());
    assert!(!repo.revoke(Uuid::new_v4()).await.unwrap());

    let canonical = repo.find_by_id(session.id).await.unwrap().unwrap();
    let view = repo.find_projection(session.id).await.unwrap().unwrap();
    assert!(canonical.revoked);
    assert!(canonical.revoked_at.is_some());
    assert_eq!(canonical.revoked, !view.active);
}

#[tokio::test]
async fn test_duplicate_digest_is_conflict() {
    let Some(db) = test_pool().await else { return };
    let repo = db.sessions();
    let user_id = Uuid::new_v4();
    let first = live(user_id);
    repo.create(&first).await.unwrap();

    let mut duplicate = live(user_id);
    duplicate.access_digest = first.access_digest.clone();
    let err = repo.create(&duplicate).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
    assert!(repo.find_by_id(duplicate.id).await.unwrap().is_none());
    assert!(repo.find_projection(duplicate.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_revoke_all_mirrors_every_projection() {
    let Some(db) = test_pool().await else { return };
    let repo = db.sessions();
    let user_id = Uuid::new_v4();
    let a = repo.create(&live(user_id)).await.unwrap();
    repo.create(&live(user_id)).await.unwrap();
    repo.create(&live(user_id)).await.unwrap();
    repo.revoke(a.id).await.unwrap();

    assert_eq!(repo.revoke_all(user_id).await.unwrap(), 2);
    assert_eq!(repo.revoke_all(user_id).await.unwrap(), 0);

    for session in repo.list_by_user(user_id, None).await.unwrap() {
        let view = repo.find_projection(session.id).await.unwrap().unwrap();
        assert!(session.revoked);
        assert!(!view.active);
    }
}

#[tokio::test]
async fn test_list_by_user_limit() {
    let Some(db) = test_pool().await else { return };
    let repo = db.sessions();
    let user_id = Uuid::new_v4();
    let first = repo.create(&live(user_id)).await.unwrap();
    let second = repo.create(&live(user_id)).await.unwrap();

    let all = repo.list_by_user(user_id, None).await.unwrap();
    assert_eq!(
        all.iter().map(|s| s.id).collect::<Vec<_>>(),
        vec![second.id, first.id]
    );

    let newest = repo.list_by_user(user_id, Some(1)).await.unwrap();
    assert_eq!(newest.len(), 1);
    assert_eq!(newest[0].id, second.id);
}

#[tokio::test]
async fn test_delete_expired_removes_both_rows() {
    let Some(db) = test_pool().await else { return };
    let repo = db.sessions();
    let user_id = Uuid::new_v4();
    let expired = repo
        .create(&new_session(user_id, -Duration::days(30)))
        .await
        .unwrap();
    let recent = repo
        .create(&new_session(user_id, -Duration::days(1)))
        .await
        .unwrap();

    let deleted = repo
        .delete_expired(Utc::now() - Duration::days(7), 10_000)
        .await
        .unwrap();

    assert!(deleted >= 1);
    assert!(repo.find_by_id(expired.id).await.unwrap().is_none());
    assert!(repo.find_projection(expired.id).await.unwrap().is_none());
    assert!(repo.find_by_id(recent.id).await.unwrap().is_some());
    assert!(repo.find_projection(recent.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_admit_evicts_oldest_in_same_transaction() {
    let Some(db) = test_pool().await else { return };
    let repo = db.sessions();
    let user_id = Uuid::new_v4();
    let oldest = repo.create(&live(user_id)).await.unwrap();
    let middle = repo.create(&live(user_id)).await.unwrap();

    let admission = repo
        .admit(&live(user_id), SessionLimit::Fixed(2))
        .await
        .unwrap();

    assert_eq!(admission.evicted, vec![oldest.id]);
    let active: Vec<Uuid> = repo
        .list_active(user_id)
        .await
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(active, vec![admission.session.id, middle.id]);
    assert!(!repo.find_projection(oldest.id).await.unwrap().unwrap().active);
}

#[tokio::test]
async fn test_admit_conflict_rolls_back_evictions() {
    let Some(db) = test_pool().await else { return };
    let repo = db.sessions();
    let user_id = Uuid::new_v4();
    let existing = live(user_id);
    let kept = repo.create(&existing).await.unwrap();

    let mut clash = live(user_id);
    clash.refresh_digest = existing.refresh_digest.clone();
    let err = repo
        .admit(&clash, SessionLimit::Fixed(1))
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Conflict);
    let canonical = repo.find_by_id(kept.id).await.unwrap().unwrap();
    let view = repo.find_projection(kept.id).await.unwrap().unwrap();
    assert!(!canonical.revoked);
    assert!(view.active);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_admits_from_separate_pools_respect_cap() {
    let Some(node_a) = test_pool().await else { return };
    let Some(node_b) = test_pool().await else { return };
    let user_id = Uuid::new_v4();
    let seed = node_a.sessions();
    seed.create(&live(user_id)).await.unwrap();
    seed.create(&live(user_id)).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let repo = if i % 2 == 0 {
            node_a.sessions()
        } else {
            node_b.sessions()
        };
        handles.push(tokio::spawn(async move {
            repo.admit(&live(user_id), SessionLimit::Fixed(3)).await
        }));
    }
    let mut evicted = 0;
    for handle in handles {
        evicted += handle.await.unwrap().unwrap().evicted.len();
    }

    assert_eq!(active_count(&seed, user_id).await, 3);
    assert_eq!(evicted, 7);
    for session in seed.list_by_user(user_id, None).await.unwrap() {
        let view = seed.find_projection(session.id).await.unwrap().unwrap();
        assert_eq!(session.revoked, !view.active);
    }
}
