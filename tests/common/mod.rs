//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use civic_quest::adapters::catalog::StaticTaskCatalog;
use civic_quest::adapters::sqlite::{
    initialize_database, PoolConfig, SqliteCompletionLedger, SqliteMemberStore, SqliteProgressionStore,
};
use civic_quest::domain::models::{CompletionRequest, Task};
use civic_quest::services::ProgressionService;
use sqlx::SqlitePool;
use tempfile::TempDir;

pub type TestService =
    ProgressionService<StaticTaskCatalog, SqliteProgressionStore, SqliteCompletionLedger, SqliteMemberStore>;

/// File-backed database so several pooled connections contend for the lock.
pub struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn setup_file_db() -> TestDb {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let url = format!("sqlite:{}", dir.path().join("progression.db").display());
    let config = PoolConfig {
        max_connections: 8,
        acquire_timeout: Duration::from_secs(30),
        busy_timeout: Duration::from_secs(30),
        ..PoolConfig::default()
    };

    let pool = initialize_database(&url, Some(config))
        .await
        .expect("failed to initialize test database");
    TestDb { pool, _dir: dir }
}

pub fn test_tasks() -> Vec<Task> {
    vec![
        Task::new("intro", "Stell dich vor", 20),
        Task::new("profile", "Profil vervollständigen", 20),
        Task::new("meetup", "Treffen besuchen", 30).repeatable(),
        Task::new("feedback", "Feedback zu einem Antrag", 50).requiring_comment(),
        Task::new("recognition", "Besondere Anerkennung", 100).restricted(),
        Task::new("big", "Großprojekt", 400),
    ]
}

pub fn service(pool: &SqlitePool) -> TestService {
    service_with_tasks(pool, test_tasks())
}

pub fn service_with_tasks(pool: &SqlitePool, tasks: Vec<Task>) -> TestService {
    ProgressionService::new(
        Arc::new(StaticTaskCatalog::new(tasks).expect("valid test catalog")),
        Arc::new(SqliteProgressionStore::new(pool.clone())),
        Arc::new(SqliteCompletionLedger::new(pool.clone())),
        Arc::new(SqliteMemberStore::new(pool.clone())),
    )
}

pub fn request(member_id: &str, task_id: &str) -> CompletionRequest {
    CompletionRequest {
        member_id: member_id.to_string(),
        display_name: format!("Member {member_id}"),
        task_id: task_id.to_string(),
        comment: None,
    }
}
