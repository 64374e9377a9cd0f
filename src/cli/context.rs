//! Wiring shared by the commands that touch the database.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::adapters::catalog::StaticTaskCatalog;
use crate::adapters::notifiers::dispatcher_from_config;
use crate::adapters::sqlite::{
    initialize_database, PoolConfig, SqliteCompletionLedger, SqliteMemberStore, SqliteProgressionStore,
};
use crate::domain::models::Config;
use crate::services::{drain, NotificationRelay, ProgressionService, ReconciliationService, RelayStats};

pub type AppProgressionService =
    ProgressionService<StaticTaskCatalog, SqliteProgressionStore, SqliteCompletionLedger, SqliteMemberStore>;

pub type AppReconciliationService = ReconciliationService<SqliteCompletionLedger, SqliteMemberStore>;

/// Open database plus the services built on it.
pub struct AppContext {
    pub pool: SqlitePool,
    pub service: AppProgressionService,
    relay_handle: Option<JoinHandle<RelayStats>>,
}

impl AppContext {
    /// Open the configured database and build the progression service.
    ///
    /// With `notify` set, a relay worker is spawned and committed completions
    /// are announced through the configured dispatcher.
    pub async fn open(config: &Config, notify: bool) -> Result<Self> {
        let pool = initialize_database(&config.database.url(), Some(PoolConfig::from(&config.database)))
            .await
            .with_context(|| format!("Failed to open database at {}", config.database.path))?;

        let catalog = StaticTaskCatalog::load(config.catalog.path.as_deref())
            .context("Failed to load task catalog")?;
        let ladder = config.progression.ladder().context("Invalid tier ladder")?;

        let mut service = ProgressionService::new(
            Arc::new(catalog),
            Arc::new(SqliteProgressionStore::new(pool.clone())),
            Arc::new(SqliteCompletionLedger::new(pool.clone())),
            Arc::new(SqliteMemberStore::new(pool.clone())),
        )
        .with_ladder(ladder)
        .with_comment_min_chars(config.progression.comment_min_chars);

        let mut relay_handle = None;
        if notify {
            let dispatcher = dispatcher_from_config(&config.notifications)
                .context("Failed to build notification dispatcher")?;
            let (relay, handle) = NotificationRelay::spawn(dispatcher);
            service = service.with_relay(relay);
            relay_handle = Some(handle);
        }

        Ok(Self { pool, service, relay_handle })
    }

    pub fn reconciliation(&self) -> AppReconciliationService {
        ReconciliationService::new(
            Arc::new(SqliteCompletionLedger::new(self.pool.clone())),
            Arc::new(SqliteMemberStore::new(self.pool.clone())),
        )
    }

    /// Drain pending notifications and close the pool.
    ///
    /// Notification problems are logged only; they never fail a command whose
    /// completion already committed.
    pub async fn shutdown(self) {
        let Self { pool, service, relay_handle } = self;
        drop(service);

        if let Some(handle) = relay_handle {
            if let Some(stats) = drain(handle).await {
                if stats.failed > 0 {
                    tracing::warn!(failed = stats.failed, delivered = stats.delivered, "some notifications were not delivered");
                } else {
                    tracing::debug!(?stats, "notifications drained");
                }
            }
        }

        pool.close().await;
    }
}
