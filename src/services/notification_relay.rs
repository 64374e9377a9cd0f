//! Post-commit notification relay.
//!
//! Completions are handed to the relay only after the ledger transaction has
//! committed. A spawned worker drains the queue and calls the dispatcher;
//! dispatcher failures are logged and dropped, so they can never change a
//! completion result that was already returned to the caller.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::domain::ports::{NotificationDispatcher, TaskCompletedNotice, TierCrossedNotice};

/// Event emitted after a completion has been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionEvent {
    pub member_id: String,
    pub task_id: String,
    pub task_name: String,
    pub xp_earned: u32,
    pub old_xp: u64,
    pub new_xp: u64,
    pub comment: Option<String>,
    /// Crossed tier names, ascending
    pub crossed_tiers: Vec<String>,
}

/// Delivery statistics reported by the worker when the relay shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub events: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Sending half of the relay. Cheap to clone; the worker stops once every
/// clone has been dropped and the queue is drained.
#[derive(Debug, Clone)]
pub struct NotificationRelay {
    sender: mpsc::UnboundedSender<ProgressionEvent>,
}

impl NotificationRelay {
    /// Spawn the delivery worker on the current tokio runtime.
    pub fn spawn(dispatcher: Arc<dyn NotificationDispatcher>) -> (Self, JoinHandle<RelayStats>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<ProgressionEvent>();

        let handle = tokio::spawn(async move {
            let mut stats = RelayStats::default();
            while let Some(event) = receiver.recv().await {
                stats.events += 1;
                let (delivered, failed) = deliver(dispatcher.as_ref(), &event).await;
                stats.delivered += delivered;
                stats.failed += failed;
            }
            tracing::debug!(?stats, "notification relay stopped");
            stats
        });

        (Self { sender }, handle)
    }

    /// Queue an event for delivery. Never fails the caller.
    pub fn publish(&self, event: ProgressionEvent) {
        if let Err(err) = self.sender.send(event) {
            tracing::warn!(
                member_id = %err.0.member_id,
                task_id = %err.0.task_id,
                "notification relay is closed, dropping completion notice"
            );
        }
    }
}

/// Deliver one event: the completion announcement, one role grant per
/// crossed tier, and one tier announcement for the highest tier reached.
///
/// Returns `(delivered, failed)` call counts.
pub async fn deliver(dispatcher: &dyn NotificationDispatcher, event: &ProgressionEvent) -> (usize, usize) {
    let mut delivered = 0;
    let mut failed = 0;

    let completed = TaskCompletedNotice {
        member_id: event.member_id.clone(),
        task_name: event.task_name.clone(),
        xp_earned: event.xp_earned,
        total_xp: event.new_xp,
        comment: event.comment.clone(),
    };
    match dispatcher.task_completed(&completed).await {
        Ok(()) => delivered += 1,
        Err(e) => {
            failed += 1;
            tracing::warn!(member_id = %event.member_id, task_id = %event.task_id, error = %e, "completion announcement failed");
        }
    }

    for tier in &event.crossed_tiers {
        match dispatcher.grant_tier_role(&event.member_id, tier).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!(member_id = %event.member_id, tier = %tier, error = %e, "tier role grant failed");
            }
        }
    }

    if let Some(highest) = event.crossed_tiers.last() {
        let notice = TierCrossedNotice {
            member_id: event.member_id.clone(),
            old_xp: event.old_xp,
            new_xp: event.new_xp,
            tier_crossed: highest.clone(),
        };
        match dispatcher.tier_crossed(&notice).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                failed += 1;
                tracing::warn!(member_id = %event.member_id, tier = %highest, error = %e, "tier announcement failed");
            }
        }
    }

    (delivered, failed)
}

/// Wait for the relay worker to finish draining.
///
/// A worker that panicked or was cancelled is logged and reported as `None`;
/// the completions it was announcing are already committed.
pub async fn drain(handle: JoinHandle<RelayStats>) -> Option<RelayStats> {
    match handle.await {
        Ok(stats) => Some(stats),
        Err(e) => {
            tracing::warn!(error = %e, "notification relay worker stopped abnormally");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::NotifyError;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingDispatcher {
        calls: Mutex<Vec<String>>,
        fail_completed: bool,
    }

    #[async_trait]
    impl NotificationDispatcher for RecordingDispatcher {
        async fn task_completed(&self, notice: &TaskCompletedNotice) -> Result<(), NotifyError> {
            self.calls.lock().await.push(format!("completed:{}", notice.task_name));
            if self.fail_completed {
                return Err(NotifyError::Transport("offline".into()));
            }
            Ok(())
        }

        async fn tier_crossed(&self, notice: &TierCrossedNotice) -> Result<(), NotifyError> {
            self.calls.lock().await.push(format!("tier:{}", notice.tier_crossed));
            Ok(())
        }

        async fn grant_tier_role(&self, _member_id: &str, tier: &str) -> Result<(), NotifyError> {
            self.calls.lock().await.push(format!("role:{tier}"));
            Ok(())
        }
    }

    fn event(crossed: &[&str]) -> ProgressionEvent {
        ProgressionEvent {
            member_id: "m-1".into(),
            task_id: "big".into(),
            task_name: "Big".into(),
            xp_earned: 400,
            old_xp: 100,
            new_xp: 500,
            comment: None,
            crossed_tiers: crossed.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_roles_per_tier_and_announcement_for_highest() {
        let dispatcher = RecordingDispatcher::default();
        let (delivered, failed) = deliver(&dispatcher, &event(&["A", "B"])).await;

        assert_eq!((delivered, failed), (4, 0));
        assert_eq!(
            *dispatcher.calls.lock().await,
            vec!["completed:Big", "role:A", "role:B", "tier:B"]
        );
    }

    #[tokio::test]
    async fn test_no_tier_calls_without_crossing() {
        let dispatcher = RecordingDispatcher::default();
        deliver(&dispatcher, &event(&[])).await;
        assert_eq!(*dispatcher.calls.lock().await, vec!["completed:Big"]);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_remaining_calls() {
        let dispatcher = RecordingDispatcher { fail_completed: true, ..Default::default() };
        let (delivered, failed) = deliver(&dispatcher, &event(&["A"])).await;

        assert_eq!((delivered, failed), (2, 1));
        assert_eq!(dispatcher.calls.lock().await.len(), 3);
    }

    #[tokio::test]
    async fn test_worker_drains_queue_on_shutdown() {
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let (relay, handle) = NotificationRelay::spawn(dispatcher.clone());

        relay.publish(event(&[]));
        relay.publish(event(&["A"]));
        drop(relay);

        let stats = handle.await.unwrap();
        assert_eq!(stats, RelayStats { events: 2, delivered: 4, failed: 0 });
    }

    struct PanickingDispatcher;

    #[async_trait]
    impl NotificationDispatcher for PanickingDispatcher {
        async fn task_completed(&self, _notice: &TaskCompletedNotice) -> Result<(), NotifyError> {
            panic!("dispatcher blew up");
        }

        async fn tier_crossed(&self, _notice: &TierCrossedNotice) -> Result<(), NotifyError> {
            Ok(())
        }

        async fn grant_tier_role(&self, _member_id: &str, _tier: &str) -> Result<(), NotifyError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_drain_reports_stats() {
        let (relay, handle) = NotificationRelay::spawn(Arc::new(RecordingDispatcher::default()));
        relay.publish(event(&[]));
        drop(relay);

        let stats = drain(handle).await;
        assert_eq!(stats, Some(RelayStats { events: 1, delivered: 1, failed: 0 }));
    }

    #[tokio::test]
    async fn test_drain_absorbs_worker_panic() {
        let (relay, handle) = NotificationRelay::spawn(Arc::new(PanickingDispatcher));
        relay.publish(event(&["A"]));
        drop(relay);

        assert_eq!(drain(handle).await, None);
    }
}
