//! End-to-end progression scenarios against a file-backed database.

mod common;

use std::sync::Arc;
use std::time::Duration;

use civic_quest::adapters::notifiers::WebhookDispatcher;
use civic_quest::adapters::sqlite::{SqliteCompletionLedger, SqliteMemberStore};
use civic_quest::domain::errors::DomainError;
use civic_quest::domain::models::{CompletionRequest, GrantRequest, Task};
use civic_quest::domain::ports::{CompletionLedger, MemberStore};
use civic_quest::services::{NotificationRelay, ReconciliationService, RelayStats};
use common::{request, service, service_with_tasks, setup_file_db};
use mockito::Matcher;

#[tokio::test]
async fn test_repeatable_task_accumulates() {
    let db = setup_file_db().await;
    let service = service(&db.pool);

    for _ in 0..5 {
        service.complete_task(request("m-1", "meetup")).await.unwrap();
    }

    let progress = service.get_member("m-1").await.unwrap().unwrap();
    assert_eq!(progress.total_xp(), 150);
    assert_eq!(progress.completion_counts.get("meetup"), Some(&5));
    assert_eq!(progress.tier, "Engagierter Bürger");
}

#[tokio::test]
async fn test_ledger_sum_matches_stored_total() {
    let db = setup_file_db().await;
    let service = service(&db.pool);

    for task_id in ["intro", "profile", "meetup", "meetup", "big"] {
        service.complete_task(request("m-1", task_id)).await.unwrap();
    }
    service.complete_task(request("m-2", "meetup")).await.unwrap();

    let ledger = SqliteCompletionLedger::new(db.pool.clone());
    let members = SqliteMemberStore::new(db.pool.clone());
    for member_id in ["m-1", "m-2"] {
        let stored = members.get(member_id).await.unwrap().unwrap().total_xp;
        assert_eq!(ledger.sum_xp(member_id).await.unwrap(), stored);
    }

    let reconciliation = ReconciliationService::new(Arc::new(ledger), Arc::new(members));
    let reports = reconciliation.reconcile_all(false).await.unwrap();
    assert!(reports.iter().all(|r| r.is_consistent()));
}

#[tokio::test]
async fn test_resubmission_keeps_xp_unchanged() {
    let db = setup_file_db().await;
    let service = service(&db.pool);

    service.complete_task(request("m-1", "intro")).await.unwrap();
    let again = service.complete_task(request("m-1", "intro")).await;

    assert!(matches!(again, Err(DomainError::AlreadyCompleted { .. })));
    let progress = service.get_member("m-1").await.unwrap().unwrap();
    assert_eq!(progress.total_xp(), 20);
    assert_eq!(progress.completion_counts.get("intro"), Some(&1));
}

#[tokio::test]
async fn test_catalog_change_keeps_recorded_xp() {
    let db = setup_file_db().await;
    let before = service(&db.pool);
    before.complete_task(request("m-1", "intro")).await.unwrap();

    // Same database, but the catalog now values "intro" at 99 XP.
    let after = service_with_tasks(&db.pool, vec![Task::new("intro", "Stell dich vor", 99)]);
    let again = after.complete_task(request("m-1", "intro")).await;
    assert!(matches!(again, Err(DomainError::AlreadyCompleted { .. })));

    let ledger = SqliteCompletionLedger::new(db.pool.clone());
    let events = ledger.list_completions("m-1").await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].xp_earned, 20);
    assert_eq!(ledger.sum_xp("m-1").await.unwrap(), 20);

    let progress = after.get_member("m-1").await.unwrap().unwrap();
    assert_eq!(progress.total_xp(), 20);
}

#[tokio::test]
async fn test_nameless_completion_keeps_profile_name() {
    let db = setup_file_db().await;
    let service = service(&db.pool);
    service.sync_profile("m-1", "Mia").await.unwrap();

    let mut nameless = request("m-1", "intro");
    nameless.display_name = String::new();
    service.complete_task(nameless).await.unwrap();

    let progress = service.get_member("m-1").await.unwrap().unwrap();
    assert_eq!(progress.member.display_name, "Mia");
}

#[tokio::test]
async fn test_crossing_reported_from_140_to_160() {
    let db = setup_file_db().await;
    let tasks = vec![Task::new("warmup", "Warm-up", 140), Task::new("intro", "Stell dich vor", 20)];
    let service = service_with_tasks(&db.pool, tasks);

    let first = service.complete_task(request("m-1", "warmup")).await.unwrap();
    assert!(first.crossed_tiers.is_empty());

    let second = service.complete_task(request("m-1", "intro")).await.unwrap();
    assert_eq!((second.old_xp, second.new_xp), (140, 160));
    assert_eq!(second.crossed_tiers, vec!["Engagierter Bürger".to_string()]);
}

#[tokio::test]
async fn test_restricted_task_needs_moderator_grant() {
    let db = setup_file_db().await;
    let service = service(&db.pool);

    let denied = service.complete_task(request("m-1", "recognition")).await;
    assert!(matches!(denied, Err(DomainError::ForbiddenTask(_))));
    assert!(service.get_member("m-1").await.unwrap().is_none());

    let granted = service
        .grant_task(GrantRequest {
            member_id: "m-1".into(),
            display_name: "Mia".into(),
            task_id: "recognition".into(),
            granted_by: "mod-7".into(),
            comment: None,
        })
        .await
        .unwrap();
    assert_eq!(granted.event.granted_by.as_deref(), Some("mod-7"));
    assert_eq!(granted.new_xp, 100);
}

#[tokio::test]
async fn test_comment_gate_rejects_short_comment_without_writing() {
    let db = setup_file_db().await;
    let service = service(&db.pool);

    let short = CompletionRequest {
        comment: Some("a".repeat(99)),
        ..request("m-1", "feedback")
    };
    let err = service.complete_task(short).await.unwrap_err();
    assert!(matches!(err, DomainError::CommentRequired { remaining: 1, .. }));
    assert!(service.get_member("m-1").await.unwrap().is_none());

    let long_enough = CompletionRequest {
        comment: Some("a".repeat(100)),
        ..request("m-1", "feedback")
    };
    let outcome = service.complete_task(long_enough).await.unwrap();
    assert_eq!(outcome.new_xp, 50);
}

#[tokio::test]
async fn test_webhook_receives_completion_and_tier_notices() {
    let mut server = mockito::Server::new_async().await;
    let completed = server
        .mock("POST", "/hook")
        .match_body(Matcher::PartialJson(serde_json::json!({ "event": "task_completed" })))
        .with_status(204)
        .expect(2)
        .create_async()
        .await;
    let role = server
        .mock("POST", "/hook")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "event": "role_granted",
            "data": { "memberId": "m-1", "role": "Engagierter Bürger" }
        })))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let tier = server
        .mock("POST", "/hook")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "event": "tier_crossed",
            "data": { "memberId": "m-1", "oldXp": 140, "newXp": 160, "tierCrossed": "Engagierter Bürger" }
        })))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let dispatcher = WebhookDispatcher::new(
        format!("{}/hook", server.url()),
        "announcements".into(),
        Duration::from_secs(2),
    )
    .unwrap();
    let (relay, handle) = NotificationRelay::spawn(Arc::new(dispatcher));

    let db = setup_file_db().await;
    let tasks = vec![Task::new("warmup", "Warm-up", 140), Task::new("intro", "Stell dich vor", 20)];
    let service = service_with_tasks(&db.pool, tasks).with_relay(relay);

    service.complete_task(request("m-1", "warmup")).await.unwrap();
    service.complete_task(request("m-1", "intro")).await.unwrap();
    drop(service);

    let stats = handle.await.unwrap();
    assert_eq!(stats, RelayStats { events: 2, delivered: 4, failed: 0 });
    completed.assert_async().await;
    role.assert_async().await;
    tier.assert_async().await;
}

#[tokio::test]
async fn test_webhook_outage_does_not_fail_completion() {
    let mut server = mockito::Server::new_async().await;
    let _down = server.mock("POST", "/hook").with_status(503).create_async().await;

    let dispatcher = WebhookDispatcher::new(
        format!("{}/hook", server.url()),
        "announcements".into(),
        Duration::from_secs(2),
    )
    .unwrap();
    let (relay, handle) = NotificationRelay::spawn(Arc::new(dispatcher));

    let db = setup_file_db().await;
    let service = service(&db.pool).with_relay(relay);
    let outcome = service.complete_task(request("m-1", "big")).await.unwrap();
    assert_eq!(outcome.crossed_tiers.len(), 2);
    drop(service);

    let stats = handle.await.unwrap();
    // One announcement, two role grants, one tier announcement
    assert_eq!(stats, RelayStats { events: 1, delivered: 0, failed: 4 });
    assert_eq!(
        SqliteMemberStore::new(db.pool.clone()).get("m-1").await.unwrap().unwrap().total_xp,
        400
    );
}
