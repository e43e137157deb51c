#![allow(clippy::unwrap_used, clippy::expect_used)]

//! `OrmRedirectsRepository` against `SQLite`.

mod support;

use handle_rename::domain::repos::RedirectsRepository;
use handle_rename::infra::storage::OrmRedirectsRepository;
use handle_rename_sdk::{RedirectKind, RedirectRule};
use support::{T0, inmem_db, redirect_count};
use time::Duration;
use uuid::Uuid;

fn rule(old_path: &str, new_path: &str, kind: RedirectKind) -> RedirectRule {
    RedirectRule {
        id: Uuid::now_v7(),
        old_path: old_path.to_owned(),
        new_path: new_path.to_owned(),
        kind,
        created_at: T0,
        expires_at: T0 + Duration::days(365),
    }
}

#[tokio::test]
async fn upsert_overwrites_rule_with_same_old_path() {
    let db = inmem_db().await;
    let repo = OrmRedirectsRepository::new();

    repo.upsert(&db, &rule("/alice", "/alice2", RedirectKind::Temporary))
        .await
        .unwrap();
    repo.upsert(&db, &rule("/alice", "/alice3", RedirectKind::Permanent))
        .await
        .unwrap();

    assert_eq!(redirect_count(&db).await, 1);
    let found = repo.find_active(&db, "/alice", T0).await.unwrap().unwrap();
    assert_eq!(found.new_path, "/alice3");
    assert_eq!(found.kind, RedirectKind::Permanent);
}

#[tokio::test]
async fn expiry_bounds_lookups_counts_and_cleanup() {
    let db = inmem_db().await;
    let repo = OrmRedirectsRepository::new();
    repo.upsert(&db, &rule("/a", "/c", RedirectKind::Permanent))
        .await
        .unwrap();
    repo.upsert(&db, &rule("/b", "/c", RedirectKind::Permanent))
        .await
        .unwrap();

    assert_eq!(repo.count_targeting(&db, "/c", T0).await.unwrap(), 2);

    let later = T0 + Duration::days(400);
    assert!(repo.find_active(&db, "/a", later).await.unwrap().is_none());
    assert_eq!(repo.count_targeting(&db, "/c", later).await.unwrap(), 0);
    assert_eq!(repo.delete_expired(&db, T0).await.unwrap(), 0);
    assert_eq!(repo.delete_expired(&db, later).await.unwrap(), 2);
}

#[tokio::test]
async fn repoint_and_delete_by_old_path() {
    let db = inmem_db().await;
    let repo = OrmRedirectsRepository::new();
    repo.upsert(&db, &rule("/a", "/b", RedirectKind::Permanent))
        .await
        .unwrap();
    repo.upsert(&db, &rule("/x", "/b", RedirectKind::Permanent))
        .await
        .unwrap();

    assert_eq!(repo.repoint_targets(&db, "/b", "/c").await.unwrap(), 2);
    assert_eq!(
        repo.find_active(&db, "/x", T0).await.unwrap().unwrap().new_path,
        "/c"
    );
    assert_eq!(repo.delete_by_old_path(&db, "/a").await.unwrap(), 1);
    assert_eq!(repo.delete_by_old_path(&db, "/a").await.unwrap(), 0);
    assert_eq!(redirect_count(&db).await, 1);
}
