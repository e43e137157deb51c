#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Content rewriter against the SeaORM repository.

mod support;

use std::sync::Arc;

use handle_rename::config::HandleRenameConfig;
use handle_rename::domain::content_rewriter::ContentReferenceRewriter;
use handle_rename::domain::handle::HandleRules;
use handle_rename::infra::storage::OrmContentRepository;
use sea_orm::TransactionTrait;
use support::{comment_body, publication_row, seed_comment, seed_publication, seed_user};

fn rewriter() -> ContentReferenceRewriter<OrmContentRepository> {
    let cfg = HandleRenameConfig::default();
    ContentReferenceRewriter::new(
        Arc::new(OrmContentRepository::new()),
        HandleRules::from_config(&cfg),
        cfg.content_path_prefix,
        cfg.case_sensitive,
    )
}

#[tokio::test]
async fn second_pass_changes_nothing() {
    // Arrange
    let db = support::inmem_db().await;
    let alice = seed_user(&db, "alice").await;
    let comment = seed_comment(&db, alice, "Hello @alice, visit /pagina/alice!").await;
    let publication = seed_publication(&db, alice, "alice weekly", "by @alice").await;
    let rewriter = rewriter();

    // Act
    let txn = db.begin().await.unwrap();
    let first = rewriter
        .rewrite(&txn, "alice", "alice_2024", false)
        .await
        .unwrap();
    txn.commit().await.unwrap();

    let txn = db.begin().await.unwrap();
    let second = rewriter
        .rewrite(&txn, "alice", "alice_2024", false)
        .await
        .unwrap();
    txn.commit().await.unwrap();

    // Assert
    assert_eq!(first.total.updated, 2);
    assert!(first.errors.is_empty());
    assert_eq!(second.total.updated, 0);
    assert!(second.errors.is_empty());
    assert_eq!(
        comment_body(&db, comment).await,
        "Hello @alice_2024, visit /pagina/alice_2024!"
    );
    let row = publication_row(&db, publication).await;
    assert_eq!(row.title, "alice_2024 weekly");
    assert_eq!(row.content, "by @alice_2024");
}
