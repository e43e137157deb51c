#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Test support utilities for `handle-rename` integration tests.
//!
//! Provides an in-memory database, seeding helpers, a controllable clock and
//! failure-injecting repositories.

#![allow(dead_code)] // Support module provides utilities that may not all be used

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use handle_rename::config::HandleRenameConfig;
use handle_rename::domain::error::DomainError;
use handle_rename::domain::ports::{CacheStore, Clock};
use handle_rename::domain::repos::{
    ContentRecord, ContentRepository, FieldUpdate, RedirectsRepository, UsersRepository,
};
use handle_rename::domain::service::Service;
use handle_rename::infra::cache::InMemoryCache;
use handle_rename::infra::storage::entity::{comment, private_message, publication, redirect, user};
use handle_rename::infra::storage::migrations::Migrator;
use handle_rename::infra::storage::{
    OrmContentRepository, OrmRedirectsRepository, OrmUsersRepository,
};
use handle_rename_sdk::{ContentKind, RedirectRule, UserIdentity};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, EntityTrait, QueryOrder, Set,
    TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use time::OffsetDateTime;
use time::macros::datetime;
use uuid::Uuid;

pub type OrmService = Service<OrmUsersRepository, OrmContentRepository, OrmRedirectsRepository>;

pub const T0: OffsetDateTime = datetime!(2026-03-01 09:00 UTC);

/// Create a fresh in-memory `SQLite` database with migrations applied.
pub async fn inmem_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Clock that only moves when told to.
pub struct ManualClock(Mutex<OffsetDateTime>);

impl ManualClock {
    pub fn new(at: OffsetDateTime) -> Arc<Self> {
        Arc::new(Self(Mutex::new(at)))
    }

    pub fn set(&self, at: OffsetDateTime) {
        *self.0.lock().unwrap() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.0.lock().unwrap()
    }
}

pub struct Harness {
    pub db: DatabaseConnection,
    pub cache: Arc<InMemoryCache>,
    pub clock: Arc<ManualClock>,
    pub service: OrmService,
}

pub async fn harness() -> Harness {
    harness_with(HandleRenameConfig::default()).await
}

pub async fn harness_with(cfg: HandleRenameConfig) -> Harness {
    let db = inmem_db().await;
    let cache = Arc::new(InMemoryCache::new());
    let clock = ManualClock::new(T0);
    let service = Service::new(
        db.clone(),
        OrmUsersRepository::new(),
        OrmContentRepository::new(),
        OrmRedirectsRepository::new(),
        cache.clone(),
        clock.clone(),
        &cfg,
    );
    Harness {
        db,
        cache,
        clock,
        service,
    }
}

/// Build a service over `db` with custom users repository and cache.
pub fn service_with<UR: UsersRepository>(
    db: &DatabaseConnection,
    users: UR,
    cache: Arc<dyn CacheStore>,
) -> Service<UR, OrmContentRepository, OrmRedirectsRepository> {
    service_from(
        db,
        users,
        OrmContentRepository::new(),
        OrmRedirectsRepository::new(),
        cache,
    )
}

/// Build a service over `db` with every repository supplied by the caller.
pub fn service_from<UR, CR, RR>(
    db: &DatabaseConnection,
    users: UR,
    content: CR,
    redirects: RR,
    cache: Arc<dyn CacheStore>,
) -> Service<UR, CR, RR>
where
    UR: UsersRepository,
    CR: ContentRepository,
    RR: RedirectsRepository,
{
    Service::new(
        db.clone(),
        users,
        content,
        redirects,
        cache,
        ManualClock::new(T0),
        &HandleRenameConfig::default(),
    )
}

/// Make the next `COMMIT` touching a user's handle fail on a deferred foreign key.
pub async fn fail_commit_on_handle_change(db: &DatabaseConnection) {
    db.execute_unprepared(
        "CREATE TABLE handle_owners (handle TEXT PRIMARY KEY);
         CREATE TABLE handle_audit (
             handle TEXT REFERENCES handle_owners(handle) DEFERRABLE INITIALLY DEFERRED
         );
         CREATE TRIGGER audit_handle_change AFTER UPDATE OF handle ON users
         BEGIN
             INSERT INTO handle_audit (handle) VALUES (NEW.handle);
         END;",
    )
    .await
    .expect("install commit-failing trigger");
}

/// Make every UPDATE of a comment whose body contains `marker` fail.
pub async fn reject_comment_updates_containing(db: &DatabaseConnection, marker: &str) {
    db.execute_unprepared(&format!(
        "CREATE TRIGGER reject_comment_update BEFORE UPDATE OF body ON comments
         WHEN instr(OLD.body, '{marker}') > 0
         BEGIN
             SELECT RAISE(ABORT, 'comment is locked');
         END;"
    ))
    .await
    .expect("install row-rejecting trigger");
}

pub async fn seed_user(db: &DatabaseConnection, handle: &str) -> Uuid {
    let id = Uuid::new_v4();
    user::ActiveModel {
        id: Set(id),
        handle: Set(handle.to_owned()),
        display_name: Set(format!("{handle} display")),
        avatar_url: Set(None),
        created_at: Set(T0),
        updated_at: Set(T0),
    }
    .insert(db)
    .await
    .expect("seed user");
    id
}

pub async fn seed_comment(db: &DatabaseConnection, author: Uuid, body: &str) -> Uuid {
    let id = Uuid::new_v4();
    comment::ActiveModel {
        id: Set(id),
        author_id: Set(author),
        body: Set(body.to_owned()),
        created_at: Set(T0),
    }
    .insert(db)
    .await
    .expect("seed comment");
    id
}

pub async fn seed_message(
    db: &DatabaseConnection,
    sender: Uuid,
    recipient: Uuid,
    body: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    private_message::ActiveModel {
        id: Set(id),
        sender_id: Set(sender),
        recipient_id: Set(recipient),
        body: Set(body.to_owned()),
        created_at: Set(T0),
    }
    .insert(db)
    .await
    .expect("seed message");
    id
}

pub async fn seed_publication(
    db: &DatabaseConnection,
    author: Uuid,
    title: &str,
    content: &str,
) -> Uuid {
    let id = Uuid::new_v4();
    publication::ActiveModel {
        id: Set(id),
        author_id: Set(author),
        title: Set(title.to_owned()),
        content: Set(content.to_owned()),
        created_at: Set(T0),
    }
    .insert(db)
    .await
    .expect("seed publication");
    id
}

pub async fn comment_body(db: &DatabaseConnection, id: Uuid) -> String {
    comment::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .expect("comment exists")
        .body
}

pub async fn message_body(db: &DatabaseConnection, id: Uuid) -> String {
    private_message::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .expect("message exists")
        .body
}

pub async fn publication_row(db: &DatabaseConnection, id: Uuid) -> publication::Model {
    publication::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .expect("publication exists")
}

pub async fn handle_of(db: &DatabaseConnection, id: Uuid) -> String {
    user::Entity::find_by_id(id)
        .one(db)
        .await
        .unwrap()
        .expect("user exists")
        .handle
}

pub async fn redirect_count(db: &DatabaseConnection) -> usize {
    redirect::Entity::find().all(db).await.unwrap().len()
}

/// Every row of every table, in a stable order.
#[derive(Debug, PartialEq, Eq)]
pub struct Snapshot {
    users: Vec<user::Model>,
    comments: Vec<comment::Model>,
    messages: Vec<private_message::Model>,
    publications: Vec<publication::Model>,
    redirects: Vec<redirect::Model>,
}

pub async fn snapshot(db: &DatabaseConnection) -> Snapshot {
    Snapshot {
        users: user::Entity::find()
            .order_by_asc(user::Column::Id)
            .all(db)
            .await
            .unwrap(),
        comments: comment::Entity::find()
            .order_by_asc(comment::Column::Id)
            .all(db)
            .await
            .unwrap(),
        messages: private_message::Entity::find()
            .order_by_asc(private_message::Column::Id)
            .all(db)
            .await
            .unwrap(),
        publications: publication::Entity::find()
            .order_by_asc(publication::Column::Id)
            .all(db)
            .await
            .unwrap(),
        redirects: redirect::Entity::find()
            .order_by_asc(redirect::Column::Id)
            .all(db)
            .await
            .unwrap(),
    }
}

/// Users repository whose handle update always fails.
pub struct FailingIdentityUpdate(pub OrmUsersRepository);

#[async_trait]
impl UsersRepository for FailingIdentityUpdate {
    async fn find_by_id<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<UserIdentity>, DomainError> {
        self.0.find_by_id(conn, id).await
    }

    async fn find_by_handle<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        handle: &str,
    ) -> Result<Option<UserIdentity>, DomainError> {
        self.0.find_by_handle(conn, handle).await
    }

    async fn handle_taken_by_other<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        handle: &str,
        except: Uuid,
    ) -> Result<bool, DomainError> {
        self.0.handle_taken_by_other(conn, handle, except).await
    }

    async fn update_handle<C: ConnectionTrait + Send + Sync>(
        &self,
        _conn: &C,
        _id: Uuid,
        _new_handle: &str,
        _at: OffsetDateTime,
    ) -> Result<(), DomainError> {
        Err(DomainError::database("forced identity update failure"))
    }
}

/// Users repository that loses the race: the handle is free at validation time but
/// taken once the transaction re-checks it.
pub struct RacingUsers {
    pub inner: OrmUsersRepository,
    pub checks: Mutex<u32>,
}

#[async_trait]
impl UsersRepository for RacingUsers {
    async fn find_by_id<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<UserIdentity>, DomainError> {
        self.inner.find_by_id(conn, id).await
    }

    async fn find_by_handle<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        handle: &str,
    ) -> Result<Option<UserIdentity>, DomainError> {
        self.inner.find_by_handle(conn, handle).await
    }

    async fn handle_taken_by_other<C: ConnectionTrait + Send + Sync>(
        &self,
        _conn: &C,
        _handle: &str,
        _except: Uuid,
    ) -> Result<bool, DomainError> {
        let mut checks = self.checks.lock().unwrap();
        *checks += 1;
        Ok(*checks > 1)
    }

    async fn update_handle<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
        new_handle: &str,
        at: OffsetDateTime,
    ) -> Result<(), DomainError> {
        self.inner.update_handle(conn, id, new_handle, at).await
    }
}

/// Content repository whose prefilter fails for one content kind, after the kinds
/// scanned before it have already been rewritten.
pub struct ScanFailsOn {
    pub inner: OrmContentRepository,
    pub kind: ContentKind,
}

#[async_trait]
impl ContentRepository for ScanFailsOn {
    async fn find_candidates<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        kind: ContentKind,
        needles: &[String],
    ) -> Result<Vec<ContentRecord>, DomainError> {
        if kind == self.kind {
            return Err(DomainError::database(format!("{kind} table is unavailable")));
        }
        self.inner.find_candidates(conn, kind, needles).await
    }

    async fn count_candidates<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        kind: ContentKind,
        needles: &[String],
    ) -> Result<u64, DomainError> {
        self.inner.count_candidates(conn, kind, needles).await
    }

    async fn update_fields<C: ConnectionTrait + TransactionTrait + Send + Sync>(
        &self,
        conn: &C,
        kind: ContentKind,
        id: Uuid,
        updates: &[FieldUpdate],
    ) -> Result<(), DomainError> {
        self.inner.update_fields(conn, kind, id, updates).await
    }
}

/// Redirects repository that refuses every write.
pub struct RejectingRedirects(pub OrmRedirectsRepository);

#[async_trait]
impl RedirectsRepository for RejectingRedirects {
    async fn upsert<C: ConnectionTrait + Send + Sync>(
        &self,
        _conn: &C,
        rule: &RedirectRule,
    ) -> Result<(), DomainError> {
        Err(DomainError::database(format!(
            "redirect table is read-only ({})",
            rule.old_path
        )))
    }

    async fn find_active<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        old_path: &str,
        now: OffsetDateTime,
    ) -> Result<Option<RedirectRule>, DomainError> {
        self.0.find_active(conn, old_path, now).await
    }

    async fn repoint_targets<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        from: &str,
        to: &str,
    ) -> Result<u64, DomainError> {
        self.0.repoint_targets(conn, from, to).await
    }

    async fn delete_by_old_path<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        old_path: &str,
    ) -> Result<u64, DomainError> {
        self.0.delete_by_old_path(conn, old_path).await
    }

    async fn delete_expired<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        now: OffsetDateTime,
    ) -> Result<u64, DomainError> {
        self.0.delete_expired(conn, now).await
    }

    async fn count_targeting<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        new_path: &str,
        now: OffsetDateTime,
    ) -> Result<u64, DomainError> {
        self.0.count_targeting(conn, new_path, now).await
    }
}
