use async_trait::async_trait;
use handle_rename_sdk::RedirectRule;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use time::OffsetDateTime;

use crate::domain::error::DomainError;
use crate::domain::repos::RedirectsRepository;
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::redirect::{ActiveModel as RedirectAM, Column, Entity as RedirectEntity};

/// ORM-based implementation of the `RedirectsRepository` trait.
#[derive(Clone, Default)]
pub struct OrmRedirectsRepository;

impl OrmRedirectsRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RedirectsRepository for OrmRedirectsRepository {
    async fn upsert<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        rule: &RedirectRule,
    ) -> Result<(), DomainError> {
        let m = RedirectAM {
            id: Set(rule.id),
            old_path: Set(rule.old_path.clone()),
            new_path: Set(rule.new_path.clone()),
            status_code: Set(i32::from(rule.kind.status_code())),
            created_at: Set(rule.created_at),
            expires_at: Set(rule.expires_at),
        };

        RedirectEntity::insert(m)
            .on_conflict(
                OnConflict::column(Column::OldPath)
                    .update_columns([
                        Column::NewPath,
                        Column::StatusCode,
                        Column::CreatedAt,
                        Column::ExpiresAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn find_active<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        old_path: &str,
        now: OffsetDateTime,
    ) -> Result<Option<RedirectRule>, DomainError> {
        let found = RedirectEntity::find()
            .filter(Column::OldPath.eq(old_path))
            .filter(Column::ExpiresAt.gt(now))
            .one(conn)
            .await
            .map_err(db_err)?;
        found.map(TryInto::try_into).transpose()
    }

    async fn repoint_targets<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        from: &str,
        to: &str,
    ) -> Result<u64, DomainError> {
        let res = RedirectEntity::update_many()
            .col_expr(Column::NewPath, Expr::value(to))
            .filter(Column::NewPath.eq(from))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected)
    }

    async fn delete_by_old_path<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        old_path: &str,
    ) -> Result<u64, DomainError> {
        let res = RedirectEntity::delete_many()
            .filter(Column::OldPath.eq(old_path))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected)
    }

    async fn delete_expired<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        now: OffsetDateTime,
    ) -> Result<u64, DomainError> {
        let res = RedirectEntity::delete_many()
            .filter(Column::ExpiresAt.lte(now))
            .exec(conn)
            .await
            .map_err(db_err)?;
        Ok(res.rows_affected)
    }

    async fn count_targeting<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        new_path: &str,
        now: OffsetDateTime,
    ) -> Result<u64, DomainError> {
        RedirectEntity::find()
            .filter(Column::NewPath.eq(new_path))
            .filter(Column::ExpiresAt.gt(now))
            .count(conn)
            .await
            .map_err(db_err)
    }
}
