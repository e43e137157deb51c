use async_trait::async_trait;
use handle_rename_sdk::UserIdentity;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, SqlErr};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::UsersRepository;
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::user::{Column, Entity as UserEntity};

/// ORM-based implementation of the `UsersRepository` trait.
#[derive(Clone, Default)]
pub struct OrmUsersRepository;

impl OrmUsersRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn handle_eq_ignore_case(handle: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(Column::Handle))).eq(handle.to_lowercase())
}

#[async_trait]
impl UsersRepository for OrmUsersRepository {
    async fn find_by_id<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> Result<Option<UserIdentity>, DomainError> {
        let found = UserEntity::find_by_id(id).one(conn).await.map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn find_by_handle<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        handle: &str,
    ) -> Result<Option<UserIdentity>, DomainError> {
        let found = UserEntity::find()
            .filter(handle_eq_ignore_case(handle))
            .one(conn)
            .await
            .map_err(db_err)?;
        Ok(found.map(Into::into))
    }

    async fn handle_taken_by_other<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        handle: &str,
        except: Uuid,
    ) -> Result<bool, DomainError> {
        let count = UserEntity::find()
            .filter(handle_eq_ignore_case(handle))
            .filter(Column::Id.ne(except))
            .count(conn)
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }

    async fn update_handle<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        id: Uuid,
        new_handle: &str,
        at: OffsetDateTime,
    ) -> Result<(), DomainError> {
        let res = UserEntity::update_many()
            .col_expr(Column::Handle, Expr::value(new_handle))
            .col_expr(Column::UpdatedAt, Expr::value(at))
            .filter(Column::Id.eq(id))
            .exec(conn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => DomainError::handle_taken(new_handle),
                _ => db_err(e),
            })?;

        if res.rows_affected == 0 {
            return Err(DomainError::user_not_found(id));
        }
        Ok(())
    }
}
