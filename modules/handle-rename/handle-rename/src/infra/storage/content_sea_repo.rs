use async_trait::async_trait;
use handle_rename_sdk::ContentKind;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::{ContentField, ContentRecord, ContentRepository, FieldUpdate};
use crate::infra::storage::db::db_err;
use crate::infra::storage::entity::{comment, private_message, publication};

/// ORM-based implementation of the `ContentRepository` trait.
///
/// The prefilter lower-cases both sides of `LIKE` so it behaves the same on every backend.
/// `_` in a handle acts as a `LIKE` wildcard, which only widens the candidate set.
#[derive(Clone, Default)]
pub struct OrmContentRepository;

impl OrmContentRepository {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn contains_any<Col: ColumnTrait>(columns: &[Col], needles: &[String]) -> Condition {
    let mut cond = Condition::any();
    for col in columns {
        for needle in needles {
            let expr: SimpleExpr = Expr::expr(Func::lower(Expr::col(*col)))
                .like(format!("%{}%", needle.to_lowercase()));
            cond = cond.add(expr);
        }
    }
    cond
}

fn publication_column(field: ContentField) -> Result<publication::Column, DomainError> {
    match field {
        ContentField::Title => Ok(publication::Column::Title),
        ContentField::Content => Ok(publication::Column::Content),
        ContentField::Body => Err(DomainError::validation(
            "field",
            "publications have no body column",
        )),
    }
}

fn body_only(kind: ContentKind, field: ContentField) -> Result<(), DomainError> {
    if field == ContentField::Body {
        Ok(())
    } else {
        Err(DomainError::validation(
            "field",
            format!("{kind} has no {} column", field.as_str()),
        ))
    }
}

#[async_trait]
impl ContentRepository for OrmContentRepository {
    async fn find_candidates<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        kind: ContentKind,
        needles: &[String],
    ) -> Result<Vec<ContentRecord>, DomainError> {
        if needles.is_empty() {
            return Ok(Vec::new());
        }
        let records = match kind {
            ContentKind::Comment => comment::Entity::find()
                .filter(contains_any(&[comment::Column::Body], needles))
                .order_by_asc(comment::Column::CreatedAt)
                .all(conn)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|m| ContentRecord {
                    kind,
                    id: m.id,
                    fields: vec![(ContentField::Body, m.body)],
                })
                .collect(),
            ContentKind::PrivateMessage => private_message::Entity::find()
                .filter(contains_any(&[private_message::Column::Body], needles))
                .order_by_asc(private_message::Column::CreatedAt)
                .all(conn)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|m| ContentRecord {
                    kind,
                    id: m.id,
                    fields: vec![(ContentField::Body, m.body)],
                })
                .collect(),
            ContentKind::Publication => publication::Entity::find()
                .filter(contains_any(
                    &[publication::Column::Title, publication::Column::Content],
                    needles,
                ))
                .order_by_asc(publication::Column::CreatedAt)
                .all(conn)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(|m| ContentRecord {
                    kind,
                    id: m.id,
                    fields: vec![
                        (ContentField::Title, m.title),
                        (ContentField::Content, m.content),
                    ],
                })
                .collect(),
        };
        Ok(records)
    }

    async fn count_candidates<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        kind: ContentKind,
        needles: &[String],
    ) -> Result<u64, DomainError> {
        if needles.is_empty() {
            return Ok(0);
        }
        let count = match kind {
            ContentKind::Comment => {
                comment::Entity::find()
                    .filter(contains_any(&[comment::Column::Body], needles))
                    .count(conn)
                    .await
            }
            ContentKind::PrivateMessage => {
                private_message::Entity::find()
                    .filter(contains_any(&[private_message::Column::Body], needles))
                    .count(conn)
                    .await
            }
            ContentKind::Publication => {
                publication::Entity::find()
                    .filter(contains_any(
                        &[publication::Column::Title, publication::Column::Content],
                        needles,
                    ))
                    .count(conn)
                    .await
            }
        };
        count.map_err(db_err)
    }

    async fn update_fields<C: ConnectionTrait + TransactionTrait + Send + Sync>(
        &self,
        conn: &C,
        kind: ContentKind,
        id: Uuid,
        updates: &[FieldUpdate],
    ) -> Result<(), DomainError> {
        if updates.is_empty() {
            return Ok(());
        }

        // nested begin is a SAVEPOINT inside the rename transaction
        let savepoint = conn.begin().await.map_err(db_err)?;
        match exec_update(&savepoint, kind, id, updates).await {
            Ok(rows) if rows > 0 => savepoint.commit().await.map_err(db_err),
            Ok(_) => {
                savepoint.rollback().await.map_err(db_err)?;
                Err(DomainError::database(format!("{kind} {id} no longer exists")))
            }
            Err(e) => {
                savepoint.rollback().await.map_err(db_err)?;
                Err(e)
            }
        }
    }
}

async fn exec_update<C: ConnectionTrait>(
    conn: &C,
    kind: ContentKind,
    id: Uuid,
    updates: &[FieldUpdate],
) -> Result<u64, DomainError> {
    let res = match kind {
        ContentKind::Comment => {
            let mut q = comment::Entity::update_many().filter(comment::Column::Id.eq(id));
            for u in updates {
                body_only(kind, u.field)?;
                q = q.col_expr(comment::Column::Body, Expr::value(u.value.clone()));
            }
            q.exec(conn).await
        }
        ContentKind::PrivateMessage => {
            let mut q =
                private_message::Entity::update_many().filter(private_message::Column::Id.eq(id));
            for u in updates {
                body_only(kind, u.field)?;
                q = q.col_expr(private_message::Column::Body, Expr::value(u.value.clone()));
            }
            q.exec(conn).await
        }
        ContentKind::Publication => {
            let mut q = publication::Entity::update_many().filter(publication::Column::Id.eq(id));
            for u in updates {
                q = q.col_expr(publication_column(u.field)?, Expr::value(u.value.clone()));
            }
            q.exec(conn).await
        }
    }
    .map_err(db_err)?;
    Ok(res.rows_affected)
}
