//! Reputation ledger repository.
//!
//! The ledger is append-only; `user.reputation` is a materialized projection
//! of it. [`record`] appends an entry and bumps the projection through one
//! code path so the two cannot drift apart, and runs on whatever connection
//! the caller holds (usually an open transaction).

use std::sync::Arc;

use crate::entities::{ReputationChange, reputation_change, user};
use devflow_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

/// One pending ledger append, IDs pre-generated by the caller.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    /// Entry ID.
    pub id: String,
    /// The user whose reputation moves.
    pub user_id: String,
    /// Signed point delta.
    pub amount: i32,
    /// Why it moved.
    pub reason: reputation_change::Reason,
    /// The question or answer that triggered the change.
    pub related_id: Option<String>,
}

/// Append a ledger entry and apply it to the user's reputation projection.
pub async fn record<C: ConnectionTrait>(conn: &C, entry: LedgerEntry) -> AppResult<()> {
    let model = reputation_change::ActiveModel {
        id: Set(entry.id),
        user_id: Set(entry.user_id.clone()),
        amount: Set(entry.amount),
        reason: Set(entry.reason),
        related_id: Set(entry.related_id),
        ..Default::default()
    };

    model
        .insert(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    user::Entity::update_many()
        .col_expr(
            user::Column::Reputation,
            Expr::col(user::Column::Reputation).add(entry.amount),
        )
        .filter(user::Column::Id.eq(entry.user_id))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(())
}

/// Reputation repository for ledger reads.
#[derive(Clone)]
pub struct ReputationRepository {
    db: Arc<DatabaseConnection>,
}

impl ReputationRepository {
    /// Create a new reputation repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Get a user's ledger entries (paginated, newest first).
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<reputation_change::Model>> {
        let mut query = ReputationChange::find()
            .filter(reputation_change::Column::UserId.eq(user_id))
            .order_by_desc(reputation_change::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(reputation_change::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
