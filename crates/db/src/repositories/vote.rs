//! Vote repository.
//!
//! Applies vote plans atomically: the vote row, the target's denormalized
//! counters, and the reputation ledger move in one transaction so the cached
//! counters can never drift from the ledger.

use std::sync::Arc;

use crate::entities::{
    Vote, answer, question,
    vote::{self, Direction, TargetType},
};
use crate::repositories::reputation::{self, LedgerEntry};
use devflow_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
    TransactionTrait,
};

/// How the vote row itself changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteMutation {
    /// No prior vote: insert a new row.
    Insert {
        /// Pre-generated vote ID.
        vote_id: String,
        /// Direction of the new vote.
        direction: Direction,
    },
    /// Same direction cast again: toggle the vote off.
    Remove {
        /// The existing vote row.
        vote_id: String,
    },
    /// Opposite direction cast: flip the row in place.
    Flip {
        /// The existing vote row.
        vote_id: String,
        /// The new direction.
        direction: Direction,
    },
}

/// A fully-decided vote application: row mutation, counter deltas, and the
/// ledger entries for the target's author.
#[derive(Debug, Clone)]
pub struct VotePlan {
    /// The voting user.
    pub user_id: String,
    /// What the vote points at.
    pub target_type: TargetType,
    /// Question or answer ID.
    pub target_id: String,
    /// The row mutation.
    pub mutation: VoteMutation,
    /// Signed delta applied to the target's upvote counter.
    pub upvote_delta: i32,
    /// Signed delta applied to the target's downvote counter.
    pub downvote_delta: i32,
    /// Ledger appends for the target's author.
    pub ledger: Vec<LedgerEntry>,
}

/// Result of applying a vote plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastOutcome {
    /// The plan was applied.
    Applied,
    /// A concurrent double-submit hit the unique index; nothing was written.
    AbsorbedDuplicate,
}

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's vote on a target.
    pub async fn find_by_user_and_target(
        &self,
        user_id: &str,
        target_type: TargetType,
        target_id: &str,
    ) -> AppResult<Option<vote::Model>> {
        Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::TargetType.eq(target_type))
            .filter(vote::Column::TargetId.eq(target_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a vote plan in a single transaction.
    pub async fn apply(&self, plan: VotePlan) -> AppResult<CastOutcome> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match &plan.mutation {
            VoteMutation::Insert { vote_id, direction } => {
                let model = vote::ActiveModel {
                    id: Set(vote_id.clone()),
                    user_id: Set(plan.user_id.clone()),
                    target_type: Set(plan.target_type),
                    target_id: Set(plan.target_id.clone()),
                    direction: Set(*direction),
                    ..Default::default()
                };

                if let Err(e) = model.insert(&txn).await {
                    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                        txn.rollback()
                            .await
                            .map_err(|e| AppError::Database(e.to_string()))?;
                        tracing::debug!(
                            user_id = %plan.user_id,
                            target_id = %plan.target_id,
                            "Absorbed duplicate vote submit"
                        );
                        return Ok(CastOutcome::AbsorbedDuplicate);
                    }
                    return Err(AppError::Database(e.to_string()));
                }
            }
            VoteMutation::Remove { vote_id } => {
                Vote::delete_by_id(vote_id.clone())
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            VoteMutation::Flip { vote_id, direction } => {
                Vote::update_many()
                    .col_expr(vote::Column::Direction, Expr::value(*direction))
                    .filter(vote::Column::Id.eq(vote_id.clone()))
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        match plan.target_type {
            TargetType::Question => {
                question::Entity::update_many()
                    .col_expr(
                        question::Column::Upvotes,
                        Expr::col(question::Column::Upvotes).add(plan.upvote_delta),
                    )
                    .col_expr(
                        question::Column::Downvotes,
                        Expr::col(question::Column::Downvotes).add(plan.downvote_delta),
                    )
                    .filter(question::Column::Id.eq(plan.target_id.clone()))
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            TargetType::Answer => {
                answer::Entity::update_many()
                    .col_expr(
                        answer::Column::Upvotes,
                        Expr::col(answer::Column::Upvotes).add(plan.upvote_delta),
                    )
                    .col_expr(
                        answer::Column::Downvotes,
                        Expr::col(answer::Column::Downvotes).add(plan.downvote_delta),
                    )
                    .filter(answer::Column::Id.eq(plan.target_id.clone()))
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        for entry in plan.ledger {
            reputation::record(&txn, entry).await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(CastOutcome::Applied)
    }
}
