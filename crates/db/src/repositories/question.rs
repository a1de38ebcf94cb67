//! Question repository.

use std::sync::Arc;

use crate::entities::{Question, question};
use devflow_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Question repository for database operations.
#[derive(Clone)]
pub struct QuestionRepository {
    db: Arc<DatabaseConnection>,
}

impl QuestionRepository {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a question by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<question::Model>> {
        Question::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a question by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<question::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::QuestionNotFound(id.to_string()))
    }

    /// Find questions by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<question::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Question::find()
            .filter(question::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new question.
    pub async fn create(&self, model: question::ActiveModel) -> AppResult<question::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List questions (paginated, newest first, optional status filter).
    pub async fn list(
        &self,
        status: Option<question::Status>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<question::Model>> {
        let mut query = Question::find().order_by_desc(question::Column::Id);

        if let Some(status) = status {
            query = query.filter(question::Column::Status.eq(status));
        }

        if let Some(id) = until_id {
            query = query.filter(question::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment a question's view count.
    pub async fn increment_view_count(&self, id: &str) -> AppResult<()> {
        Question::update_many()
            .col_expr(
                question::Column::ViewCount,
                Expr::col(question::Column::ViewCount).add(1),
            )
            .filter(question::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment a question's answer count.
    pub async fn increment_answer_count(&self, id: &str) -> AppResult<()> {
        Question::update_many()
            .col_expr(
                question::Column::AnswerCount,
                Expr::col(question::Column::AnswerCount).add(1),
            )
            .filter(question::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
