//! Answer repository.

use std::sync::Arc;

use crate::entities::{Answer, answer, question};
use crate::repositories::reputation::{self, LedgerEntry};
use devflow_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};

/// A fully-decided acceptance: which flags move and which ledger entries
/// accompany them.
#[derive(Debug, Clone)]
pub struct AcceptancePlan {
    /// The question being solved.
    pub question_id: String,
    /// The answer gaining accepted status.
    pub answer_id: String,
    /// A previously accepted answer losing the flag, if any.
    pub previous_answer_id: Option<String>,
    /// Ledger appends (asker bonus, author bonus, revocations).
    pub ledger: Vec<LedgerEntry>,
}

/// Answer repository for database operations.
#[derive(Clone)]
pub struct AnswerRepository {
    db: Arc<DatabaseConnection>,
}

impl AnswerRepository {
    /// Create a new answer repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an answer by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<answer::Model>> {
        Answer::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an answer by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<answer::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::AnswerNotFound(id.to_string()))
    }

    /// Create a new answer.
    pub async fn create(&self, model: answer::ActiveModel) -> AppResult<answer::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get answers for a question (paginated, oldest first so the thread
    /// reads top to bottom).
    pub async fn find_by_question(
        &self,
        question_id: &str,
        limit: u64,
        since_id: Option<&str>,
    ) -> AppResult<Vec<answer::Model>> {
        let mut query = Answer::find()
            .filter(answer::Column::QuestionId.eq(question_id))
            .order_by_asc(answer::Column::Id);

        if let Some(id) = since_id {
            query = query.filter(answer::Column::Id.gt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the accepted answer for a question, if any.
    pub async fn find_accepted(&self, question_id: &str) -> AppResult<Option<answer::Model>> {
        Answer::find()
            .filter(answer::Column::QuestionId.eq(question_id))
            .filter(answer::Column::IsAccepted.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the AI-generated answer for a question, if any.
    pub async fn find_ai_generated(&self, question_id: &str) -> AppResult<Option<answer::Model>> {
        Answer::find()
            .filter(answer::Column::QuestionId.eq(question_id))
            .filter(answer::Column::IsAiGenerated.eq(true))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply an acceptance plan in a single transaction.
    ///
    /// Clears the previous accepted flag (if any), sets the new one, marks
    /// the question solved, and appends the accompanying ledger entries.
    pub async fn apply_acceptance(&self, plan: AcceptancePlan) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(previous_id) = &plan.previous_answer_id {
            Answer::update_many()
                .col_expr(answer::Column::IsAccepted, Expr::value(false))
                .filter(answer::Column::Id.eq(previous_id.clone()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        Answer::update_many()
            .col_expr(answer::Column::IsAccepted, Expr::value(true))
            .filter(answer::Column::Id.eq(plan.answer_id.clone()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        question::Entity::update_many()
            .col_expr(
                question::Column::Status,
                Expr::value(question::Status::Solved),
            )
            .filter(question::Column::Id.eq(plan.question_id.clone()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        for entry in plan.ledger {
            reputation::record(&txn, entry).await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::reputation_change;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_answer(id: &str, question_id: &str, author_id: &str) -> answer::Model {
        answer::Model {
            id: id.to_string(),
            question_id: question_id.to_string(),
            author_id: author_id.to_string(),
            body: "Use a scoped thread.".to_string(),
            is_accepted: false,
            is_ai_generated: false,
            ai_model: None,
            ai_confidence: None,
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_ledger_row(id: &str, user_id: &str, amount: i32) -> reputation_change::Model {
        reputation_change::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            amount,
            reason: reputation_change::Reason::AnswerAccepted,
            related_id: Some("a1".to_string()),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<answer::Model>::new()])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let result = repo.get_by_id("missing").await;

        match result {
            Err(AppError::AnswerNotFound(id)) => assert_eq!(id, "missing"),
            _ => panic!("Expected AnswerNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_find_accepted_none() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<answer::Model>::new()])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let result = repo.find_accepted("q1").await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_ai_generated() {
        let mut ai_answer = create_test_answer("a2", "q1", "bot");
        ai_answer.is_ai_generated = true;
        ai_answer.ai_model = Some("gpt-4o-mini".to_string());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[ai_answer]])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let result = repo.find_ai_generated("q1").await.unwrap();

        assert!(result.is_some());
        assert_eq!(result.unwrap().ai_model.as_deref(), Some("gpt-4o-mini"));
    }

    #[tokio::test]
    async fn test_apply_acceptance_first_accept() {
        // Flag update + question status + two ledger appends
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_ledger_row("rc1", "author1", 15)]])
                .append_query_results([[create_test_ledger_row("rc2", "asker1", 2)]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = AnswerRepository::new(db);
        let plan = AcceptancePlan {
            question_id: "q1".to_string(),
            answer_id: "a1".to_string(),
            previous_answer_id: None,
            ledger: vec![
                LedgerEntry {
                    id: "rc1".to_string(),
                    user_id: "author1".to_string(),
                    amount: 15,
                    reason: reputation_change::Reason::AnswerAccepted,
                    related_id: Some("a1".to_string()),
                },
                LedgerEntry {
                    id: "rc2".to_string(),
                    user_id: "asker1".to_string(),
                    amount: 2,
                    reason: reputation_change::Reason::AcceptedAnswer,
                    related_id: Some("a1".to_string()),
                },
            ],
        };

        repo.apply_acceptance(plan).await.unwrap();
    }
}
