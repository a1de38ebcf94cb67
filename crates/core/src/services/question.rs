//! Question service.

use devflow_common::{AppResult, IdGenerator};
use devflow_db::{
    entities::question,
    repositories::{QuestionRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a question.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionInput {
    /// Question title.
    #[validate(length(min = 10, max = 256, message = "Title must be 10-256 characters"))]
    pub title: String,
    /// Question body.
    #[validate(length(min = 20, message = "Description must be at least 20 characters"))]
    pub body: String,
}

/// Question service for business logic.
#[derive(Clone)]
pub struct QuestionService {
    question_repo: QuestionRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl QuestionService {
    /// Create a new question service.
    #[must_use]
    pub const fn new(question_repo: QuestionRepository, user_repo: UserRepository) -> Self {
        Self {
            question_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a new question.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateQuestionInput,
    ) -> AppResult<question::Model> {
        input.validate()?;

        let model = question::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(user_id.to_string()),
            title: Set(input.title),
            body: Set(input.body),
            status: Set(question::Status::Open),
            ..Default::default()
        };

        let created = self.question_repo.create(model).await?;

        if let Err(e) = self.user_repo.increment_questions_count(user_id).await {
            tracing::warn!(error = %e, user_id = %user_id, "Failed to bump questions count");
        }

        Ok(created)
    }

    /// Get a question by ID, recording the view.
    ///
    /// Authors reading their own question do not move the view count.
    pub async fn get(&self, id: &str, viewer_id: Option<&str>) -> AppResult<question::Model> {
        let mut question = self.question_repo.get_by_id(id).await?;

        if viewer_id != Some(question.author_id.as_str()) {
            if let Err(e) = self.question_repo.increment_view_count(id).await {
                tracing::warn!(error = %e, question_id = %id, "Failed to bump view count");
            } else {
                question.view_count += 1;
            }
        }

        Ok(question)
    }

    /// List questions (paginated, newest first, optional status filter).
    pub async fn list(
        &self,
        status: Option<question::Status>,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<question::Model>> {
        self.question_repo
            .list(status, limit.min(100), until_id)
            .await
    }
}
