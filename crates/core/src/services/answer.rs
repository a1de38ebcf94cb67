//! Answer service.

use devflow_common::{AppError, AppResult, IdGenerator, ReputationConfig};
use devflow_db::{
    entities::{answer, question, reputation_change::Reason},
    repositories::{
        AcceptancePlan, AnswerRepository, LedgerEntry, QuestionRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating an answer.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnswerInput {
    /// Answer body.
    #[validate(length(min = 20, message = "Answer must be at least 20 characters"))]
    pub body: String,
}

/// Answer service for business logic.
#[derive(Clone)]
pub struct AnswerService {
    answer_repo: AnswerRepository,
    question_repo: QuestionRepository,
    user_repo: UserRepository,
    points: ReputationConfig,
    id_gen: IdGenerator,
}

impl AnswerService {
    /// Create a new answer service.
    #[must_use]
    pub const fn new(
        answer_repo: AnswerRepository,
        question_repo: QuestionRepository,
        user_repo: UserRepository,
        points: ReputationConfig,
    ) -> Self {
        Self {
            answer_repo,
            question_repo,
            user_repo,
            points,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post an answer to a question.
    pub async fn create(
        &self,
        user_id: &str,
        question_id: &str,
        input: CreateAnswerInput,
    ) -> AppResult<answer::Model> {
        input.validate()?;

        // The question must exist and still take answers
        let question = self.question_repo.get_by_id(question_id).await?;
        if question.status == question::Status::Closed {
            return Err(AppError::BadRequest(
                "Question is closed to new answers".to_string(),
            ));
        }

        let model = answer::ActiveModel {
            id: Set(self.id_gen.generate()),
            question_id: Set(question_id.to_string()),
            author_id: Set(user_id.to_string()),
            body: Set(input.body),
            ..Default::default()
        };

        let created = self.answer_repo.create(model).await?;

        self.question_repo
            .increment_answer_count(question_id)
            .await?;
        if let Err(e) = self.user_repo.increment_answers_count(user_id).await {
            tracing::warn!(error = %e, user_id = %user_id, "Failed to bump answers count");
        }

        Ok(created)
    }

    /// List answers for a question.
    pub async fn list_for_question(
        &self,
        question_id: &str,
        limit: u64,
        since_id: Option<&str>,
    ) -> AppResult<Vec<answer::Model>> {
        self.answer_repo
            .find_by_question(question_id, limit, since_id)
            .await
    }

    /// Accept an answer as the solution to a question.
    ///
    /// Only the asker may accept. Re-accepting the already accepted answer
    /// is a no-op; accepting a different answer swaps the flag in one
    /// transaction and reverses the previous author's bonus.
    pub async fn accept(
        &self,
        question_id: &str,
        answer_id: &str,
        requester_id: &str,
    ) -> AppResult<answer::Model> {
        let question = self.question_repo.get_by_id(question_id).await?;

        if question.author_id != requester_id {
            return Err(AppError::Forbidden(
                "Only the question author can accept an answer".to_string(),
            ));
        }

        let answer = self.answer_repo.get_by_id(answer_id).await?;
        if answer.question_id != question_id {
            return Err(AppError::NotFound(
                "Answer does not belong to this question".to_string(),
            ));
        }

        if answer.is_accepted {
            return Ok(answer);
        }

        let previous = self.answer_repo.find_accepted(question_id).await?;
        let plan = plan_acceptance(
            &self.points,
            &self.id_gen,
            &question,
            &answer,
            previous.as_ref(),
        );

        self.answer_repo.apply_acceptance(plan).await?;

        tracing::info!(
            question_id = %question_id,
            answer_id = %answer_id,
            "Answer accepted"
        );

        Ok(answer::Model {
            is_accepted: true,
            ..answer
        })
    }
}

/// Decide which flags move and which ledger entries accompany an acceptance.
///
/// The asker's bonus is granted once per question, on first acceptance; a
/// swap reverses the previous author's bonus with a compensating entry.
fn plan_acceptance(
    points: &ReputationConfig,
    id_gen: &IdGenerator,
    question: &question::Model,
    answer: &answer::Model,
    previous: Option<&answer::Model>,
) -> AcceptancePlan {
    let mut ledger = Vec::new();

    if let Some(prev) = previous {
        ledger.push(LedgerEntry {
            id: id_gen.generate(),
            user_id: prev.author_id.clone(),
            amount: -points.accept_author,
            reason: Reason::AcceptanceRevoked,
            related_id: Some(prev.id.clone()),
        });
    }

    ledger.push(LedgerEntry {
        id: id_gen.generate(),
        user_id: answer.author_id.clone(),
        amount: points.accept_author,
        reason: Reason::AnswerAccepted,
        related_id: Some(answer.id.clone()),
    });

    if previous.is_none() {
        ledger.push(LedgerEntry {
            id: id_gen.generate(),
            user_id: question.author_id.clone(),
            amount: points.accept_asker,
            reason: Reason::AcceptedAnswer,
            related_id: Some(answer.id.clone()),
        });
    }

    AcceptancePlan {
        question_id: question.id.clone(),
        answer_id: answer.id.clone(),
        previous_answer_id: previous.map(|p| p.id.clone()),
        ledger,
    }
}
