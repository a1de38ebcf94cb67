//! Thread summary service.

use devflow_common::AppResult;
use devflow_db::{
    entities::{answer, question},
    repositories::{AnswerRepository, QuestionRepository},
};
use serde::Serialize;

use crate::services::provider::DynGenerativeProvider;

/// Maximum answers folded into one summary prompt.
const MAX_SUMMARY_ANSWERS: u64 = 50;

/// A generated thread summary. Never persisted; recomputed per call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Summary text.
    pub text: String,
    /// Model that produced it.
    pub model: String,
}

/// Summary service.
#[derive(Clone)]
pub struct SummaryService {
    question_repo: QuestionRepository,
    answer_repo: AnswerRepository,
    generative: DynGenerativeProvider,
}

impl SummaryService {
    /// Create a new summary service.
    #[must_use]
    pub fn new(
        question_repo: QuestionRepository,
        answer_repo: AnswerRepository,
        generative: DynGenerativeProvider,
    ) -> Self {
        Self {
            question_repo,
            answer_repo,
            generative,
        }
    }

    /// Summarize a question and its answers.
    pub async fn generate(&self, question_id: &str) -> AppResult<Summary> {
        let question = self.question_repo.get_by_id(question_id).await?;
        let answers = self
            .answer_repo
            .find_by_question(question_id, MAX_SUMMARY_ANSWERS, None)
            .await?;

        let prompt = build_summary_prompt(&question, &answers);
        let completion = self.generative.complete(&prompt).await?;

        Ok(Summary {
            text: completion.text,
            model: completion.model,
        })
    }
}

/// Build the summary prompt from the whole thread.
fn build_summary_prompt(question: &question::Model, answers: &[answer::Model]) -> String {
    let mut prompt = format!(
        "Summarize this Q&A thread in a short paragraph.\n\nQuestion: {}\n{}\n",
        question.title, question.body
    );

    for (i, answer) in answers.iter().enumerate() {
        let marker = if answer.is_accepted { " (accepted)" } else { "" };
        prompt.push_str(&format!("\nAnswer {}{}: {}\n", i + 1, marker, answer.body));
    }

    prompt.push_str("\nSummary:");
    prompt
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::provider::MockAiProvider;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_question() -> question::Model {
        question::Model {
            id: "q1".to_string(),
            author_id: "u1".to_string(),
            title: "Why is my future not Send?".to_string(),
            body: "It compiles until I spawn it.".to_string(),
            status: question::Status::Open,
            view_count: 0,
            answer_count: 1,
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_answer(id: &str, accepted: bool) -> answer::Model {
        answer::Model {
            id: id.to_string(),
            question_id: "q1".to_string(),
            author_id: "u2".to_string(),
            body: "You are holding a non-Send guard across an await.".to_string(),
            is_accepted: accepted,
            is_ai_generated: false,
            ai_model: None,
            ai_confidence: None,
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_prompt_marks_accepted_answer() {
        let prompt = build_summary_prompt(
            &test_question(),
            &[test_answer("a1", false), test_answer("a2", true)],
        );

        assert!(prompt.contains("Answer 1:"));
        assert!(prompt.contains("Answer 2 (accepted):"));
        assert!(prompt.contains("Why is my future not Send?"));
    }

    #[tokio::test]
    async fn test_generate_summary() {
        let question_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_question()]])
            .into_connection();
        let answer_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_answer("a1", true)]])
            .into_connection();

        let mock = Arc::new(MockAiProvider::new());
        let service = SummaryService::new(
            QuestionRepository::new(Arc::new(question_db)),
            AnswerRepository::new(Arc::new(answer_db)),
            mock.clone(),
        );

        let summary = service.generate("q1").await.unwrap();

        assert_eq!(summary.model, "mock-model");
        assert_eq!(mock.call_count(), 1);
    }
}
