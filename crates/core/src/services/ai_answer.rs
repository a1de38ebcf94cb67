//! AI answer orchestration.
//!
//! Retrieval-augmented generation over the question corpus: embed the
//! question, pull similar questions out of the vector table, feed them to
//! the generative provider as context, and persist the result as a flagged
//! answer. One AI answer per question; repeat calls return the existing one.

use devflow_common::{AiConfig, AppResult, IdGenerator};
use devflow_db::{
    entities::{answer, question},
    repositories::{AnswerRepository, EmbeddingRepository, QuestionRepository, TARGET_QUESTION},
};
use sea_orm::Set;
use serde::Serialize;

use crate::services::provider::{DynEmbeddingProvider, DynGenerativeProvider};

/// A similar question with its cosine similarity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarQuestion {
    /// The neighboring question.
    pub question: question::Model,
    /// Cosine similarity in `[0, 1]`.
    pub similarity: f64,
}

/// AI answer service.
#[derive(Clone)]
pub struct AiAnswerService {
    question_repo: QuestionRepository,
    answer_repo: AnswerRepository,
    embedding_repo: EmbeddingRepository,
    generative: DynGenerativeProvider,
    embeddings: DynEmbeddingProvider,
    config: AiConfig,
    /// The system user that authors AI answers.
    ai_user_id: String,
    id_gen: IdGenerator,
}

impl AiAnswerService {
    /// Create a new AI answer service.
    #[must_use]
    pub fn new(
        question_repo: QuestionRepository,
        answer_repo: AnswerRepository,
        embedding_repo: EmbeddingRepository,
        generative: DynGenerativeProvider,
        embeddings: DynEmbeddingProvider,
        config: AiConfig,
        ai_user_id: String,
    ) -> Self {
        Self {
            question_repo,
            answer_repo,
            embedding_repo,
            generative,
            embeddings,
            config,
            ai_user_id,
            id_gen: IdGenerator::new(),
        }
    }

    /// Generate an AI answer for a question.
    ///
    /// Idempotent: when an AI answer already exists it is returned as-is.
    /// A provider failure surfaces before anything is written.
    pub async fn generate(&self, question_id: &str) -> AppResult<answer::Model> {
        let question = self.question_repo.get_by_id(question_id).await?;

        if let Some(existing) = self.answer_repo.find_ai_generated(question_id).await? {
            tracing::debug!(question_id = %question_id, "Returning existing AI answer");
            return Ok(existing);
        }

        let neighbors = self.neighbors(&question).await?;
        let prompt = build_answer_prompt(&question, &neighbors);

        let completion = self.generative.complete(&prompt).await?;

        let model = answer::ActiveModel {
            id: Set(self.id_gen.generate()),
            question_id: Set(question_id.to_string()),
            author_id: Set(self.ai_user_id.clone()),
            body: Set(completion.text),
            is_ai_generated: Set(true),
            ai_model: Set(Some(completion.model)),
            ai_confidence: Set(completion.confidence),
            ..Default::default()
        };

        let created = self.answer_repo.create(model).await?;
        self.question_repo
            .increment_answer_count(question_id)
            .await?;

        tracing::info!(
            question_id = %question_id,
            answer_id = %created.id,
            neighbors = neighbors.len(),
            "Generated AI answer"
        );

        Ok(created)
    }

    /// Look up the existing AI answer for a question, if any.
    pub async fn check_existing(&self, question_id: &str) -> AppResult<Option<answer::Model>> {
        self.question_repo.get_by_id(question_id).await?;
        self.answer_repo.find_ai_generated(question_id).await
    }

    /// Find questions similar to the given one.
    pub async fn similar_questions(&self, question_id: &str) -> AppResult<Vec<SimilarQuestion>> {
        let question = self.question_repo.get_by_id(question_id).await?;
        self.neighbors(&question).await
    }

    /// Embed (or reuse the stored embedding of) a question and query its
    /// neighbors above the configured similarity threshold.
    async fn neighbors(&self, question: &question::Model) -> AppResult<Vec<SimilarQuestion>> {
        let embedding = match self
            .embedding_repo
            .find_vector(TARGET_QUESTION, &question.id)
            .await?
        {
            Some(stored) => stored,
            None => {
                let text = format!("{}\n\n{}", question.title, question.body);
                let computed = self.embeddings.embed(&text).await?;
                self.embedding_repo
                    .upsert(TARGET_QUESTION, &question.id, &computed)
                    .await?;
                computed
            }
        };

        let hits = self
            .embedding_repo
            .find_similar_questions(
                &embedding,
                self.config.similarity_threshold,
                self.config.max_context_questions,
                &question.id,
            )
            .await?;

        let ids: Vec<String> = hits.iter().map(|h| h.target_id.clone()).collect();
        let questions = self.question_repo.find_by_ids(&ids).await?;

        // Preserve nearest-first hit order
        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                questions
                    .iter()
                    .find(|q| q.id == hit.target_id)
                    .map(|q| SimilarQuestion {
                        question: q.clone(),
                        similarity: hit.similarity,
                    })
            })
            .collect())
    }
}

/// Build the generation prompt from the question and its neighbors.
fn build_answer_prompt(question: &question::Model, neighbors: &[SimilarQuestion]) -> String {
    let mut prompt = String::from(
        "You are an assistant on a developer Q&A site. \
         Answer the question below concisely and technically.\n",
    );

    if !neighbors.is_empty() {
        prompt.push_str("\nContext from similar questions:\n");
        for neighbor in neighbors {
            prompt.push_str(&format!(
                "- {} (similarity {:.2}): {}\n",
                neighbor.question.title,
                neighbor.similarity,
                snippet(&neighbor.question.body, 280)
            ));
        }
    }

    prompt.push_str(&format!(
        "\nQuestion: {}\n{}\n\nAnswer:",
        question.title, question.body
    ));

    prompt
}

/// Truncate a body to a context snippet on a char boundary.
fn snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::provider::{Completion, GenerativeProvider, MockAiProvider};
    use async_trait::async_trait;
    use chrono::Utc;
    use devflow_common::AppError;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;

    fn test_question(id: &str, title: &str) -> question::Model {
        question::Model {
            id: id.to_string(),
            author_id: "u1".to_string(),
            title: title.to_string(),
            body: "Longer body describing the problem in detail.".to_string(),
            status: question::Status::Open,
            view_count: 0,
            answer_count: 0,
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn ai_answer(id: &str, question_id: &str) -> answer::Model {
        answer::Model {
            id: id.to_string(),
            question_id: question_id.to_string(),
            author_id: "ai-assistant".to_string(),
            body: "Generated answer.".to_string(),
            is_accepted: false,
            is_ai_generated: true,
            ai_model: Some("mock-model".to_string()),
            ai_confidence: Some(0.85),
            upvotes: 0,
            downvotes: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl GenerativeProvider for FailingProvider {
        async fn complete(&self, _prompt: &str) -> AppResult<Completion> {
            Err(AppError::GenerationFailed("provider is down".to_string()))
        }
    }

    fn make_service(
        question_db: sea_orm::DatabaseConnection,
        answer_db: sea_orm::DatabaseConnection,
        embedding_db: sea_orm::DatabaseConnection,
        generative: DynGenerativeProvider,
        embeddings: DynEmbeddingProvider,
    ) -> AiAnswerService {
        AiAnswerService::new(
            QuestionRepository::new(Arc::new(question_db)),
            AnswerRepository::new(Arc::new(answer_db)),
            EmbeddingRepository::new(Arc::new(embedding_db)),
            generative,
            embeddings,
            AiConfig::default(),
            "ai-assistant".to_string(),
        )
    }

    #[tokio::test]
    async fn test_generate_returns_existing_without_provider_call() {
        let question_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_question("q1", "Existing")]])
            .into_connection();
        let answer_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[ai_answer("a1", "q1")]])
            .into_connection();
        let embedding_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let mock = Arc::new(MockAiProvider::new());
        let service = make_service(
            question_db,
            answer_db,
            embedding_db,
            mock.clone(),
            mock.clone(),
        );

        let result = service.generate("q1").await.unwrap();

        assert_eq!(result.id, "a1");
        assert!(result.is_ai_generated);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_persists_flagged_answer() {
        let neighbor = test_question("q2", "Neighbor");
        let question_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_question("q1", "Main")]])
            .append_query_results([[neighbor]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let answer_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<answer::Model>::new()])
            .append_query_results([[ai_answer("a1", "q1")]])
            .into_connection();
        let embedding_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![btreemap! {
                "embedding" => Value::from("[0.1,0.2]"),
            }]])
            .append_query_results([vec![btreemap! {
                "target_id" => Value::from("q2"),
                "similarity" => Value::from(0.88_f64),
            }]])
            .into_connection();

        let mock = Arc::new(MockAiProvider::new());
        let service = make_service(
            question_db,
            answer_db,
            embedding_db,
            mock.clone(),
            mock.clone(),
        );

        let result = service.generate("q1").await.unwrap();

        assert!(result.is_ai_generated);
        assert_eq!(result.ai_model.as_deref(), Some("mock-model"));
        // One completion call; the stored embedding was reused
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generate_provider_failure_writes_nothing() {
        let question_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_question("q1", "Main")]])
            .append_query_results([Vec::<question::Model>::new()])
            .into_connection();
        let answer_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<answer::Model>::new()])
            .into_connection();
        let embedding_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![btreemap! {
                "embedding" => Value::from("[0.1,0.2]"),
            }]])
            .append_query_results([Vec::<std::collections::BTreeMap<&str, Value>>::new()])
            .into_connection();

        let embeddings = Arc::new(MockAiProvider::new());
        let service = make_service(
            question_db,
            answer_db,
            embedding_db,
            Arc::new(FailingProvider),
            embeddings,
        );

        let result = service.generate("q1").await;

        // The failure surfaces as GenerationFailed, not as a write error
        match result {
            Err(AppError::GenerationFailed(msg)) => assert!(msg.contains("down")),
            other => panic!("Expected GenerationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_prompt_includes_neighbors() {
        let question = test_question("q1", "How do I pin a future?");
        let neighbors = vec![SimilarQuestion {
            question: test_question("q2", "Pinning and self-referential structs"),
            similarity: 0.82,
        }];

        let prompt = build_answer_prompt(&question, &neighbors);

        assert!(prompt.contains("How do I pin a future?"));
        assert!(prompt.contains("Pinning and self-referential structs"));
        assert!(prompt.contains("0.82"));
    }

    #[test]
    fn test_prompt_without_neighbors_omits_context() {
        let question = test_question("q1", "Standalone");
        let prompt = build_answer_prompt(&question, &[]);

        assert!(!prompt.contains("Context from similar questions"));
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let text = "é".repeat(300);
        let result = snippet(&text, 280);

        assert!(result.ends_with("..."));
        assert_eq!(result.chars().count(), 283);
    }
}
