//! AI embedding repository.
//!
//! The `ai_embedding` table holds `pgvector` columns, so everything here is
//! raw parameterized SQL; similarity math stays inside Postgres (`<=>` is
//! cosine distance).

use std::sync::Arc;

use devflow_common::{AppError, AppResult};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement};

/// Embedding target kind for questions, stored as a plain string in the
/// vector table.
pub const TARGET_QUESTION: &str = "question";

/// A neighbor returned by the similarity query.
#[derive(Debug, Clone, FromQueryResult)]
pub struct SimilarityHit {
    /// The neighboring question's ID.
    pub target_id: String,
    /// Cosine similarity in `[0, 1]`, higher is closer.
    pub similarity: f64,
}

/// Embedding repository for database operations.
#[derive(Clone)]
pub struct EmbeddingRepository {
    db: Arc<DatabaseConnection>,
}

impl EmbeddingRepository {
    /// Create a new embedding repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Render a vector as a `pgvector` literal.
    fn vector_literal(embedding: &[f32]) -> String {
        let parts: Vec<String> = embedding.iter().map(ToString::to_string).collect();
        format!("[{}]", parts.join(","))
    }

    /// Insert or refresh the embedding for a target.
    pub async fn upsert(
        &self,
        target_type: &str,
        target_id: &str,
        embedding: &[f32],
    ) -> AppResult<()> {
        let literal = Self::vector_literal(embedding);

        self.db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                r"
                INSERT INTO ai_embedding (target_type, target_id, embedding)
                VALUES ($1, $2, $3::vector)
                ON CONFLICT (target_type, target_id)
                DO UPDATE SET embedding = EXCLUDED.embedding, created_at = now()
                ",
                [target_type.into(), target_id.into(), literal.into()],
            ))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Parse a `pgvector` literal back into a vector.
    fn parse_vector(text: &str) -> AppResult<Vec<f32>> {
        text.trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                s.trim()
                    .parse::<f32>()
                    .map_err(|e| AppError::Database(format!("Invalid vector literal: {e}")))
            })
            .collect()
    }

    /// Fetch the stored embedding for a target, if present.
    pub async fn find_vector(
        &self,
        target_type: &str,
        target_id: &str,
    ) -> AppResult<Option<Vec<f32>>> {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                r"
                SELECT embedding::text AS embedding
                FROM ai_embedding
                WHERE target_type = $1 AND target_id = $2
                ",
                [target_type.into(), target_id.into()],
            ))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(row) => {
                let text: String = row
                    .try_get("", "embedding")
                    .map_err(|e| AppError::Database(e.to_string()))?;
                Ok(Some(Self::parse_vector(&text)?))
            }
            None => Ok(None),
        }
    }

    /// Find question neighbors above a cosine-similarity threshold,
    /// excluding the query question itself, nearest first.
    pub async fn find_similar_questions(
        &self,
        embedding: &[f32],
        threshold: f32,
        limit: u64,
        exclude_id: &str,
    ) -> AppResult<Vec<SimilarityHit>> {
        let literal = Self::vector_literal(embedding);

        SimilarityHit::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r"
            SELECT target_id, 1 - (embedding <=> $1::vector) AS similarity
            FROM ai_embedding
            WHERE target_type = 'question'
                AND target_id <> $2
                AND 1 - (embedding <=> $1::vector) >= $3
            ORDER BY embedding <=> $1::vector
            LIMIT $4
            ",
            [
                literal.into(),
                exclude_id.into(),
                f64::from(threshold).into(),
                (limit as i64).into(),
            ],
        ))
        .all(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    #[test]
    fn test_vector_literal() {
        let literal = EmbeddingRepository::vector_literal(&[0.5, -1.0, 0.25]);
        assert_eq!(literal, "[0.5,-1,0.25]");
    }

    #[test]
    fn test_parse_vector_round_trip() {
        let parsed = EmbeddingRepository::parse_vector("[0.5,-1,0.25]").unwrap();
        assert_eq!(parsed, vec![0.5, -1.0, 0.25]);

        let with_spaces = EmbeddingRepository::parse_vector("[0.1, 0.2, 0.3]").unwrap();
        assert_eq!(with_spaces, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_find_vector_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! {
                    "embedding" => Value::from("[0.1,0.2]"),
                }]])
                .into_connection(),
        );

        let repo = EmbeddingRepository::new(db);
        let vector = repo.find_vector(TARGET_QUESTION, "q1").await.unwrap();

        assert_eq!(vector, Some(vec![0.1, 0.2]));
    }

    #[tokio::test]
    async fn test_upsert() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = EmbeddingRepository::new(db);
        repo.upsert(TARGET_QUESTION, "q1", &[0.1, 0.2])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_find_similar_questions() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    btreemap! {
                        "target_id" => Value::from("q2"),
                        "similarity" => Value::from(0.91_f64),
                    },
                    btreemap! {
                        "target_id" => Value::from("q3"),
                        "similarity" => Value::from(0.72_f64),
                    },
                ]])
                .into_connection(),
        );

        let repo = EmbeddingRepository::new(db);
        let hits = repo
            .find_similar_questions(&[0.1, 0.2], 0.65, 5, "q1")
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].target_id, "q2");
        assert!(hits[0].similarity > hits[1].similarity);
    }
}
