//! Create AI embedding table migration.
//!
//! Uses the `pgvector` extension; similarity search runs on the database's
//! vector operators, so the table is created with raw SQL.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("CREATE EXTENSION IF NOT EXISTS vector;")
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE TABLE IF NOT EXISTS ai_embedding (
                    target_type varchar(16) NOT NULL,
                    target_id varchar(32) NOT NULL,
                    embedding vector(1536) NOT NULL,
                    created_at timestamptz NOT NULL DEFAULT now(),
                    PRIMARY KEY (target_type, target_id)
                );
                ",
            )
            .await?;

        // Approximate-nearest-neighbor index for cosine distance
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE INDEX IF NOT EXISTS idx_ai_embedding_cosine
                ON ai_embedding
                USING ivfflat (embedding vector_cosine_ops)
                WITH (lists = 100);
                ",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS ai_embedding;")
            .await?;
        Ok(())
    }
}
