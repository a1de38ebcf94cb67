//! User service.

use devflow_common::{AppError, AppResult, IdGenerator};
use devflow_db::{
    entities::{reputation_change, user},
    repositories::{ReputationRepository, UserRepository},
};
use sea_orm::Set;

/// Username reserved for the system user that authors AI answers.
pub const AI_USERNAME: &str = "ai-assistant";

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    reputation_repo: ReputationRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, reputation_repo: ReputationRepository) -> Self {
        Self {
            user_repo,
            reputation_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve a bearer token to a user.
    ///
    /// Token issuance itself is an external collaborator; this only matches
    /// the opaque token against the user table.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user profile.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user's reputation ledger (paginated, newest first).
    pub async fn reputation_ledger(
        &self,
        user_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<reputation_change::Model>> {
        self.user_repo.get_by_id(user_id).await?;
        self.reputation_repo
            .find_by_user(user_id, limit.min(100), until_id)
            .await
    }

    /// Find or create the system user that authors AI answers.
    pub async fn ensure_ai_user(&self) -> AppResult<user::Model> {
        if let Some(existing) = self.user_repo.find_by_username(AI_USERNAME).await? {
            return Ok(existing);
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(AI_USERNAME.to_string()),
            token: Set(None),
            name: Set(Some("AI Assistant".to_string())),
            ..Default::default()
        };

        let created = self.user_repo.create(model).await?;
        tracing::info!(user_id = %created.id, "Created AI assistant user");
        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            token: Some("tok".to_string()),
            name: None,
            bio: None,
            reputation: 7,
            questions_count: 0,
            answers_count: 0,
            is_admin: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn make_service(
        user_db: sea_orm::DatabaseConnection,
        reputation_db: sea_orm::DatabaseConnection,
    ) -> UserService {
        UserService::new(
            UserRepository::new(Arc::new(user_db)),
            ReputationRepository::new(Arc::new(reputation_db)),
        )
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let reputation_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = make_service(user_db, reputation_db);
        let result = service.authenticate_by_token("bad-token").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_ensure_ai_user_reuses_existing() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("sys", AI_USERNAME)]])
            .into_connection();
        let reputation_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = make_service(user_db, reputation_db);
        let result = service.ensure_ai_user().await.unwrap();

        assert_eq!(result.id, "sys");
    }

    #[tokio::test]
    async fn test_reputation_ledger_requires_existing_user() {
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();
        let reputation_db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let service = make_service(user_db, reputation_db);
        let result = service.reputation_ledger("missing", 20, None).await;

        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }
}
