//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance with the `pgvector`
//! extension available.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `devflow_test`)
//!   `TEST_DB_PASSWORD` (default: `devflow_test`)
//!   `TEST_DB_NAME` (default: `devflow_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use devflow_db::entities::{question, reputation_change, user, vote};
use devflow_db::repositories::{
    LedgerEntry, QuestionRepository, ReputationRepository, UserRepository, VoteMutation, VotePlan,
    VoteRepository,
};
use devflow_db::test_utils::TestDatabase;
use sea_orm::Set;

async fn setup() -> TestDatabase {
    let db = TestDatabase::new().await.expect("Failed to connect");
    devflow_db::migrate(db.connection())
        .await
        .expect("Migrations failed");
    db.cleanup().await.expect("Cleanup failed");
    db
}

fn user_model(id: &str, username: &str) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(username.to_string()),
        token: Set(Some(format!("token-{id}"))),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
}

fn question_model(id: &str, author_id: &str) -> question::ActiveModel {
    question::ActiveModel {
        id: Set(id.to_string()),
        author_id: Set(author_id.to_string()),
        title: Set("How do lifetimes interact with closures?".to_string()),
        body: Set("I keep hitting E0373 when spawning threads.".to_string()),
        status: Set(question::Status::Open),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let db = TestDatabase::new().await;
    assert!(db.is_ok(), "Failed to connect: {:?}", db.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_vote_cast_keeps_counter_and_ledger_in_sync() {
    let db = setup().await;
    let conn = Arc::new(db.conn);

    let users = UserRepository::new(Arc::clone(&conn));
    let questions = QuestionRepository::new(Arc::clone(&conn));
    let votes = VoteRepository::new(Arc::clone(&conn));
    let reputation = ReputationRepository::new(Arc::clone(&conn));

    users.create(user_model("author", "author")).await.unwrap();
    users.create(user_model("voter", "voter")).await.unwrap();
    questions
        .create(question_model("q1", "author"))
        .await
        .unwrap();

    let plan = VotePlan {
        user_id: "voter".to_string(),
        target_type: vote::TargetType::Question,
        target_id: "q1".to_string(),
        mutation: VoteMutation::Insert {
            vote_id: "v1".to_string(),
            direction: vote::Direction::Up,
        },
        upvote_delta: 1,
        downvote_delta: 0,
        ledger: vec![LedgerEntry {
            id: "rc1".to_string(),
            user_id: "author".to_string(),
            amount: 5,
            reason: reputation_change::Reason::QuestionUpvoted,
            related_id: Some("q1".to_string()),
        }],
    };
    votes.apply(plan).await.unwrap();

    let q = questions.get_by_id("q1").await.unwrap();
    assert_eq!(q.upvotes, 1);
    assert_eq!(q.downvotes, 0);

    let author = users.get_by_id("author").await.unwrap();
    let ledger_sum: i32 = reputation
        .find_by_user("author", 100, None)
        .await
        .unwrap()
        .iter()
        .map(|e| e.amount)
        .sum();
    assert_eq!(author.reputation, 5);
    assert_eq!(author.reputation, ledger_sum);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_vote_insert_is_absorbed() {
    let db = setup().await;
    let conn = Arc::new(db.conn);

    let users = UserRepository::new(Arc::clone(&conn));
    let questions = QuestionRepository::new(Arc::clone(&conn));
    let votes = VoteRepository::new(Arc::clone(&conn));

    users.create(user_model("author", "author2")).await.unwrap();
    users.create(user_model("voter", "voter2")).await.unwrap();
    questions
        .create(question_model("q1", "author"))
        .await
        .unwrap();

    let plan = |vote_id: &str| VotePlan {
        user_id: "voter".to_string(),
        target_type: vote::TargetType::Question,
        target_id: "q1".to_string(),
        mutation: VoteMutation::Insert {
            vote_id: vote_id.to_string(),
            direction: vote::Direction::Up,
        },
        upvote_delta: 1,
        downvote_delta: 0,
        ledger: vec![LedgerEntry {
            id: format!("rc-{vote_id}"),
            user_id: "author".to_string(),
            amount: 5,
            reason: reputation_change::Reason::QuestionUpvoted,
            related_id: Some("q1".to_string()),
        }],
    };

    let first = votes.apply(plan("v1")).await.unwrap();
    let second = votes.apply(plan("v2")).await.unwrap();

    assert_eq!(first, devflow_db::repositories::CastOutcome::Applied);
    assert_eq!(
        second,
        devflow_db::repositories::CastOutcome::AbsorbedDuplicate
    );

    // The absorbed submit must leave no trace: one vote, counter at 1
    let q = questions.get_by_id("q1").await.unwrap();
    assert_eq!(q.upvotes, 1);

    let author = users.get_by_id("author").await.unwrap();
    assert_eq!(author.reputation, 5);
}
