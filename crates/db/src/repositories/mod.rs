//! Database repositories.

pub mod answer;
pub mod embedding;
pub mod question;
pub mod reputation;
pub mod user;
pub mod vote;

pub use answer::{AcceptancePlan, AnswerRepository};
pub use embedding::{EmbeddingRepository, SimilarityHit, TARGET_QUESTION};
pub use question::QuestionRepository;
pub use reputation::{LedgerEntry, ReputationRepository};
pub use user::UserRepository;
pub use vote::{CastOutcome, VoteMutation, VotePlan, VoteRepository};
