//! Business logic services.

#![allow(missing_docs)]

pub mod admin_tool;
pub mod ai_answer;
pub mod answer;
pub mod provider;
pub mod question;
pub mod summary;
pub mod user;
pub mod vote;
pub mod voice;

pub use admin_tool::{
    AdminToolService, CommandOutput, CommandRunner, DynCommandRunner, ProcessCommandRunner,
};
pub use ai_answer::{AiAnswerService, SimilarQuestion};
pub use answer::{AnswerService, CreateAnswerInput};
pub use provider::{
    Completion, DynEmbeddingProvider, DynGenerativeProvider, DynSpeechProvider,
    ElevenLabsProvider, EmbeddingProvider, GenerativeProvider, MockAiProvider, MockSpeechProvider,
    OpenAiProvider, SpeechProvider,
};
pub use question::{CreateQuestionInput, QuestionService};
pub use summary::{Summary, SummaryService};
pub use user::UserService;
pub use vote::VoteService;
pub use voice::{SpeechAudio, VoiceService};
