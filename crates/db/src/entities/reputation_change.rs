//! Reputation change entity (append-only audit log).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Why reputation moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    #[sea_orm(string_value = "question_upvoted")]
    QuestionUpvoted,
    #[sea_orm(string_value = "question_downvoted")]
    QuestionDownvoted,
    #[sea_orm(string_value = "answer_upvoted")]
    AnswerUpvoted,
    #[sea_orm(string_value = "answer_downvoted")]
    AnswerDownvoted,
    /// A prior vote was toggled off or flipped; reverses an earlier entry
    #[sea_orm(string_value = "vote_withdrawn")]
    VoteWithdrawn,
    /// Awarded to the author of an accepted answer
    #[sea_orm(string_value = "answer_accepted")]
    AnswerAccepted,
    /// Awarded to the asker for accepting an answer
    #[sea_orm(string_value = "accepted_answer")]
    AcceptedAnswer,
    /// A previously accepted answer lost its accepted status
    #[sea_orm(string_value = "acceptance_revoked")]
    AcceptanceRevoked,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reputation_change")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user whose reputation moved
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Signed point delta
    pub amount: i32,

    pub reason: Reason,

    /// The question or answer that triggered the change
    #[sea_orm(nullable)]
    pub related_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
