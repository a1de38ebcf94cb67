//! Answer entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "answer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The question being answered
    #[sea_orm(indexed)]
    pub question_id: String,

    /// Author user ID
    #[sea_orm(indexed)]
    pub author_id: String,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    /// At most one answer per question carries this flag
    #[sea_orm(default_value = false)]
    pub is_accepted: bool,

    /// Was this answer produced by the AI orchestrator?
    #[sea_orm(default_value = false)]
    pub is_ai_generated: bool,

    /// Model name reported by the provider (AI answers only)
    #[sea_orm(nullable)]
    pub ai_model: Option<String>,

    /// Confidence reported by the provider (AI answers only)
    #[sea_orm(nullable)]
    pub ai_confidence: Option<f32>,

    /// Upvote count, a cache of the vote ledger
    #[sea_orm(default_value = 0)]
    pub upvotes: i32,

    /// Downvote count, a cache of the vote ledger
    #[sea_orm(default_value = 0)]
    pub downvotes: i32,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Net score (upvotes minus downvotes).
    #[must_use]
    pub const fn score(&self) -> i32 {
        self.upvotes - self.downvotes
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::question::Entity",
        from = "Column::QuestionId",
        to = "super::question::Column::Id",
        on_delete = "Cascade"
    )]
    Question,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Author,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
