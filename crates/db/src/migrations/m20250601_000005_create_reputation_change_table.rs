//! Create reputation change table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ReputationChange::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ReputationChange::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ReputationChange::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReputationChange::Amount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReputationChange::Reason)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ReputationChange::RelatedId)
                            .string_len(32)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ReputationChange::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reputation_change_user")
                            .from(ReputationChange::Table, ReputationChange::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id + created_at (for paginating a user's ledger)
        manager
            .create_index(
                Index::create()
                    .name("idx_reputation_change_user_created")
                    .table(ReputationChange::Table)
                    .col(ReputationChange::UserId)
                    .col(ReputationChange::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ReputationChange::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ReputationChange {
    Table,
    Id,
    UserId,
    Amount,
    Reason,
    RelatedId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
