use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum IdeaVotes {
    Table,
    Id,
    IdeaId,
    UserId,
    YesVote,
    MaybeVote,
    NoVote,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Ideas {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IdeaVotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdeaVotes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IdeaVotes::IdeaId).integer().not_null())
                    .col(ColumnDef::new(IdeaVotes::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(IdeaVotes::YesVote)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(IdeaVotes::MaybeVote)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(IdeaVotes::NoVote)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(IdeaVotes::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(IdeaVotes::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_idea_votes_idea_id")
                            .from(IdeaVotes::Table, IdeaVotes::IdeaId)
                            .to(Ideas::Table, Ideas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_idea_votes_user_id")
                            .from(IdeaVotes::Table, IdeaVotes::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One row per (idea, voter); re-votes are upserts against this key.
        manager
            .create_index(
                Index::create()
                    .name("idx_idea_votes_unique")
                    .table(IdeaVotes::Table)
                    .col(IdeaVotes::IdeaId)
                    .col(IdeaVotes::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_idea_votes_idea")
                    .table(IdeaVotes::Table)
                    .col(IdeaVotes::IdeaId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IdeaVotes::Table).to_owned())
            .await
    }
}
