use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum IdeaComments {
    Table,
    Id,
    IdeaId,
    UserId,
    Content,
    CreatedAt,
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
                    .table(IdeaComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IdeaComments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(IdeaComments::IdeaId).integer().not_null())
                    .col(ColumnDef::new(IdeaComments::UserId).integer().not_null())
                    .col(ColumnDef::new(IdeaComments::Content).text().not_null())
                    .col(
                        ColumnDef::new(IdeaComments::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_idea_comments_idea_id")
                            .from(IdeaComments::Table, IdeaComments::IdeaId)
                            .to(Ideas::Table, Ideas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_idea_comments_user_id")
                            .from(IdeaComments::Table, IdeaComments::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_idea_comments_idea")
                    .table(IdeaComments::Table)
                    .col(IdeaComments::IdeaId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IdeaComments::Table).to_owned())
            .await
    }
}
