use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Ideas {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Category,
    Stage,
    Tags,
    SeekingInvestment,
    InvestmentAmount,
    CreatedAt,
    UpdatedAt,
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
                    .table(Ideas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ideas::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ideas::UserId).integer().not_null())
                    .col(ColumnDef::new(Ideas::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Ideas::Description).text().not_null())
                    .col(ColumnDef::new(Ideas::Category).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Ideas::Stage)
                            .string_len(20)
                            .not_null()
                            .default("idea"),
                    )
                    .col(ColumnDef::new(Ideas::Tags).json_binary())
                    .col(
                        ColumnDef::new(Ideas::SeekingInvestment)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Ideas::InvestmentAmount).string_len(50))
                    .col(
                        ColumnDef::new(Ideas::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Ideas::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ideas_user_id")
                            .from(Ideas::Table, Ideas::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ideas_user_id")
                    .table(Ideas::Table)
                    .col(Ideas::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ideas_created_at")
                    .table(Ideas::Table)
                    .col(Ideas::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ideas::Table).to_owned())
            .await
    }
}
