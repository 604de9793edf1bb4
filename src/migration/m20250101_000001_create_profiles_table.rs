use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    Email,
    PasswordHash,
    ProfileType,
    FullName,
    CompanyName,
    Bio,
    AvatarUrl,
    Website,
    Industry,
    InvestorType,
    InvestmentRange,
    Sectors,
    Interests,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profiles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profiles::Email).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Profiles::PasswordHash)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Profiles::ProfileType)
                            .string_len(20)
                            .not_null()
                            .default("personal"),
                    )
                    .col(ColumnDef::new(Profiles::FullName).string_len(100))
                    .col(ColumnDef::new(Profiles::CompanyName).string_len(100))
                    .col(ColumnDef::new(Profiles::Bio).text())
                    .col(ColumnDef::new(Profiles::AvatarUrl).string_len(500))
                    .col(ColumnDef::new(Profiles::Website).string_len(255))
                    .col(ColumnDef::new(Profiles::Industry).string_len(100))
                    .col(ColumnDef::new(Profiles::InvestorType).string_len(50))
                    .col(ColumnDef::new(Profiles::InvestmentRange).string_len(50))
                    .col(ColumnDef::new(Profiles::Sectors).json_binary())
                    .col(ColumnDef::new(Profiles::Interests).string_len(10))
                    .col(
                        ColumnDef::new(Profiles::Role)
                            .string_len(20)
                            .not_null()
                            .default("member"),
                    )
                    .col(
                        ColumnDef::new(Profiles::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Profiles::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_profiles_email")
                    .table(Profiles::Table)
                    .col(Profiles::Email)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await
    }
}
