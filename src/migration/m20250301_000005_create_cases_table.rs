use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Cases {
    Table,
    Id,
    PublicId,
    Title,
    Content,
    Category,
    SubmissionType,
    ReporterName,
    ReporterEmail,
    Severity,
    Status,
    AiSummary,
    AiRiskAssessment,
    AiSuggestedSteps,
    AiReasoning,
    SubmittedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Cases::PublicId)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Cases::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Cases::Content).text().not_null())
                    .col(ColumnDef::new(Cases::Category).string_len(50).not_null())
                    .col(
                        ColumnDef::new(Cases::SubmissionType)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Cases::ReporterName).string().null())
                    .col(ColumnDef::new(Cases::ReporterEmail).string().null())
                    .col(ColumnDef::new(Cases::Severity).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Cases::Status)
                            .string_len(50)
                            .not_null()
                            .default("New"),
                    )
                    .col(ColumnDef::new(Cases::AiSummary).text().null())
                    .col(ColumnDef::new(Cases::AiRiskAssessment).text().null())
                    .col(ColumnDef::new(Cases::AiSuggestedSteps).json_binary().null())
                    .col(ColumnDef::new(Cases::AiReasoning).text().null())
                    .col(
                        ColumnDef::new(Cases::SubmittedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Cases::UpdatedAt)
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
                    .name("idx_cases_status")
                    .table(Cases::Table)
                    .col(Cases::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cases_severity")
                    .table(Cases::Table)
                    .col(Cases::Severity)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_cases_submitted_at")
                    .table(Cases::Table)
                    .col(Cases::SubmittedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Cases::Table).to_owned())
            .await
    }
}
