use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Attachments {
    Table,
    Id,
    CaseId,
    Url,
    FileName,
    FileType,
    UploadedById,
    UploadedByName,
    UploadedAt,
}

#[derive(DeriveIden)]
enum Cases {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Attachments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Attachments::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Attachments::CaseId).integer().not_null())
                    .col(ColumnDef::new(Attachments::Url).string().not_null())
                    .col(ColumnDef::new(Attachments::FileName).string().not_null())
                    .col(
                        ColumnDef::new(Attachments::FileType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Attachments::UploadedById).integer().null())
                    .col(
                        ColumnDef::new(Attachments::UploadedByName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Attachments::UploadedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_attachments_case_id")
                            .from(Attachments::Table, Attachments::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attachments_case_id")
                    .table(Attachments::Table)
                    .col(Attachments::CaseId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Attachments::Table).to_owned())
            .await
    }
}
