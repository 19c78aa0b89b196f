use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum CaseMessages {
    Table,
    Id,
    CaseId,
    Sender,
    SenderUserId,
    SenderName,
    SenderAvatar,
    Content,
    SentAt,
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
                    .table(CaseMessages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CaseMessages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CaseMessages::CaseId).integer().not_null())
                    .col(
                        ColumnDef::new(CaseMessages::Sender)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CaseMessages::SenderUserId).integer().null())
                    .col(ColumnDef::new(CaseMessages::SenderName).string().null())
                    .col(ColumnDef::new(CaseMessages::SenderAvatar).string().null())
                    .col(ColumnDef::new(CaseMessages::Content).text().not_null())
                    .col(
                        ColumnDef::new(CaseMessages::SentAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_case_messages_case_id")
                            .from(CaseMessages::Table, CaseMessages::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_case_messages_case_sent")
                    .table(CaseMessages::Table)
                    .col(CaseMessages::CaseId)
                    .col(CaseMessages::SentAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CaseMessages::Table).to_owned())
            .await
    }
}
