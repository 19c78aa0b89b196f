use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum CaseAssignees {
    Table,
    Id,
    CaseId,
    UserId,
    Position,
    AssignedAt,
}

#[derive(DeriveIden)]
enum Cases {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CaseAssignees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CaseAssignees::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CaseAssignees::CaseId).integer().not_null())
                    .col(ColumnDef::new(CaseAssignees::UserId).integer().not_null())
                    .col(
                        ColumnDef::new(CaseAssignees::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CaseAssignees::AssignedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_case_assignees_case_id")
                            .from(CaseAssignees::Table, CaseAssignees::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_case_assignees_user_id")
                            .from(CaseAssignees::Table, CaseAssignees::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_case_assignees_unique")
                    .table(CaseAssignees::Table)
                    .col(CaseAssignees::CaseId)
                    .col(CaseAssignees::UserId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CaseAssignees::Table).to_owned())
            .await
    }
}
