use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One entry in a case's communication channel. Append-only; display order
/// is `sent_at` ascending (server-assigned, not client send order).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "case_messages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub case_id: i32,
    /// "reporter" or "officer".
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub sender: String,
    pub sender_user_id: Option<i32>,
    pub sender_name: Option<String>,
    pub sender_avatar: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub sent_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::case::Entity",
        from = "Column::CaseId",
        to = "super::case::Column::Id"
    )]
    Case,
}

impl Related<super::case::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Case.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
