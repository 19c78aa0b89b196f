use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One submitted report. `content` and the AI-derived columns are written
/// once at creation and never updated; `status`, `severity` and the
/// assignee set mutate through the lifecycle service only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Human-shared tracking code (`IB-XXXX-XXXXXX`), unique, uppercase.
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub public_id: String,
    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub category: String,
    /// "anonymous" or "confidential".
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub submission_type: String,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub severity: String,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub ai_summary: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub ai_risk_assessment: Option<String>,
    pub ai_suggested_steps: Option<Json>,
    #[sea_orm(column_type = "Text", nullable)]
    pub ai_reasoning: Option<String>,
    pub submitted_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::case_message::Entity")]
    Messages,
    #[sea_orm(has_many = "super::attachment::Entity")]
    Attachments,
    #[sea_orm(has_many = "super::case_assignee::Entity")]
    Assignees,
}

impl ActiveModelBehavior for ActiveModel {}
