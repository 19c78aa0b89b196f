use crate::{
    error::{AppError, AppResult},
    models::{case_message, Case, CaseMessage, CaseMessageModel, UserModel},
    services::lifecycle::STATUS_RESOLVED,
    websocket::hub::CaseStreamHub,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Per-case ordered message log between the reporter and officers. Posts
/// are gated on the case still being open; listing order is the
/// server-assigned timestamp, never client send order.
pub struct MessageService {
    db: DatabaseConnection,
    hub: CaseStreamHub,
}

impl MessageService {
    pub fn new(db: DatabaseConnection, hub: CaseStreamHub) -> Self {
        Self { db, hub }
    }

    /// Pseudonymous post from the reporter side; no identity is attached.
    pub async fn post_reporter_message(
        &self,
        case_id: i32,
        content: &str,
    ) -> AppResult<CaseMessageModel> {
        self.append(case_id, "reporter", None, content).await
    }

    /// Officer post; carries the acting identity's display name and avatar.
    pub async fn post_officer_message(
        &self,
        case_id: i32,
        actor: &UserModel,
        content: &str,
    ) -> AppResult<CaseMessageModel> {
        self.append(case_id, "officer", Some(actor), content).await
    }

    /// All messages for a case, sent_at ascending with id as tiebreak so
    /// entries landing in the same timestamp tick keep insertion order.
    pub async fn list(&self, case_id: i32) -> AppResult<Vec<CaseMessageModel>> {
        let messages = CaseMessage::find()
            .filter(case_message::Column::CaseId.eq(case_id))
            .order_by_asc(case_message::Column::SentAt)
            .order_by_asc(case_message::Column::Id)
            .all(&self.db)
            .await?;
        Ok(messages)
    }

    async fn append(
        &self,
        case_id: i32,
        sender: &str,
        sender_info: Option<&UserModel>,
        content: &str,
    ) -> AppResult<CaseMessageModel> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation(
                "Message content cannot be empty".to_string(),
            ));
        }

        let case = Case::find_by_id(case_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if case.status == STATUS_RESOLVED {
            return Err(AppError::InvalidState(
                "Case is resolved; the conversation is closed".to_string(),
            ));
        }

        let now = chrono::Utc::now().naive_utc();
        let model = case_message::ActiveModel {
            case_id: sea_orm::ActiveValue::Set(case_id),
            sender: sea_orm::ActiveValue::Set(sender.to_string()),
            sender_user_id: sea_orm::ActiveValue::Set(sender_info.map(|u| u.id)),
            sender_name: sea_orm::ActiveValue::Set(sender_info.map(|u| u.name.clone())),
            sender_avatar: sea_orm::ActiveValue::Set(
                sender_info.and_then(|u| u.avatar_url.clone()),
            ),
            content: sea_orm::ActiveValue::Set(content.to_string()),
            sent_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("post_message", e))?;

        // Live update: new entries are appended at subscribers without a
        // refresh.
        self.hub.broadcast(
            case_id,
            &serde_json::json!({
                "type": "message",
                "data": {
                    "id": saved.id,
                    "sender": &saved.sender,
                    "sender_name": &saved.sender_name,
                    "sender_avatar": &saved.sender_avatar,
                    "content": &saved.content,
                    "sent_at": saved.sent_at.to_string(),
                }
            })
            .to_string(),
        );

        Ok(saved)
    }
}
