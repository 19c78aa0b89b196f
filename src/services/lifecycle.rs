use crate::{
    error::{AppError, AppResult},
    models::{
        case, case_assignee, case_message, Case, CaseAssignee, CaseModel, StatusDefinition,
        User, UserModel,
    },
    services::audit::AuditService,
    websocket::hub::CaseStreamHub,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

pub const SEVERITIES: &[&str] = &["Low", "Medium", "High", "Critical"];

pub const STATUS_NEW: &str = "New";
pub const STATUS_IN_PROGRESS: &str = "In Progress";
pub const STATUS_RESOLVED: &str = "Resolved";
pub const STATUS_CASE_CLOSED: &str = "Case Closed";

/// Statuses reachable only through dedicated operations: creation sets
/// New, the close flow sets Resolved. Generic status selection must never
/// land on these.
pub const MANUAL_SELECTION_EXCLUDED: &[&str] = &[STATUS_RESOLVED, STATUS_NEW, STATUS_CASE_CLOSED];

/// State machine over a case's status, severity and assignee set. Every
/// operation checks the terminal-state precondition before any write and
/// appends exactly one audit entry on success. The store itself cannot
/// enforce these rules, so this service is the policy boundary every
/// mutating path goes through.
pub struct LifecycleService {
    db: DatabaseConnection,
    hub: CaseStreamHub,
}

impl LifecycleService {
    pub fn new(db: DatabaseConnection, hub: CaseStreamHub) -> Self {
        Self { db, hub }
    }

    /// Assign a single officer: replaces the assignee set and pulls a New
    /// case into In Progress.
    pub async fn assign(
        &self,
        case_id: i32,
        user_id: i32,
        actor: &UserModel,
    ) -> AppResult<CaseModel> {
        let case = self.load_open_case(case_id).await?;
        let assignee = self.load_user(user_id).await?;

        self.replace_assignee_rows(case_id, &[assignee.id]).await?;

        let force_in_progress = case.status == STATUS_NEW;
        let updated = if force_in_progress {
            self.write_status(case, STATUS_IN_PROGRESS).await?
        } else {
            case
        };

        self.audit(&updated, actor, &format!("assigned the case to {}", assignee.name))
            .await?;
        self.broadcast_case_updated(&updated);
        Ok(updated)
    }

    /// Replace the whole assignee set.
    pub async fn transfer(
        &self,
        case_id: i32,
        user_ids: &[i32],
        actor: &UserModel,
    ) -> AppResult<CaseModel> {
        let case = self.load_open_case(case_id).await?;
        let users = self.load_users(user_ids).await?;

        let ids: Vec<i32> = users.iter().map(|u| u.id).collect();
        self.replace_assignee_rows(case_id, &ids).await?;

        let names = join_names(&users);
        self.audit(&case, actor, &format!("transferred the case to {}", names))
            .await?;
        self.broadcast_case_updated(&case);
        Ok(case)
    }

    /// Union the given identities into the existing assignee set,
    /// deduplicated by id, preserving existing order.
    pub async fn add_assignees(
        &self,
        case_id: i32,
        user_ids: &[i32],
        actor: &UserModel,
    ) -> AppResult<CaseModel> {
        let case = self.load_open_case(case_id).await?;
        let users = self.load_users(user_ids).await?;

        let existing = CaseAssignee::find()
            .filter(case_assignee::Column::CaseId.eq(case_id))
            .order_by_asc(case_assignee::Column::Position)
            .all(&self.db)
            .await?;
        let existing_ids: Vec<i32> = existing.iter().map(|a| a.user_id).collect();
        let mut next_position = existing.iter().map(|a| a.position + 1).max().unwrap_or(0);

        let now = chrono::Utc::now().naive_utc();
        for user in &users {
            if existing_ids.contains(&user.id) {
                continue;
            }
            let row = case_assignee::ActiveModel {
                case_id: sea_orm::ActiveValue::Set(case_id),
                user_id: sea_orm::ActiveValue::Set(user.id),
                position: sea_orm::ActiveValue::Set(next_position),
                assigned_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            };
            row.insert(&self.db)
                .await
                .map_err(|e| AppError::from_store_write("add_assignees", e))?;
            next_position += 1;
        }

        let names = join_names(&users);
        self.audit(&case, actor, &format!("added {} to the case", names))
            .await?;
        self.broadcast_case_updated(&case);
        Ok(case)
    }

    /// Generic status selection. The target must resolve to a catalog
    /// entry outside the reserved set; New/Resolved/Case Closed are only
    /// reachable through creation and the close flow.
    pub async fn change_status(
        &self,
        case_id: i32,
        status_definition_id: i32,
        actor: &UserModel,
    ) -> AppResult<CaseModel> {
        let case = self.load_open_case(case_id).await?;

        let definition = StatusDefinition::find_by_id(status_definition_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if MANUAL_SELECTION_EXCLUDED.contains(&definition.name.as_str()) {
            return Err(AppError::InvalidTransition(format!(
                "Status \"{}\" cannot be selected directly",
                definition.name
            )));
        }

        let old_status = case.status.clone();
        let updated = self.write_status(case, &definition.name).await?;

        self.audit(
            &updated,
            actor,
            &format!("changed status from {} to {}", old_status, definition.name),
        )
        .await?;
        self.broadcast_case_updated(&updated);
        Ok(updated)
    }

    /// Severity can move in either direction; there is no ordering
    /// constraint between the four levels.
    pub async fn change_severity(
        &self,
        case_id: i32,
        severity: &str,
        actor: &UserModel,
    ) -> AppResult<CaseModel> {
        if !SEVERITIES.contains(&severity) {
            return Err(AppError::Validation(format!(
                "Severity must be one of: {}",
                SEVERITIES.join(", ")
            )));
        }

        let case = self.load_open_case(case_id).await?;
        let old_severity = case.severity.clone();

        let now = chrono::Utc::now().naive_utc();
        let mut active: case::ActiveModel = case.into();
        active.severity = sea_orm::ActiveValue::Set(severity.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);
        let updated = active
            .update(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("change_severity", e))?;

        self.audit(
            &updated,
            actor,
            &format!("changed severity from {} to {}", old_severity, severity),
        )
        .await?;
        self.broadcast_case_updated(&updated);
        Ok(updated)
    }

    /// The only path into the terminal state. Appends a system-authored
    /// closing message attributed to the closing officer, then the audit
    /// entry. Closing an already-Resolved case fails before any write, so
    /// no duplicate message or audit line can appear.
    pub async fn close(
        &self,
        case_id: i32,
        actor: &UserModel,
        remarks: Option<&str>,
    ) -> AppResult<CaseModel> {
        let case = self.load_open_case(case_id).await?;

        let remarks = remarks.map(str::trim).filter(|r| !r.is_empty());
        let content = format!(
            "Case closed with the following remarks: {}",
            remarks.unwrap_or("No remarks provided.")
        );

        let now = chrono::Utc::now().naive_utc();
        let message = case_message::ActiveModel {
            case_id: sea_orm::ActiveValue::Set(case_id),
            sender: sea_orm::ActiveValue::Set("officer".to_string()),
            sender_user_id: sea_orm::ActiveValue::Set(Some(actor.id)),
            sender_name: sea_orm::ActiveValue::Set(Some(actor.name.clone())),
            sender_avatar: sea_orm::ActiveValue::Set(actor.avatar_url.clone()),
            content: sea_orm::ActiveValue::Set(content),
            sent_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        let message = message
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("close_case", e))?;

        let updated = self.write_status(case, STATUS_RESOLVED).await?;

        self.audit(
            &updated,
            actor,
            "closed the case and marked it as \"Resolved\"",
        )
        .await?;

        self.hub.broadcast(
            updated.id,
            &serde_json::json!({
                "type": "message",
                "data": {
                    "id": message.id,
                    "sender": "officer",
                    "sender_name": &message.sender_name,
                    "content": &message.content,
                    "sent_at": message.sent_at.to_string(),
                }
            })
            .to_string(),
        );
        self.broadcast_case_updated(&updated);
        Ok(updated)
    }

    /// Assignee identities in assignment order.
    pub async fn assignees(&self, case_id: i32) -> AppResult<Vec<UserModel>> {
        let rows = CaseAssignee::find()
            .filter(case_assignee::Column::CaseId.eq(case_id))
            .order_by_asc(case_assignee::Column::Position)
            .all(&self.db)
            .await?;

        let ids: Vec<i32> = rows.iter().map(|r| r.user_id).collect();
        let users = User::find()
            .filter(crate::models::user::Column::Id.is_in(ids.clone()))
            .all(&self.db)
            .await?;

        // Re-order the fetched identities by assignment position.
        let mut ordered = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = users.iter().find(|u| u.id == id) {
                ordered.push(user.clone());
            }
        }
        Ok(ordered)
    }

    async fn load_open_case(&self, case_id: i32) -> AppResult<CaseModel> {
        let case = Case::find_by_id(case_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if case.status == STATUS_RESOLVED {
            return Err(AppError::InvalidState(
                "Case is resolved and can no longer be modified".to_string(),
            ));
        }
        Ok(case)
    }

    async fn load_user(&self, user_id: i32) -> AppResult<UserModel> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn load_users(&self, user_ids: &[i32]) -> AppResult<Vec<UserModel>> {
        if user_ids.is_empty() {
            return Err(AppError::Validation(
                "At least one assignee is required".to_string(),
            ));
        }

        // Dedup while keeping the caller's order.
        let mut unique: Vec<i32> = Vec::with_capacity(user_ids.len());
        for id in user_ids {
            if !unique.contains(id) {
                unique.push(*id);
            }
        }

        let found = User::find()
            .filter(crate::models::user::Column::Id.is_in(unique.clone()))
            .all(&self.db)
            .await?;

        let mut ordered = Vec::with_capacity(unique.len());
        for id in &unique {
            match found.iter().find(|u| u.id == *id) {
                Some(user) => ordered.push(user.clone()),
                None => return Err(AppError::NotFound),
            }
        }
        Ok(ordered)
    }

    async fn replace_assignee_rows(&self, case_id: i32, user_ids: &[i32]) -> AppResult<()> {
        CaseAssignee::delete_many()
            .filter(case_assignee::Column::CaseId.eq(case_id))
            .exec(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("replace_assignees", e))?;

        let now = chrono::Utc::now().naive_utc();
        for (position, user_id) in user_ids.iter().enumerate() {
            let row = case_assignee::ActiveModel {
                case_id: sea_orm::ActiveValue::Set(case_id),
                user_id: sea_orm::ActiveValue::Set(*user_id),
                position: sea_orm::ActiveValue::Set(position as i32),
                assigned_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            };
            row.insert(&self.db)
                .await
                .map_err(|e| AppError::from_store_write("replace_assignees", e))?;
        }
        Ok(())
    }

    async fn write_status(&self, case: CaseModel, status: &str) -> AppResult<CaseModel> {
        let now = chrono::Utc::now().naive_utc();
        let mut active: case::ActiveModel = case.into();
        active.status = sea_orm::ActiveValue::Set(status.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active
            .update(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("change_status", e))
    }

    async fn audit(&self, case: &CaseModel, actor: &UserModel, action: &str) -> AppResult<()> {
        AuditService::new(self.db.clone())
            .append(Some(case.id), actor, action)
            .await?;
        Ok(())
    }

    fn broadcast_case_updated(&self, case: &CaseModel) {
        self.hub.broadcast(
            case.id,
            &serde_json::json!({
                "type": "case_updated",
                "data": {
                    "public_id": &case.public_id,
                    "status": &case.status,
                    "severity": &case.severity,
                }
            })
            .to_string(),
        );
    }
}

fn join_names(users: &[UserModel]) -> String {
    users
        .iter()
        .map(|u| u.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
