use crate::{
    error::{AppError, AppResult},
    models::{
        case_message, share_token, AttachmentModel, Case, CaseMessage, CaseMessageModel,
        CaseModel, ShareToken, ShareTokenModel, UserModel,
    },
    utils::token::generate_share_token_id,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Supported token lifetimes, in days.
pub const ALLOWED_TTL_DAYS: &[i64] = &[1, 7, 30];

/// Read-only view handed to share-link visitors: the case with reporter
/// contact removed, plus its timeline.
#[derive(Debug)]
pub struct SharedCaseView {
    pub case: CaseModel,
    pub messages: Vec<CaseMessageModel>,
    pub attachments: Vec<AttachmentModel>,
    pub expires_at: chrono::NaiveDateTime,
}

/// Issues and resolves time-boxed capability tokens for external case
/// viewing. There is deliberately no revocation: a token stays valid
/// until its natural expiry.
pub struct ShareService {
    db: DatabaseConnection,
    frontend_url: String,
}

impl ShareService {
    pub fn new(db: DatabaseConnection) -> Self {
        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        Self { db, frontend_url }
    }

    /// Mint a token for the case and return it with its shareable URL.
    pub async fn issue(
        &self,
        case_id: i32,
        ttl_days: i64,
        actor: &UserModel,
    ) -> AppResult<(ShareTokenModel, String)> {
        if !ALLOWED_TTL_DAYS.contains(&ttl_days) {
            return Err(AppError::Validation(format!(
                "Share link duration must be one of {:?} days",
                ALLOWED_TTL_DAYS
            )));
        }

        // Verify the case exists before minting a credential for it.
        Case::find_by_id(case_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();
        let token = share_token::ActiveModel {
            id: sea_orm::ActiveValue::Set(generate_share_token_id()?),
            case_id: sea_orm::ActiveValue::Set(case_id),
            created_by: sea_orm::ActiveValue::Set(actor.id),
            created_at: sea_orm::ActiveValue::Set(now),
            expires_at: sea_orm::ActiveValue::Set(now + chrono::Duration::days(ttl_days)),
        };

        let saved = token
            .insert(&self.db)
            .await
            .map_err(|e| AppError::from_store_write("issue_share_token", e))?;

        let url = format!("{}/share/{}", self.frontend_url, saved.id);
        Ok((saved, url))
    }

    /// Resolve a token to the redacted case view. Unknown ids and expired
    /// tokens are distinct, user-facing failures; neither leaks whether a
    /// case exists.
    pub async fn resolve(&self, token_id: &str) -> AppResult<SharedCaseView> {
        let token = ShareToken::find_by_id(token_id.to_string())
            .one(&self.db)
            .await?
            .ok_or(AppError::InvalidLink)?;

        let now = chrono::Utc::now().naive_utc();
        if now > token.expires_at {
            return Err(AppError::ExpiredLink);
        }

        let case = Case::find_by_id(token.case_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::InvalidLink)?;

        let messages = CaseMessage::find()
            .filter(case_message::Column::CaseId.eq(case.id))
            .order_by_asc(case_message::Column::SentAt)
            .order_by_asc(case_message::Column::Id)
            .all(&self.db)
            .await?;
        let attachments = crate::services::attachment::AttachmentService::new(self.db.clone())
            .list(case.id)
            .await?;

        Ok(SharedCaseView {
            case: redact_reporter_contact(case),
            messages,
            attachments,
            expires_at: token.expires_at,
        })
    }
}

/// Hard invariant of the public share view: reporter contact is stripped
/// unconditionally, even for confidential cases, regardless of viewer.
pub fn redact_reporter_contact(mut case: CaseModel) -> CaseModel {
    case.reporter_name = None;
    case.reporter_email = None;
    case
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confidential_case() -> CaseModel {
        let now = chrono::Utc::now().naive_utc();
        CaseModel {
            id: 1,
            public_id: "IB-AB12-CD34EF".to_string(),
            title: "Ledger irregularities".to_string(),
            content: "Quarterly numbers do not add up.".to_string(),
            category: "Financial".to_string(),
            submission_type: "confidential".to_string(),
            reporter_name: Some("Jordan Vale".to_string()),
            reporter_email: Some("jordan@example.com".to_string()),
            severity: "High".to_string(),
            status: "In Progress".to_string(),
            ai_summary: Some("Possible accounting fraud.".to_string()),
            ai_risk_assessment: Some("High financial exposure.".to_string()),
            ai_suggested_steps: None,
            ai_reasoning: None,
            submitted_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn redaction_strips_contact_and_keeps_the_rest() {
        let redacted = redact_reporter_contact(confidential_case());
        assert_eq!(redacted.reporter_name, None);
        assert_eq!(redacted.reporter_email, None);
        assert_eq!(redacted.title, "Ledger irregularities");
        assert_eq!(redacted.submission_type, "confidential");
        assert_eq!(redacted.severity, "High");
    }

    #[test]
    fn ttl_catalog() {
        assert_eq!(ALLOWED_TTL_DAYS, &[1, 7, 30]);
    }
}
