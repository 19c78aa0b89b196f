use crate::{
    error::{AppError, AppResult},
    models::{case, category, CaseModel, Category},
    services::{advisor::AdvisorClient, lifecycle::STATUS_NEW},
    utils::tracking::generate_tracking_code,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

pub const SUBMISSION_ANONYMOUS: &str = "anonymous";
pub const SUBMISSION_CONFIDENTIAL: &str = "confidential";

#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: String,
    pub category: String,
    pub content: String,
    pub submission_type: String,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
}

/// Public submission flow. The advisory calls and the insert form an
/// all-or-nothing unit: severity classification and summarization run
/// concurrently, step suggestion waits on the severity result, and the
/// case row is only written after all three responses are in hand.
pub struct IntakeService {
    db: DatabaseConnection,
    advisor: AdvisorClient,
}

impl IntakeService {
    pub fn new(db: DatabaseConnection, advisor: AdvisorClient) -> Self {
        Self { db, advisor }
    }

    pub async fn submit(&self, input: NewReport) -> AppResult<CaseModel> {
        let (reporter_name, reporter_email) = self.validate(&input).await?;

        let (classification, summary) = tokio::try_join!(
            self.advisor.classify(&input.content),
            self.advisor.summarize(&input.content),
        )?;
        let steps = self
            .advisor
            .suggest_steps(&input.content, &classification.severity_level)
            .await?;

        let now = chrono::Utc::now().naive_utc();

        // Tracking codes are random, so a collision is a unique-index
        // race, not an exhausted space; regenerate and retry a couple of
        // times.
        let mut last_err: Option<sea_orm::DbErr> = None;
        for _ in 0..3 {
            let public_id = generate_tracking_code()?;
            let model = case::ActiveModel {
                public_id: sea_orm::ActiveValue::Set(public_id),
                title: sea_orm::ActiveValue::Set(input.title.trim().to_string()),
                content: sea_orm::ActiveValue::Set(input.content.trim().to_string()),
                category: sea_orm::ActiveValue::Set(input.category.clone()),
                submission_type: sea_orm::ActiveValue::Set(input.submission_type.clone()),
                reporter_name: sea_orm::ActiveValue::Set(reporter_name.clone()),
                reporter_email: sea_orm::ActiveValue::Set(reporter_email.clone()),
                severity: sea_orm::ActiveValue::Set(classification.severity_level.clone()),
                status: sea_orm::ActiveValue::Set(STATUS_NEW.to_string()),
                ai_summary: sea_orm::ActiveValue::Set(Some(summary.summary.clone())),
                ai_risk_assessment: sea_orm::ActiveValue::Set(Some(
                    summary.risk_assessment.clone(),
                )),
                ai_suggested_steps: sea_orm::ActiveValue::Set(Some(serde_json::json!(steps.steps))),
                ai_reasoning: sea_orm::ActiveValue::Set(Some(classification.reasoning.clone())),
                submitted_at: sea_orm::ActiveValue::Set(now),
                updated_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            };

            match model.insert(&self.db).await {
                Ok(saved) => {
                    tracing::info!(
                        public_id = %saved.public_id,
                        severity = %saved.severity,
                        "report submitted"
                    );
                    return Ok(saved);
                }
                Err(e) if is_unique_violation(&e) => {
                    last_err = Some(e);
                    continue;
                }
                Err(e) => return Err(AppError::from_store_write("submit_report", e)),
            }
        }

        Err(AppError::from_store_write(
            "submit_report",
            last_err.unwrap_or(sea_orm::DbErr::Custom(
                "tracking code collision retries exhausted".to_string(),
            )),
        ))
    }

    /// Field checks plus the confidentiality rules: a confidential report
    /// must carry contact details, an anonymous one must not — whatever
    /// the client sent, nothing identifying is stored for anonymous.
    async fn validate(&self, input: &NewReport) -> AppResult<(Option<String>, Option<String>)> {
        let category_exists = Category::find()
            .filter(category::Column::Name.eq(input.category.clone()))
            .one(&self.db)
            .await?
            .is_some();
        if !category_exists {
            return Err(AppError::Validation(format!(
                "Unknown category: {}",
                input.category
            )));
        }

        match input.submission_type.as_str() {
            SUBMISSION_ANONYMOUS => Ok((None, None)),
            SUBMISSION_CONFIDENTIAL => {
                let name = input
                    .reporter_name
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty());
                let email = input
                    .reporter_email
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty());
                match (name, email) {
                    (Some(n), Some(e)) => Ok((Some(n.to_string()), Some(e.to_string()))),
                    _ => Err(AppError::Validation(
                        "Confidential reports require your name and email".to_string(),
                    )),
                }
            }
            other => Err(AppError::Validation(format!(
                "Unknown submission type: {}",
                other
            ))),
        }
    }
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    let text = err.to_string();
    text.contains("duplicate key") || text.contains("unique constraint")
}
