use crate::config::advisor::AdvisorConfig;
use crate::error::{AppError, AppResult};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::time::Duration;

/// Client for the hosted AI advisory service that triages incoming
/// reports. Three prompt endpoints are exposed: severity classification,
/// summarization, and investigation-step suggestion. Every failure maps to
/// `ExternalService`; the intake flow persists nothing unless all three
/// calls succeed.
#[derive(Clone)]
pub struct AdvisorClient {
    http: reqwest::Client,
    config: AdvisorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Classification {
    pub severity_level: String,
    pub reasoning: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Summary {
    pub summary: String,
    pub risk_assessment: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SuggestedSteps {
    pub steps: Vec<String>,
    pub reasoning: String,
}

impl AdvisorClient {
    pub fn new(config: AdvisorConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    pub async fn classify(&self, content: &str) -> AppResult<Classification> {
        let classification: Classification = self
            .post_json(
                "/v1/classify",
                json!({ "model": self.config.model, "content": content }),
            )
            .await?;

        // An off-catalog label from the model is a service failure, not a
        // value to store.
        if !crate::services::lifecycle::SEVERITIES.contains(&classification.severity_level.as_str())
        {
            return Err(AppError::ExternalService(format!(
                "Advisor returned unknown severity '{}'",
                classification.severity_level
            )));
        }

        Ok(classification)
    }

    pub async fn summarize(&self, content: &str) -> AppResult<Summary> {
        self.post_json(
            "/v1/summarize",
            json!({ "model": self.config.model, "content": content }),
        )
        .await
    }

    pub async fn suggest_steps(&self, content: &str, risk_level: &str) -> AppResult<SuggestedSteps> {
        self.post_json(
            "/v1/suggest-steps",
            json!({
                "model": self.config.model,
                "content": content,
                "risk_level": risk_level,
            }),
        )
        .await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> AppResult<T> {
        let url = format!("{}{}", self.config.base_url, path);

        let mut request = self.http.post(&url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Advisor unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ExternalService(format!(
                "Advisor returned {} for {}",
                status, path
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::ExternalService(format!("Invalid advisor response: {}", e)))
    }
}
