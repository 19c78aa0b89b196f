use anyhow::Result;
use std::env;

/// Connection settings for the hosted AI advisory service. The client is
/// constructed once at startup from this config and passed down to the
/// intake flow; tests point `base_url` at a local stub server.
#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_seconds: u64,
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("ADVISOR_URL")
            .map_err(|_| anyhow::anyhow!("ADVISOR_URL environment variable must be set"))?;

        let api_key = env::var("ADVISOR_API_KEY").ok().filter(|k| !k.is_empty());

        let model = env::var("ADVISOR_MODEL").unwrap_or_else(|_| "ibx-triage-1".to_string());

        let timeout_seconds: u64 = env::var("ADVISOR_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            timeout_seconds,
        })
    }
}
