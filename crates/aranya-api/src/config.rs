//! Service configuration, read from the environment.
use anyhow::{bail, Context};
use std::time::Duration;

use aranya_model::GeminiConfig;
use aranya_stages::OrchestratorOptions;

pub const DEFAULT_ADDR: &str = "0.0.0.0:8787";
pub const DEFAULT_STAGE_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: String,
    pub gemini: GeminiConfig,
    /// `None` disables the per-stage deadline
    pub stage_timeout: Option<Duration>,
    pub dedupe_identification: bool,
    /// YAML file replacing the bundled prompts
    pub prompts_path: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            gemini: GeminiConfig::default(),
            stage_timeout: Some(Duration::from_secs(DEFAULT_STAGE_TIMEOUT_SECS)),
            dedupe_identification: false,
            prompts_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(key) = get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")) {
            config.gemini.api_key = key;
        }
        if let Some(model) = get("ARANYA_MODEL") {
            config.gemini.model = model;
        }
        if let Some(endpoint) = get("ARANYA_MODEL_ENDPOINT") {
            config.gemini.endpoint = endpoint;
        }
        if let Some(addr) = get("ARANYA_ADDR") {
            config.addr = addr;
        }
        if let Some(secs) = get("ARANYA_STAGE_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("ARANYA_STAGE_TIMEOUT_SECS is not a number: {}", secs))?;
            config.stage_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(flag) = get("ARANYA_DEDUPE_IDENTIFICATION") {
            config.dedupe_identification = parse_flag(&flag)
                .with_context(|| "ARANYA_DEDUPE_IDENTIFICATION must be true or false")?;
        }
        config.prompts_path = get("ARANYA_PROMPTS_PATH");

        Ok(config)
    }

    pub fn orchestrator_options(&self) -> OrchestratorOptions {
        OrchestratorOptions {
            stage_timeout: self.stage_timeout,
            dedupe_identification: self.dedupe_identification,
        }
    }

    pub fn has_credential(&self) -> bool {
        !self.gemini.api_key.is_empty()
    }
}

fn parse_flag(value: &str) -> anyhow::Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognised flag value '{}'", other),
    }
}
