use anyhow::{Context, Result};

const DEFAULT_LLM_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub llm_api_key: String,
    pub llm_api_base: String,
    pub llm_chat_model: String,
    pub llm_transcription_model: String,
    pub llm_timeout_secs: u64,
    /// HMAC secret for the `identity` cookie.
    pub identity_secret: String,
    /// Where protected interview routes send callers who fail the gate.
    pub dashboard_url: String,
    pub port: u16,
    pub rust_log: String,
}

/// Everything the AI clients need. Built from `Config` and handed to each
/// client constructor so tests can build clients without touching the env.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_base: String,
    pub api_key: String,
    pub chat_model: String,
    pub transcription_model: String,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            llm_api_key: require_env("LLM_API_KEY")?,
            llm_api_base: optional_env("LLM_API_BASE", DEFAULT_LLM_API_BASE),
            llm_chat_model: optional_env("LLM_CHAT_MODEL", DEFAULT_CHAT_MODEL),
            llm_transcription_model: optional_env(
                "LLM_TRANSCRIPTION_MODEL",
                DEFAULT_TRANSCRIPTION_MODEL,
            ),
            llm_timeout_secs: optional_env("LLM_TIMEOUT_SECS", "120")
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            identity_secret: require_env("IDENTITY_SECRET")?,
            dashboard_url: optional_env("DASHBOARD_URL", "/dashboard"),
            port: optional_env("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }

    pub fn llm(&self) -> LlmConfig {
        LlmConfig {
            api_base: self.llm_api_base.trim_end_matches('/').to_string(),
            api_key: self.llm_api_key.clone(),
            chat_model: self.llm_chat_model.clone(),
            transcription_model: self.llm_transcription_model.clone(),
            timeout_secs: self.llm_timeout_secs,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl Config {
    /// Config for handler tests. Never reads the environment.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/hirewise_test".to_string(),
            s3_bucket: "resumes".to_string(),
            s3_endpoint: "http://localhost:9000".to_string(),
            aws_access_key_id: "test".to_string(),
            aws_secret_access_key: "test".to_string(),
            llm_api_key: "test-key".to_string(),
            llm_api_base: DEFAULT_LLM_API_BASE.to_string(),
            llm_chat_model: DEFAULT_CHAT_MODEL.to_string(),
            llm_transcription_model: DEFAULT_TRANSCRIPTION_MODEL.to_string(),
            llm_timeout_secs: 5,
            identity_secret: "test-identity-secret".to_string(),
            dashboard_url: "/dashboard".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
