use config::builder::{ConfigBuilder, DefaultState};
use config::{ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::env;

const ENV_PREFIX: &str = "TOURBOOK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Memory,
    Redis,
}

/// The `[agent]` section of the service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    /// OpenAI-compatible endpoint root, without `/chat/completions`.
    pub base_url: String,
    /// Where the tour booking API is served; tools append `/api/v1/...`.
    pub backend_url: String,
    pub max_iterations: usize,
    pub request_timeout_seconds: u64,
    pub session_backend: SessionBackend,
    pub redis_url: String,
    pub session_ttl_seconds: Option<u64>,
}

#[derive(Deserialize)]
struct Root {
    agent: AgentSettings,
}

impl AgentSettings {
    /// Same layering as the API server: defaults, optional `config/*` files,
    /// then `TOURBOOK__AGENT__*`. `OPENAI_API_KEY` fills in a missing key.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let root: Root = defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        let mut settings = root.agent;
        if settings.api_key.as_deref().map_or(true, str::is_empty) {
            settings.api_key = env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty());
        }
        Ok(settings)
    }

    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let root: Root = defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(root.agent)
    }

    /// Enabled and holding a non-empty API key.
    pub fn is_ready(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("agent.enabled", true)?
        .set_default("agent.model", "gpt-4o-mini")?
        .set_default("agent.temperature", 0.7)?
        .set_default("agent.base_url", "https://api.openai.com/v1")?
        .set_default("agent.backend_url", "http://localhost:8000")?
        .set_default("agent.max_iterations", 5)?
        .set_default("agent.request_timeout_seconds", 60)?
        .set_default("agent.session_backend", "memory")?
        .set_default("agent.redis_url", "redis://127.0.0.1:6379")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = AgentSettings::from_toml("").unwrap();
        assert_eq!(settings.max_iterations, 5);
        assert_eq!(settings.session_backend, SessionBackend::Memory);
        assert!(settings.session_ttl_seconds.is_none());
        assert!(!settings.is_ready());
    }

    #[test]
    fn test_redis_backend_with_ttl() {
        let settings = AgentSettings::from_toml(
            r#"
            [agent]
            api_key = "sk-test"
            session_backend = "redis"
            session_ttl_seconds = 3600
            "#,
        )
        .unwrap();
        assert_eq!(settings.session_backend, SessionBackend::Redis);
        assert_eq!(settings.session_ttl_seconds, Some(3600));
        assert!(settings.is_ready());
    }

    #[test]
    fn test_disabled_is_never_ready() {
        let settings = AgentSettings::from_toml(
            r#"
            [agent]
            enabled = false
            api_key = "sk-test"
            "#,
        )
        .unwrap();
        assert!(!settings.is_ready());
    }
}
