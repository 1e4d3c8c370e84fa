use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Root of the REST API, e.g. http://localhost:8080/api
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default env_logger filter when RUST_LOG is not set
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, an optional `school-admin` config
    /// file and `SCHOOL_ADMIN__*` environment variables, in that order
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = config::Config::builder();

        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        config = config.add_source(config::File::with_name("school-admin").required(false));

        // SCHOOL_ADMIN__BACKEND__BASE_URL -> backend.base_url
        config = config.add_source(
            config::Environment::with_prefix("SCHOOL_ADMIN")
                .prefix_separator("__")
                .separator("__"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
        assert!(config.backend.base_url.starts_with("http://"));
    }

    #[test]
    fn test_load_without_sources_yields_defaults() {
        let config = AppConfig::load().unwrap();
        assert!(!config.backend.base_url.is_empty());
        assert!(config.backend.timeout_secs > 0);
    }
}
