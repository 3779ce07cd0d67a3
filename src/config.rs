use crate::error::{AppError, AppResult};
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub database_min_connections: u32,
    #[serde(default = "default_connection_timeout")]
    pub database_connection_timeout: u64,

    pub redis_url: String,

    #[serde(default = "default_host")]
    pub server_host: String,
    #[serde(default = "default_port")]
    pub server_port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// HS256 shared secret of the identity provider
    #[serde(default)]
    pub identity_jwt_secret: Option<String>,
    /// RS256 public key (PEM); takes precedence over the shared secret
    #[serde(default)]
    pub identity_jwt_public_key: Option<String>,
    #[serde(default)]
    pub identity_jwt_issuer: Option<String>,
    #[serde(default)]
    pub identity_webhook_secret: Option<String>,

    #[serde(default)]
    pub coach_api_key: Option<String>,
    #[serde(default = "default_coach_api_url")]
    pub coach_api_url: String,
    #[serde(default = "default_coach_model")]
    pub coach_model: String,
    #[serde(default = "default_coach_max_attempts")]
    pub coach_max_attempts: u32,
    #[serde(default = "default_coach_initial_backoff_ms")]
    pub coach_initial_backoff_ms: u64,

    #[serde(default = "default_daily_task_limit")]
    pub daily_task_limit: usize,
    #[serde(default = "default_daily_cache_ttl")]
    pub daily_cache_ttl: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct IdentityConfig {
    pub jwt_secret: Option<String>,
    pub jwt_public_key: Option<String>,
    pub issuer: Option<String>,
    pub webhook_secret: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CoachConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

#[derive(Clone, Debug)]
pub struct RoadmapConfig {
    pub daily_task_limit: usize,
    pub daily_cache_ttl: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

// Default value functions
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connection_timeout() -> u64 {
    30
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_coach_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta/".to_string()
}
fn default_coach_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_coach_max_attempts() -> u32 {
    3
}
fn default_coach_initial_backoff_ms() -> u64 {
    1000
}
fn default_daily_task_limit() -> usize {
    3
}
fn default_daily_cache_ttl() -> u64 {
    300
} // 5 minutes
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>()
            .map_err(|e| AppError::Config(format!("Failed to load config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database_max_connections == 0 {
            return Err(AppError::Config(
                "DATABASE_MAX_CONNECTIONS must be > 0".to_string(),
            ));
        }

        if self.database_min_connections > self.database_max_connections {
            return Err(AppError::Config(
                "DATABASE_MIN_CONNECTIONS cannot be greater than DATABASE_MAX_CONNECTIONS"
                    .to_string(),
            ));
        }

        let has_secret = self
            .identity_jwt_secret
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        let has_public_key = self
            .identity_jwt_public_key
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty());
        if !has_secret && !has_public_key {
            return Err(AppError::Config(
                "IDENTITY_JWT_SECRET or IDENTITY_JWT_PUBLIC_KEY must be set".to_string(),
            ));
        }

        if self.coach_max_attempts == 0 {
            return Err(AppError::Config("COACH_MAX_ATTEMPTS must be > 0".to_string()));
        }

        if self.daily_task_limit == 0 {
            return Err(AppError::Config("DAILY_TASK_LIMIT must be > 0".to_string()));
        }

        Ok(())
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database_url.clone(),
            max_connections: self.database_max_connections,
            min_connections: self.database_min_connections,
            connection_timeout: self.database_connection_timeout,
        }
    }

    pub fn server(&self) -> ServerConfig {
        ServerConfig {
            host: self.server_host.clone(),
            port: self.server_port,
            cors_origins: self.cors_origins.clone(),
        }
    }

    pub fn identity(&self) -> IdentityConfig {
        IdentityConfig {
            jwt_secret: non_empty(&self.identity_jwt_secret),
            jwt_public_key: non_empty(&self.identity_jwt_public_key),
            issuer: non_empty(&self.identity_jwt_issuer),
            webhook_secret: non_empty(&self.identity_webhook_secret),
        }
    }

    pub fn coach(&self) -> CoachConfig {
        CoachConfig {
            api_key: non_empty(&self.coach_api_key),
            api_url: self.coach_api_url.clone(),
            model: self.coach_model.clone(),
            max_attempts: self.coach_max_attempts,
            initial_backoff_ms: self.coach_initial_backoff_ms,
        }
    }

    pub fn roadmap(&self) -> RoadmapConfig {
        RoadmapConfig {
            daily_task_limit: self.daily_task_limit,
            daily_cache_ttl: self.daily_cache_ttl,
        }
    }

    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.clone(),
            format: self.log_format.clone(),
        }
    }
}

// 空字符串的环境变量视为未设置
fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        serde_json::from_value(serde_json::json!({
            "database_url": "postgres://localhost/skillzbloom",
            "redis_url": "redis://127.0.0.1/",
            "identity_jwt_secret": "dev-secret"
        }))
        .expect("config should deserialize")
    }

    #[test]
    fn defaults_are_applied() {
        let config = base_config();
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.daily_task_limit, 3);
        assert_eq!(config.coach_max_attempts, 3);
        assert_eq!(config.coach_initial_backoff_ms, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn identity_key_is_required() {
        let mut config = base_config();
        config.identity_jwt_secret = Some("  ".to_string());
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        config.identity_jwt_public_key =
            Some("-----BEGIN PUBLIC KEY-----\n...".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.identity().jwt_secret, None);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let mut config = base_config();
        config.daily_task_limit = 0;
        assert!(config.validate().is_err());

        let mut config = base_config();
        config.database_max_connections = 0;
        assert!(config.validate().is_err());
    }
}
