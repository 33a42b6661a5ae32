use figment::providers::{Env, Format, Toml};
use figment::Figment;
use log::warn;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
        }
    }
}

impl DatabaseConfig {
    /// Config value wins over the DATABASE_URL environment variable.
    pub fn resolved_url(&self) -> String {
        self.url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
}

impl AuthConfig {
    pub fn resolved_secret(&self) -> String {
        self.jwt_secret
            .clone()
            .or_else(|| std::env::var("JWT_SECRET").ok())
            .unwrap_or_else(|| {
                warn!("JWT_SECRET not set, using default development secret - DO NOT USE IN PRODUCTION");
                "dev-secret-key-change-in-production-minimum-32-chars".to_string()
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Number of completed outbound actions targeted per week.
    pub weekly_goal: i64,
    /// Fixed offset from UTC for the agent's calendar day, in minutes.
    pub timezone_offset_minutes: i32,
    pub recent_activity_limit: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            weekly_goal: 50,
            // AEST; the served territory does not observe daylight saving.
            timezone_offset_minutes: 600,
            recent_activity_limit: 10,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("propserver.toml"))
            .merge(Env::prefixed("PROPSERVER_").split("__"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.dashboard.weekly_goal, 50);
        assert_eq!(config.dashboard.timezone_offset_minutes, 600);
        assert_eq!(config.dashboard.recent_activity_limit, 10);
    }
}
