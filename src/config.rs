use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub seed_sample_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Authentication happens upstream; these settings describe how the
/// authenticated principal reaches us and where anonymous viewers are sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub login_url: String,
    pub user_header: String,
    pub username_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            login_url: "/accounts/login/".to_string(),
            user_header: "x-remote-user".to_string(),
            username_header: "x-remote-user-name".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = AuthConfig::default();
        Ok(Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:data/sentinel_comments.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .unwrap_or(5),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            auth: AuthConfig {
                login_url: env::var("LOGIN_URL").unwrap_or(defaults.login_url),
                user_header: env::var("AUTH_USER_HEADER")
                    .unwrap_or(defaults.user_header)
                    .to_ascii_lowercase(),
                username_header: env::var("AUTH_USERNAME_HEADER")
                    .unwrap_or(defaults.username_header)
                    .to_ascii_lowercase(),
            },
            seed_sample_data: env::var("SEED_SAMPLE_DATA")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    /// In-memory database on a single pooled connection, no seeding.
    pub fn for_tests() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            auth: AuthConfig::default(),
            seed_sample_data: false,
        }
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
