//! Configuration management

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 5000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default deployment environment.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Default public domain used to build dataset DOI URLs.
pub const DEFAULT_DOMAIN: &str = "localhost";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Default deposition API base URL (the fakenodo service).
pub const DEFAULT_FAKENODO_URL: &str = "http://localhost:5001/api";

/// Default timeout for deposition API requests in seconds.
pub const DEFAULT_ZENODO_TIMEOUT_SECS: u64 = 30;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    /// `None` runs the server on the in-memory repositories.
    pub database: Option<DatabaseConfig>,
    pub cors: CorsConfig,
    pub zenodo: ZenodoConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    pub site: SiteConfig,
}

/// Public-facing site settings used when rendering links
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteConfig {
    /// `development`, `production`, ...
    pub environment: String,
    pub domain: String,
    /// Base URL under which badges are reachable, without trailing slash.
    pub public_url: String,
}

impl SiteConfig {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// URL of a dataset DOI on this site.
    pub fn doi_url(&self, doi: &str) -> String {
        let scheme = if self.is_development() { "http" } else { "https" };
        format!("{}://{}/doi/{}", scheme, self.domain, doi)
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            public_url: format!("http://{}:{}", DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

/// Deposition API client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZenodoConfig {
    /// API base, e.g. `http://localhost:5001/api`. `/depositions` is
    /// appended by the client when missing.
    pub url: String,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
}

impl ZenodoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ZenodoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_FAKENODO_URL.to_string(),
            access_token: None,
            timeout_secs: DEFAULT_ZENODO_TIMEOUT_SECS,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.parse().ok())
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("PIXELHUB_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string());
        let port = env_parse("PIXELHUB_PORT").unwrap_or(DEFAULT_SERVER_PORT);
        let domain = std::env::var("PIXELHUB_DOMAIN")
            .or_else(|_| std::env::var("DOMAIN"))
            .unwrap_or_else(|_| DEFAULT_DOMAIN.to_string());

        let config = Config {
            server: ServerConfig {
                shutdown_timeout_secs: env_parse("PIXELHUB_SHUTDOWN_TIMEOUT")
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
                site: SiteConfig {
                    environment: std::env::var("PIXELHUB_ENV")
                        .unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string()),
                    domain,
                    public_url: env_non_empty("PIXELHUB_PUBLIC_URL")
                        .map(|url| url.trim_end_matches('/').to_string())
                        .unwrap_or_else(|| format!("http://{}:{}", host, port)),
                },
                host,
                port,
            },
            database: env_non_empty("DATABASE_URL").map(|url| DatabaseConfig {
                url,
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: env_parse("DATABASE_MIN_CONNECTIONS")
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: env_parse("DATABASE_CONNECT_TIMEOUT")
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
            }),
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_parse("CORS_ALLOW_CREDENTIALS").unwrap_or(true),
            },
            zenodo: ZenodoConfig {
                url: env_non_empty("FAKENODO_URL").unwrap_or_else(|| DEFAULT_FAKENODO_URL.to_string()),
                access_token: env_non_empty("FAKENODO_TOKEN")
                    .or_else(|| env_non_empty("ZENODO_ACCESS_TOKEN")),
                timeout_secs: env_parse("ZENODO_TIMEOUT_SECS").unwrap_or(DEFAULT_ZENODO_TIMEOUT_SECS),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        if let Some(ref database) = self.database {
            if database.max_connections == 0 {
                anyhow::bail!("Database max_connections must be greater than 0");
            }

            if database.min_connections > database.max_connections {
                anyhow::bail!(
                    "Database min_connections ({}) cannot be greater than max_connections ({})",
                    database.min_connections,
                    database.max_connections
                );
            }
        }

        if self.zenodo.url.trim().is_empty() {
            anyhow::bail!("Deposition API URL cannot be empty");
        }

        if self.zenodo.timeout_secs == 0 {
            anyhow::bail!("Deposition API timeout must be greater than 0");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
                site: SiteConfig::default(),
            },
            database: None,
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            zenodo: ZenodoConfig::default(),
        }
    }
}
