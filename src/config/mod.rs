use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub filter: FilterConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl FilterConfig {
    /// Both limits at least 1, and the default never above the maximum
    pub fn clamped(self) -> Self {
        let max_limit = self.max_limit.max(1);
        Self {
            default_limit: self.default_limit.clamp(1, max_limit),
            max_limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL; when set it wins over the discrete fields below
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageBackend {
    S3,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub host: String,
    pub port: u16,
    pub access_key: String,
    #[serde(skip_serializing)]
    pub secret_access_key: String,
    pub region: String,
    /// Physical bucket that holds every logical bucket as a key prefix
    pub bucket: String,
    /// Logical bucket used when a request names none
    pub default_bucket: String,
    pub use_tls: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub jwt_issuer: String,
    pub jwt_expiry_hours: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_overrides(lookup)
    }

    fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server overrides
        if let Some(v) = lookup("BIND_ADDR") {
            self.server.bind_addr = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.server.log_level = v;
        }
        if let Some(v) = lookup("REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs = v.parse().unwrap_or(self.server.request_timeout_secs);
        }
        if let Some(v) = lookup("SHUTDOWN_GRACE_SECS") {
            self.server.shutdown_grace_secs = v.parse().unwrap_or(self.server.shutdown_grace_secs);
        }

        // Filter overrides
        if let Some(v) = lookup("FILTER_DEFAULT_LIMIT") {
            self.filter.default_limit = v.parse().unwrap_or(self.filter.default_limit);
        }
        if let Some(v) = lookup("FILTER_MAX_LIMIT") {
            self.filter.max_limit = v.parse().unwrap_or(self.filter.max_limit);
        }

        // Database overrides
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = lookup("PG_HOST") {
            self.database.host = v;
        }
        if let Some(v) = lookup("PG_PORT") {
            self.database.port = v.parse().unwrap_or(self.database.port);
        }
        if let Some(v) = lookup("PG_DATABASE") {
            self.database.database = v;
        }
        if let Some(v) = lookup("PG_USER") {
            self.database.user = v;
        }
        if let Some(v) = lookup("PG_PASSWORD") {
            self.database.password = v;
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Storage overrides
        if let Some(v) = lookup("STORAGE_BACKEND") {
            self.storage.backend = match v.to_ascii_lowercase().as_str() {
                "memory" | "in-memory" => StorageBackend::Memory,
                "s3" | "minio" => StorageBackend::S3,
                _ => self.storage.backend,
            };
        }
        if let Some(v) = lookup("STORAGE_HOST") {
            self.storage.host = v;
        }
        if let Some(v) = lookup("STORAGE_PORT") {
            self.storage.port = v.parse().unwrap_or(self.storage.port);
        }
        if let Some(v) = lookup("STORAGE_ACCESS_KEY") {
            self.storage.access_key = v;
        }
        if let Some(v) = lookup("STORAGE_SECRET_ACCESS_KEY") {
            self.storage.secret_access_key = v;
        }
        if let Some(v) = lookup("STORAGE_REGION") {
            self.storage.region = v;
        }
        if let Some(v) = lookup("STORAGE_BUCKET") {
            self.storage.bucket = v;
        }
        if let Some(v) = lookup("STORAGE_DEFAULT_BUCKET") {
            self.storage.default_bucket = v;
        }
        if let Some(v) = lookup("STORAGE_USE_TLS") {
            self.storage.use_tls = v.parse().unwrap_or(self.storage.use_tls);
        }
        if let Some(v) = lookup("STORAGE_TIMEOUT_SECS") {
            self.storage.timeout_secs = v.parse().unwrap_or(self.storage.timeout_secs);
        }

        // Security overrides
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Some(v) = lookup("JWT_ISSUER") {
            self.security.jwt_issuer = v;
        }
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }

        self.filter = self.filter.clamped();
        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                bind_addr: ":8080".to_string(),
                log_level: "debug".to_string(),
                request_timeout_secs: 30,
                shutdown_grace_secs: 10,
            },
            filter: FilterConfig {
                default_limit: 10,
                max_limit: 1000,
            },
            database: DatabaseConfig {
                url: None,
                host: "localhost".to_string(),
                port: 5432,
                database: "postgresdb".to_string(),
                user: "postgres".to_string(),
                password: "postgres".to_string(),
                max_connections: 10,
                connection_timeout: 5,
            },
            storage: StorageConfig {
                backend: StorageBackend::S3,
                host: "localhost".to_string(),
                port: 9000,
                access_key: "minio".to_string(),
                secret_access_key: "minio123".to_string(),
                region: "us-east-1".to_string(),
                bucket: "attachments".to_string(),
                default_bucket: "files".to_string(),
                use_tls: false,
                timeout_secs: 60,
            },
            security: SecurityConfig {
                enable_cors: true,
                jwt_issuer: "smart-survey-api".to_string(),
                jwt_expiry_hours: 24,
            },
        }
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.server.log_level = "info".to_string();
        config.database.max_connections = 50;
        config.filter.max_limit = 100;
        config.storage.use_tls = true;
        config.security.enable_cors = false;
        config
    }
}

impl ServerConfig {
    /// Socket address to bind. Accepts the `:8080` shorthand for all interfaces.
    pub fn socket_addr(&self) -> String {
        if self.bind_addr.starts_with(':') {
            format!("0.0.0.0{}", self.bind_addr)
        } else {
            self.bind_addr.clone()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl StorageConfig {
    pub fn endpoint(&self) -> String {
        let scheme = if self.use_tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
