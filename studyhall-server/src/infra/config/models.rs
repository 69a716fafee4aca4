use std::path::PathBuf;

use studyhall_core::pagination::{COMMENT_LIMITS, FEED_LIMITS, LimitPolicy, REPLY_LIMITS};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub pagination: PaginationConfig,
    pub cors: CorsConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Keep everything in process memory instead of PostgreSQL.
    pub in_memory: bool,
}

/// Page size bounds per list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    pub feed: LimitPolicy,
    pub comments: LimitPolicy,
    pub replies: LimitPolicy,
    pub saved: LimitPolicy,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            feed: FEED_LIMITS,
            comments: COMMENT_LIMITS,
            replies: REPLY_LIMITS,
            saved: FEED_LIMITS,
        }
    }
}

impl PaginationConfig {
    pub fn policies(&self) -> [(&'static str, LimitPolicy); 4] {
        [
            ("feed", self.feed),
            ("comments", self.comments),
            ("replies", self.replies),
            ("saved", self.saved),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
