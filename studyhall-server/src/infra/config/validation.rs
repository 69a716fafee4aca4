use axum::http::HeaderValue;
use thiserror::Error;

use super::models::{Config, CorsConfig, PaginationConfig};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("DATABASE_URL is required unless the in-memory store is enabled")]
    MissingDatabaseUrl,
    #[error("invalid {endpoint} page limits: {reason}")]
    InvalidPageLimits {
        endpoint: &'static str,
        reason: String,
    },
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
    #[error("CORS credentials cannot be combined with a wildcard origin")]
    CredentialedCorsWildcard,
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if config.storage.in_memory {
        warnings.push_with_hint(
            "In-memory store enabled; posts and comments are lost on restart",
            "Unset STUDYHALL_IN_MEMORY and provide DATABASE_URL for persistent storage",
        );
    } else if config.database.url.is_none() {
        return Err(ConfigGuardRailError::MissingDatabaseUrl);
    }

    validate_page_limits(&config.pagination)?;

    if config.cors.is_wildcard_included() {
        if config.cors.allow_credentials {
            return Err(ConfigGuardRailError::CredentialedCorsWildcard);
        }
        if !config.dev_mode {
            return Err(ConfigGuardRailError::DangerousCorsWildcard);
        }
    }
    validate_cors(&config.cors)?;

    Ok(warnings)
}

fn validate_page_limits(
    pagination: &PaginationConfig,
) -> Result<(), ConfigGuardRailError> {
    for (endpoint, policy) in pagination.policies() {
        let reason = if policy.max == 0 {
            Some("max must be at least 1".to_string())
        } else if policy.default == 0 {
            Some("default must be at least 1".to_string())
        } else if policy.default > policy.max {
            Some(format!(
                "default {} exceeds max {}",
                policy.default, policy.max
            ))
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(ConfigGuardRailError::InvalidPageLimits {
                endpoint,
                reason,
            });
        }
    }
    Ok(())
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    for origin in &cors.allowed_origins {
        if origin.trim() == "*" {
            continue;
        }
        if HeaderValue::from_str(origin).is_err() {
            return Err(ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("origin '{origin}' is not a valid header value"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyhall_core::pagination::LimitPolicy;

    fn in_memory() -> Config {
        let mut config = Config::default();
        config.storage.in_memory = true;
        config
    }

    #[test]
    fn database_url_required_without_in_memory_store() {
        let config = Config::default();
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::MissingDatabaseUrl)
        ));

        let warnings = apply_guard_rails(&in_memory()).expect("in-memory is valid");
        assert_eq!(warnings.items.len(), 1);
    }

    #[test]
    fn default_above_max_is_rejected() {
        let mut config = in_memory();
        config.pagination.replies = LimitPolicy::new(50, 40);
        let err = apply_guard_rails(&config).expect_err("bad limits");
        assert!(matches!(
            err,
            ConfigGuardRailError::InvalidPageLimits { endpoint: "replies", .. }
        ));
    }

    #[test]
    fn wildcard_cors_only_in_dev_mode() {
        let mut config = in_memory();
        config.cors.allowed_origins = vec!["*".to_string()];
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::DangerousCorsWildcard)
        ));

        config.dev_mode = true;
        assert!(apply_guard_rails(&config).is_ok());
    }

    #[test]
    fn wildcard_with_credentials_is_rejected_even_in_dev_mode() {
        let mut config = in_memory();
        config.dev_mode = true;
        config.cors.allowed_origins = vec!["*".to_string()];
        config.cors.allow_credentials = true;
        assert!(matches!(
            apply_guard_rails(&config),
            Err(ConfigGuardRailError::CredentialedCorsWildcard)
        ));

        config.cors.allowed_origins = vec!["https://campus.example".to_string()];
        assert!(apply_guard_rails(&config).is_ok());
    }
}
