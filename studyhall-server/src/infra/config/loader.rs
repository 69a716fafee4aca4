use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

use studyhall_core::pagination::LimitPolicy;

use super::{
    models::{
        Config, ConfigMetadata, CorsConfig, DatabaseConfig,
        DEFAULT_MAX_CONNECTIONS, PaginationConfig, ServerConfig, StorageConfig,
    },
    sources::{EnvConfig, FileConfig, FileLimitConfig, FilePaginationConfig},
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

const DEFAULT_CONFIG_LOCATIONS: [&str; 2] =
    ["studyhall.toml", "config/studyhall.toml"];

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

/// Builds a [`Config`] from defaults, an optional TOML file and the
/// environment, in increasing order of precedence.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        self.load_with_overrides(|_| {})
    }

    /// [`load`](Self::load) with command-line values applied on top of the
    /// environment snapshot before composition and validation.
    pub fn load_with_overrides(
        &self,
        overrides: impl FnOnce(&mut EnvConfig),
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        let mut env = EnvConfig::gather();
        overrides(&mut env);

        let mut load = self.load_with_env(env)?;
        load.config.metadata.env_file_loaded = env_file_loaded;
        Ok(load)
    }

    /// Like [`load`](Self::load) but with an explicit environment snapshot
    /// and without reading `.env`.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;

        let mut warnings = ConfigWarnings::default();
        if config_path.is_none() {
            warnings.push_with_hint(
                "No studyhall.toml detected; falling back to environment variables",
                "Pass --config or set STUDYHALL_CONFIG_PATH to use a configuration file",
            );
        }

        let config = compose_config(file_config.unwrap_or_default(), env, config_path);
        warnings.extend(validation::apply_guard_rails(&config)?);

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let explicit = self
            .options
            .config_path
            .clone()
            .or_else(|| env.config_path.clone());

        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigLoadError::MissingConfig { path });
                }
                path
            }
            None => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .map(PathBuf::from)
                .find(|candidate| candidate.exists())
            {
                Some(path) => path,
                None => return Ok((None, None)),
            },
        };

        let file_config = read_file_config(&path)?;
        Ok((Some(file_config), Some(path)))
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|err| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
    toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source: err,
    })
}

fn compose_config(
    file: FileConfig,
    env: EnvConfig,
    config_path: Option<PathBuf>,
) -> Config {
    let FileConfig {
        server: file_server,
        database: file_database,
        storage: file_storage,
        pagination: file_pagination,
        cors: file_cors,
        dev_mode: file_dev_mode,
    } = file;

    let defaults = ServerConfig::default();
    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or(defaults.host),
        port: env.server_port.or(file_server.port).unwrap_or(defaults.port),
    };

    let database = DatabaseConfig {
        url: env.database_url.or(file_database.url),
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS),
    };

    let storage = StorageConfig {
        in_memory: env.in_memory.or(file_storage.in_memory).unwrap_or(false),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_default(),
        allow_credentials: env
            .cors_allow_credentials
            .or(file_cors.allow_credentials)
            .unwrap_or(false),
    };

    Config {
        server,
        database,
        storage,
        pagination: compose_pagination(file_pagination),
        cors,
        dev_mode: env.dev_mode.or(file_dev_mode).unwrap_or(false),
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded: false,
        },
    }
}

fn compose_pagination(file: FilePaginationConfig) -> PaginationConfig {
    let defaults = PaginationConfig::default();
    let merge = |over: FileLimitConfig, base: LimitPolicy| {
        LimitPolicy::new(
            over.default.unwrap_or(base.default),
            over.max.unwrap_or(base.max),
        )
    };

    PaginationConfig {
        feed: merge(file.feed, defaults.feed),
        comments: merge(file.comments, defaults.comments),
        replies: merge(file.replies, defaults.replies),
        saved: merge(file.saved, defaults.saved),
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn environment_overrides_file_and_file_overrides_defaults() {
        let file = write_config(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [storage]
            in_memory = true

            [pagination.replies]
            default = 5
            "#,
        );
        let env = EnvConfig {
            server_port: Some(9090),
            ..EnvConfig::default()
        };

        let load = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(env)
            .expect("config loads");

        assert_eq!(load.config.server.host, "127.0.0.1");
        assert_eq!(load.config.server.port, 9090);
        assert!(load.config.storage.in_memory);
        assert_eq!(load.config.pagination.replies, LimitPolicy::new(5, 40));
        assert_eq!(load.config.pagination.feed, LimitPolicy::new(20, 50));
        assert_eq!(load.config.metadata.config_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = ConfigLoader::new()
            .with_config_path("/definitely/not/here/studyhall.toml")
            .load_with_env(EnvConfig::default())
            .expect_err("missing file");
        assert!(matches!(err, ConfigLoadError::MissingConfig { .. }));
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let file = write_config("[server\nport = ");
        let err = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(EnvConfig::default())
            .expect_err("parse failure");
        assert!(matches!(err, ConfigLoadError::Parse { .. }));
    }

    #[test]
    fn guard_rails_run_on_the_composed_config() {
        let file = write_config("[database]\nmax_connections = 4\n");
        let err = ConfigLoader::new()
            .with_config_path(file.path())
            .load_with_env(EnvConfig::default())
            .expect_err("no database url");
        assert!(matches!(
            err,
            ConfigLoadError::GuardRail(ConfigGuardRailError::MissingDatabaseUrl)
        ));
    }
}
