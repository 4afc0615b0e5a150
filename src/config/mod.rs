use crate::types::{ClientConfigLocation, DatabaseKind, DatabasePassword, S3Credentials};

pub mod args;

#[derive(Debug, Clone)]
pub struct Config {
    pub source_bucket: String,
    pub destination_bucket: String,
    pub table_name: Option<String>,
    pub identifier_source: IdentifierSourceConfig,
    pub client_config: ClientConfig,
    pub force_retry_config: ForceRetryConfig,
    pub tracing_config: Option<TracingConfig>,
    pub batch_config: BatchConfig,
    pub rate_limit_objects: Option<u32>,
    pub max_keys: i32,
    pub dry_run: bool,
    pub warn_as_error: bool,
    pub auto_complete_shell: Option<clap_complete::shells::Shell>,
}

impl Config {
    pub fn is_interactive_input_required(&self) -> bool {
        if self.table_name.is_none() {
            return true;
        }

        match &self.identifier_source {
            IdentifierSourceConfig::Database(database_config) => {
                database_config.offset.is_none() || database_config.limit.is_none()
            }
            IdentifierSourceConfig::Literal { ids } => ids.is_none(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum IdentifierSourceConfig {
    Database(DatabaseConfig),
    Literal { ids: Option<String> },
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub kind: DatabaseKind,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: DatabasePassword,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub client_config_location: ClientConfigLocation,
    pub credential: S3Credentials,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub retry_config: RetryConfig,
    pub cli_timeout_config: CLITimeoutConfig,
    pub disable_stalled_stream_protection: bool,
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub aws_max_attempts: u32,
    pub initial_backoff_milliseconds: u64,
}

#[derive(Debug, Clone)]
pub struct CLITimeoutConfig {
    pub operation_timeout_milliseconds: Option<u64>,
    pub operation_attempt_timeout_milliseconds: Option<u64>,
    pub connect_timeout_milliseconds: Option<u64>,
    pub read_timeout_milliseconds: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
pub struct TracingConfig {
    pub tracing_level: log::Level,
    pub json_tracing: bool,
    pub aws_sdk_tracing: bool,
    pub span_events_tracing: bool,
    pub disable_color_tracing: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ForceRetryConfig {
    pub force_retry_count: u32,
    pub force_retry_interval_milliseconds: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    pub batch_size: usize,
    pub batch_interval_milliseconds: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            batch_interval_milliseconds: 1000,
        }
    }
}
