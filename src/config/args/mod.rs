use crate::Config;
use crate::config::args::value_parser::{bucket, url};
use crate::config::{
    BatchConfig, CLITimeoutConfig, ClientConfig, DatabaseConfig, ForceRetryConfig,
    IdentifierSourceConfig, RetryConfig, TracingConfig,
};
use crate::types::{
    AccessKeys, ClientConfigLocation, DatabaseKind, DatabasePassword, S3Credentials,
};
use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
#[cfg(feature = "version")]
use shadow_rs::shadow;
use std::ffi::OsString;
use std::path::PathBuf;
use std::str::FromStr;

mod value_parser;

const DEFAULT_BATCH_SIZE: u32 = 50;
const DEFAULT_BATCH_INTERVAL_MILLISECONDS: u64 = 1000;
const DEFAULT_AWS_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_FORCE_RETRY_COUNT: u32 = 0;
const DEFAULT_FORCE_RETRY_INTERVAL_MILLISECONDS: u64 = 1000;
const DEFAULT_INITIAL_BACKOFF_MILLISECONDS: u64 = 100;
const DEFAULT_JSON_TRACING: bool = false;
const DEFAULT_AWS_SDK_TRACING: bool = false;
const DEFAULT_SPAN_EVENTS_TRACING: bool = false;
const DEFAULT_DISABLE_COLOR_TRACING: bool = false;
const DEFAULT_WARN_AS_ERROR: bool = false;
const DEFAULT_FORCE_PATH_STYLE: bool = false;
const DEFAULT_DRY_RUN: bool = false;
const DEFAULT_MAX_KEYS: i32 = 1000;
const DEFAULT_DISABLE_STALLED_STREAM_PROTECTION: bool = false;

const NO_SOURCE_BUCKET_SPECIFIED: &str =
    "source bucket must be specified with --source-bucket or SOURCE_BUCKET\n";
const NO_DESTINATION_BUCKET_SPECIFIED: &str =
    "destination bucket must be specified with --destination-bucket or DESTINATION_BUCKET\n";
const SAME_SOURCE_AND_DESTINATION_BUCKET: &str =
    "source and destination bucket must be different\n";
const NO_IDENTIFIER_SOURCE_SPECIFIED: &str =
    "identifier source must be specified: mysql | postgres | list\n";
const NO_SECRET_ACCESS_KEY_SPECIFIED: &str =
    "--aws-secret-access-key must be specified with --aws-access-key-id\n";

#[cfg(feature = "version")]
shadow!(build);

/// Copies the objects stored under `<table>s/<id>/` from a source bucket to a destination bucket,
/// for each id selected from a database table or given as a literal list.
///
/// The table name is used as an SQL identifier. It is validated and quoted, but this tool is
/// meant to be run by trusted operators only.
#[derive(Parser, Clone, Debug)]
#[cfg_attr(feature = "version", command(version=format!("{} ({} {}), {}", build::PKG_VERSION, build::SHORT_COMMIT, build::BUILD_TARGET, build::RUST_VERSION)))]
pub struct CLIArgs {
    #[command(subcommand)]
    identifier_source: Option<IdentifierSourceCommand>,

    /// bucket to copy objects from
    #[arg(long, env, value_parser = bucket::check_bucket_name, help_heading = "General")]
    source_bucket: Option<String>,

    /// bucket to copy objects to
    #[arg(long, env, value_parser = bucket::check_bucket_name, help_heading = "General")]
    destination_bucket: Option<String>,

    /// table whose ids select the objects. its plural form is used as the top-level prefix. prompted if not specified
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "General")]
    table_name: Option<String>,

    /// A simulation mode. objects are listed but not copied
    #[arg(long, env, default_value_t = DEFAULT_DRY_RUN, help_heading = "General")]
    dry_run: bool,

    /// location of the file that the AWS CLI uses to store configuration profiles
    #[arg(long, env, value_name = "FILE", help_heading = "AWS Configuration")]
    aws_config_file: Option<PathBuf>,

    /// location of the file that the AWS CLI uses to store access keys
    #[arg(long, env, value_name = "FILE", help_heading = "AWS Configuration")]
    aws_shared_credentials_file: Option<PathBuf>,

    /// AWS CLI profile
    #[arg(long, env = "S3MIGRATE_PROFILE", help_heading = "AWS Configuration")]
    profile: Option<String>,

    /// access key
    #[arg(long, env, help_heading = "AWS Configuration")]
    aws_access_key_id: Option<String>,

    /// secret access key
    #[arg(long, env, requires = "aws_access_key_id", help_heading = "AWS Configuration")]
    aws_secret_access_key: Option<String>,

    /// session token
    #[arg(long, env, requires = "aws_access_key_id", help_heading = "AWS Configuration")]
    aws_session_token: Option<String>,

    /// region of the buckets
    #[arg(long, env, value_parser = NonEmptyStringValueParser::new(), help_heading = "AWS Configuration")]
    aws_region: Option<String>,

    /// endpoint url
    #[arg(long, env, value_parser = url::check_scheme, help_heading = "AWS Configuration")]
    endpoint_url: Option<String>,

    /// force path-style addressing
    #[arg(long, env, default_value_t = DEFAULT_FORCE_PATH_STYLE, help_heading = "AWS Configuration")]
    force_path_style: bool,

    /// number of ids processed before pausing
    #[arg(long, env, default_value_t = DEFAULT_BATCH_SIZE, value_parser = clap::value_parser!(u32).range(1..), help_heading = "Performance")]
    batch_size: u32,

    /// pause between batches. 0 disables the pause
    #[arg(long, env, default_value_t = DEFAULT_BATCH_INTERVAL_MILLISECONDS, value_name = "batch_interval", help_heading = "Performance")]
    batch_interval_milliseconds: u64,

    /// rate limit copies per second
    #[arg(long, env, value_parser = clap::value_parser!(u32).range(1..), help_heading = "Performance")]
    rate_limit_objects: Option<u32>,

    #[clap(flatten)]
    verbosity: Verbosity<InfoLevel>,

    #[arg(long, env, default_value_t = DEFAULT_JSON_TRACING, help_heading = "Tracing/Logging")]
    json_tracing: bool,

    #[arg(long, env, default_value_t = DEFAULT_AWS_SDK_TRACING, help_heading = "Tracing/Logging")]
    aws_sdk_tracing: bool,

    #[arg(long, env, default_value_t = DEFAULT_SPAN_EVENTS_TRACING, help_heading = "Tracing/Logging")]
    span_events_tracing: bool,

    #[arg(long, env, default_value_t = DEFAULT_DISABLE_COLOR_TRACING, help_heading = "Tracing/Logging")]
    disable_color_tracing: bool,

    /// maximum number of attempts of the AWS SDK for each request
    #[arg(long, env, default_value_t = DEFAULT_AWS_MAX_ATTEMPTS, value_name = "max_attempts", help_heading = "Retry Options")]
    aws_max_attempts: u32,

    #[arg(long, env, default_value_t = DEFAULT_INITIAL_BACKOFF_MILLISECONDS, value_name = "initial_backoff", help_heading = "Retry Options")]
    initial_backoff_milliseconds: u64,

    /// number of additional attempts for a failed copy. 0 means a failed copy is only logged
    #[arg(long, env, default_value_t = DEFAULT_FORCE_RETRY_COUNT, help_heading = "Retry Options")]
    force_retry_count: u32,

    #[arg(long, env, default_value_t = DEFAULT_FORCE_RETRY_INTERVAL_MILLISECONDS, value_name = "force_retry_interval", help_heading = "Retry Options")]
    force_retry_interval_milliseconds: u64,

    #[arg(
        long,
        env,
        value_name = "operation_timeout",
        help_heading = "Timeout Options"
    )]
    operation_timeout_milliseconds: Option<u64>,

    #[arg(
        long,
        env,
        value_name = "operation_attempt_timeout",
        help_heading = "Timeout Options"
    )]
    operation_attempt_timeout_milliseconds: Option<u64>,

    #[arg(
        long,
        env,
        value_name = "connect_timeout",
        help_heading = "Timeout Options"
    )]
    connect_timeout_milliseconds: Option<u64>,

    #[arg(
        long,
        env,
        value_name = "read_timeout",
        help_heading = "Timeout Options"
    )]
    read_timeout_milliseconds: Option<u64>,

    /// exit with code 3 when any listing or copy has failed
    #[arg(long, env, default_value_t = DEFAULT_WARN_AS_ERROR, help_heading = "Advanced")]
    warn_as_error: bool,

    /// page size of ListObjectsV2
    #[arg(long, env, default_value_t = DEFAULT_MAX_KEYS, value_parser = clap::value_parser!(i32).range(1..=1000), help_heading = "Advanced")]
    max_keys: i32,

    #[arg(long, env, value_name = "SHELL", value_parser = clap_complete::shells::Shell::from_str, help_heading = "Advanced")]
    auto_complete_shell: Option<clap_complete::shells::Shell>,

    #[arg(long, env, default_value_t = DEFAULT_DISABLE_STALLED_STREAM_PROTECTION, help_heading = "Advanced")]
    disable_stalled_stream_protection: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum IdentifierSourceCommand {
    /// select ids from a MySQL table with LIMIT/OFFSET
    Mysql(MysqlArgs),
    /// select ids from a PostgreSQL table with LIMIT/OFFSET
    Postgres(PostgresArgs),
    /// use a comma-separated id list
    List(ListArgs),
}

#[derive(Args, Clone, Debug)]
pub struct MysqlArgs {
    #[arg(long, env, help_heading = "MySQL")]
    mysql_host: Option<String>,

    #[arg(long, env, default_value_t = DatabaseKind::Mysql.default_port(), help_heading = "MySQL")]
    mysql_port: u16,

    #[arg(long, env, help_heading = "MySQL")]
    mysql_database: Option<String>,

    #[arg(long, env, help_heading = "MySQL")]
    mysql_user: Option<String>,

    #[arg(long, env, help_heading = "MySQL")]
    mysql_password: Option<String>,

    #[clap(flatten)]
    window: QueryWindowArgs,
}

#[derive(Args, Clone, Debug)]
pub struct PostgresArgs {
    #[arg(long, env, help_heading = "PostgreSQL")]
    postgres_host: Option<String>,

    #[arg(long, env, default_value_t = DatabaseKind::Postgres.default_port(), help_heading = "PostgreSQL")]
    postgres_port: u16,

    #[arg(long, env, help_heading = "PostgreSQL")]
    postgres_database: Option<String>,

    #[arg(long, env, help_heading = "PostgreSQL")]
    postgres_user: Option<String>,

    #[arg(long, env, help_heading = "PostgreSQL")]
    postgres_password: Option<String>,

    #[clap(flatten)]
    window: QueryWindowArgs,
}

#[derive(Args, Clone, Debug)]
pub struct QueryWindowArgs {
    /// number of rows to skip. prompted if not specified
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..), help_heading = "Query")]
    offset: Option<i64>,

    /// number of ids to fetch. prompted if not specified
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..), help_heading = "Query")]
    limit: Option<i64>,
}

#[derive(Args, Clone, Debug)]
pub struct ListArgs {
    /// comma-separated ids, e.g. 1,2,3,4. prompted if not specified
    #[arg(long, help_heading = "List")]
    ids: Option<String>,
}

pub fn parse_from_args<I, T>(args: I) -> Result<CLIArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CLIArgs::try_parse_from(args)
}

pub fn build_config_from_args<I, T>(args: I) -> Result<Config, String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let config_args = CLIArgs::try_parse_from(args).map_err(|e| e.to_string())?;
    crate::Config::try_from(config_args)
}

impl CLIArgs {
    fn validate_config(&self) -> Result<(), String> {
        self.check_bucket_specified()?;
        self.check_bucket_conflict()?;
        self.check_credentials()?;

        Ok(())
    }

    fn check_bucket_specified(&self) -> Result<(), String> {
        if self.source_bucket.is_none() {
            return Err(NO_SOURCE_BUCKET_SPECIFIED.to_string());
        }

        if self.destination_bucket.is_none() {
            return Err(NO_DESTINATION_BUCKET_SPECIFIED.to_string());
        }

        Ok(())
    }

    fn check_bucket_conflict(&self) -> Result<(), String> {
        if self.source_bucket == self.destination_bucket {
            return Err(SAME_SOURCE_AND_DESTINATION_BUCKET.to_string());
        }

        Ok(())
    }

    fn check_credentials(&self) -> Result<(), String> {
        if self.aws_access_key_id.is_some() && self.aws_secret_access_key.is_none() {
            return Err(NO_SECRET_ACCESS_KEY_SPECIFIED.to_string());
        }

        Ok(())
    }

    fn build_client_config(&self) -> ClientConfig {
        let credential = if let Some(profile) = self.profile.clone() {
            S3Credentials::Profile(profile)
        } else if let Some(access_key) = self.aws_access_key_id.clone() {
            S3Credentials::Credentials {
                access_keys: AccessKeys {
                    access_key,
                    secret_access_key: self.aws_secret_access_key.clone().unwrap_or_default(),
                    session_token: self.aws_session_token.clone(),
                },
            }
        } else {
            S3Credentials::FromEnvironment
        };

        ClientConfig {
            client_config_location: ClientConfigLocation {
                aws_config_file: self.aws_config_file.clone(),
                aws_shared_credentials_file: self.aws_shared_credentials_file.clone(),
            },
            credential,
            region: self.aws_region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            force_path_style: self.force_path_style,
            retry_config: RetryConfig {
                aws_max_attempts: self.aws_max_attempts,
                initial_backoff_milliseconds: self.initial_backoff_milliseconds,
            },
            cli_timeout_config: CLITimeoutConfig {
                operation_timeout_milliseconds: self.operation_timeout_milliseconds,
                operation_attempt_timeout_milliseconds: self.operation_attempt_timeout_milliseconds,
                connect_timeout_milliseconds: self.connect_timeout_milliseconds,
                read_timeout_milliseconds: self.read_timeout_milliseconds,
            },
            disable_stalled_stream_protection: self.disable_stalled_stream_protection,
        }
    }

    fn build_identifier_source_config(&self) -> Result<IdentifierSourceConfig, String> {
        match &self.identifier_source {
            Some(IdentifierSourceCommand::Mysql(args)) => {
                Ok(IdentifierSourceConfig::Database(DatabaseConfig {
                    kind: DatabaseKind::Mysql,
                    host: required_value(&args.mysql_host, "mysql-host")?,
                    port: args.mysql_port,
                    database: required_value(&args.mysql_database, "mysql-database")?,
                    user: required_value(&args.mysql_user, "mysql-user")?,
                    password: DatabasePassword {
                        password: required_value(&args.mysql_password, "mysql-password")?,
                    },
                    offset: args.window.offset,
                    limit: args.window.limit,
                }))
            }
            Some(IdentifierSourceCommand::Postgres(args)) => {
                Ok(IdentifierSourceConfig::Database(DatabaseConfig {
                    kind: DatabaseKind::Postgres,
                    host: required_value(&args.postgres_host, "postgres-host")?,
                    port: args.postgres_port,
                    database: required_value(&args.postgres_database, "postgres-database")?,
                    user: required_value(&args.postgres_user, "postgres-user")?,
                    password: DatabasePassword {
                        password: required_value(&args.postgres_password, "postgres-password")?,
                    },
                    offset: args.window.offset,
                    limit: args.window.limit,
                }))
            }
            Some(IdentifierSourceCommand::List(args)) => Ok(IdentifierSourceConfig::Literal {
                ids: args.ids.clone(),
            }),
            None => Err(NO_IDENTIFIER_SOURCE_SPECIFIED.to_string()),
        }
    }

    fn build_tracing_config(&self) -> Option<TracingConfig> {
        let mut tracing_config = self.verbosity.log_level().map(|log_level| TracingConfig {
            tracing_level: log_level,
            json_tracing: self.json_tracing,
            aws_sdk_tracing: self.aws_sdk_tracing,
            span_events_tracing: self.span_events_tracing,
            disable_color_tracing: self.disable_color_tracing,
        });

        // dry-run output is the list of objects, so it must be visible.
        if self.dry_run {
            if tracing_config.is_none() {
                tracing_config = Some(TracingConfig {
                    tracing_level: log::Level::Info,
                    json_tracing: DEFAULT_JSON_TRACING,
                    aws_sdk_tracing: DEFAULT_AWS_SDK_TRACING,
                    span_events_tracing: DEFAULT_SPAN_EVENTS_TRACING,
                    disable_color_tracing: DEFAULT_DISABLE_COLOR_TRACING,
                });
            } else if let Some(config) = tracing_config {
                if config.tracing_level < log::Level::Info {
                    tracing_config = Some(TracingConfig {
                        tracing_level: log::Level::Info,
                        ..config
                    });
                }
            }
        }

        tracing_config
    }
}

fn required_value(value: &Option<String>, option_name: &str) -> Result<String, String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value.clone()),
        _ => Err(format!(
            "--{option_name} (or {}) must be specified\n",
            option_name.to_uppercase().replace('-', "_")
        )),
    }
}

impl TryFrom<CLIArgs> for Config {
    type Error = String;

    fn try_from(value: CLIArgs) -> Result<Self, Self::Error> {
        // completion script generation needs no other configuration.
        if value.auto_complete_shell.is_some() {
            return Ok(Config {
                source_bucket: value.source_bucket.clone().unwrap_or_default(),
                destination_bucket: value.destination_bucket.clone().unwrap_or_default(),
                table_name: value.table_name.clone(),
                identifier_source: IdentifierSourceConfig::Literal { ids: None },
                client_config: value.build_client_config(),
                force_retry_config: ForceRetryConfig {
                    force_retry_count: value.force_retry_count,
                    force_retry_interval_milliseconds: value.force_retry_interval_milliseconds,
                },
                tracing_config: None,
                batch_config: BatchConfig::default(),
                rate_limit_objects: None,
                max_keys: value.max_keys,
                dry_run: value.dry_run,
                warn_as_error: value.warn_as_error,
                auto_complete_shell: value.auto_complete_shell,
            });
        }

        value.validate_config()?;

        let identifier_source = value.build_identifier_source_config()?;
        let client_config = value.build_client_config();
        let tracing_config = value.build_tracing_config();

        Ok(Config {
            source_bucket: value.source_bucket.unwrap_or_default(),
            destination_bucket: value.destination_bucket.unwrap_or_default(),
            table_name: value.table_name,
            identifier_source,
            client_config,
            force_retry_config: ForceRetryConfig {
                force_retry_count: value.force_retry_count,
                force_retry_interval_milliseconds: value.force_retry_interval_milliseconds,
            },
            tracing_config,
            batch_config: BatchConfig {
                batch_size: value.batch_size as usize,
                batch_interval_milliseconds: value.batch_interval_milliseconds,
            },
            rate_limit_objects: value.rate_limit_objects,
            max_keys: value.max_keys,
            dry_run: value.dry_run,
            warn_as_error: value.warn_as_error,
            auto_complete_shell: value.auto_complete_shell,
        })
    }
}
