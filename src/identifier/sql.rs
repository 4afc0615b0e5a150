use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{debug, trace};

use crate::config::DatabaseConfig;
use crate::identifier::IdentifierSource;
use crate::types::DatabaseKind;
use crate::types::error::S3migrateError;

const TABLE_NAME_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$";

/// Selects one window of ids from a table, in the database's natural row order.
///
/// The table name is validated when ids are fetched, so a malformed name yields an error from
/// `fetch_ids` before any connection is made.
pub struct SqlIdentifierSource {
    database_config: DatabaseConfig,
    table_name: String,
    offset: i64,
    limit: i64,
}

impl SqlIdentifierSource {
    pub fn new(
        database_config: DatabaseConfig,
        table_name: &str,
        offset: i64,
        limit: i64,
    ) -> Self {
        Self {
            database_config,
            table_name: table_name.to_string(),
            offset,
            limit,
        }
    }

    fn select_query(&self) -> String {
        build_select_query(self.database_config.kind, &self.table_name)
    }

    async fn fetch_mysql_ids(&self) -> Result<Vec<String>> {
        let connect_options = MySqlConnectOptions::new()
            .host(&self.database_config.host)
            .port(self.database_config.port)
            .username(&self.database_config.user)
            .password(&self.database_config.password.password)
            .database(&self.database_config.database);

        let pool = MySqlPoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .context("could not connect to mysql.")?;
        trace!("mysql connection established.");

        let query = self.select_query();
        let result = sqlx::query_scalar::<_, String>(&query)
            .bind(self.limit)
            .bind(self.offset)
            .fetch_all(&pool)
            .await;

        pool.close().await;
        trace!("mysql connection closed.");

        result.context("sqlx::query_scalar() failed on mysql.")
    }

    async fn fetch_postgres_ids(&self) -> Result<Vec<String>> {
        let connect_options = PgConnectOptions::new()
            .host(&self.database_config.host)
            .port(self.database_config.port)
            .username(&self.database_config.user)
            .password(&self.database_config.password.password)
            .database(&self.database_config.database);

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await
            .context("could not connect to postgres.")?;
        trace!("postgres connection established.");

        let query = self.select_query();
        let result = sqlx::query_scalar::<_, String>(&query)
            .bind(self.limit)
            .bind(self.offset)
            .fetch_all(&pool)
            .await;

        pool.close().await;
        trace!("postgres connection closed.");

        result.context("sqlx::query_scalar() failed on postgres.")
    }
}

#[async_trait]
impl IdentifierSource for SqlIdentifierSource {
    async fn fetch_ids(&self) -> Result<Vec<String>> {
        debug!(
            database = self.database_config.kind.to_string(),
            host = self.database_config.host,
            table = self.table_name,
            offset = self.offset,
            limit = self.limit,
            "fetching identifiers."
        );

        validate_table_name(&self.table_name)?;

        match self.database_config.kind {
            DatabaseKind::Mysql => self.fetch_mysql_ids().await,
            DatabaseKind::Postgres => self.fetch_postgres_ids().await,
        }
    }

    fn describe(&self) -> String {
        format!(
            "{}://{}:{}/{} table={} offset={} limit={}",
            self.database_config.kind,
            self.database_config.host,
            self.database_config.port,
            self.database_config.database,
            self.table_name,
            self.offset,
            self.limit
        )
    }
}

pub fn validate_table_name(table_name: &str) -> Result<()> {
    if table_name.is_empty() {
        return Err(S3migrateError::EmptyTableName.into());
    }

    let pattern = Regex::new(TABLE_NAME_PATTERN)?;
    if !pattern.is_match(table_name) {
        return Err(S3migrateError::InvalidTableName(table_name.to_string()).into());
    }

    Ok(())
}

/// Quotes each dot separated part. The name must already be validated.
///
/// PostgreSQL folds unquoted names to lower case, so the parts are folded before quoting to
/// resolve the same relation an unquoted name would.
pub fn quote_table_name(kind: DatabaseKind, table_name: &str) -> String {
    table_name
        .split('.')
        .map(|part| match kind {
            DatabaseKind::Mysql => format!("`{part}`"),
            DatabaseKind::Postgres => format!("\"{}\"", part.to_lowercase()),
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// The id is cast to text so that any integer column type decodes as a string.
pub fn build_select_query(kind: DatabaseKind, table_name: &str) -> String {
    let quoted_table_name = quote_table_name(kind, table_name);

    match kind {
        DatabaseKind::Mysql => {
            format!("SELECT CAST(id AS CHAR) AS id FROM {quoted_table_name} LIMIT ? OFFSET ?")
        }
        DatabaseKind::Postgres => {
            format!("SELECT id::text AS id FROM {quoted_table_name} LIMIT $1 OFFSET $2")
        }
    }
}
