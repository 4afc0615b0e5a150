use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow};

use s3migrate::Config;
use s3migrate::config::IdentifierSourceConfig;
use s3migrate::identifier::{IdentifierSourceBox, LiteralIdentifierSource, SqlIdentifierSource};
use s3migrate::types::error::S3migrateError;

/// Everything the migration needs that may have been left to interactive input.
pub struct MigrationRequest {
    pub table_name: String,
    pub identifier_source: IdentifierSourceBox,
}

/// Builds the request from the config, prompting on `writer` for every value that is missing.
pub fn resolve_migration_request<R: BufRead, W: Write>(
    config: &Config,
    reader: &mut R,
    writer: &mut W,
) -> Result<MigrationRequest> {
    let table_name = match &config.table_name {
        Some(table_name) => table_name.clone(),
        None => prompt_value(reader, writer, "Enter the table name: ")?,
    };
    if table_name.is_empty() {
        return Err(S3migrateError::EmptyTableName.into());
    }

    let identifier_source: IdentifierSourceBox = match &config.identifier_source {
        IdentifierSourceConfig::Database(database_config) => {
            let offset = match database_config.offset {
                Some(offset) => offset,
                None => prompt_non_negative(reader, writer, "Enter the offset: ")?,
            };
            let limit = match database_config.limit {
                Some(limit) => limit,
                None => prompt_non_negative(reader, writer, "Enter the limit: ")?,
            };

            Box::new(SqlIdentifierSource::new(
                database_config.clone(),
                &table_name,
                offset,
                limit,
            ))
        }
        IdentifierSourceConfig::Literal { ids } => {
            let ids = match ids {
                Some(ids) => ids.clone(),
                None => prompt_value(
                    reader,
                    writer,
                    "Enter the ids, separated by commas (e.g. 1,2,3,4): ",
                )?,
            };

            Box::new(LiteralIdentifierSource::new(&ids))
        }
    };

    Ok(MigrationRequest {
        table_name,
        identifier_source,
    })
}

fn prompt_value<R: BufRead, W: Write>(reader: &mut R, writer: &mut W, message: &str) -> Result<String> {
    write!(writer, "{message}").context("failed to write prompt.")?;
    writer.flush().context("failed to flush prompt.")?;

    let mut line = String::new();
    let read_bytes = reader
        .read_line(&mut line)
        .context("failed to read from stdin.")?;
    if read_bytes == 0 {
        return Err(anyhow!("stdin closed while waiting for input."));
    }

    Ok(line.trim().to_string())
}

fn prompt_non_negative<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
    message: &str,
) -> Result<i64> {
    let value = prompt_value(reader, writer, message)?;

    let number = value
        .parse::<i64>()
        .with_context(|| format!("not a number: {value}"))?;
    if number < 0 {
        return Err(anyhow!("must not be negative: {value}"));
    }

    Ok(number)
}
