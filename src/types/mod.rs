use std::fmt;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;

use zeroize_derive::{Zeroize, ZeroizeOnDrop};

pub mod error;
pub mod token;

pub const MIGRATION_SUMMARY_NAME: &str = "MIGRATION_SUMMARY";

#[derive(Debug, Clone, PartialEq)]
pub enum MigrationStatistics {
    CopyComplete { key: String },
    CopyError { key: String },
    IdentifierEmpty { identifier: String },
    IdentifierError { identifier: String },
    BatchComplete { batch_number: usize },
}

/// Counters for one run of the batch copier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub total_identifiers: usize,
    pub identifiers_processed: usize,
    pub identifiers_without_objects: usize,
    pub identifiers_with_list_error: usize,
    pub objects_copied: u64,
    pub objects_failed: u64,
    pub batches_processed: usize,
    pub cancelled: bool,
}

impl MigrationReport {
    pub fn has_failure(&self) -> bool {
        0 < self.objects_failed || 0 < self.identifiers_with_list_error
    }
}

/// One page of a prefix-scoped listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListObjectsPage {
    pub keys: Vec<String>,
    pub next_continuation_token: Option<String>,
}

impl ListObjectsPage {
    pub fn is_last_page(&self) -> bool {
        self.next_continuation_token.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    Mysql,
    Postgres,
}

impl DatabaseKind {
    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseKind::Mysql => 3306,
            DatabaseKind::Postgres => 5432,
        }
    }
}

impl fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseKind::Mysql => write!(f, "mysql"),
            DatabaseKind::Postgres => write!(f, "postgres"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfigLocation {
    pub aws_config_file: Option<PathBuf>,
    pub aws_shared_credentials_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub enum S3Credentials {
    Profile(String),
    Credentials { access_keys: AccessKeys },
    FromEnvironment,
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AccessKeys {
    pub access_key: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Debug for AccessKeys {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_struct("AccessKeys");
        let session_token = self
            .session_token
            .as_ref()
            .map_or("None", |_| "** redacted **");
        keys.field("access_key", &self.access_key)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &session_token);
        keys.finish()
    }
}

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DatabasePassword {
    pub password: String,
}

impl Debug for DatabasePassword {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut keys = f.debug_struct("DatabasePassword");
        keys.field("password", &"** redacted **");
        keys.finish()
    }
}
