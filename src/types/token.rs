pub type MigrationCancellationToken = tokio_util::sync::CancellationToken;

pub fn create_migration_cancellation_token() -> MigrationCancellationToken {
    tokio_util::sync::CancellationToken::new()
}
