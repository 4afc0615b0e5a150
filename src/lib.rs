/*!
# Overview
s3migrate copies the S3 objects that belong to database rows from one bucket to another.

Objects of a row are expected under `<table>s/<id>/` (the table name is pluralized by appending `s`
unless it already ends with `s`). s3migrate selects the ids, lists every object under each id's
prefix and copies it server-side into the destination bucket under the identical key.

## Features
- Identifier sources
  - MySQL and PostgreSQL: a `LIMIT`/`OFFSET` window of the `id` column, with bound parameters
    and a validated, quoted table name.
  - Literal list: a comma-separated list of ids. Tokens that are not decimal integers are ignored.

- Best-effort, per-object isolation
  A failed listing or copy is logged and counted, and the migration goes on with the next object
  or id. Optionally a failed copy is retried (`--force-retry-count`).

- Paced
  Ids are processed one at a time in batches (default 50). Between batches s3migrate pauses
  (default 1 second). Copies can also be rate limited (`--rate-limit-objects`).

- Complete listing
  Listings follow continuation tokens, so prefixes with more than one page of objects are copied
  completely.

Copies are idempotent, so a migration can simply be run again.

**NOTE: the table name is used as an SQL identifier. s3migrate is intended for trusted operators.**

## As a library
s3migrate CLI is a thin wrapper of this library.

Example usage
=============

```Toml
[dependencies]
s3migrate = "0.1"
tokio = { version = "1", features = ["full"] }
```

```no_run
use s3migrate::config::Config;
use s3migrate::config::args::parse_from_args;
use s3migrate::identifier::{LiteralIdentifierSource, fetch_identifiers_or_empty};
use s3migrate::migration::BatchCopier;
use s3migrate::storage::s3::S3StorageFactory;
use s3migrate::types::token::create_migration_cancellation_token;

#[tokio::main]
async fn main() {
    // You can use all the arguments for s3migrate CLI.
    let args = vec![
        "program_name",
        "--source-bucket",
        "source-bucket",
        "--destination-bucket",
        "destination-bucket",
        "--table-name",
        "order",
        "list",
        "--ids",
        "1,2,3",
    ];

    // s3migrate library converts the arguments to Config.
    let config = Config::try_from(parse_from_args(args).unwrap()).unwrap();

    let source = LiteralIdentifierSource::new("1,2,3");
    let identifiers = fetch_identifiers_or_empty(&source).await;

    let (stats_sender, stats_receiver) = async_channel::unbounded();
    let storage = S3StorageFactory::create(&config).await;
    let batch_copier = BatchCopier::new(
        &config,
        "order",
        storage,
        create_migration_cancellation_token(),
        stats_sender,
    );

    let report = batch_copier.run(&identifiers).await;
    stats_receiver.close();

    if report.has_failure() {
        println!("{} objects failed.", report.objects_failed);
    }
}
```
*/

pub use config::Config;
pub use config::args::CLIArgs;

pub mod config;
pub mod identifier;
pub mod migration;
pub mod storage;
pub mod types;
