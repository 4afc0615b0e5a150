const S3_SCHEME: &str = "s3://";

const EMPTY_BUCKET_NAME: &str = "bucket name must not be empty.";
const BUCKET_NAME_WITH_KEY: &str = "bucket name must not contain '/'.";

/// Accepts `bucket` or `s3://bucket`, returning the bare bucket name.
pub fn check_bucket_name(value: &str) -> Result<String, String> {
    let bucket = value.strip_prefix(S3_SCHEME).unwrap_or(value);
    let bucket = bucket.strip_suffix('/').unwrap_or(bucket);

    if bucket.is_empty() {
        return Err(EMPTY_BUCKET_NAME.to_string());
    }

    if bucket.contains('/') {
        return Err(BUCKET_NAME_WITH_KEY.to_string());
    }

    Ok(bucket.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_bucket_name() {
        init_dummy_tracing_subscriber();

        assert_eq!(check_bucket_name("my-bucket").unwrap(), "my-bucket");
        assert_eq!(check_bucket_name("s3://my-bucket").unwrap(), "my-bucket");
        assert_eq!(check_bucket_name("s3://my-bucket/").unwrap(), "my-bucket");
    }

    #[test]
    fn invalid_bucket_name() {
        init_dummy_tracing_subscriber();

        assert_eq!(check_bucket_name("").unwrap_err(), EMPTY_BUCKET_NAME);
        assert_eq!(check_bucket_name("s3://").unwrap_err(), EMPTY_BUCKET_NAME);
        assert_eq!(
            check_bucket_name("s3://my-bucket/prefix").unwrap_err(),
            BUCKET_NAME_WITH_KEY
        );
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
