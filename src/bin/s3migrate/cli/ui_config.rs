use s3migrate::Config;

// progress lines would interleave with info logs
pub fn is_progress_indicator_needed(config: &Config) -> bool {
    match &config.tracing_config {
        None => true,
        Some(tracing_config) => {
            tracing_config.tracing_level <= log::Level::Warn && !tracing_config.json_tracing
        }
    }
}

pub fn is_show_result_needed(config: &Config) -> bool {
    match &config.tracing_config {
        None => true,
        Some(tracing_config) => !tracing_config.json_tracing,
    }
}

#[cfg(test)]
mod tests {
    use s3migrate::config::args::parse_from_args;

    use super::*;

    fn build_config(extra_args: &[&str]) -> Config {
        let mut args = vec![
            "s3migrate",
            "--source-bucket",
            "source-bucket",
            "--destination-bucket",
            "destination-bucket",
        ];
        args.extend_from_slice(extra_args);
        args.push("list");

        Config::try_from(parse_from_args(args).unwrap()).unwrap()
    }

    #[test]
    fn is_progress_indicator_needed_default() {
        init_dummy_tracing_subscriber();

        assert!(!is_progress_indicator_needed(&build_config(&[])));
    }

    #[test]
    fn is_progress_indicator_needed_quiet() {
        init_dummy_tracing_subscriber();

        assert!(is_progress_indicator_needed(&build_config(&["-q"])));
    }

    #[test]
    fn is_progress_indicator_needed_no_tracing_config() {
        init_dummy_tracing_subscriber();

        assert!(is_progress_indicator_needed(&build_config(&["-qqq"])));
    }

    #[test]
    fn is_progress_indicator_needed_json_tracing() {
        init_dummy_tracing_subscriber();

        assert!(!is_progress_indicator_needed(&build_config(&[
            "-q",
            "--json-tracing"
        ])));
    }

    #[test]
    fn is_show_result_needed_default() {
        init_dummy_tracing_subscriber();

        assert!(is_show_result_needed(&build_config(&[])));
        assert!(is_show_result_needed(&build_config(&["-qqq"])));
    }

    #[test]
    fn is_show_result_needed_json_tracing() {
        init_dummy_tracing_subscriber();

        assert!(!is_show_result_needed(&build_config(&["--json-tracing"])));
    }

    fn init_dummy_tracing_subscriber() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("dummy=trace")
            .try_init();
    }
}
