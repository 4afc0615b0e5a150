use std::env;

use rusty_fork::rusty_fork_test;
use tracing_subscriber::fmt::format::FmtSpan;

use s3migrate::config::TracingConfig;

const EVENT_FILTER_ENV_VAR: &str = "RUST_LOG";

pub fn init_tracing(config: &TracingConfig) {
    let fmt_span = if config.span_events_tracing {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let subscriber_builder = tracing_subscriber::fmt()
        .compact()
        .with_ansi(!config.disable_color_tracing)
        .with_span_events(fmt_span);

    let (event_filter, show_target) = build_event_filter(config);

    let subscriber_builder = subscriber_builder
        .with_env_filter(event_filter)
        .with_target(show_target);
    if config.json_tracing {
        subscriber_builder.json().init();
    } else {
        subscriber_builder.init();
    }
}

// RUST_LOG wins over the verbosity flags unless AWS SDK tracing is requested.
fn build_event_filter(config: &TracingConfig) -> (String, bool) {
    let tracing_level = config.tracing_level;

    if config.aws_sdk_tracing {
        return (
            format!(
                "s3migrate={tracing_level},sqlx={tracing_level},aws_smithy_runtime={tracing_level},aws_config={tracing_level},aws_sigv4={tracing_level}"
            ),
            true,
        );
    }

    match env::var(EVENT_FILTER_ENV_VAR) {
        Ok(event_filter) => (event_filter, true),
        Err(_) => (format!("s3migrate={tracing_level}"), false),
    }
}

rusty_fork_test! {
    #[test]
    fn init_json_tracing() {
        init_tracing(&TracingConfig {
            tracing_level: log::Level::Info,
            json_tracing: true,
            aws_sdk_tracing: false,
            span_events_tracing: false,
            disable_color_tracing: false});
    }

    #[test]
    fn init_aws_sdk_tracing() {
        init_tracing(&TracingConfig {
            tracing_level: log::Level::Debug,
            json_tracing: false,
            aws_sdk_tracing: true,
            span_events_tracing: true,
            disable_color_tracing: false,
        });
    }

    #[test]
    fn init_normal_tracing() {
        // runs in a separate process
        unsafe { env::remove_var(EVENT_FILTER_ENV_VAR) };

        let config = TracingConfig {
            tracing_level: log::Level::Warn,
            json_tracing: false,
            aws_sdk_tracing: false,
            span_events_tracing: false,
            disable_color_tracing: true,
        };
        assert_eq!(build_event_filter(&config), ("s3migrate=WARN".to_string(), false));

        init_tracing(&config);
    }

    #[test]
    fn init_with_env() {
        // runs in a separate process
        unsafe { env::set_var(EVENT_FILTER_ENV_VAR, "trace") };

        let config = TracingConfig {
            tracing_level: log::Level::Info,
            json_tracing: false,
            aws_sdk_tracing: false,
            span_events_tracing: false,
            disable_color_tracing: true,
        };
        assert_eq!(build_event_filter(&config), ("trace".to_string(), true));

        init_tracing(&config);
    }
}
