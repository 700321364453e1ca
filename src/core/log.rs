use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

/// Our own crate plus the HTTP request traces from `serve`.
const APP_TARGETS: [&str; 2] = ["txagg", "tower_http"];

fn app_filter(verbose: bool) -> Targets {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    APP_TARGETS
        .iter()
        .fold(Targets::new(), |targets, target| targets.with_target(*target, level))
}

/// Logs go to stderr so `aggregate --json` output stays parseable.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_filter(verbose))
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_verbose_enables_debug_for_app_targets() {
        let filter = app_filter(true);

        assert!(filter.would_enable("txagg::core::aggregator", &Level::DEBUG));
        assert!(filter.would_enable("tower_http::trace", &Level::DEBUG));
        assert!(!filter.would_enable("hyper", &Level::ERROR));
    }

    #[test]
    fn test_quiet_keeps_warnings_only() {
        let filter = app_filter(false);

        assert!(filter.would_enable("txagg", &Level::WARN));
        assert!(!filter.would_enable("txagg", &Level::INFO));
    }
}
