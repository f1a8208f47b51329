use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogLevel;

/// Filter used when `RUST_LOG` is not set.
pub fn default_directives(level: LogLevel) -> String {
    let level = level.as_directive();
    format!(
        "{}={level},api={level},scraper={level},tower_http={level}",
        env!("CARGO_CRATE_NAME")
    )
}

/// Initializes structured logging. `RUST_LOG` takes precedence over `LOG_LEVEL`.
pub fn init(level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directives(level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_follow_level() {
        assert_eq!(
            default_directives(LogLevel::Warn),
            "tracker=warn,api=warn,scraper=warn,tower_http=warn"
        );
    }
}
