use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.trim().to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" => Ok(LevelFilter::WARN),
        "error" => Ok(LevelFilter::ERROR),
        other => Err(format!(
            "Invalid logging.level '{}'. Valid values: trace, debug, info, warn, error",
            other
        )),
    }
}

/// Installs the global subscriber. Logs go to stderr; stdout belongs to the CLI output.
/// `RUST_LOG` directives are layered on top of the configured level.
pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), String> {
    let level_filter = parse_level(&logging_config.level)?;

    let filter_layer = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .from_env_lossy();

    // Route `log` records from dependencies (reqwest, hyper) through tracing.
    tracing_log::LogTracer::init().map_err(|e| format!("Failed to bridge log records: {}", e))?;

    let result = match logging_config.format.to_lowercase().as_str() {
        "json" => tracing::subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt::layer().json().with_writer(std::io::stderr)),
        ),
        // "console" and anything unknown fall back to human-readable output
        _ => tracing::subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt::layer().compact().with_writer(std::io::stderr)),
        ),
    };

    result.map_err(|e| format!("Failed to install tracing subscriber: {}", e))
}
