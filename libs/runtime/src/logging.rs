use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

use crate::config::LoggingConfig;

fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// Initialize logging from a configuration.
///
/// Returns the file writer guard when file logging is enabled; it must be
/// kept alive for the lifetime of the process or buffered lines are lost.
pub fn init_logging(cfg: &LoggingConfig) -> Option<WorkerGuard> {
    // Bridge `log` → `tracing` before installing the subscriber.
    let _ = tracing_log::LogTracer::init();

    let console_layer = parse_tracing_level(&cfg.console_level).map(|level| {
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::from_level(level))
    });

    let mut guard = None;
    let file_layer = if cfg.file.trim().is_empty() {
        None
    } else {
        let path = Path::new(&cfg.file);
        let (dir, file_name) = (
            path.parent().unwrap_or_else(|| Path::new(".")),
            path.file_name().map(|f| f.to_string_lossy().to_string()),
        );
        match file_name {
            Some(file_name) => {
                if let Err(e) = std::fs::create_dir_all(dir) {
                    eprintln!("Failed to create log directory {}: {e}", dir.display());
                    None
                } else {
                    let appender = tracing_appender::rolling::daily(dir, file_name);
                    let (writer, g) = tracing_appender::non_blocking(appender);
                    guard = Some(g);
                    parse_tracing_level(&cfg.file_level).map(|level| {
                        fmt::layer()
                            .json()
                            .with_ansi(false)
                            .with_target(true)
                            .with_writer(writer)
                            .with_filter(tracing_subscriber::filter::LevelFilter::from_level(
                                level,
                            ))
                    })
                }
            }
            None => None,
        }
    };

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();

    guard
}

/// Console-only logging with default settings; used when no configuration
/// is available yet.
pub fn init_default_logging() {
    let _ = tracing_log::LogTracer::init();
    let _ = fmt().with_target(true).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing() {
        assert_eq!(parse_tracing_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_tracing_level("DEBUG"), Some(Level::DEBUG));
        assert_eq!(parse_tracing_level("Info"), Some(Level::INFO));
        assert_eq!(parse_tracing_level("off"), None);
        assert_eq!(parse_tracing_level("none"), None);
        assert_eq!(parse_tracing_level("invalid"), Some(Level::INFO));
    }

    #[test]
    fn init_with_file_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("nested/logs/app.log");
        let cfg = LoggingConfig {
            console_level: "off".to_string(),
            file: file.to_string_lossy().to_string(),
            file_level: "debug".to_string(),
        };
        let _guard = init_logging(&cfg);
        assert!(file.parent().unwrap().exists());
    }
}
