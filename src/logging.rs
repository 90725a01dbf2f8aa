// Logging setup
//
// `log` is used everywhere in the crate; this wires it to env_logger according to the
// `[logging]` configuration section.

use std::fs::OpenOptions;
use std::io::Write;

use env_logger::{Builder, Target};
use log::LevelFilter;

use crate::config::{LogTarget, LoggingConfig};

/// Parses a level name, falling back to `Info`.
pub fn level_filter(level: &str) -> LevelFilter {
    level.parse().unwrap_or_else(|_| {
        eprintln!("Unknown log level '{level}', using info");
        LevelFilter::Info
    })
}

/// Initialises the global logger. `RUST_LOG` overrides the configured level.
///
/// Calling it again keeps the first logger.
pub fn init(config: &LoggingConfig) {
    let mut builder = Builder::new();
    builder.filter_level(level_filter(&config.level));
    builder.parse_default_env();

    if config.log_to_file {
        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&config.log_file)
        {
            Ok(mut file) => {
                let _ = writeln!(file, "=== renderer-hal log ===");
                let _ = writeln!(file, "Started: {:?}", std::time::SystemTime::now());
                let _ = writeln!(file);
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("Cannot open log file {:?}: {e}", config.log_file);
                builder.target(target(config.target));
            }
        }
    } else {
        builder.target(target(config.target));
    }

    if builder.try_init().is_err() {
        log::debug!("Logger already initialised");
    }
}

fn target(target: LogTarget) -> Target {
    match target {
        LogTarget::Stderr => Target::Stderr,
        LogTarget::Stdout => Target::Stdout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse() {
        assert_eq!(level_filter("trace"), LevelFilter::Trace);
        assert_eq!(level_filter("WARN"), LevelFilter::Warn);
        assert_eq!(level_filter("loud"), LevelFilter::Info);
    }
}
