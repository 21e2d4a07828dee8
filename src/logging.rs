//! Tracing subscriber setup.
//!
//! Logs go to stderr so that command output on stdout stays parseable.

use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::Level;

use crate::config::LoggingConfig;

/// Parse a configured level name (`trace` .. `error`, any case).
pub fn parse_level(level: &str) -> Result<Level> {
    Level::from_str(level.trim()).with_context(|| format!("invalid log level: {}", level))
}

/// Install the global fmt subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let level = parse_level(&config.level)?;
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_level(" WARN ").unwrap(), Level::WARN);
        assert!(parse_level("chatty").is_err());
    }
}
