//! Logger setup
//!
//! RUST_LOG wins over the configured level. The TUI logs to a file since
//! anything written to stderr would land on top of the table.

use std::fs::OpenOptions;
use std::path::Path;

use env_logger::{Builder, Env, Target};

use crate::error::Result;

/// Log to stderr (non-interactive commands)
pub fn init_stderr(default_level: &str) {
    let _ = Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .try_init();
}

/// Log to an append-only file (TUI)
pub fn init_file(default_level: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .target(Target::Pipe(Box::new(file)))
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_file_creates_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("scoreboard.log");
        init_file("debug", &path).unwrap();
        assert!(path.exists());
    }
}
