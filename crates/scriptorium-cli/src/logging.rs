// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! File logging. Stdout and stderr belong to the terminal UI, so every log
//! line goes to rotating files under the configured log directory.

use anyhow::{Context, Result, anyhow, bail};
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::{APP_NAME, LOG_LEVELS};

const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

static LOGGING: OnceLock<LoggingState> = OnceLock::new();

struct LoggingState {
    level: String,
    dir: PathBuf,
    _handle: LoggerHandle,
}

/// Starts the file logger. Repeating the call with the same level and
/// directory is a no-op; asking for a different one is an error.
pub fn init_logging(level: &str, dir: &Path) -> Result<()> {
    let level = normalize_level(level)?;

    if let Some(state) = LOGGING.get() {
        if state.dir != dir || state.level != level {
            bail!(
                "logging already initialized at {} with level {}; refusing to switch to {} with level {}",
                state.dir.display(),
                state.level,
                dir.display(),
                level
            );
        }
        return Ok(());
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("create log directory {}", dir.display()))?;
    let handle = Logger::try_with_str(&level)
        .with_context(|| format!("invalid log level {level:?}"))?
        .log_to_file(FileSpec::default().directory(dir).basename(APP_NAME))
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .with_context(|| format!("start logger in {}", dir.display()))?;

    info!(
        "event=app_start version={} level={level} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        dir.display()
    );
    LOGGING
        .set(LoggingState {
            level,
            dir: dir.to_path_buf(),
            _handle: handle,
        })
        .map_err(|_| anyhow!("logging initialized concurrently"))?;
    Ok(())
}

fn normalize_level(level: &str) -> Result<String> {
    let normalized = match level.trim().to_ascii_lowercase().as_str() {
        "warning" => "warn".to_owned(),
        other => other.to_owned(),
    };
    if !LOG_LEVELS.contains(&normalized.as_str()) {
        bail!(
            "unsupported log level {level:?}; expected {}",
            LOG_LEVELS.join("|")
        );
    }
    Ok(normalized)
}
