use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use log::{LevelFilter, Metadata, Record};
use once_cell::sync::Lazy;

use crate::datasource::file_path::LOG_LEVEL_PATH;

// Console logger; level filtering is done by the log crate via max_level.
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        print!("[{timestamp}][{}]: {}\n", record.level(), record.args());
    }

    fn flush(&self) {}
}

static LOGGER: Lazy<ConsoleLogger> = Lazy::new(|| ConsoleLogger);

pub fn init_logger() -> Result<()> {
    let log_level = read_log_level_config()?;

    log::set_logger(&*LOGGER)
        .map(|()| log::set_max_level(log_level))
        .with_context(|| "Failed to set logger")?;

    log::info!("Logger initialized with level: {log_level}");
    log::info!("Log level config path: {LOG_LEVEL_PATH}");

    Ok(())
}

pub fn read_log_level_config() -> Result<LevelFilter> {
    let default_level = LevelFilter::Info;

    if !Path::new(LOG_LEVEL_PATH).exists() {
        return Ok(default_level);
    }

    let content = match std::fs::read_to_string(LOG_LEVEL_PATH) {
        Ok(content) => content,
        Err(_) => return Ok(default_level),
    };

    match content.trim().to_lowercase().as_str() {
        "debug" => Ok(LevelFilter::Debug),
        "info" => Ok(LevelFilter::Info),
        "warn" => Ok(LevelFilter::Warn),
        "error" => Ok(LevelFilter::Error),
        _ => Ok(default_level),
    }
}

pub fn update_log_level() -> Result<()> {
    let new_level = read_log_level_config()?;
    log::set_max_level(new_level);
    log::info!("Log level updated to: {new_level}");
    Ok(())
}
