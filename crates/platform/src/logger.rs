//! `log` backend writing to the browser console.
//!
//! Every line carries the `[Zenn Scrap TOC]` prefix so the script's output
//! can be filtered out of a busy page console.

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

pub const PREFIX: &str = "[Zenn Scrap TOC]";

pub struct ConsoleLogger {
    level: LevelFilter,
}

impl ConsoleLogger {
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

/// Console line for one record. Engine targets (`toc.*`) stay terse; other
/// targets are named so their origin is visible.
pub fn format_line(level: Level, target: &str, message: &str) -> String {
    let tag = match level {
        Level::Error | Level::Warn | Level::Info => "",
        Level::Debug => "debug ",
        Level::Trace => "trace ",
    };
    if target.starts_with("toc") {
        format!("{PREFIX} {tag}{message}")
    } else {
        format!("{PREFIX} {tag}[{target}] {message}")
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), record.target(), &record.args().to_string());
        emit(record.level(), &line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn emit(level: Level, line: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let value = JsValue::from_str(line);
    match level {
        Level::Error => console::error_1(&value),
        Level::Warn => console::warn_1(&value),
        Level::Info => console::log_1(&value),
        Level::Debug | Level::Trace => console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(_level: Level, line: &str) {
    eprintln!("{line}");
}

static LOGGER: ConsoleLogger = ConsoleLogger::new(LevelFilter::Debug);

/// Install the console logger. A second call keeps the first logger.
pub fn init(max: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(max);
    Ok(())
}
