//! `log` backend that writes to the browser console.
//!
//! On targets other than wasm32 records are dropped, so native unit tests
//! can exercise code that logs.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[{}] {}: {}", record.level(), record.target(), record.args());
        write_console(record.level(), &line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn write_console(level: Level, line: &str) {
    use web_sys::console;
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => console::error_1(&value),
        Level::Warn => console::warn_1(&value),
        Level::Info => console::info_1(&value),
        Level::Debug | Level::Trace => console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_console(_level: Level, _line: &str) {}

/// Installs the console logger. Later calls only adjust the level.
pub fn init(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("console logger already installed");
    }
    log::set_max_level(level);
}
