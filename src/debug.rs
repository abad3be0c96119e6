//! Debug logging to stderr.
//!
//! Provides a minimal `log` backend for the binaries. Library code only uses
//! the `log` macros; nothing is printed until [`init`] installs this sink.
//! Records from other crates (the BLE stack) are limited to warnings so
//! `--verbose` output stays about the link.

use core::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::config::logging::PREFIX;

/// Crate targets allowed through at the configured level
const OWN_TARGETS: [&str; 2] = ["microbit_uart_bridge", "microbit_uart"];

static INIT: AtomicBool = AtomicBool::new(false);
static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        let own = OWN_TARGETS
            .iter()
            .any(|target| metadata.target().starts_with(target));
        if own {
            metadata.level() <= log::max_level()
        } else {
            metadata.level() <= Level::Warn
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record.level(), record.args());
        // Diagnostics are best effort, a closed stderr is not an error
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Initialise the debug output system.
///
/// Returns false if a logger was already installed (by this or another crate).
pub fn init(level: LevelFilter) -> bool {
    match log::set_logger(&LOGGER) {
        Ok(()) => {
            log::set_max_level(level);
            INIT.store(true, Ordering::Release);
            true
        }
        Err(_) => false,
    }
}

/// Check if debug output is initialised.
pub fn is_init() -> bool {
    INIT.load(Ordering::Acquire)
}

/// Format one diagnostic line.
pub fn format_line(level: Level, args: &fmt::Arguments) -> String {
    format!("{} {:<5} {}", PREFIX, level, args)
}
