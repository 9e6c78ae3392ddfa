//! Append-only diagnostic log. Stays silent unless a log file was asked for
//! on the command line; the TUI itself never shows these entries.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use anyhow::{Context, Result};
use chrono::Utc;

static LOG: OnceLock<Mutex<File>> = OnceLock::new();

pub fn init(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let _ = LOG.set(Mutex::new(file));
    Ok(())
}

fn log(level: &str, message: &str) {
    let Some(lock) = LOG.get() else { return };
    if let Ok(mut file) = lock.lock() {
        let ts = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f UTC");
        let _ = writeln!(file, "[{ts}] [{level}] {message}");
        let _ = file.flush();
    }
}

pub fn info(message: &str) {
    log("INFO", message);
}

pub fn error(message: &str) {
    log("ERROR", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_without_init_is_a_noop() {
        error("nobody is listening");
        info("still nobody");
    }
}
