//! Append-only transfer log kept by the server alongside stderr logging.
//!
//! Records are plain text, one per line, with a local timestamp and either
//! a severity tag or a structured `[TRANSFER]` summary. The file is shared
//! by all connection handlers; appends go through a mutex so concurrent
//! records never interleave.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;

use chrono::Local;

use crate::error::{Result, TransferError};

pub struct TransferLog {
    file: Mutex<File>,
}

impl TransferLog {
    /// Open the log file for appending, creating it and its parent
    /// directory if absent.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TransferError::Configuration(format!(
                    "failed to create log directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                TransferError::Configuration(format!(
                    "failed to open log file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        let log = TransferLog {
            file: Mutex::new(file),
        };
        log.message("INFO", "Logger initialized");
        Ok(log)
    }

    /// Append a free-form record with a severity tag. Write failures are
    /// swallowed: the log never takes a transfer down with it.
    pub fn message(&self, level: &str, message: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "[{}] [{}] {}", timestamp(), level, message);
            let _ = file.flush();
        }
    }

    /// Append a structured transfer summary.
    pub fn transfer(&self, client_addr: SocketAddr, filename: &str, size: u64, status: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(
                file,
                "[{}] [TRANSFER] Client: {} | File: {} | Size: {} bytes | Status: {}",
                timestamp(),
                client_addr,
                filename,
                size,
                status
            );
            let _ = file.flush();
        }
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
