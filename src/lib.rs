pub mod cipher;
pub mod commands;
pub mod error;
pub mod logger;
pub mod protocol;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_KEY: u8 = 0xAA;
pub const DEFAULT_FILE: &str = "test.txt";

/// Maximum encoded filename length on the wire, including the zero terminator.
pub const MAX_FILENAME_LEN: usize = 256;
pub const SEND_CHUNK_SIZE: usize = 4096;

pub const RECEIVED_FILES_DIR: &str = "received_files";
pub const TRANSFER_LOG_FILE: &str = "logs/transfer.log";
