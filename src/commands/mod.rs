//! # Commands Module
//!
//! This module contains the two command handlers for eftt:
//!
//! ## `send`
//! Handles sending one file to a server:
//! - Reads the whole file into memory and applies the byte transform
//! - Connects and writes the filename, size, and payload fields
//! - Streams the payload with a progress bar, tolerating partial writes
//! - Reads the server acknowledgment (best-effort)
//!
//! ## `serve`
//! Runs the receiving server:
//! - Binds a reuse-addr listener and accepts connections in a loop
//! - Dispatches each connection to its own detached handler task
//! - Each handler receives one request, reverses the transform, persists
//!   the file, and acknowledges
//! - Stops accepting when the shutdown signal fires; in-flight handlers
//!   are not drained

pub mod send;
pub mod serve;
