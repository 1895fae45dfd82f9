use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::cipher;
use crate::error::{Result, TransferError};
use crate::logger::TransferLog;
use crate::protocol;
use crate::{DEFAULT_KEY, RECEIVED_FILES_DIR, TRANSFER_LOG_FILE};

/// Server settings. The CLI runs with the defaults; tests inject scratch
/// directories and an I/O deadline.
pub struct ServerConfig {
    /// Shared transform key.
    pub key: u8,
    /// Directory that receives decrypted files.
    pub received_dir: PathBuf,
    /// Path of the append-only transfer log.
    pub log_file: PathBuf,
    /// Per-field deadline for handler reads. `None` preserves the baseline
    /// behavior of blocking indefinitely on a silent peer.
    pub io_timeout: Option<Duration>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            key: DEFAULT_KEY,
            received_dir: PathBuf::from(RECEIVED_FILES_DIR),
            log_file: PathBuf::from(TRANSFER_LOG_FILE),
            io_timeout: None,
        }
    }
}

/// Function handler to kickoff server logic:
///     - Bind the listener on all local addresses
///     - Install the signal listener that cancels the accept loop
///     - Run the accept loop until shutdown
pub async fn run(port: u16) -> Result<()> {
    let bind_addr: SocketAddr = format!("0.0.0.0:{}", port).parse().map_err(|e| {
        TransferError::InvalidArgument(format!("invalid listen address for port {}: {}", port, e))
    })?;

    debug!("Attempting to bind to {}", bind_addr);
    let listener = bind(bind_addr)?;
    println!("Server listening on {}", bind_addr);
    println!("Waiting for client connections...");

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    serve(listener, ServerConfig::default(), shutdown).await
}

/// Create a listening socket with address reuse enabled, so restarts do
/// not fail on a lingering socket.
pub fn bind(addr: SocketAddr) -> Result<TcpListener> {
    let socket = match addr {
        SocketAddr::V4(_) => TcpSocket::new_v4(),
        SocketAddr::V6(_) => TcpSocket::new_v6(),
    }
    .map_err(|e| TransferError::Configuration(format!("socket creation failed: {}", e)))?;

    socket
        .set_reuseaddr(true)
        .map_err(|e| TransferError::Configuration(format!("failed to set SO_REUSEADDR: {}", e)))?;
    socket
        .bind(addr)
        .map_err(|e| TransferError::Configuration(format!("failed to bind {}: {}", addr, e)))?;
    socket
        .listen(1024)
        .map_err(|e| TransferError::Configuration(format!("failed to listen on {}: {}", addr, e)))
}

/// Main accept loop. Each accepted connection is handed to a detached
/// handler task immediately, so accept throughput is never coupled to
/// transfer duration. Cancelling the token stops accepting and returns;
/// in-flight handlers are not waited on.
pub async fn serve(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: CancellationToken,
) -> Result<()> {
    std::fs::create_dir_all(&config.received_dir).map_err(|e| {
        TransferError::Configuration(format!(
            "failed to create receiving directory {}: {}",
            config.received_dir.display(),
            e
        ))
    })?;

    let log = Arc::new(TransferLog::open(&config.log_file)?);
    let local_addr = listener.local_addr()?;
    info!("Server started on {}", local_addr);
    log.message("INFO", &format!("Server started on {}", local_addr));

    let config = Arc::new(config);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Shutdown requested, no longer accepting connections");
                log.message("INFO", "Server shutting down");
                return Ok(());
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, addr)) => {
                        info!("New client connection from: {}", addr);
                        log.message("INFO", &format!("Client connected: {}", addr));

                        // Spawn a dedicated task for this connection so the
                        // server keeps accepting immediately
                        debug!("Spawning connection handler for {}", addr);
                        tokio::spawn(handle_client(
                            stream,
                            addr,
                            Arc::clone(&config),
                            Arc::clone(&log),
                        ));
                    }
                    Err(e) => {
                        // Transient accept failures only affect the one
                        // connection that was being established
                        error!("Accept failed: {}", e);
                        continue;
                    }
                }
            }
        }
    }
}

/// Service exactly one connection to completion or failure. Every failure
/// is terminal for this connection only; the stream is dropped on all
/// paths, which closes it.
async fn handle_client(
    mut stream: TcpStream,
    addr: SocketAddr,
    config: Arc<ServerConfig>,
    log: Arc<TransferLog>,
) {
    match receive_transfer(&mut stream, &config).await {
        Ok((filename, size)) => {
            log.transfer(addr, &filename, size, "SUCCESS");

            // The file is already durable, so an acknowledgment send
            // failure is not escalated
            if let Err(e) = protocol::write_ack(&mut stream).await {
                debug!("Failed to send acknowledgment to {}: {}", addr, e);
            }
            info!("Client {} disconnected", addr);
        }
        Err(e) => {
            error!("Transfer from {} failed: {}", addr, e);
            log.message("ERROR", &format!("Transfer from {} failed: {}", addr, e));
        }
    }
}

/// Receive one request: filename, size, payload. Reverses the transform
/// and persists the result under the receiving directory, overwriting any
/// existing file of the same name.
async fn receive_transfer(stream: &mut TcpStream, config: &ServerConfig) -> Result<(String, u64)> {
    let filename = with_deadline(config.io_timeout, protocol::read_filename(stream)).await?;
    debug!("Receiving file: {}", filename);

    let size = with_deadline(config.io_timeout, protocol::read_size(stream)).await?;
    debug!("File size: {} bytes", size);

    let mut payload = with_deadline(config.io_timeout, protocol::read_payload(stream, size)).await?;
    debug!("Received {} bytes of encrypted data", payload.len());

    cipher::decrypt_in_place(&mut payload, config.key);

    let output_path = config.received_dir.join(&filename);
    tokio::fs::write(&output_path, &payload).await?;
    info!("File saved: {}", output_path.display());

    Ok((filename, size))
}

/// Apply the configured deadline to one field read. Expiry is an I/O
/// failure like any other: the request is abandoned.
async fn with_deadline<F, T>(limit: Option<Duration>, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        Some(duration) => match timeout(duration, operation).await {
            Ok(result) => result,
            Err(_) => Err(TransferError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "i/o deadline exceeded",
            ))),
        },
        None => operation.await,
    }
}

fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Received shutdown signal");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            error!("Failed to install SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
