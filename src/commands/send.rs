use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use tokio::io::AsyncWriteExt;
use tokio::net::{lookup_host, TcpStream};

use crate::cipher;
use crate::error::{Result, TransferError};
use crate::protocol;
use crate::{DEFAULT_KEY, SEND_CHUNK_SIZE};

/// Function handler to kickoff sender logic:
///     - Read the whole file into memory and apply the byte transform
///     - Connect to the server
///     - Write the filename, size, and payload fields in order
///     - Read the acknowledgment (best-effort)
///
/// Any failure before the payload is fully sent aborts the run; a missing
/// acknowledgment after that point is only informational.
pub async fn run(host: &str, port: u16, file_path: &str) -> Result<()> {
    send_file(host, port, file_path, DEFAULT_KEY).await
}

pub async fn send_file(host: &str, port: u16, file_path: &str, key: u8) -> Result<()> {
    let path = Path::new(file_path);
    if !path.is_file() {
        return Err(TransferError::InvalidArgument(format!(
            "not a readable file: {}",
            file_path
        )));
    }
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            TransferError::InvalidArgument(format!("cannot extract filename from: {}", file_path))
        })?;

    let mut data = tokio::fs::read(path).await?;
    println!("File: {}", file_path);
    println!("Size: {} bytes", data.len());

    cipher::encrypt_in_place(&mut data, key);
    debug!("File encrypted with key {:#04x}", key);

    let server = format!("{}:{}", host, port);
    let addr = lookup_host(server.as_str())
        .await
        .map_err(|e| TransferError::InvalidArgument(format!("cannot resolve {}: {}", server, e)))?
        .next()
        .ok_or_else(|| {
            TransferError::InvalidArgument(format!("no address found for {}", server))
        })?;

    println!("Connecting to server {}...", server);
    let mut stream = TcpStream::connect(addr).await?;
    println!("Connected to server");

    protocol::write_filename(&mut stream, filename).await?;
    debug!("Filename sent: {}", filename);
    protocol::write_size(&mut stream, data.len() as u64).await?;
    debug!("File size sent: {} bytes", data.len());

    // Stream the payload in slices so progress is visible; write_all
    // retries partial transport acceptance within each slice
    let bar = ProgressBar::new(data.len() as u64);
    bar.set_style(ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.black}] {bytes}/{total_bytes} ({eta}) {msg}")
        .unwrap());

    for chunk in data.chunks(SEND_CHUNK_SIZE) {
        stream.write_all(chunk).await?;
        bar.inc(chunk.len() as u64);
    }
    stream.flush().await?;
    bar.finish_with_message("Payload sent");
    println!("File data sent successfully ({} bytes)", data.len());

    match protocol::read_ack(&mut stream).await {
        Ok(Some(ack)) => println!("Server response: {}", ack),
        Ok(None) => println!("No acknowledgment received from server"),
        Err(e) => {
            debug!("Error reading acknowledgment: {}", e);
            println!("No acknowledgment received from server");
        }
    }

    println!("File transfer completed. Connection closed.");
    Ok(())
}
