//! Wire protocol for one transfer.
//!
//! Each connection carries exactly one request, three fields in order with
//! no outer framing:
//!
//! 1. Filename: raw bytes terminated by a single zero byte; at most
//!    [`MAX_FILENAME_LEN`](crate::MAX_FILENAME_LEN) bytes on the wire
//!    including the terminator.
//! 2. Size: a `u64` in little-endian byte order, the exact payload length.
//! 3. Payload: exactly `size` bytes of transformed data.
//!
//! The server replies with a short acknowledgment string after persisting;
//! a connection closed without one is a valid outcome the client tolerates.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, TransferError};
use crate::MAX_FILENAME_LEN;

pub const ACK_MESSAGE: &str = "File received successfully";

/// Write the filename field followed by its zero terminator.
pub async fn write_filename<W>(writer: &mut W, filename: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if filename.is_empty() || filename.as_bytes().contains(&0) {
        return Err(TransferError::InvalidArgument(format!(
            "filename cannot be empty or contain a zero byte: {:?}",
            filename
        )));
    }
    if filename.len() + 1 > MAX_FILENAME_LEN {
        return Err(TransferError::ProtocolViolation(format!(
            "filename is {} bytes, maximum is {} including the terminator",
            filename.len(),
            MAX_FILENAME_LEN
        )));
    }

    writer.write_all(filename.as_bytes()).await?;
    writer.write_u8(0).await?;
    Ok(())
}

/// Read the filename field, accumulating byte by byte until the zero
/// terminator. If no terminator appears within [`MAX_FILENAME_LEN`] bytes
/// the request is malformed.
pub async fn read_filename<R>(reader: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut name = Vec::new();
    for _ in 0..MAX_FILENAME_LEN {
        let byte = reader.read_u8().await?;
        if byte == 0 {
            return String::from_utf8(name).map_err(|_| {
                TransferError::ProtocolViolation("filename is not valid UTF-8".to_string())
            });
        }
        name.push(byte);
    }

    Err(TransferError::ProtocolViolation(format!(
        "filename exceeds {} bytes without a terminator",
        MAX_FILENAME_LEN
    )))
}

/// Write the payload size as a little-endian `u64`.
pub async fn write_size<W>(writer: &mut W, size: u64) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_u64_le(size).await?;
    Ok(())
}

/// Read the payload size, accumulating all 8 bytes.
pub async fn read_size<R>(reader: &mut R) -> Result<u64>
where
    R: AsyncRead + Unpin,
{
    Ok(reader.read_u64_le().await?)
}

/// Read exactly `size` payload bytes, looping across partial deliveries.
/// The buffer is allocated up front; allocation failure is reported rather
/// than aborting the process.
pub async fn read_payload<R>(reader: &mut R, size: u64) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let size = usize::try_from(size).map_err(|_| {
        TransferError::ResourceExhausted(format!("payload size {} exceeds addressable memory", size))
    })?;

    let mut payload = Vec::new();
    payload.try_reserve_exact(size)?;
    payload.resize(size, 0);

    reader.read_exact(&mut payload).await?;
    Ok(payload)
}

/// Send the success acknowledgment.
pub async fn write_ack<W>(writer: &mut W) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(ACK_MESSAGE.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read whatever acknowledgment the server sends, if any. Returns `None`
/// when the connection was closed without one.
pub async fn read_ack<R>(reader: &mut R) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = [0u8; 256];
    let bytes_read = reader.read(&mut buffer).await?;
    if bytes_read == 0 {
        return Ok(None);
    }
    Ok(Some(
        String::from_utf8_lossy(&buffer[..bytes_read]).into_owned(),
    ))
}
