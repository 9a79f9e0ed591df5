//! Frame I/O over tokio streams and TCP connect.
//!
//! # Example
//!
//! ```ignore
//! use tinyrpc::protocol::FrameBuffer;
//! use tinyrpc::transport::{connect, read_frame, write_frame};
//!
//! let mut stream = connect("127.0.0.1:8000", None).await?;
//! write_frame(&mut stream, &request, max_frame_size).await?;
//! let payload = read_frame(&mut stream, &mut FrameBuffer::new()).await?;
//! ```

use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::{RpcError, Result};
use crate::protocol::{encode_frame, FrameBuffer};

/// Read buffer size per `read` call.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Read until one complete frame payload is available.
///
/// Returns `Ok(None)` if the peer closed the stream before sending any
/// bytes. A close in the middle of a frame is `ConnectionClosedPrematurely`.
/// Only the first frame is returned; connections here carry one frame per
/// direction, so anything the peer sent after it is discarded.
pub async fn read_frame<R>(reader: &mut R, buffer: &mut FrameBuffer) -> Result<Option<Bytes>>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];

    loop {
        let n = reader
            .read(&mut chunk)
            .await
            .map_err(|e| RpcError::ReadFailed(e.to_string()))?;

        if n == 0 {
            if !buffer.has_partial_frame() {
                return Ok(None);
            }
            return Err(RpcError::ConnectionClosedPrematurely);
        }

        let mut frames = buffer.push(&chunk[..n])?.into_iter();
        if let Some(frame) = frames.next() {
            let extra = frames.count();
            if extra > 0 {
                tracing::debug!("Discarding {} frame(s) after the first", extra);
            }
            return Ok(Some(frame));
        }
    }
}

/// Frame `payload` and write it, then flush.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8], max_frame_size: u32) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(payload, max_frame_size)?;

    writer
        .write_all(&frame)
        .await
        .map_err(|e| RpcError::WriteFailed(e.to_string()))?;
    writer
        .flush()
        .await
        .map_err(|e| RpcError::WriteFailed(e.to_string()))?;

    Ok(())
}

/// Open a TCP connection, optionally bounded by `timeout`.
pub async fn connect(addr: &str, timeout: Option<Duration>) -> Result<TcpStream> {
    let attempt = TcpStream::connect(addr);

    let stream = match timeout {
        Some(limit) => tokio::time::timeout(limit, attempt)
            .await
            .map_err(|_| RpcError::Timeout(limit))?,
        None => attempt.await,
    }
    .map_err(|e| RpcError::ConnectFailed(format!("{}: {}", addr, e)))?;

    // Calls are a single small write each way.
    stream.set_nodelay(true)?;

    tracing::trace!("Connected to {}", addr);
    Ok(stream)
}
