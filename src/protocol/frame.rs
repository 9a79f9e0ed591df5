//! Length-prefixed frame encoding and decoding.
//!
//! ```text
//! ┌──────────────┬─────────────────────┐
//! │ Length       │ Payload             │
//! │ 4 bytes      │ `Length` bytes      │
//! │ uint32 BE    │                     │
//! └──────────────┴─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use tinyrpc::protocol::{decode_frame, encode_frame, DEFAULT_MAX_FRAME_SIZE};
//!
//! let bytes = encode_frame(b"hello", DEFAULT_MAX_FRAME_SIZE).unwrap();
//! assert_eq!(bytes.len(), 4 + 5);
//!
//! let (payload, consumed) = decode_frame(&bytes, DEFAULT_MAX_FRAME_SIZE).unwrap();
//! assert_eq!(payload, b"hello");
//! assert_eq!(consumed, bytes.len());
//! ```

use crate::error::{RpcError, Result};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default ceiling for a single frame's payload (64 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024;

/// Read the big-endian length prefix at the start of `buf`.
///
/// Returns `None` if fewer than 4 bytes are available.
#[inline]
pub fn peek_length(buf: &[u8]) -> Option<u32> {
    let prefix: [u8; LENGTH_PREFIX_SIZE] = buf.get(..LENGTH_PREFIX_SIZE)?.try_into().ok()?;
    Some(u32::from_be_bytes(prefix))
}

/// Prefix `payload` with its 4-byte big-endian length.
///
/// # Errors
///
/// Returns `OversizedFrame` if the payload is larger than `max_frame_size`.
pub fn encode_frame(payload: &[u8], max_frame_size: u32) -> Result<Vec<u8>> {
    let length = check_length(payload.len(), max_frame_size)?;

    let mut buf = Vec::with_capacity(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&length.to_be_bytes());
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Decode one frame from the front of `buf`.
///
/// Returns the payload slice and the total number of bytes the frame
/// occupies (prefix included). Bytes past the frame are left untouched.
///
/// # Errors
///
/// - `IncompleteFrame` if the prefix or payload has not fully arrived
/// - `OversizedFrame` if the declared length exceeds `max_frame_size`
pub fn decode_frame(buf: &[u8], max_frame_size: u32) -> Result<(&[u8], usize)> {
    let length = match peek_length(buf) {
        Some(length) => length,
        None => {
            return Err(RpcError::IncompleteFrame {
                needed: LENGTH_PREFIX_SIZE - buf.len(),
            })
        }
    };

    if length > max_frame_size {
        return Err(RpcError::OversizedFrame {
            length: length as usize,
            max: max_frame_size,
        });
    }

    let total = LENGTH_PREFIX_SIZE + length as usize;
    if buf.len() < total {
        return Err(RpcError::IncompleteFrame {
            needed: total - buf.len(),
        });
    }

    Ok((&buf[LENGTH_PREFIX_SIZE..total], total))
}

/// Validate a payload length against the ceiling and the u32 prefix range.
pub(crate) fn check_length(length: usize, max_frame_size: u32) -> Result<u32> {
    match u32::try_from(length) {
        Ok(n) if n <= max_frame_size => Ok(n),
        _ => Err(RpcError::OversizedFrame {
            length,
            max: max_frame_size,
        }),
    }
}
