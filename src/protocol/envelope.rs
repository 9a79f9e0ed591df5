//! Call envelope: routing header plus raw argument bytes.
//!
//! A request frame carries:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ outer frame length (u32 BE)                                   │
//! ├───────────────────────────────────────┬───────────────────────┤
//! │ header frame                          │ argument bytes        │
//! │ u32 BE len + msgpack(RpcHeader)       │ `args_len` bytes      │
//! └───────────────────────────────────────┴───────────────────────┘
//! ```
//!
//! The header needs its own length prefix because its encoded size is not
//! known until it has been decoded. The argument is not separately framed;
//! its length is carried in the header and must match the bytes that follow.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use super::frame::{check_length, decode_frame, encode_frame};
use crate::codec::MsgPackCodec;
use crate::error::{RpcError, Result};

/// Routing header carried at the front of every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcHeader {
    pub service_name: String,
    pub method_name: String,
    pub args_len: u32,
}

impl RpcHeader {
    pub fn new(service_name: impl Into<String>, method_name: impl Into<String>, args_len: u32) -> Self {
        Self {
            service_name: service_name.into(),
            method_name: method_name.into(),
            args_len,
        }
    }
}

/// A decoded call: header plus the argument bytes it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub header: RpcHeader,
    pub args: Bytes,
}

impl Envelope {
    #[inline]
    pub fn service_name(&self) -> &str {
        &self.header.service_name
    }

    #[inline]
    pub fn method_name(&self) -> &str {
        &self.header.method_name
    }

    #[inline]
    pub fn args(&self) -> &[u8] {
        &self.args
    }
}

/// Build the envelope bytes for one call.
///
/// The result is the body of the outer transport frame; wrap it with
/// [`encode_frame`] before writing it to a socket.
///
/// # Example
///
/// ```
/// use tinyrpc::protocol::{decode_envelope, encode_envelope, DEFAULT_MAX_FRAME_SIZE};
///
/// let bytes = encode_envelope("UserService", "Login", b"args", DEFAULT_MAX_FRAME_SIZE).unwrap();
/// let envelope = decode_envelope(&bytes, DEFAULT_MAX_FRAME_SIZE).unwrap();
///
/// assert_eq!(envelope.service_name(), "UserService");
/// assert_eq!(envelope.method_name(), "Login");
/// assert_eq!(envelope.args(), b"args");
/// ```
pub fn encode_envelope(
    service_name: &str,
    method_name: &str,
    args: &[u8],
    max_frame_size: u32,
) -> Result<Vec<u8>> {
    let args_len = check_length(args.len(), max_frame_size)?;
    let header = RpcHeader::new(service_name, method_name, args_len);

    let header_bytes = MsgPackCodec::encode(&header)?;
    let mut buf = encode_frame(&header_bytes, max_frame_size)?;
    buf.extend_from_slice(args);

    check_length(buf.len(), max_frame_size)?;
    Ok(buf)
}

/// Decode envelope bytes (the body of an outer frame).
///
/// # Errors
///
/// Returns `EnvelopeDecode` if the header frame is truncated or oversized,
/// the header does not decode, a name is empty, or `args_len` disagrees
/// with the number of trailing bytes.
pub fn decode_envelope(bytes: &[u8], max_frame_size: u32) -> Result<Envelope> {
    let (header_bytes, consumed) = decode_frame(bytes, max_frame_size)
        .map_err(|e| RpcError::EnvelopeDecode(format!("header frame: {}", e)))?;

    let header: RpcHeader = MsgPackCodec::decode(header_bytes)
        .map_err(|e| RpcError::EnvelopeDecode(format!("header record: {}", e)))?;

    if header.service_name.is_empty() {
        return Err(RpcError::EnvelopeDecode("empty service name".to_string()));
    }
    if header.method_name.is_empty() {
        return Err(RpcError::EnvelopeDecode("empty method name".to_string()));
    }

    let args = &bytes[consumed..];
    if args.len() != header.args_len as usize {
        return Err(RpcError::EnvelopeDecode(format!(
            "args_len {} does not match {} trailing bytes",
            header.args_len,
            args.len()
        )));
    }

    Ok(Envelope {
        header,
        args: Bytes::copy_from_slice(args),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{DEFAULT_MAX_FRAME_SIZE, LENGTH_PREFIX_SIZE};

    const MAX: u32 = DEFAULT_MAX_FRAME_SIZE;

    #[test]
    fn test_roundtrip() {
        let args = MsgPackCodec::encode(&("xy", "123")).unwrap();
        let bytes = encode_envelope("UserService", "Login", &args, MAX).unwrap();
        let envelope = decode_envelope(&bytes, MAX).unwrap();

        assert_eq!(envelope.header, RpcHeader::new("UserService", "Login", args.len() as u32));
        assert_eq!(envelope.args(), &args[..]);
    }

    #[test]
    fn test_empty_args() {
        let bytes = encode_envelope("S", "m", b"", MAX).unwrap();
        let envelope = decode_envelope(&bytes, MAX).unwrap();

        assert_eq!(envelope.header.args_len, 0);
        assert!(envelope.args().is_empty());
    }

    #[test]
    fn test_layout_is_header_frame_then_args() {
        let bytes = encode_envelope("S", "m", b"ARGS", MAX).unwrap();

        let header_len = u32::from_be_bytes(bytes[..4].try_into().unwrap()) as usize;
        let header: RpcHeader =
            MsgPackCodec::decode(&bytes[LENGTH_PREFIX_SIZE..LENGTH_PREFIX_SIZE + header_len]).unwrap();

        assert_eq!(header.args_len, 4);
        assert_eq!(&bytes[LENGTH_PREFIX_SIZE + header_len..], b"ARGS");
    }

    #[test]
    fn test_args_len_mismatch() {
        let mut bytes = encode_envelope("S", "m", b"abc", MAX).unwrap();
        bytes.push(b'!');

        let err = decode_envelope(&bytes, MAX).unwrap_err();
        assert!(matches!(err, RpcError::EnvelopeDecode(_)));
        assert!(err.to_string().contains("args_len 3"));

        bytes.truncate(bytes.len() - 2);
        assert!(matches!(decode_envelope(&bytes, MAX), Err(RpcError::EnvelopeDecode(_))));
    }

    #[test]
    fn test_truncated_header_frame() {
        let bytes = encode_envelope("UserService", "Login", b"", MAX).unwrap();
        let err = decode_envelope(&bytes[..6], MAX).unwrap_err();
        assert!(matches!(err, RpcError::EnvelopeDecode(_)));
    }

    #[test]
    fn test_garbage_header_record() {
        let bytes = encode_frame(b"\xc1\xc1", MAX).unwrap();
        assert!(matches!(decode_envelope(&bytes, MAX), Err(RpcError::EnvelopeDecode(_))));
    }

    #[test]
    fn test_empty_names_rejected() {
        let bytes = encode_envelope("", "Login", b"", MAX).unwrap();
        assert!(decode_envelope(&bytes, MAX)
            .unwrap_err()
            .to_string()
            .contains("empty service name"));

        let bytes = encode_envelope("UserService", "", b"", MAX).unwrap();
        assert!(decode_envelope(&bytes, MAX)
            .unwrap_err()
            .to_string()
            .contains("empty method name"));
    }
}
