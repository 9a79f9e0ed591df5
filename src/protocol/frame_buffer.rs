//! Frame buffer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` so completed payloads are handed out without
//! copying. Parsing is a two-state machine:
//! - `WaitingForLength`: need the 4-byte length prefix
//! - `WaitingForPayload`: prefix parsed, need N more payload bytes
//!
//! # Example
//!
//! ```
//! use tinyrpc::protocol::{encode_frame, FrameBuffer, DEFAULT_MAX_FRAME_SIZE};
//!
//! let bytes = encode_frame(b"hi", DEFAULT_MAX_FRAME_SIZE).unwrap();
//! let mut buffer = FrameBuffer::new();
//!
//! assert!(buffer.push(&bytes[..3]).unwrap().is_empty());
//! let frames = buffer.push(&bytes[3..]).unwrap();
//! assert_eq!(&frames[0][..], b"hi");
//! ```

use bytes::{Bytes, BytesMut};

use super::frame::{peek_length, DEFAULT_MAX_FRAME_SIZE, LENGTH_PREFIX_SIZE};
use crate::error::{RpcError, Result};

/// State machine for frame parsing.
#[derive(Debug, Clone, Copy)]
enum State {
    WaitingForLength,
    WaitingForPayload { remaining: u32 },
}

/// Buffer for accumulating incoming bytes and extracting complete frame payloads.
pub struct FrameBuffer {
    buffer: BytesMut,
    state: State,
    max_frame_size: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer with the default frame ceiling.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Create a new frame buffer with a custom frame ceiling.
    pub fn with_max_frame_size(max_frame_size: u32) -> Self {
        Self {
            buffer: BytesMut::with_capacity(8 * 1024),
            state: State::WaitingForLength,
            max_frame_size,
        }
    }

    /// Push data into the buffer and extract all complete frame payloads.
    ///
    /// Partial data stays buffered for the next push.
    ///
    /// # Errors
    ///
    /// Returns `OversizedFrame` as soon as a length prefix above the ceiling
    /// is seen. The buffer should be discarded along with the connection.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Bytes>> {
        self.buffer.extend_from_slice(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.try_extract_one()? {
            frames.push(frame);
        }

        Ok(frames)
    }

    /// Try to extract a single frame payload.
    fn try_extract_one(&mut self) -> Result<Option<Bytes>> {
        match self.state {
            State::WaitingForLength => {
                let length = match peek_length(&self.buffer) {
                    Some(length) => length,
                    None => return Ok(None),
                };

                if length > self.max_frame_size {
                    return Err(RpcError::OversizedFrame {
                        length: length as usize,
                        max: self.max_frame_size,
                    });
                }

                let _ = self.buffer.split_to(LENGTH_PREFIX_SIZE);

                if length == 0 {
                    return Ok(Some(Bytes::new()));
                }

                self.state = State::WaitingForPayload { remaining: length };
                self.try_extract_one()
            }

            State::WaitingForPayload { remaining } => {
                let remaining = remaining as usize;
                if self.buffer.len() < remaining {
                    return Ok(None);
                }

                let payload = self.buffer.split_to(remaining).freeze();
                self.state = State::WaitingForLength;
                Ok(Some(payload))
            }
        }
    }

    /// Number of buffered bytes not yet returned as a frame.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// True while a frame has been started but not completed.
    ///
    /// Used to tell a clean EOF from a peer that hung up mid-frame.
    pub fn has_partial_frame(&self) -> bool {
        matches!(self.state, State::WaitingForPayload { .. }) || !self.buffer.is_empty()
    }

    /// Clear the buffer and reset state.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::WaitingForLength;
    }

    #[cfg(test)]
    fn state_name(&self) -> &'static str {
        match self.state {
            State::WaitingForLength => "WaitingForLength",
            State::WaitingForPayload { .. } => "WaitingForPayload",
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::encode_frame;

    fn frame(payload: &[u8]) -> Vec<u8> {
        encode_frame(payload, DEFAULT_MAX_FRAME_SIZE).unwrap()
    }

    #[test]
    fn test_single_complete_frame() {
        let mut buffer = FrameBuffer::new();
        let frames = buffer.push(&frame(b"hello")).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"hello");
        assert!(buffer.is_empty());
        assert!(!buffer.has_partial_frame());
    }

    #[test]
    fn test_multiple_frames_in_one_push() {
        let mut buffer = FrameBuffer::new();
        let mut combined = frame(b"first");
        combined.extend(frame(b"second"));
        combined.extend(frame(b""));

        let frames = buffer.push(&combined).unwrap();

        assert_eq!(frames.len(), 3);
        assert_eq!(&frames[0][..], b"first");
        assert_eq!(&frames[1][..], b"second");
        assert!(frames[2].is_empty());
    }

    #[test]
    fn test_fragmented_prefix_and_payload() {
        let mut buffer = FrameBuffer::new();
        let bytes = frame(b"a longer payload that arrives in pieces");

        assert!(buffer.push(&bytes[..2]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForLength");
        assert!(buffer.has_partial_frame());

        assert!(buffer.push(&bytes[2..10]).unwrap().is_empty());
        assert_eq!(buffer.state_name(), "WaitingForPayload");

        let frames = buffer.push(&bytes[10..]).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], b"a longer payload that arrives in pieces");
        assert_eq!(buffer.state_name(), "WaitingForLength");
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut buffer = FrameBuffer::new();
        let bytes = frame(b"hi");
        let last = bytes.len() - 1;

        for (i, byte) in bytes.iter().enumerate() {
            let frames = buffer.push(&[*byte]).unwrap();
            if i < last {
                assert!(frames.is_empty(), "frame completed early at byte {}", i);
            } else {
                assert_eq!(frames.len(), 1);
                assert_eq!(&frames[0][..], b"hi");
            }
        }
    }

    #[test]
    fn test_oversized_rejected_on_prefix() {
        let mut buffer = FrameBuffer::with_max_frame_size(16);
        let result = buffer.push(&1000u32.to_be_bytes());

        assert!(matches!(
            result,
            Err(RpcError::OversizedFrame { length: 1000, max: 16 })
        ));
    }

    #[test]
    fn test_clear_resets_state() {
        let mut buffer = FrameBuffer::new();
        let bytes = frame(b"test");
        buffer.push(&bytes[..6]).unwrap();
        assert_eq!(buffer.state_name(), "WaitingForPayload");

        buffer.clear();

        assert_eq!(buffer.state_name(), "WaitingForLength");
        assert!(buffer.is_empty());
        assert!(!buffer.has_partial_frame());
    }
}
