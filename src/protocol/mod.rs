//! Protocol module - frame codec and call envelope.
//!
//! - 4-byte big-endian length-prefixed frames
//! - Frame buffer for accumulating partial reads
//! - Call envelope (header frame + argument bytes) carried inside a frame

mod envelope;
mod frame;
mod frame_buffer;

pub use envelope::{decode_envelope, encode_envelope, Envelope, RpcHeader};
pub use frame::{decode_frame, encode_frame, peek_length, DEFAULT_MAX_FRAME_SIZE, LENGTH_PREFIX_SIZE};
pub use frame_buffer::FrameBuffer;
