//! Codec module - structured message encoding for headers and payloads.
//!
//! Every record that crosses the wire (the call header, request arguments,
//! response bodies) is encoded with [`MsgPackCodec`].
//!
//! # Example
//!
//! ```
//! use tinyrpc::codec::MsgPackCodec;
//!
//! let encoded = MsgPackCodec::encode(&"hello").unwrap();
//! let decoded: String = MsgPackCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded, "hello");
//! ```

mod msgpack;

pub use msgpack::MsgPackCodec;
