//! TCP transport helpers.
//!
//! One call per connection: the caller connects, writes one frame, reads one
//! frame, and the server closes. The helpers here work on any tokio stream so
//! they can be exercised over `tokio::io::duplex` as well as real sockets.

mod tcp;

pub use tcp::{connect, read_frame, write_frame};
