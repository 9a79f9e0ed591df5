//! # tinyrpc
//!
//! A small RPC framework over TCP.
//!
//! A process registers services made of named methods. A caller addresses a
//! method by `(service, method)` name, sends a MessagePack-encoded argument
//! and receives a MessagePack-encoded reply.
//!
//! ## Architecture
//!
//! - **Wire**: 4-byte big-endian length-prefixed frames. A request frame holds
//!   a framed [`RpcHeader`](protocol::RpcHeader) followed by the argument bytes.
//! - **Dispatch**: services publish a table of
//!   [`MethodDescriptor`](service::MethodDescriptor)s at registration; the
//!   server looks calls up by name and works through type-erased messages.
//! - **Lifecycle**: one TCP connection per call. Server-side failures close
//!   the connection without a reply; the caller records them on its
//!   [`RpcController`].
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tinyrpc::{ChannelConfig, RpcChannel, RpcServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> tinyrpc::Result<()> {
//!     let server = RpcServer::builder()
//!         .register(Arc::new(UserService))
//!         .bind(ServerConfig::new("127.0.0.1:0"))
//!         .await?;
//!     let addr = server.local_addr();
//!     tokio::spawn(server.run());
//!
//!     let channel = RpcChannel::new(ChannelConfig::new(addr.to_string()));
//!     let reply: LoginResponse = channel.call("UserService", "Login", &request).await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;

mod channel;
mod controller;
mod server;

pub use channel::RpcChannel;
pub use config::{ChannelConfig, RpcConfig, ServerConfig};
pub use controller::RpcController;
pub use discovery::{Discovery, MemoryDiscovery};
pub use error::{Result, RpcError};
pub use server::{RpcServer, RpcServerBuilder};
pub use service::{Done, MethodDescriptor, Service};
