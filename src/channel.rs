//! RPC client channel.
//!
//! Every call opens its own TCP connection, writes one framed envelope,
//! reads one framed response and closes. There is no request multiplexing,
//! so concurrent calls on a cloned channel simply use separate connections.
//!
//! # Example
//!
//! ```ignore
//! use tinyrpc::{ChannelConfig, RpcChannel, RpcController};
//!
//! let channel = RpcChannel::new(ChannelConfig::new("127.0.0.1:8000"));
//!
//! let mut response = LoginResponse::default();
//! let mut controller = RpcController::new();
//! channel
//!     .call_method("UserService", "Login", &request, &mut response, &mut controller)
//!     .await;
//!
//! if controller.failed() {
//!     eprintln!("login failed: {}", controller.error_text());
//! }
//! ```

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::net::TcpStream;

use crate::codec::MsgPackCodec;
use crate::config::ChannelConfig;
use crate::controller::RpcController;
use crate::discovery::{method_path, Discovery};
use crate::error::{RpcError, Result};
use crate::protocol::{encode_envelope, FrameBuffer};
use crate::transport::{connect, read_frame, write_frame};

/// Client side of a call.
#[derive(Clone)]
pub struct RpcChannel {
    config: ChannelConfig,
    discovery: Option<Arc<dyn Discovery>>,
}

impl RpcChannel {
    /// Channel calling the fixed address in `config`.
    pub fn new(config: ChannelConfig) -> Self {
        Self {
            config,
            discovery: None,
        }
    }

    /// Channel that looks up `/<service>/<method>` before every call, unless
    /// `config` carries an address.
    pub fn with_discovery(config: ChannelConfig, discovery: Arc<dyn Discovery>) -> Self {
        Self {
            config,
            discovery: Some(discovery),
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Call a method, recording any failure on `controller`.
    ///
    /// On success `response` holds the decoded reply. On failure `response`
    /// is left untouched and `controller.failed()` is true. Nothing is
    /// returned and nothing panics.
    pub async fn call_method<Req, Resp>(
        &self,
        service: &str,
        method: &str,
        request: &Req,
        response: &mut Resp,
        controller: &mut RpcController,
    ) where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        match self.call(service, method, request).await {
            Ok(reply) => *response = reply,
            Err(e) => {
                tracing::warn!("Call {}.{} failed: {}", service, method, e);
                controller.set_failed_from(&e);
            }
        }
    }

    /// Call a method and return the decoded reply.
    pub async fn call<Req, Resp>(&self, service: &str, method: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let args = MsgPackCodec::encode(request)?;
        let envelope = encode_envelope(service, method, &args, self.config.max_frame_size)?;

        let addr = self.resolve(service, method).await?;
        tracing::debug!("Calling {}.{} at {}", service, method, addr);

        let stream = connect(&addr, self.config.connect_timeout).await?;

        let exchange = self.exchange(stream, &envelope);
        let payload = match self.config.call_timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| RpcError::Timeout(limit))??,
            None => exchange.await?,
        };

        MsgPackCodec::decode(&payload).map_err(|e| RpcError::ResponseDecode(e.to_string()))
    }

    /// Where `service.method` is served.
    ///
    /// A configured address wins; discovery is asked only without one.
    async fn resolve(&self, service: &str, method: &str) -> Result<String> {
        if let Some(addr) = &self.config.addr {
            return Ok(addr.clone());
        }

        match &self.discovery {
            Some(discovery) => discovery.resolve(&method_path(service, method)).await,
            None => Err(RpcError::Config(
                "channel has no address and no discovery".to_string(),
            )),
        }
    }

    /// Write the request frame and read the single response frame.
    async fn exchange(&self, mut stream: TcpStream, envelope: &[u8]) -> Result<Bytes> {
        write_frame(&mut stream, envelope, self.config.max_frame_size).await?;

        let mut buffer = FrameBuffer::with_max_frame_size(self.config.max_frame_size);
        read_frame(&mut stream, &mut buffer)
            .await?
            .ok_or(RpcError::ConnectionClosedPrematurely)
    }
}

impl std::fmt::Debug for RpcChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcChannel")
            .field("config", &self.config)
            .field("discovery", &self.discovery.is_some())
            .finish()
    }
}
