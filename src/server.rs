//! RPC server (provider).
//!
//! [`RpcServerBuilder`] collects services during the registration phase.
//! [`RpcServerBuilder::bind`] freezes the registry, binds the listener and
//! publishes every method to discovery. [`RpcServer`] then serves:
//! 1. Accept a connection (it waits for a slot if the limit is reached)
//! 2. Read one frame within the read timeout and decode the call envelope
//! 3. Look up the method and decode the argument into a blank request
//! 4. Invoke the handler and wait for its completion signal
//! 5. Write the framed response and close
//!
//! Any failure along the way is logged and the connection is closed without
//! a response. Callers see that as a premature close.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tinyrpc::{RpcServer, ServerConfig};
//!
//! let server = RpcServer::builder()
//!     .register(Arc::new(UserService))
//!     .bind(ServerConfig::new("127.0.0.1:8000"))
//!     .await?;
//!
//! server.run().await?;
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::config::ServerConfig;
use crate::discovery::{method_path, service_path, Discovery};
use crate::error::{RpcError, Result};
use crate::protocol::{decode_envelope, FrameBuffer};
use crate::service::{Done, Service, ServiceRegistry};
use crate::transport::{read_frame, write_frame};

/// Pause after a failed `accept` so a persistent error does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Per-connection limits taken from [`ServerConfig`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct ConnectionLimits {
    pub max_frame_size: u32,
    pub read_timeout: Option<Duration>,
}

/// Registration phase of a server.
#[derive(Default)]
pub struct RpcServerBuilder {
    registry: ServiceRegistry,
    discovery: Option<Arc<dyn Discovery>>,
}

impl RpcServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service. A second service with the same name replaces the
    /// first.
    pub fn register<S: Service>(mut self, service: Arc<S>) -> Self {
        self.registry.register(service);
        self
    }

    /// Publish methods to `discovery` once bound.
    pub fn discovery(mut self, discovery: Arc<dyn Discovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }

    /// Bind the listener and publish every registered method.
    ///
    /// Services are published at `/<service>` and methods at
    /// `/<service>/<method>` (ephemeral), both holding the bound address.
    pub async fn bind(self, config: ServerConfig) -> Result<RpcServer> {
        let listener = TcpListener::bind(&config.bind_addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!(
            "RPC server listening on {} with services {:?}",
            local_addr,
            self.registry.service_names()
        );

        if let Some(discovery) = &self.discovery {
            publish_all(discovery.as_ref(), &self.registry, &local_addr.to_string()).await?;
        }

        Ok(RpcServer {
            listener,
            local_addr,
            registry: Arc::new(self.registry),
            connections: Arc::new(Semaphore::new(config.max_connections)),
            limits: ConnectionLimits {
                max_frame_size: config.max_frame_size,
                read_timeout: config.read_timeout,
            },
        })
    }
}

async fn publish_all(discovery: &dyn Discovery, registry: &ServiceRegistry, addr: &str) -> Result<()> {
    for service in registry.services() {
        discovery.publish(&service_path(service.name()), addr, false).await?;

        for method in service.method_names() {
            discovery
                .publish(&method_path(service.name(), method), addr, true)
                .await?;
        }
    }
    Ok(())
}

/// A bound server with a frozen registry.
pub struct RpcServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    registry: Arc<ServiceRegistry>,
    connections: Arc<Semaphore>,
    limits: ConnectionLimits,
}

impl RpcServer {
    pub fn builder() -> RpcServerBuilder {
        RpcServerBuilder::new()
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Registered services.
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Serve until the process exits.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` completes.
    ///
    /// Connections already accepted finish on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("RPC server on {} shutting down", self.local_addr);
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            accept_failed(e).await;
                            continue;
                        }
                    };
                    self.spawn_connection(stream, peer);
                }
            }
        }
    }

    fn spawn_connection(&self, stream: tokio::net::TcpStream, peer: SocketAddr) {
        tracing::trace!("Accepted connection from {}", peer);

        let connections = self.connections.clone();
        let registry = self.registry.clone();
        let limits = self.limits;

        tokio::spawn(async move {
            // Over the limit the connection waits here; its request stays
            // buffered in the socket until a slot frees up.
            let _permit = match connections.clone().try_acquire_owned() {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::debug!("Connection capacity reached, {} waits for a slot", peer);
                    match connections.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return,
                    }
                }
            };

            match serve_connection(stream, &registry, limits).await {
                Ok(()) => tracing::trace!("Closed connection from {}", peer),
                Err(e @ RpcError::HandlerAbandoned { .. }) => {
                    tracing::error!("Closing connection from {}: {}", peer, e)
                }
                Err(e) => tracing::warn!("Closing connection from {} without response: {}", peer, e),
            }
        });
    }
}

/// Log a failed `accept` and pause before the next one.
async fn accept_failed(error: std::io::Error) {
    tracing::warn!("Accept failed: {}", error);
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}

/// Serve exactly one call on `stream`, then shut it down.
///
/// Returns the error that ended the call early, if any. No bytes are written
/// in that case. A peer that has not delivered its request frame within
/// `read_timeout` is dropped with `Timeout`.
pub(crate) async fn serve_connection<S>(
    mut stream: S,
    registry: &ServiceRegistry,
    limits: ConnectionLimits,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let max_frame_size = limits.max_frame_size;
    let mut buffer = FrameBuffer::with_max_frame_size(max_frame_size);

    let read = read_frame(&mut stream, &mut buffer);
    let received = match limits.read_timeout {
        Some(limit) => tokio::time::timeout(limit, read)
            .await
            .map_err(|_| RpcError::Timeout(limit))??,
        None => read.await?,
    };

    let frame = match received {
        Some(frame) => frame,
        None => {
            tracing::debug!("Peer closed before sending a request");
            return Ok(());
        }
    };

    let envelope = decode_envelope(&frame, max_frame_size)?;
    let (service, method_name) = (envelope.service_name(), envelope.method_name());
    tracing::debug!("Dispatching {}.{} ({} argument bytes)", service, method_name, envelope.args().len());

    let method = registry.lookup(service, method_name)?;

    let mut request = method.new_request();
    request
        .merge_from_bytes(envelope.args())
        .map_err(|e| RpcError::ArgumentDecode(e.to_string()))?;
    let mut response = method.new_response();

    let (done, mut completion) = Done::new();
    method.invoke(&*request, &mut *response, done);

    let outcome = match completion.try_complete() {
        Some(outcome) => outcome,
        None => {
            tracing::debug!("{}.{} deferred completion", service, method_name);
            completion.await
        }
    };
    outcome.map_err(|_| RpcError::HandlerAbandoned {
        service: service.to_string(),
        method: method_name.to_string(),
    })?;

    let payload = response.to_bytes()?;
    write_frame(&mut stream, &payload, max_frame_size).await?;
    stream.shutdown().await?;

    tracing::debug!("Responded to {}.{} ({} bytes)", service, method_name, payload.len());
    Ok(())
}
