//! Configuration loading.
//!
//! A config file holds `key=value` lines. `#` starts a comment line; blank
//! lines and whitespace around keys and values are ignored.
//!
//! ```text
//! # provider address
//! rpc_ip=127.0.0.1
//! rpc_port=8000
//! zk_ip=127.0.0.1
//! zk_port=2181
//! ```
//!
//! [`RpcConfig`] keeps the raw entries and produces the typed
//! [`ServerConfig`] and [`ChannelConfig`] the server and channel take.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{RpcError, Result};
use crate::protocol::DEFAULT_MAX_FRAME_SIZE;

/// Default number of runtime worker threads for a server.
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Default limit on concurrently served connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 256;

/// Default time a connection gets to deliver its request frame.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Parsed `key=value` configuration.
#[derive(Debug, Clone, Default)]
pub struct RpcConfig {
    entries: HashMap<String, String>,
}

impl RpcConfig {
    /// Load and parse a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RpcError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::parse(&text)
    }

    /// Parse config text.
    ///
    /// # Errors
    ///
    /// Returns `Config` for a non-comment line without `=` or with an empty
    /// key.
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries = HashMap::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = line.split_once('=').ok_or_else(|| {
                RpcError::Config(format!("line {}: expected key=value, got {:?}", index + 1, line))
            })?;

            let key = key.trim();
            if key.is_empty() {
                return Err(RpcError::Config(format!("line {}: empty key", index + 1)));
            }

            entries.insert(key.to_string(), value.trim().to_string());
        }

        Ok(Self { entries })
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Set or replace a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| RpcError::Config(format!("missing required key {}", key)))
    }

    fn parsed<T: FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|_| RpcError::Config(format!("invalid value for {}: {:?}", key, value))),
        }
    }

    /// Provider address, `rpc_ip:rpc_port`.
    pub fn rpc_addr(&self) -> Result<String> {
        let ip = self.require("rpc_ip")?;
        let port: u16 = self
            .parsed("rpc_port")?
            .ok_or_else(|| RpcError::Config("missing required key rpc_port".to_string()))?;
        Ok(format!("{}:{}", ip, port))
    }

    /// Coordination service address, `zk_ip:zk_port`, if configured.
    pub fn discovery_addr(&self) -> Result<Option<String>> {
        let ip = match self.get("zk_ip") {
            Some(ip) if !ip.is_empty() => ip,
            _ => return Ok(None),
        };
        let port: u16 = self
            .parsed("zk_port")?
            .ok_or_else(|| RpcError::Config("zk_ip is set but zk_port is missing".to_string()))?;
        Ok(Some(format!("{}:{}", ip, port)))
    }

    /// Server settings: bind address plus tuning keys.
    pub fn server_config(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::new(self.rpc_addr()?);
        if let Some(threads) = self.parsed("worker_threads")? {
            config = config.worker_threads(threads);
        }
        if let Some(limit) = self.parsed("max_connections")? {
            config = config.max_connections(limit);
        }
        if let Some(max) = self.parsed("max_frame_size")? {
            config = config.max_frame_size(max);
        }
        if let Some(ms) = self.parsed::<u64>("read_timeout_ms")? {
            // 0 disables the deadline.
            config = config.read_timeout((ms > 0).then(|| Duration::from_millis(ms)));
        }
        Ok(config)
    }

    /// Channel settings: target address (if `rpc_ip`/`rpc_port` are set)
    /// plus tuning keys.
    pub fn channel_config(&self) -> Result<ChannelConfig> {
        let mut config = ChannelConfig::default();
        if self.get("rpc_ip").is_some() {
            config = config.addr(self.rpc_addr()?);
        }
        if let Some(max) = self.parsed("max_frame_size")? {
            config = config.max_frame_size(max);
        }
        if let Some(ms) = self.parsed::<u64>("connect_timeout_ms")? {
            config = config.connect_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.parsed::<u64>("call_timeout_ms")? {
            config = config.call_timeout(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on, `ip:port`. Port 0 picks a free port.
    pub bind_addr: String,
    /// Runtime worker threads used by [`build_runtime`](Self::build_runtime).
    pub worker_threads: usize,
    /// Connections served at once; extra connections wait for a slot.
    pub max_connections: usize,
    /// Largest accepted frame.
    pub max_frame_size: u32,
    /// Deadline for the request frame once a connection is being served.
    /// `None` waits indefinitely.
    pub read_timeout: Option<Duration>,
}

impl ServerConfig {
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            ..Self::default()
        }
    }

    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.max(1);
        self
    }

    pub fn max_connections(mut self, limit: usize) -> Self {
        self.max_connections = limit;
        self
    }

    pub fn max_frame_size(mut self, max: u32) -> Self {
        self.max_frame_size = max;
        self
    }

    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Multi-threaded runtime sized by `worker_threads`.
    pub fn build_runtime(&self) -> Result<tokio::runtime::Runtime> {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.worker_threads)
            .thread_name("tinyrpc-worker")
            .enable_all()
            .build()
            .map_err(RpcError::Io)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            worker_threads: DEFAULT_WORKER_THREADS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
        }
    }
}

/// Channel settings.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Fixed target address. Takes precedence over discovery when set.
    pub addr: Option<String>,
    /// Largest accepted frame, for both request and response.
    pub max_frame_size: u32,
    /// Bound on establishing the connection. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Bound on the whole call after connecting. `None` waits indefinitely.
    pub call_timeout: Option<Duration>,
}

impl ChannelConfig {
    pub fn new(addr: impl Into<String>) -> Self {
        Self::default().addr(addr)
    }

    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    pub fn max_frame_size(mut self, max: u32) -> Self {
        self.max_frame_size = max;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            addr: None,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            connect_timeout: None,
            call_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# provider
rpc_ip = 127.0.0.1
rpc_port=8000

zk_ip=10.0.0.5
zk_port=2181
worker_threads=8
call_timeout_ms=1500
owner=ops
";

    #[test]
    fn test_parse_sample() {
        let config = RpcConfig::parse(SAMPLE).unwrap();

        assert_eq!(config.get("rpc_ip"), Some("127.0.0.1"));
        assert_eq!(config.get("owner"), Some("ops"));
        assert_eq!(config.rpc_addr().unwrap(), "127.0.0.1:8000");
        assert_eq!(config.discovery_addr().unwrap().as_deref(), Some("10.0.0.5:2181"));
    }

    #[test]
    fn test_server_config_from_keys() {
        let server = RpcConfig::parse(SAMPLE).unwrap().server_config().unwrap();

        assert_eq!(server.bind_addr, "127.0.0.1:8000");
        assert_eq!(server.worker_threads, 8);
        assert_eq!(server.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(server.max_frame_size, DEFAULT_MAX_FRAME_SIZE);
        assert_eq!(server.read_timeout, Some(DEFAULT_READ_TIMEOUT));
    }

    #[test]
    fn test_read_timeout_key() {
        let base = "rpc_ip=127.0.0.1\nrpc_port=1\n";

        let server = RpcConfig::parse(&format!("{}read_timeout_ms=250", base))
            .unwrap()
            .server_config()
            .unwrap();
        assert_eq!(server.read_timeout, Some(Duration::from_millis(250)));

        let server = RpcConfig::parse(&format!("{}read_timeout_ms=0", base))
            .unwrap()
            .server_config()
            .unwrap();
        assert_eq!(server.read_timeout, None);
    }

    #[test]
    fn test_channel_config_from_keys() {
        let channel = RpcConfig::parse(SAMPLE).unwrap().channel_config().unwrap();

        assert_eq!(channel.addr.as_deref(), Some("127.0.0.1:8000"));
        assert_eq!(channel.call_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(channel.connect_timeout, None);
    }

    #[test]
    fn test_missing_required_key() {
        let config = RpcConfig::parse("rpc_ip=127.0.0.1").unwrap();
        let err = config.rpc_addr().unwrap_err();
        assert!(err.to_string().contains("rpc_port"));

        let config = RpcConfig::parse("rpc_port=1").unwrap();
        assert!(config.server_config().is_err());
    }

    #[test]
    fn test_invalid_values() {
        let config = RpcConfig::parse("rpc_ip=a\nrpc_port=99999").unwrap();
        assert!(matches!(config.rpc_addr(), Err(RpcError::Config(_))));

        let config = RpcConfig::parse("rpc_ip=a\nrpc_port=1\nworker_threads=many").unwrap();
        assert!(config.server_config().is_err());
    }

    #[test]
    fn test_malformed_lines() {
        assert!(RpcConfig::parse("just a line").is_err());
        assert!(RpcConfig::parse("=value").is_err());
    }

    #[test]
    fn test_no_discovery_configured() {
        let config = RpcConfig::parse("rpc_ip=127.0.0.1\nrpc_port=1").unwrap();
        assert_eq!(config.discovery_addr().unwrap(), None);

        let config = RpcConfig::parse("zk_ip=127.0.0.1").unwrap();
        assert!(config.discovery_addr().is_err());
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("tinyrpc-config-{}.conf", std::process::id()));
        std::fs::write(&path, SAMPLE).unwrap();

        let config = RpcConfig::from_file(&path).unwrap();
        assert_eq!(config.rpc_addr().unwrap(), "127.0.0.1:8000");

        std::fs::remove_file(&path).unwrap();
        assert!(RpcConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_builders() {
        let server = ServerConfig::new("0.0.0.0:9000")
            .worker_threads(0)
            .max_connections(2)
            .max_frame_size(1024);
        assert_eq!(server.worker_threads, 1);
        assert_eq!(server.max_connections, 2);
        assert_eq!(server.max_frame_size, 1024);

        let channel = ChannelConfig::new("127.0.0.1:1").connect_timeout(Duration::from_secs(1));
        assert_eq!(channel.addr.as_deref(), Some("127.0.0.1:1"));
        assert_eq!(channel.connect_timeout, Some(Duration::from_secs(1)));
    }
}
