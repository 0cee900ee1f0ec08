//! Bounded connection pool for one node endpoint
//!
//! Every call leases a connection through [`ConnectionPool::acquire`] and
//! gives it back when the [`PooledConnection`] is dropped, on every exit
//! path. A semaphore with `max_size` permits caps the number of open
//! connections: each lease holds one permit, and idle connections exist
//! only as the leftovers of earlier leases.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;
use tonic::transport::ClientTlsConfig;
use tracing::{debug, warn};

use crate::context::CallContext;
use crate::error::{SdkError, SdkResult};
use crate::transport::{GrpcDialer, Transport};

/// Why a connection could not be leased
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PoolError {
    /// Every connection stayed busy for the whole wait budget
    #[error("pool exhausted")]
    Exhausted,

    /// Caller cancelled while waiting
    #[error("cancelled while waiting for a connection")]
    Cancelled,

    /// Caller deadline passed while waiting
    #[error("deadline exceeded while waiting for a connection")]
    DeadlineExceeded,

    /// Pool was closed
    #[error("pool closed")]
    Closed,

    /// Opening a new connection failed
    #[error("dial failed: {0}")]
    Dial(String),
}

// ==================== Endpoint ====================

/// Node address: `grpc://host:port`, `grpcs://host:port` or bare `host:port`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
    tls: bool,
}

impl Endpoint {
    /// Parse and validate an endpoint string
    pub fn parse(s: &str) -> SdkResult<Self> {
        let s = s.trim();
        let (tls, rest) = match s.split_once("://") {
            Some(("grpc", rest)) => (false, rest),
            Some(("grpcs", rest)) => (true, rest),
            Some((scheme, _)) => {
                return Err(SdkError::InvalidConfig(format!(
                    "unsupported scheme '{}' in endpoint {}",
                    scheme, s
                )))
            }
            None => (false, s),
        };
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            let (host, tail) = bracketed.split_once(']').ok_or_else(|| {
                SdkError::InvalidConfig(format!("unterminated IPv6 host in {}", s))
            })?;
            let port = tail.strip_prefix(':').ok_or_else(|| {
                SdkError::InvalidConfig(format!("missing port in endpoint {}", s))
            })?;
            (host, port)
        } else {
            rest.rsplit_once(':')
                .ok_or_else(|| SdkError::InvalidConfig(format!("missing port in endpoint {}", s)))?
        };

        if host.is_empty() || host.contains(['/', ' ', '?', '#']) {
            return Err(SdkError::InvalidConfig(format!("invalid host in endpoint {}", s)));
        }
        let port: u16 = port
            .parse()
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| SdkError::InvalidConfig(format!("invalid port in endpoint {}", s)))?;

        Ok(Self {
            host: host.to_string(),
            port,
            tls,
        })
    }

    pub(crate) fn loopback(port: u16) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port,
            tls: false,
        }
    }

    /// Host name or IP (without IPv6 brackets)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the endpoint uses TLS (`grpcs`)
    pub fn is_tls(&self) -> bool {
        self.tls
    }

    /// URI in the form the HTTP/2 channel expects
    pub fn uri(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        if self.host.contains(':') {
            format!("{}://[{}]:{}", scheme, self.host, self.port)
        } else {
            format!("{}://{}:{}", scheme, self.host, self.port)
        }
    }
}

impl FromStr for Endpoint {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.tls { "grpcs" } else { "grpc" };
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", scheme, self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", scheme, self.host, self.port)
        }
    }
}

// ==================== Config ====================

/// Pool configuration
///
/// Deserializes from a config file with durations in milliseconds
/// (`default_timeout_ms`, `acquire_timeout_ms`, `connect_timeout_ms`).
/// TLS settings are code-only.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Connections opened eagerly by [`ConnectionPool::connect`]
    pub initial_size: usize,
    /// Upper bound on open connections
    pub max_size: usize,
    /// Per-call timeout applied when the caller's context has no deadline
    #[serde(rename = "default_timeout_ms", with = "duration_ms")]
    pub default_timeout: Duration,
    /// How long `acquire` waits for a free connection
    #[serde(rename = "acquire_timeout_ms", with = "duration_ms")]
    pub acquire_timeout: Duration,
    /// TCP/TLS connect timeout for new connections
    #[serde(rename = "connect_timeout_ms", with = "duration_ms")]
    pub connect_timeout: Duration,
    /// TLS settings for `grpcs` endpoints
    #[serde(skip)]
    pub tls: Option<ClientTlsConfig>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: 1,
            max_size: 8,
            default_timeout: Duration::from_secs(10),
            acquire_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
            tls: None,
        }
    }
}

impl PoolConfig {
    /// Check sizing and timeouts
    pub fn validate(&self) -> SdkResult<()> {
        if self.max_size == 0 {
            return Err(SdkError::InvalidConfig("max_size must be at least 1".into()));
        }
        if self.initial_size > self.max_size {
            return Err(SdkError::InvalidConfig(format!(
                "initial_size {} exceeds max_size {}",
                self.initial_size, self.max_size
            )));
        }
        if self.default_timeout < Duration::from_millis(1) {
            return Err(SdkError::InvalidConfig(
                "default_timeout must be at least 1ms".into(),
            ));
        }
        if self.acquire_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(SdkError::InvalidConfig(
                "acquire_timeout and connect_timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

// ==================== Dialer ====================

/// Opens new connections for the pool
#[async_trait]
pub trait Dialer: Send + Sync {
    /// Open one connection to `endpoint`
    async fn dial(
        &self,
        endpoint: &Endpoint,
        config: &PoolConfig,
    ) -> Result<Arc<dyn Transport>, PoolError>;
}

// ==================== Pool ====================

struct PoolInner {
    endpoint: Endpoint,
    config: PoolConfig,
    dialer: Arc<dyn Dialer>,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<Arc<dyn Transport>>>,
    open: AtomicUsize,
    closed: AtomicBool,
    shutdown: CancellationToken,
}

impl PoolInner {
    fn discard(&self, reason: &str) {
        let open = self.open.fetch_sub(1, Ordering::AcqRel) - 1;
        debug!(endpoint = %self.endpoint, open, reason, "discarding connection");
    }

    fn give_back(&self, conn: Arc<dyn Transport>, healthy: bool) {
        if self.closed.load(Ordering::Acquire) {
            self.discard("pool closed");
        } else if !healthy || !conn.is_healthy() {
            self.discard("unhealthy");
        } else {
            let mut idle = self.idle.lock();
            idle.push(conn);
            debug!(endpoint = %self.endpoint, idle = idle.len(), "connection released");
        }
    }
}

/// Bounded pool of connections to a single endpoint
///
/// Cheap to clone; clones share the same connections.
#[derive(Clone)]
pub struct ConnectionPool {
    inner: Arc<PoolInner>,
}

impl ConnectionPool {
    /// Create a pool over gRPC connections; nothing is dialled yet
    pub fn new(endpoint: &str, config: PoolConfig) -> SdkResult<Self> {
        Self::with_dialer(endpoint, config, Arc::new(GrpcDialer))
    }

    /// Create a pool with a custom dialer (mock transports, proxies)
    pub fn with_dialer(
        endpoint: &str,
        config: PoolConfig,
        dialer: Arc<dyn Dialer>,
    ) -> SdkResult<Self> {
        let endpoint = Endpoint::parse(endpoint)?;
        config.validate()?;
        Ok(Self::from_parts(endpoint, config, dialer))
    }

    pub(crate) fn from_parts(
        endpoint: Endpoint,
        config: PoolConfig,
        dialer: Arc<dyn Dialer>,
    ) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                permits: Arc::new(Semaphore::new(config.max_size)),
                idle: Mutex::new(Vec::with_capacity(config.max_size)),
                open: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
                shutdown: CancellationToken::new(),
                endpoint,
                config,
                dialer,
            }),
        }
    }

    /// Create a pool and open `initial_size` connections up front
    pub async fn connect(endpoint: &str, config: PoolConfig) -> SdkResult<Self> {
        let pool = Self::new(endpoint, config)?;
        pool.warm_up().await?;
        Ok(pool)
    }

    /// Open connections until `initial_size` are idle
    ///
    /// Every dial holds a lease slot until warm-up ends, so running this
    /// next to `acquire` never opens more than `max_size` connections.
    /// Warm-up stops early when no slot is free.
    pub async fn warm_up(&self) -> SdkResult<()> {
        let target = self.inner.config.initial_size;
        let mut slots = Vec::with_capacity(target);
        while self.idle_connections() < target && self.open_connections() < target {
            let Ok(slot) = Arc::clone(&self.inner.permits).try_acquire_owned() else {
                debug!(endpoint = %self.inner.endpoint, "warm-up stopped, pool busy");
                break;
            };
            slots.push(slot);
            let conn = self.dial().await.map_err(|source| SdkError::RpcDial {
                op: "Connect",
                source,
            })?;
            self.inner.idle.lock().push(conn);
        }
        Ok(())
    }

    async fn dial(&self) -> Result<Arc<dyn Transport>, PoolError> {
        let inner = &self.inner;
        match inner.dialer.dial(&inner.endpoint, &inner.config).await {
            Ok(conn) => {
                let open = inner.open.fetch_add(1, Ordering::AcqRel) + 1;
                debug!(endpoint = %inner.endpoint, open, "dialled new connection");
                Ok(conn)
            }
            Err(e) => {
                warn!(endpoint = %inner.endpoint, error = %e, "dial failed");
                Err(e)
            }
        }
    }

    /// Lease a connection
    ///
    /// Reuses an idle healthy connection, dials a new one while under
    /// `max_size`, and otherwise waits until a lease is returned. Waiting
    /// ends with `Cancelled`/`DeadlineExceeded` from the context, `Closed`
    /// from [`ConnectionPool::close`], or `Exhausted` once `acquire_timeout`
    /// elapses.
    pub async fn acquire(&self, ctx: &CallContext) -> Result<PooledConnection, PoolError> {
        if self.is_closed() {
            return Err(PoolError::Closed);
        }

        let permit = tokio::select! {
            biased;
            reason = ctx.done() => return Err(context_to_pool(reason)),
            _ = self.inner.shutdown.cancelled() => return Err(PoolError::Closed),
            permit = Arc::clone(&self.inner.permits).acquire_owned() => {
                permit.map_err(|_| PoolError::Closed)?
            }
            _ = tokio::time::sleep(self.inner.config.acquire_timeout) => {
                return Err(PoolError::Exhausted)
            }
        };

        loop {
            let candidate = self.inner.idle.lock().pop();
            match candidate {
                Some(conn) if conn.is_healthy() => return Ok(self.lease(conn, permit)),
                Some(_) => self.inner.discard("unhealthy while idle"),
                None => break,
            }
        }

        let conn = tokio::select! {
            biased;
            reason = ctx.done() => return Err(context_to_pool(reason)),
            conn = self.dial() => conn?,
        };
        Ok(self.lease(conn, permit))
    }

    fn lease(&self, conn: Arc<dyn Transport>, permit: OwnedSemaphorePermit) -> PooledConnection {
        PooledConnection {
            conn,
            pool: Arc::clone(&self.inner),
            healthy: true,
            _permit: permit,
        }
    }

    /// Refuse further leases, wake waiters with `Closed`, drop idle connections
    ///
    /// Connections currently leased are dropped when their lease ends.
    pub fn close(&self) {
        if self.inner.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.inner.shutdown.cancel();
        self.inner.permits.close();
        let drained: Vec<_> = self.inner.idle.lock().drain(..).collect();
        for _ in &drained {
            self.inner.discard("pool closed");
        }
        debug!(endpoint = %self.inner.endpoint, "pool closed");
    }

    /// Whether [`ConnectionPool::close`] was called
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Open connections, leased or idle
    pub fn open_connections(&self) -> usize {
        self.inner.open.load(Ordering::Acquire)
    }

    /// Idle connections ready for reuse
    pub fn idle_connections(&self) -> usize {
        self.inner.idle.lock().len()
    }

    /// Per-call timeout used when the caller's context has no deadline
    pub fn default_timeout(&self) -> Duration {
        self.inner.config.default_timeout
    }

    /// Target endpoint
    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    /// Pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }
}

impl fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("endpoint", &self.inner.endpoint)
            .field("open", &self.open_connections())
            .field("idle", &self.idle_connections())
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn context_to_pool(reason: SdkError) -> PoolError {
    match reason {
        SdkError::DeadlineExceeded => PoolError::DeadlineExceeded,
        _ => PoolError::Cancelled,
    }
}

/// Scoped lease on a pooled connection
///
/// Dropping the lease returns the connection to the idle set, or discards
/// it when it was marked unhealthy or the pool is closed.
pub struct PooledConnection {
    conn: Arc<dyn Transport>,
    pool: Arc<PoolInner>,
    healthy: bool,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    /// The leased transport
    pub fn transport(&self) -> &dyn Transport {
        self.conn.as_ref()
    }

    /// Discard the connection instead of reusing it
    pub fn mark_unhealthy(&mut self) {
        self.healthy = false;
    }

    /// Whether the lease will return the connection to the pool
    pub fn is_healthy(&self) -> bool {
        self.healthy && self.conn.is_healthy()
    }
}

impl fmt::Debug for PooledConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("endpoint", &self.pool.endpoint)
            .field("healthy", &self.healthy)
            .finish_non_exhaustive()
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        // the permit field drops after this, so a woken waiter sees the idle connection
        self.pool.give_back(Arc::clone(&self.conn), self.healthy);
    }
}
