//! Transport layer for node RPC communication
//!
//! A transport carries one unary call: request bytes in, response bytes out.
//! Protobuf encoding happens one layer up in [`crate::TronClient`], so the
//! same client runs over a real HTTP/2 channel or the in-memory mock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Buf, BufMut, Bytes};
use parking_lot::{Mutex, RwLock};
use prost::Message;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, ClientTlsConfig};
use tonic::Status;

use crate::pool::{Dialer, Endpoint, PoolConfig, PoolError};
use tron_proto::{wallet, BlockExtention, BlockHeader, BlockHeaderRaw, ChainParameter, ChainParameters, Return};

/// One multiplexed connection to a node (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a unary call on `path` with an already-encoded request
    async fn unary(
        &self,
        path: &'static str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, Status>;

    /// Whether the connection can be reused
    fn is_healthy(&self) -> bool {
        true
    }
}

// ==================== gRPC ====================

/// Pass-through codec: the message bytes are already protobuf-encoded
#[derive(Debug, Clone, Copy, Default)]
struct RawCodec;

impl Codec for RawCodec {
    type Encode = Bytes;
    type Decode = Bytes;
    type Encoder = RawCodec;
    type Decoder = RawCodec;

    fn encoder(&mut self) -> Self::Encoder {
        RawCodec
    }

    fn decoder(&mut self) -> Self::Decoder {
        RawCodec
    }
}

impl Encoder for RawCodec {
    type Item = Bytes;
    type Error = Status;

    fn encode(&mut self, item: Bytes, dst: &mut EncodeBuf<'_>) -> Result<(), Status> {
        dst.put(item);
        Ok(())
    }
}

impl Decoder for RawCodec {
    type Item = Bytes;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Bytes>, Status> {
        let len = src.remaining();
        Ok(Some(src.copy_to_bytes(len)))
    }
}

/// HTTP/2 connection to a node's wallet service
pub struct GrpcTransport {
    grpc: tonic::client::Grpc<Channel>,
    healthy: AtomicBool,
}

impl GrpcTransport {
    /// Open a channel to `endpoint`
    ///
    /// `grpcs` endpoints use `config.tls`, or a default TLS config verifying
    /// the endpoint host when none is given.
    pub async fn connect(endpoint: &Endpoint, config: &PoolConfig) -> Result<Self, PoolError> {
        let mut builder = Channel::from_shared(endpoint.uri())
            .map_err(|e| PoolError::Dial(e.to_string()))?
            .connect_timeout(config.connect_timeout)
            .tcp_nodelay(true);

        if endpoint.is_tls() {
            let tls = config
                .tls
                .clone()
                .unwrap_or_else(|| ClientTlsConfig::new().domain_name(endpoint.host()));
            builder = builder
                .tls_config(tls)
                .map_err(|e| PoolError::Dial(e.to_string()))?;
        }

        let channel = builder
            .connect()
            .await
            .map_err(|e| PoolError::Dial(e.to_string()))?;

        Ok(Self {
            grpc: tonic::client::Grpc::new(channel),
            healthy: AtomicBool::new(true),
        })
    }
}

impl std::fmt::Debug for GrpcTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrpcTransport")
            .field("healthy", &self.healthy.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    async fn unary(
        &self,
        path: &'static str,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, Status> {
        let mut grpc = self.grpc.clone();
        grpc.ready().await.map_err(|e| {
            self.healthy.store(false, Ordering::Relaxed);
            Status::unavailable(format!("channel not ready: {}", e))
        })?;

        let mut request = tonic::Request::new(payload);
        request.set_timeout(timeout);

        let response = grpc
            .unary(request, PathAndQuery::from_static(path), RawCodec)
            .await
            .map_err(|status| {
                if matches!(status.code(), tonic::Code::Unavailable | tonic::Code::Unknown) {
                    self.healthy.store(false, Ordering::Relaxed);
                }
                status
            })?;
        Ok(response.into_inner())
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}

/// Default dialer: one [`GrpcTransport`] per pooled connection
#[derive(Debug, Clone, Copy, Default)]
pub struct GrpcDialer;

#[async_trait]
impl Dialer for GrpcDialer {
    async fn dial(
        &self,
        endpoint: &Endpoint,
        config: &PoolConfig,
    ) -> Result<Arc<dyn Transport>, PoolError> {
        let transport = GrpcTransport::connect(endpoint, config).await?;
        Ok(Arc::new(transport))
    }
}

// ==================== Mock ====================

type Handler = Arc<dyn Fn(Bytes) -> Result<Bytes, Status> + Send + Sync>;

struct MockState {
    responses: RwLock<HashMap<&'static str, Handler>>,
    default_responses: HashMap<&'static str, Handler>,
    calls: Mutex<HashMap<&'static str, usize>>,
    delay: Mutex<Option<Duration>>,
    healthy: AtomicBool,
}

/// In-memory transport for testing
///
/// Answers from custom responses first, then from built-in defaults for
/// a few read-only methods (`GetNowBlock2`, `GetChainParameters`,
/// `BroadcastTransaction`). Unknown paths answer `UNIMPLEMENTED`. Clones
/// share state, so a test can keep a handle while the pool owns another.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    /// Energy price in the default chain parameters (sun per unit)
    pub const DEFAULT_ENERGY_FEE: i64 = 420;
    /// Bandwidth price in the default chain parameters (sun per byte)
    pub const DEFAULT_TRANSACTION_FEE: i64 = 1000;
    /// Height of the default head block
    pub const DEFAULT_BLOCK_NUMBER: i64 = 256;

    /// Create a new mock transport
    pub fn new() -> Self {
        let mut defaults: HashMap<&'static str, Handler> = HashMap::new();

        let head = BlockExtention {
            block_header: Some(BlockHeader {
                raw_data: Some(BlockHeaderRaw {
                    number: Self::DEFAULT_BLOCK_NUMBER,
                    timestamp: 1_700_000_000_000,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            blockid: vec![0xab; 32],
            ..Default::default()
        };
        defaults.insert(wallet::GET_NOW_BLOCK, canned(&head));

        let params = ChainParameters {
            chain_parameter: vec![
                ChainParameter {
                    key: "getEnergyFee".into(),
                    value: Self::DEFAULT_ENERGY_FEE,
                },
                ChainParameter {
                    key: "getTransactionFee".into(),
                    value: Self::DEFAULT_TRANSACTION_FEE,
                },
            ],
        };
        defaults.insert(wallet::GET_CHAIN_PARAMETERS, canned(&params));

        let accepted = Return {
            result: true,
            ..Default::default()
        };
        defaults.insert(wallet::BROADCAST_TRANSACTION, canned(&accepted));

        Self {
            state: Arc::new(MockState {
                responses: RwLock::new(HashMap::new()),
                default_responses: defaults,
                calls: Mutex::new(HashMap::new()),
                delay: Mutex::new(None),
                healthy: AtomicBool::new(true),
            }),
        }
    }

    /// Answer `path` with a fixed message
    pub fn set_response<M: Message>(&self, path: &'static str, response: &M) {
        self.state.responses.write().insert(path, canned(response));
    }

    /// Answer `path` with a fixed error status
    pub fn set_error(&self, path: &'static str, status: Status) {
        self.state.responses.write().insert(
            path,
            Arc::new(move |_| Err(Status::new(status.code(), status.message().to_owned()))),
        );
    }

    /// Answer `path` by running `handler` on the decoded request
    pub fn set_handler<Req, Resp, F>(&self, path: &'static str, handler: F)
    where
        Req: Message + Default,
        Resp: Message,
        F: Fn(Req) -> Result<Resp, Status> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |payload: Bytes| {
            let request = Req::decode(payload)
                .map_err(|e| Status::invalid_argument(format!("bad request: {}", e)))?;
            handler(request).map(|resp| Bytes::from(resp.encode_to_vec()))
        });
        self.state.responses.write().insert(path, handler);
    }

    /// Clear custom responses
    pub fn clear_responses(&self) {
        self.state.responses.write().clear();
    }

    /// Delay every answer by `delay`
    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.state.delay.lock() = delay;
    }

    /// Flip the health flag reported to the pool
    pub fn set_healthy(&self, healthy: bool) {
        self.state.healthy.store(healthy, Ordering::Relaxed);
    }

    /// Number of calls made on `path`
    pub fn calls(&self, path: &str) -> usize {
        self.state.calls.lock().get(path).copied().unwrap_or(0)
    }

    /// Number of calls made on any path
    pub fn total_calls(&self) -> usize {
        self.state.calls.lock().values().sum()
    }
}

fn canned<M: Message>(message: &M) -> Handler {
    let bytes = Bytes::from(message.encode_to_vec());
    Arc::new(move |_| Ok(bytes.clone()))
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("calls", &self.total_calls())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn unary(
        &self,
        path: &'static str,
        payload: Bytes,
        _timeout: Duration,
    ) -> Result<Bytes, Status> {
        *self.state.calls.lock().entry(path).or_insert(0) += 1;

        let delay = *self.state.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let custom = self.state.responses.read().get(path).cloned();
        let handler = custom.or_else(|| self.state.default_responses.get(path).cloned());

        match handler {
            Some(handler) => handler(payload),
            None => Err(Status::unimplemented(format!("method not found: {}", path))),
        }
    }

    fn is_healthy(&self) -> bool {
        self.state.healthy.load(Ordering::Relaxed)
    }
}

/// Dialer handing out clones of one [`MockTransport`]
#[derive(Debug, Clone, Default)]
pub struct MockDialer {
    transport: MockTransport,
    dials: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl MockDialer {
    /// Dialer serving `transport`
    pub fn new(transport: MockTransport) -> Self {
        Self {
            transport,
            dials: Arc::new(AtomicUsize::new(0)),
            fail: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make subsequent dials fail (or succeed again)
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::Relaxed);
    }

    /// Number of dial attempts so far
    pub fn dials(&self) -> usize {
        self.dials.load(Ordering::Relaxed)
    }

    /// The shared transport
    pub fn transport(&self) -> &MockTransport {
        &self.transport
    }
}

#[async_trait]
impl Dialer for MockDialer {
    async fn dial(
        &self,
        endpoint: &Endpoint,
        _config: &PoolConfig,
    ) -> Result<Arc<dyn Transport>, PoolError> {
        self.dials.fetch_add(1, Ordering::Relaxed);
        if self.fail.load(Ordering::Relaxed) {
            return Err(PoolError::Dial(format!("connection refused: {}", endpoint)));
        }
        Ok(Arc::new(self.transport.clone()))
    }
}
