//! Transaction workflow
//!
//! [`TransactionWorkflow`] drives one node-built transaction through
//! `Unsigned -> Signed -> Broadcasted`. Any failure moves it to `Error`,
//! which is terminal: every later call returns the recorded cause.
//!
//! Only `raw_data.expiration` and `raw_data.fee_limit` may be changed, and
//! only before the first signature.

use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use prost::Message;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use tron_crypto::{recover_address, Signature};
use tron_primitives::{Address, H256};
use tron_proto::{
    ContractResult, Permission, ResponseCode, Transaction, TransactionExtention, TransactionInfo,
    TriggerSmartContract,
};

use crate::client::TronClient;
use crate::context::CallContext;
use crate::error::{SdkError, SdkResult};
use crate::signer::Signer;

/// Interval between receipt polls
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// No signatures; expiration and fee limit may change
    Unsigned,
    /// At least one signature
    Signed,
    /// Accepted by the node
    Broadcasted,
    /// Terminal failure
    Error,
}

/// Transaction as handed to the workflow
#[derive(Debug, Clone)]
pub enum TxSource {
    /// Bare transaction
    Bare(Transaction),
    /// Build reply carrying the node's transaction ID
    Extension(TransactionExtention),
}

impl From<Transaction> for TxSource {
    fn from(tx: Transaction) -> Self {
        TxSource::Bare(tx)
    }
}

impl From<TransactionExtention> for TxSource {
    fn from(ext: TransactionExtention) -> Self {
        TxSource::Extension(ext)
    }
}

/// Execution status from a receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    /// Executed successfully
    Success,
    /// Reverted
    Revert,
    /// Ran out of energy
    OutOfEnergy,
    /// Any other VM outcome
    Other(ContractResult),
}

impl ExecutionStatus {
    fn from_result(result: ContractResult) -> Self {
        match result {
            ContractResult::Default | ContractResult::Success => Self::Success,
            ContractResult::Revert => Self::Revert,
            ContractResult::OutOfEnergy => Self::OutOfEnergy,
            other => Self::Other(other),
        }
    }

    /// Name as the node writes it
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Revert => "REVERT",
            Self::OutOfEnergy => "OUT_OF_ENERGY",
            Self::Other(result) => result.as_str_name(),
        }
    }
}

/// Post-execution record
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    /// VM outcome
    pub status: ExecutionStatus,
    /// Energy consumed
    pub energy_used: i64,
    /// Bandwidth consumed, in bytes
    pub bandwidth_used: i64,
    /// Total fee paid, in sun
    pub fee: i64,
    /// Block that included the transaction
    pub block_number: i64,
    /// Emitted logs
    pub logs: Vec<tron_proto::Log>,
    /// Contract return data
    pub result: Vec<u8>,
    /// Node message, if any
    pub message: String,
}

impl Receipt {
    fn from_info(info: TransactionInfo) -> Self {
        let (status, energy_used, bandwidth_used) = match &info.receipt {
            Some(r) => (
                ExecutionStatus::from_result(r.result()),
                r.energy_usage_total,
                r.net_usage,
            ),
            None => (ExecutionStatus::Success, 0, 0),
        };
        Self {
            status,
            energy_used,
            bandwidth_used,
            fee: info.fee,
            block_number: info.block_number,
            logs: info.log,
            result: info.contract_result.into_iter().next().unwrap_or_default(),
            message: String::from_utf8_lossy(&info.res_message).into_owned(),
        }
    }
}

/// Result of a broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastResult {
    /// Transaction ID, hex
    pub tx_id: String,
    /// Node accepted the transaction
    pub accepted: bool,
    /// Node response code
    pub code: ResponseCode,
    /// Node message, verbatim
    pub server_message: String,
    /// Receipt, when waited for and available in time
    pub receipt: Option<Receipt>,
}

/// Fee estimate in sun
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeEstimate {
    /// Contract call: energy plus bandwidth at current prices
    Contract {
        /// Estimated energy
        energy: i64,
        /// Sun per energy unit
        energy_price: i64,
        /// Serialized size
        size_bytes: i64,
        /// Sun per byte
        bandwidth_price: i64,
    },
    /// Other kinds: bandwidth only
    Bandwidth {
        /// Serialized size
        size_bytes: i64,
    },
}

impl FeeEstimate {
    /// Estimated total; bandwidth-only estimates are the byte count
    pub fn total(&self) -> i64 {
        match *self {
            FeeEstimate::Contract {
                energy,
                energy_price,
                size_bytes,
                bandwidth_price,
            } => energy
                .saturating_mul(energy_price)
                .saturating_add(size_bytes.saturating_mul(bandwidth_price)),
            FeeEstimate::Bandwidth { size_bytes } => size_bytes,
        }
    }
}

struct Inner {
    state: TxState,
    tx: Transaction,
    error: Option<SdkError>,
}

impl Inner {
    /// Fail unless in one of `allowed`; the recorded cause wins in `Error`
    fn guard(&mut self, op: &str, allowed: &[TxState]) -> SdkResult<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if !allowed.contains(&self.state) {
            let err = SdkError::InvalidState(format!("{} not allowed in {:?}", op, self.state));
            return Err(self.fail(err));
        }
        Ok(())
    }

    fn fail(&mut self, err: SdkError) -> SdkError {
        warn!(from = ?self.state, error = %err, "transaction workflow failed");
        self.state = TxState::Error;
        self.error = Some(err.clone());
        err
    }

    fn transition(&mut self, to: TxState) {
        if self.state != to {
            debug!(from = ?self.state, to = ?to, "transaction workflow transition");
        }
        self.state = to;
    }

    fn raw_mut(&mut self) -> SdkResult<&mut tron_proto::TransactionRaw> {
        self.tx
            .raw_data
            .as_mut()
            .ok_or_else(|| SdkError::InvalidParameter("transaction has no raw_data".into()))
    }
}

/// State machine over one transaction
pub struct TransactionWorkflow {
    client: TronClient,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for TransactionWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionWorkflow").finish_non_exhaustive()
    }
}

impl TransactionWorkflow {
    /// Start a workflow
    ///
    /// A transaction that already carries signatures starts in `Signed`. A
    /// build reply whose `txid` differs from the locally computed ID is
    /// rejected with `TxIdMismatch`.
    pub fn new(client: TronClient, source: impl Into<TxSource>) -> SdkResult<Self> {
        let (tx, node_txid) = match source.into() {
            TxSource::Bare(tx) => (tx, None),
            TxSource::Extension(ext) => {
                let tx = ext.transaction.ok_or_else(|| {
                    SdkError::InvalidParameter("build reply carries no transaction".into())
                })?;
                (tx, (!ext.txid.is_empty()).then_some(ext.txid))
            }
        };
        let has_contract = tx.raw_data.as_ref().is_some_and(|r| !r.contract.is_empty());
        if !has_contract {
            return Err(SdkError::InvalidParameter(
                "transaction has no contract entries".into(),
            ));
        }

        if let Some(node) = &node_txid {
            let local = client.tx_id(&tx)?;
            if node.as_slice() != local.as_bytes() {
                return Err(SdkError::TxIdMismatch {
                    local: local.to_hex(),
                    node: hex::encode(node),
                });
            }
        }

        let state = if tx.signature.is_empty() {
            TxState::Unsigned
        } else {
            TxState::Signed
        };
        Ok(Self {
            client,
            inner: Mutex::new(Inner {
                state,
                tx,
                error: None,
            }),
        })
    }

    /// Current state
    pub async fn state(&self) -> TxState {
        self.inner.lock().await.state
    }

    /// Recorded failure, if in `Error`
    pub async fn last_error(&self) -> Option<SdkError> {
        self.inner.lock().await.error.clone()
    }

    /// Set `raw_data.expiration` (unix milliseconds)
    pub async fn set_timeout(&self, expiration_ms: i64) -> SdkResult<()> {
        let mut inner = self.inner.lock().await;
        inner.guard("set_timeout", &[TxState::Unsigned])?;
        if expiration_ms <= 0 {
            let err = SdkError::InvalidParameter(format!("expiration {} ms", expiration_ms));
            return Err(inner.fail(err));
        }
        match inner.raw_mut() {
            Ok(raw) => raw.expiration = expiration_ms,
            Err(err) => return Err(inner.fail(err)),
        }
        Ok(())
    }

    /// Set `raw_data.fee_limit` (sun)
    pub async fn set_fee_limit(&self, fee_limit: i64) -> SdkResult<()> {
        let mut inner = self.inner.lock().await;
        inner.guard("set_fee_limit", &[TxState::Unsigned])?;
        if fee_limit < 0 {
            let err = SdkError::InvalidAmount(format!("fee limit {} is negative", fee_limit));
            return Err(inner.fail(err));
        }
        match inner.raw_mut() {
            Ok(raw) => raw.fee_limit = fee_limit,
            Err(err) => return Err(inner.fail(err)),
        }
        Ok(())
    }

    /// Append a signature over the transaction ID
    pub async fn sign(&self, signer: &dyn Signer) -> SdkResult<()> {
        let mut inner = self.inner.lock().await;
        inner.guard("sign", &[TxState::Unsigned, TxState::Signed])?;
        match self.append_signature(&mut inner, signer) {
            Ok(()) => Ok(()),
            Err(err) => Err(inner.fail(err)),
        }
    }

    /// Sign as a member of permission `permission_id`
    ///
    /// Some contract entry must name that permission. The digest is still
    /// the transaction ID; the node weighs the signature against the
    /// permission's keys. No threshold check happens here, see
    /// [`check_permission`](Self::check_permission).
    pub async fn multi_sign(&self, signer: &dyn Signer, permission_id: i32) -> SdkResult<()> {
        let mut inner = self.inner.lock().await;
        inner.guard("multi_sign", &[TxState::Unsigned, TxState::Signed])?;
        let named = inner
            .tx
            .raw_data
            .as_ref()
            .is_some_and(|raw| raw.contract.iter().any(|c| c.permission_id == permission_id));
        if !named {
            let err = SdkError::InvalidParameter(format!(
                "no contract entry uses permission {}",
                permission_id
            ));
            return Err(inner.fail(err));
        }
        match self.append_signature(&mut inner, signer) {
            Ok(()) => Ok(()),
            Err(err) => Err(inner.fail(err)),
        }
    }

    fn append_signature(&self, inner: &mut Inner, signer: &dyn Signer) -> SdkResult<()> {
        let tx_id = self.client.tx_id(&inner.tx)?;
        let signature = signer.sign_digest(&tx_id)?;
        inner.tx.signature.push(signature.to_bytes().to_vec());
        debug!(
            tx_id = %tx_id.to_hex(),
            signer = %signer.address(),
            signatures = inner.tx.signature.len(),
            "transaction signed"
        );
        inner.transition(TxState::Signed);
        Ok(())
    }

    /// Transaction ID
    pub async fn get_txid(&self) -> SdkResult<H256> {
        let mut inner = self.inner.lock().await;
        inner.guard("get_txid", &[TxState::Signed, TxState::Broadcasted])?;
        self.client.tx_id(&inner.tx)
    }

    /// Signed transaction
    pub async fn get_signed(&self) -> SdkResult<Transaction> {
        let mut inner = self.inner.lock().await;
        inner.guard("get_signed", &[TxState::Signed, TxState::Broadcasted])?;
        Ok(inner.tx.clone())
    }

    /// Addresses recovered from the present signatures, in order
    pub async fn signers(&self) -> SdkResult<Vec<Address>> {
        let inner = self.inner.lock().await;
        let tx_id = self.client.tx_id(&inner.tx)?;
        inner
            .tx
            .signature
            .iter()
            .map(|raw| -> SdkResult<Address> {
                let signature = Signature::from_slice(raw)?;
                Ok(recover_address(&tx_id, &signature)?)
            })
            .collect()
    }

    /// Whether the present signatures meet `permission`'s threshold
    ///
    /// Each distinct signer counts once, with the weight its key has in the
    /// permission; signers outside the permission add nothing.
    pub async fn check_permission(&self, permission: &Permission) -> SdkResult<bool> {
        let signers: HashSet<Address> = self.signers().await?.into_iter().collect();
        let weight: i64 = permission
            .keys
            .iter()
            .filter(|key| {
                signers
                    .iter()
                    .any(|s| s.as_bytes().as_slice() == key.address.as_slice())
            })
            .map(|key| key.weight)
            .sum();
        debug!(weight, threshold = permission.threshold, "permission check");
        Ok(weight >= permission.threshold)
    }

    /// Estimate the fee at current prices
    ///
    /// Contract calls are estimated through the node's energy estimate;
    /// other kinds cost their serialized size in bandwidth.
    pub async fn estimate_fee(&self, ctx: &CallContext) -> SdkResult<FeeEstimate> {
        let mut inner = self.inner.lock().await;
        inner.guard("estimate_fee", &[TxState::Unsigned, TxState::Signed])?;
        match self.estimate(ctx, &inner.tx).await {
            Ok(estimate) => Ok(estimate),
            Err(err) => Err(inner.fail(err)),
        }
    }

    async fn estimate(&self, ctx: &CallContext, tx: &Transaction) -> SdkResult<FeeEstimate> {
        let size_bytes = i64::try_from(tx.encoded_len()).unwrap_or(i64::MAX);
        let trigger = tx
            .raw_data
            .as_ref()
            .and_then(|raw| raw.contract.first())
            .and_then(|c| c.parameter.as_ref())
            .and_then(|p| p.unpack::<TriggerSmartContract>());

        let Some(trigger) = trigger else {
            return Ok(FeeEstimate::Bandwidth { size_bytes });
        };
        let energy = self.client.estimate_energy(ctx, &trigger).await?;
        let (energy_price, bandwidth_price) = self.client.resource_prices(ctx).await?;
        Ok(FeeEstimate::Contract {
            energy,
            energy_price,
            size_bytes,
            bandwidth_price,
        })
    }

    /// Submit the signed transaction
    ///
    /// With `wait_seconds > 0` and a contract-executing transaction, polls
    /// for the receipt every second until it arrives or the earlier of the
    /// context deadline and the wait window passes (`receipt: None`). A
    /// receipt with a failed execution status is `TxReverted`.
    pub async fn broadcast(
        &self,
        ctx: &CallContext,
        wait_seconds: u64,
    ) -> SdkResult<BroadcastResult> {
        let mut inner = self.inner.lock().await;
        inner.guard("broadcast", &[TxState::Signed])?;
        match self.submit(&mut inner, ctx, wait_seconds).await {
            Ok(result) => Ok(result),
            Err(err) => Err(inner.fail(err)),
        }
    }

    async fn submit(
        &self,
        inner: &mut Inner,
        ctx: &CallContext,
        wait_seconds: u64,
    ) -> SdkResult<BroadcastResult> {
        let raw = inner
            .tx
            .raw_data
            .as_ref()
            .ok_or_else(|| SdkError::InvalidParameter("transaction has no raw_data".into()))?;
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or_default();
        if raw.expiration <= now_ms {
            return Err(SdkError::InvalidParameter(format!(
                "transaction expired at {} (now {})",
                raw.expiration, now_ms
            )));
        }
        let executes_code = raw.contract.iter().any(|c| c.r#type().executes_code());

        let tx_id = self.client.tx_id(&inner.tx)?;
        let ret = self.client.broadcast_transaction(ctx, &inner.tx).await?;
        if !ret.result {
            return Err(SdkError::BroadcastRejected {
                code: ret.code(),
                message: ret.message_text(),
            });
        }
        inner.transition(TxState::Broadcasted);
        info!(tx_id = %tx_id.to_hex(), "transaction accepted");

        let receipt = if wait_seconds > 0 && executes_code {
            let wait_ctx = ctx.child_with_timeout(Duration::from_secs(wait_seconds));
            self.wait_receipt(&wait_ctx, &tx_id).await?
        } else {
            None
        };

        if let Some(receipt) = &receipt {
            if receipt.status != ExecutionStatus::Success {
                let reason = if receipt.message.is_empty() {
                    receipt.status.as_str().to_string()
                } else {
                    format!("{}: {}", receipt.status.as_str(), receipt.message)
                };
                return Err(SdkError::TxReverted {
                    tx_id: Some(tx_id.to_hex()),
                    message: reason,
                });
            }
        }

        Ok(BroadcastResult {
            tx_id: tx_id.to_hex(),
            accepted: true,
            code: ret.code(),
            server_message: ret.message_text(),
            receipt,
        })
    }

    /// Poll until the receipt shows up; `None` once `ctx`'s deadline passes
    async fn wait_receipt(&self, ctx: &CallContext, tx_id: &H256) -> SdkResult<Option<Receipt>> {
        loop {
            match self.client.get_transaction_info_by_id(ctx, tx_id).await {
                Ok(Some(info)) if info.id.as_slice() == tx_id.as_bytes() => {
                    let receipt = Receipt::from_info(info);
                    info!(
                        tx_id = %tx_id.to_hex(),
                        status = receipt.status.as_str(),
                        block = receipt.block_number,
                        "receipt received"
                    );
                    return Ok(Some(receipt));
                }
                Ok(_) => {}
                Err(SdkError::DeadlineExceeded) => return Ok(None),
                Err(err) => return Err(err),
            }

            tokio::select! {
                biased;
                reason = ctx.done() => {
                    return match reason {
                        SdkError::DeadlineExceeded => {
                            debug!(tx_id = %tx_id.to_hex(), "receipt wait window elapsed");
                            Ok(None)
                        }
                        other => Err(other),
                    };
                }
                _ = tokio::time::sleep(RECEIPT_POLL_INTERVAL) => {}
            }
        }
    }
}
