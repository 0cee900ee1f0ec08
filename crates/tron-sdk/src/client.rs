//! TronClient - typed facade over the node's wallet service
//!
//! One method per node RPC. Every call leases a pooled connection, applies
//! the pool's default timeout when the caller's context has none, and tags
//! failures with the operation name. Build methods validate the node's
//! `Return` before handing the transaction back.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use prost::Message;
use tonic::{Code, Status};
use tracing::{debug, warn};

use tron_crypto::TxIdAlgorithm;
use tron_primitives::{Address, H256};
use tron_proto::{
    wallet, Account, AccountResourceMessage, AssetIssueContract, AssetIssueList, BlockExtention,
    BytesMessage, ChainParameters, CreateSmartContract, DelegateResourceContract, EmptyMessage,
    EstimateEnergyMessage, ExchangeList, ExchangeTransactionContract, FreezeBalanceV2Contract,
    NumberMessage, ProposalApproveContract, ProposalCreateContract, ProposalList, ResourceCode,
    ResponseCode, Return, SmartContract, Transaction, TransactionExtention, TransactionInfo,
    TransferAssetContract, TransferContract, TriggerSmartContract, UnDelegateResourceContract,
    UnfreezeBalanceV2Contract, Vote, VoteWitnessContract, WithdrawExpireUnfreezeContract,
    WitnessList,
};

use crate::context::CallContext;
use crate::error::{SdkError, SdkResult};
use crate::pool::{ConnectionPool, Endpoint, PoolConfig, PoolError};
use crate::transport::{MockDialer, MockTransport};

/// Chain parameter holding the energy price (sun per unit)
pub const ENERGY_FEE_PARAMETER: &str = "getEnergyFee";
/// Chain parameter holding the bandwidth price (sun per byte)
pub const TRANSACTION_FEE_PARAMETER: &str = "getTransactionFee";

/// Client for a TRON node
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct TronClient {
    pool: ConnectionPool,
    txid_algorithm: TxIdAlgorithm,
}

impl TronClient {
    /// Client over an existing pool
    pub fn new(pool: ConnectionPool) -> Self {
        Self {
            pool,
            txid_algorithm: TxIdAlgorithm::default(),
        }
    }

    /// Connect to `endpoint` with the default pool configuration
    pub async fn connect(endpoint: &str) -> SdkResult<Self> {
        Self::connect_with_config(endpoint, PoolConfig::default()).await
    }

    /// Connect to `endpoint`, opening `config.initial_size` connections
    pub async fn connect_with_config(endpoint: &str, config: PoolConfig) -> SdkResult<Self> {
        let pool = ConnectionPool::connect(endpoint, config).await?;
        Ok(Self::new(pool))
    }

    /// Client whose every connection is `transport` (for testing)
    pub fn with_mock(transport: MockTransport) -> Self {
        let dialer = MockDialer::new(transport);
        let pool = ConnectionPool::from_parts(
            Endpoint::loopback(50051),
            PoolConfig::default(),
            Arc::new(dialer),
        );
        Self::new(pool)
    }

    /// Select the digest used for transaction IDs
    pub fn with_txid_algorithm(mut self, algorithm: TxIdAlgorithm) -> Self {
        self.txid_algorithm = algorithm;
        self
    }

    /// Digest used for transaction IDs
    pub fn txid_algorithm(&self) -> TxIdAlgorithm {
        self.txid_algorithm
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    /// Transaction ID: digest of the serialized `raw_data`
    pub fn tx_id(&self, tx: &Transaction) -> SdkResult<H256> {
        let raw = tx
            .raw_data
            .as_ref()
            .ok_or_else(|| SdkError::InvalidParameter("transaction has no raw_data".into()))?;
        Ok(self.txid_algorithm.digest(&raw.encode_to_vec()))
    }

    /// Issue one unary call
    async fn unary<Req, Resp>(
        &self,
        op: &'static str,
        path: &'static str,
        ctx: &CallContext,
        request: &Req,
    ) -> SdkResult<Resp>
    where
        Req: Message,
        Resp: Message + Default,
    {
        let mut conn = self.pool.acquire(ctx).await.map_err(|e| match e {
            PoolError::Cancelled => SdkError::Cancelled,
            PoolError::DeadlineExceeded => SdkError::DeadlineExceeded,
            source => SdkError::RpcDial { op, source },
        })?;

        let call_ctx = ctx.or_timeout(self.pool.default_timeout());
        let timeout = call_ctx
            .remaining()
            .unwrap_or_else(|| self.pool.default_timeout());
        let payload = Bytes::from(request.encode_to_vec());
        debug!(op, bytes = payload.len(), "rpc call");

        let outcome = tokio::select! {
            biased;
            reason = call_ctx.done() => Err(reason),
            result = conn.transport().unary(path, payload, timeout) => Ok(result),
        };

        let raw = match outcome {
            Err(reason) => {
                // the call was abandoned mid-flight
                conn.mark_unhealthy();
                warn!(op, error = %reason, "rpc aborted");
                return Err(reason);
            }
            Ok(Err(status)) => {
                if is_connection_fault(status.code()) {
                    conn.mark_unhealthy();
                }
                warn!(op, code = ?status.code(), message = status.message(), "rpc failed");
                return Err(map_status(op, status));
            }
            Ok(Ok(raw)) => raw,
        };
        drop(conn);

        Resp::decode(raw).map_err(|e| SdkError::RpcTransport {
            op,
            code: Code::Internal,
            message: format!("malformed response: {}", e),
        })
    }

    /// Call a build method and validate the node's verdict
    async fn build<Req: Message>(
        &self,
        op: &'static str,
        path: &'static str,
        ctx: &CallContext,
        request: &Req,
    ) -> SdkResult<TransactionExtention> {
        let ext: TransactionExtention = self.unary(op, path, ctx, request).await?;
        check_extension(op, ext)
    }

    // ==================== Chain Info ====================

    /// Current head block
    pub async fn get_now_block(&self, ctx: &CallContext) -> SdkResult<BlockExtention> {
        self.unary("GetNowBlock", wallet::GET_NOW_BLOCK, ctx, &EmptyMessage {})
            .await
    }

    /// Block at `number`
    pub async fn get_block_by_num(
        &self,
        ctx: &CallContext,
        number: i64,
    ) -> SdkResult<BlockExtention> {
        self.unary(
            "GetBlockByNum",
            wallet::GET_BLOCK_BY_NUM,
            ctx,
            &NumberMessage { num: number },
        )
        .await
    }

    /// All chain parameters
    pub async fn get_chain_parameters(&self, ctx: &CallContext) -> SdkResult<ChainParameters> {
        self.unary(
            "GetChainParameters",
            wallet::GET_CHAIN_PARAMETERS,
            ctx,
            &EmptyMessage {},
        )
        .await
    }

    /// Current `(energy price, bandwidth price)` in sun; fetched every time
    pub async fn resource_prices(&self, ctx: &CallContext) -> SdkResult<(i64, i64)> {
        let params = self.get_chain_parameters(ctx).await?;
        let lookup = |key: &str| {
            params.get(key).ok_or_else(|| SdkError::RpcTransport {
                op: "GetChainParameters",
                code: Code::NotFound,
                message: format!("chain parameter {} missing", key),
            })
        };
        Ok((
            lookup(ENERGY_FEE_PARAMETER)?,
            lookup(TRANSACTION_FEE_PARAMETER)?,
        ))
    }

    // ==================== Accounts ====================

    /// Account record (empty when the account does not exist yet)
    pub async fn get_account(&self, ctx: &CallContext, address: &Address) -> SdkResult<Account> {
        let request = Account {
            address: address.as_bytes().to_vec(),
            ..Default::default()
        };
        self.unary("GetAccount", wallet::GET_ACCOUNT, ctx, &request)
            .await
    }

    /// Bandwidth and energy usage of an account
    pub async fn get_account_resource(
        &self,
        ctx: &CallContext,
        address: &Address,
    ) -> SdkResult<AccountResourceMessage> {
        let request = Account {
            address: address.as_bytes().to_vec(),
            ..Default::default()
        };
        self.unary(
            "GetAccountResource",
            wallet::GET_ACCOUNT_RESOURCE,
            ctx,
            &request,
        )
        .await
    }

    // ==================== Transfers ====================

    /// Build a native-coin transfer of `amount` sun
    pub async fn create_transfer(
        &self,
        ctx: &CallContext,
        from: &Address,
        to: &Address,
        amount: i64,
    ) -> SdkResult<TransactionExtention> {
        require_positive("amount", amount)?;
        if from == to {
            return Err(SdkError::InvalidParameter(
                "sender and recipient are the same address".into(),
            ));
        }
        let request = TransferContract {
            owner_address: from.as_bytes().to_vec(),
            to_address: to.as_bytes().to_vec(),
            amount,
        };
        self.build("CreateTransaction", wallet::CREATE_TRANSACTION, ctx, &request)
            .await
    }

    /// Build a TRC10 asset transfer
    pub async fn transfer_asset(
        &self,
        ctx: &CallContext,
        from: &Address,
        to: &Address,
        asset_id: &str,
        amount: i64,
    ) -> SdkResult<TransactionExtention> {
        require_positive("amount", amount)?;
        if asset_id.is_empty() {
            return Err(SdkError::InvalidParameter("asset id is empty".into()));
        }
        if from == to {
            return Err(SdkError::InvalidParameter(
                "sender and recipient are the same address".into(),
            ));
        }
        let request = TransferAssetContract {
            asset_name: asset_id.as_bytes().to_vec(),
            owner_address: from.as_bytes().to_vec(),
            to_address: to.as_bytes().to_vec(),
            amount,
        };
        self.build("TransferAsset", wallet::TRANSFER_ASSET, ctx, &request)
            .await
    }

    /// TRC10 asset by numeric id
    pub async fn get_asset_issue_by_id(
        &self,
        ctx: &CallContext,
        asset_id: &str,
    ) -> SdkResult<AssetIssueContract> {
        let request = BytesMessage {
            value: asset_id.as_bytes().to_vec(),
        };
        self.unary(
            "GetAssetIssueById",
            wallet::GET_ASSET_ISSUE_BY_ID,
            ctx,
            &request,
        )
        .await
    }

    /// Every issued TRC10 asset
    pub async fn get_asset_issue_list(&self, ctx: &CallContext) -> SdkResult<AssetIssueList> {
        self.unary(
            "GetAssetIssueList",
            wallet::GET_ASSET_ISSUE_LIST,
            ctx,
            &EmptyMessage {},
        )
        .await
    }

    // ==================== Smart Contracts ====================

    /// Build a state-changing contract call
    pub async fn trigger_contract(
        &self,
        ctx: &CallContext,
        request: &TriggerSmartContract,
    ) -> SdkResult<TransactionExtention> {
        self.build("TriggerContract", wallet::TRIGGER_CONTRACT, ctx, request)
            .await
    }

    /// Execute a contract call read-only on the node
    ///
    /// The result is validated but no transaction is required in it.
    pub async fn trigger_constant_contract(
        &self,
        ctx: &CallContext,
        request: &TriggerSmartContract,
    ) -> SdkResult<TransactionExtention> {
        let op = "TriggerConstantContract";
        let ext: TransactionExtention = self
            .unary(op, wallet::TRIGGER_CONSTANT_CONTRACT, ctx, request)
            .await?;
        check_return(op, ext.result.as_ref())?;
        Ok(ext)
    }

    /// Energy the call would consume
    pub async fn estimate_energy(
        &self,
        ctx: &CallContext,
        request: &TriggerSmartContract,
    ) -> SdkResult<i64> {
        let op = "EstimateEnergy";
        let reply: EstimateEnergyMessage = self
            .unary(op, wallet::ESTIMATE_ENERGY, ctx, request)
            .await?;
        check_return(op, reply.result.as_ref())?;
        Ok(reply.energy_required)
    }

    /// Build a contract deployment
    pub async fn deploy_contract(
        &self,
        ctx: &CallContext,
        request: &CreateSmartContract,
    ) -> SdkResult<TransactionExtention> {
        self.build("DeployContract", wallet::DEPLOY_CONTRACT, ctx, request)
            .await
    }

    /// Deployed contract, including its ABI
    pub async fn get_contract(
        &self,
        ctx: &CallContext,
        address: &Address,
    ) -> SdkResult<SmartContract> {
        let request = BytesMessage {
            value: address.as_bytes().to_vec(),
        };
        self.unary("GetContract", wallet::GET_CONTRACT, ctx, &request)
            .await
    }

    // ==================== Transactions ====================

    /// Submit a signed transaction; the node's verdict is returned as-is
    pub async fn broadcast_transaction(
        &self,
        ctx: &CallContext,
        tx: &Transaction,
    ) -> SdkResult<Return> {
        self.unary(
            "BroadcastTransaction",
            wallet::BROADCAST_TRANSACTION,
            ctx,
            tx,
        )
        .await
    }

    /// Transaction by ID, `None` when the node does not know it
    pub async fn get_transaction_by_id(
        &self,
        ctx: &CallContext,
        id: &H256,
    ) -> SdkResult<Option<Transaction>> {
        let request = BytesMessage {
            value: id.as_bytes().to_vec(),
        };
        let tx: Transaction = self
            .unary("GetTransactionById", wallet::GET_TRANSACTION_BY_ID, ctx, &request)
            .await?;
        Ok(tx.raw_data.is_some().then_some(tx))
    }

    /// Receipt by transaction ID, `None` until the transaction is executed
    pub async fn get_transaction_info_by_id(
        &self,
        ctx: &CallContext,
        id: &H256,
    ) -> SdkResult<Option<TransactionInfo>> {
        let request = BytesMessage {
            value: id.as_bytes().to_vec(),
        };
        let info: TransactionInfo = self
            .unary(
                "GetTransactionInfoById",
                wallet::GET_TRANSACTION_INFO_BY_ID,
                ctx,
                &request,
            )
            .await?;
        Ok((!info.id.is_empty()).then_some(info))
    }

    // ==================== Resources ====================

    /// Stake `amount` sun for bandwidth or energy
    pub async fn freeze_balance_v2(
        &self,
        ctx: &CallContext,
        owner: &Address,
        amount: i64,
        resource: ResourceCode,
    ) -> SdkResult<TransactionExtention> {
        require_positive("frozen balance", amount)?;
        let request = FreezeBalanceV2Contract {
            owner_address: owner.as_bytes().to_vec(),
            frozen_balance: amount,
            resource: resource as i32,
        };
        self.build("FreezeBalanceV2", wallet::FREEZE_BALANCE_V2, ctx, &request)
            .await
    }

    /// Start unstaking `amount` sun
    pub async fn unfreeze_balance_v2(
        &self,
        ctx: &CallContext,
        owner: &Address,
        amount: i64,
        resource: ResourceCode,
    ) -> SdkResult<TransactionExtention> {
        require_positive("unfreeze balance", amount)?;
        let request = UnfreezeBalanceV2Contract {
            owner_address: owner.as_bytes().to_vec(),
            unfreeze_balance: amount,
            resource: resource as i32,
        };
        self.build(
            "UnfreezeBalanceV2",
            wallet::UNFREEZE_BALANCE_V2,
            ctx,
            &request,
        )
        .await
    }

    /// Delegate staked resources to another account
    ///
    /// `lock_period` is in blocks and only applies when `lock` is set.
    pub async fn delegate_resource(
        &self,
        ctx: &CallContext,
        owner: &Address,
        receiver: &Address,
        resource: ResourceCode,
        balance: i64,
        lock: Option<i64>,
    ) -> SdkResult<TransactionExtention> {
        require_positive("delegated balance", balance)?;
        if owner == receiver {
            return Err(SdkError::InvalidParameter(
                "cannot delegate resources to self".into(),
            ));
        }
        let request = DelegateResourceContract {
            owner_address: owner.as_bytes().to_vec(),
            resource: resource as i32,
            balance,
            receiver_address: receiver.as_bytes().to_vec(),
            lock: lock.is_some(),
            lock_period: lock.unwrap_or_default(),
        };
        self.build("DelegateResource", wallet::DELEGATE_RESOURCE, ctx, &request)
            .await
    }

    /// Reclaim delegated resources
    pub async fn undelegate_resource(
        &self,
        ctx: &CallContext,
        owner: &Address,
        receiver: &Address,
        resource: ResourceCode,
        balance: i64,
    ) -> SdkResult<TransactionExtention> {
        require_positive("undelegated balance", balance)?;
        let request = UnDelegateResourceContract {
            owner_address: owner.as_bytes().to_vec(),
            resource: resource as i32,
            balance,
            receiver_address: receiver.as_bytes().to_vec(),
        };
        self.build(
            "UnDelegateResource",
            wallet::UNDELEGATE_RESOURCE,
            ctx,
            &request,
        )
        .await
    }

    /// Withdraw unstaked balance whose waiting period has passed
    pub async fn withdraw_expire_unfreeze(
        &self,
        ctx: &CallContext,
        owner: &Address,
    ) -> SdkResult<TransactionExtention> {
        let request = WithdrawExpireUnfreezeContract {
            owner_address: owner.as_bytes().to_vec(),
        };
        self.build(
            "WithdrawExpireUnfreeze",
            wallet::WITHDRAW_EXPIRE_UNFREEZE,
            ctx,
            &request,
        )
        .await
    }

    // ==================== Governance ====================

    /// Registered witnesses
    pub async fn list_witnesses(&self, ctx: &CallContext) -> SdkResult<WitnessList> {
        self.unary("ListWitnesses", wallet::LIST_WITNESSES, ctx, &EmptyMessage {})
            .await
    }

    /// Cast votes; replaces the owner's previous votes
    pub async fn vote_witness_account(
        &self,
        ctx: &CallContext,
        owner: &Address,
        votes: &[(Address, i64)],
    ) -> SdkResult<TransactionExtention> {
        if votes.is_empty() {
            return Err(SdkError::InvalidParameter("no votes given".into()));
        }
        let votes = votes
            .iter()
            .map(|(witness, count)| {
                require_positive("vote count", *count)?;
                Ok(Vote {
                    vote_address: witness.as_bytes().to_vec(),
                    vote_count: *count,
                })
            })
            .collect::<SdkResult<Vec<_>>>()?;
        let request = VoteWitnessContract {
            owner_address: owner.as_bytes().to_vec(),
            votes,
            support: true,
        };
        self.build(
            "VoteWitnessAccount",
            wallet::VOTE_WITNESS_ACCOUNT,
            ctx,
            &request,
        )
        .await
    }

    /// Open and past proposals
    pub async fn list_proposals(&self, ctx: &CallContext) -> SdkResult<ProposalList> {
        self.unary("ListProposals", wallet::LIST_PROPOSALS, ctx, &EmptyMessage {})
            .await
    }

    /// Propose chain parameter changes (witnesses only)
    pub async fn proposal_create(
        &self,
        ctx: &CallContext,
        owner: &Address,
        parameters: HashMap<i64, i64>,
    ) -> SdkResult<TransactionExtention> {
        if parameters.is_empty() {
            return Err(SdkError::InvalidParameter("no parameters proposed".into()));
        }
        let request = ProposalCreateContract {
            owner_address: owner.as_bytes().to_vec(),
            parameters,
        };
        self.build("ProposalCreate", wallet::PROPOSAL_CREATE, ctx, &request)
            .await
    }

    /// Add or withdraw approval of a proposal
    pub async fn proposal_approve(
        &self,
        ctx: &CallContext,
        owner: &Address,
        proposal_id: i64,
        approve: bool,
    ) -> SdkResult<TransactionExtention> {
        let request = ProposalApproveContract {
            owner_address: owner.as_bytes().to_vec(),
            proposal_id,
            is_add_approval: approve,
        };
        self.build("ProposalApprove", wallet::PROPOSAL_APPROVE, ctx, &request)
            .await
    }

    // ==================== Exchange ====================

    /// Bancor exchange pairs
    pub async fn list_exchanges(&self, ctx: &CallContext) -> SdkResult<ExchangeList> {
        self.unary("ListExchanges", wallet::LIST_EXCHANGES, ctx, &EmptyMessage {})
            .await
    }

    /// Trade `quant` of `token_id` on an exchange, expecting at least `expected` back
    pub async fn exchange_transaction(
        &self,
        ctx: &CallContext,
        owner: &Address,
        exchange_id: i64,
        token_id: &str,
        quant: i64,
        expected: i64,
    ) -> SdkResult<TransactionExtention> {
        require_positive("quant", quant)?;
        require_positive("expected", expected)?;
        let request = ExchangeTransactionContract {
            owner_address: owner.as_bytes().to_vec(),
            exchange_id,
            token_id: token_id.as_bytes().to_vec(),
            quant,
            expected,
        };
        self.build(
            "ExchangeTransaction",
            wallet::EXCHANGE_TRANSACTION,
            ctx,
            &request,
        )
        .await
    }
}

// ==================== Helpers ====================

fn require_positive(what: &str, value: i64) -> SdkResult<()> {
    if value <= 0 {
        return Err(SdkError::InvalidAmount(format!(
            "{} must be positive, got {}",
            what, value
        )));
    }
    Ok(())
}

/// Status codes after which the connection is not reused
fn is_connection_fault(code: Code) -> bool {
    matches!(
        code,
        Code::Unavailable
            | Code::Unknown
            | Code::Internal
            | Code::Cancelled
            | Code::DeadlineExceeded
            | Code::DataLoss
    )
}

fn map_status(op: &'static str, status: Status) -> SdkError {
    match status.code() {
        Code::DeadlineExceeded => SdkError::DeadlineExceeded,
        code => SdkError::RpcTransport {
            op,
            code,
            message: status.message().to_string(),
        },
    }
}

fn check_return(op: &'static str, ret: Option<&Return>) -> SdkResult<()> {
    match ret {
        Some(ret) if ret.result => Ok(()),
        Some(ret) => {
            let err = SdkError::TxBuild {
                code: ret.code(),
                message: ret.message_text(),
            };
            warn!(op, error = %err, "node rejected request");
            Err(err)
        }
        None => {
            warn!(op, "node reply carries no result");
            Err(SdkError::TxBuild {
                code: ResponseCode::OtherError,
                message: format!("{}: missing result", op),
            })
        }
    }
}

/// Validate a build reply: positive verdict and a transaction with contracts
pub(crate) fn check_extension(
    op: &'static str,
    ext: TransactionExtention,
) -> SdkResult<TransactionExtention> {
    check_return(op, ext.result.as_ref())?;
    let has_contract = ext
        .transaction
        .as_ref()
        .and_then(|tx| tx.raw_data.as_ref())
        .is_some_and(|raw| !raw.contract.is_empty());
    if !has_contract {
        return Err(SdkError::TxBuild {
            code: ResponseCode::OtherError,
            message: format!("{}: node returned no transaction", op),
        });
    }
    Ok(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tron_proto::{TransactionContract, TransactionRaw};

    fn addr(byte: u8) -> Address {
        Address::from_evm_bytes([byte; 20])
    }

    fn built(contract: TransactionContract) -> TransactionExtention {
        TransactionExtention {
            transaction: Some(Transaction {
                raw_data: Some(TransactionRaw {
                    contract: vec![contract],
                    expiration: 1_700_000_060_000,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            result: Some(Return {
                result: true,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_get_now_block_from_defaults() {
        let client = TronClient::with_mock(MockTransport::new());
        let block = client.get_now_block(&CallContext::background()).await.unwrap();
        assert_eq!(block.number(), MockTransport::DEFAULT_BLOCK_NUMBER);
    }

    #[tokio::test]
    async fn test_resource_prices() {
        let client = TronClient::with_mock(MockTransport::new());
        let (energy, bandwidth) = client
            .resource_prices(&CallContext::background())
            .await
            .unwrap();
        assert_eq!(energy, MockTransport::DEFAULT_ENERGY_FEE);
        assert_eq!(bandwidth, MockTransport::DEFAULT_TRANSACTION_FEE);
    }

    #[tokio::test]
    async fn test_create_transfer_sends_addresses() {
        let mock = MockTransport::new();
        mock.set_handler(wallet::CREATE_TRANSACTION, |req: TransferContract| {
            assert_eq!(req.amount, 1_500_000);
            assert_eq!(req.owner_address[0], 0x41);
            Ok(built(TransactionContract::new(&req)))
        });
        let client = TronClient::with_mock(mock.clone());

        let ext = client
            .create_transfer(&CallContext::background(), &addr(1), &addr(2), 1_500_000)
            .await
            .unwrap();
        assert!(ext.transaction.is_some());
        assert_eq!(mock.calls(wallet::CREATE_TRANSACTION), 1);
    }

    #[tokio::test]
    async fn test_create_transfer_validates_before_rpc() {
        let mock = MockTransport::new();
        let client = TronClient::with_mock(mock.clone());
        let ctx = CallContext::background();

        let err = client.create_transfer(&ctx, &addr(1), &addr(2), 0).await.unwrap_err();
        assert!(matches!(err, SdkError::InvalidAmount(_)));
        let err = client.create_transfer(&ctx, &addr(1), &addr(1), 5).await.unwrap_err();
        assert!(matches!(err, SdkError::InvalidParameter(_)));
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_build_rejection_surfaces_node_message() {
        let mock = MockTransport::new();
        mock.set_response(
            wallet::CREATE_TRANSACTION,
            &TransactionExtention {
                result: Some(Return {
                    result: false,
                    code: ResponseCode::ContractValidateError as i32,
                    message: b"Validate TransferContract error, balance is not sufficient.".to_vec(),
                }),
                ..Default::default()
            },
        );
        let client = TronClient::with_mock(mock);

        let err = client
            .create_transfer(&CallContext::background(), &addr(1), &addr(2), 10)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SdkError::TxBuild {
                code: ResponseCode::ContractValidateError,
                message: "Validate TransferContract error, balance is not sufficient.".into(),
            }
        );
    }

    #[tokio::test]
    async fn test_build_without_result_is_rejected() {
        let mock = MockTransport::new();
        mock.set_response(wallet::TRIGGER_CONTRACT, &TransactionExtention::default());
        let client = TronClient::with_mock(mock);

        let err = client
            .trigger_contract(&CallContext::background(), &TriggerSmartContract::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::TxBuild { code: ResponseCode::OtherError, .. }));
    }

    #[tokio::test]
    async fn test_transport_error_is_wrapped_and_discards_connection() {
        let mock = MockTransport::new();
        mock.set_error(wallet::GET_NOW_BLOCK, Status::unavailable("connection reset"));
        let client = TronClient::with_mock(mock);

        let err = client
            .get_now_block(&CallContext::background())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SdkError::RpcTransport {
                op: "GetNowBlock",
                code: Code::Unavailable,
                message: "connection reset".into(),
            }
        );
        assert_eq!(client.pool().open_connections(), 0);
    }

    #[tokio::test]
    async fn test_application_error_keeps_connection() {
        let client = TronClient::with_mock(MockTransport::new());
        let err = client
            .list_exchanges(&CallContext::background())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SdkError::RpcTransport { code: Code::Unimplemented, .. }
        ));
        assert_eq!(client.pool().idle_connections(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_timeout_applies() {
        let mock = MockTransport::new();
        mock.set_delay(Some(Duration::from_secs(60)));
        let client = TronClient::with_mock(mock);

        let err = client
            .get_now_block(&CallContext::background())
            .await
            .unwrap_err();
        assert_eq!(err, SdkError::DeadlineExceeded);
        assert_eq!(client.pool().open_connections(), 0);
    }

    #[tokio::test]
    async fn test_cancellation_aborts_call() {
        let mock = MockTransport::new();
        mock.set_delay(Some(Duration::from_secs(60)));
        let client = TronClient::with_mock(mock);

        let ctx = CallContext::background();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let err = client.get_now_block(&ctx).await.unwrap_err();
        assert_eq!(err, SdkError::Cancelled);
    }

    #[tokio::test]
    async fn test_missing_transaction_info_is_none() {
        let mock = MockTransport::new();
        mock.set_response(wallet::GET_TRANSACTION_INFO_BY_ID, &TransactionInfo::default());
        let client = TronClient::with_mock(mock);

        let info = client
            .get_transaction_info_by_id(&CallContext::background(), &H256::ZERO)
            .await
            .unwrap();
        assert!(info.is_none());
    }

    #[test]
    fn test_tx_id_algorithms_differ() {
        let tx = built(TransactionContract::new(&TransferContract {
            owner_address: addr(1).as_bytes().to_vec(),
            to_address: addr(2).as_bytes().to_vec(),
            amount: 1,
        }))
        .transaction
        .unwrap();

        let client = TronClient::with_mock(MockTransport::new());
        let keccak = client.tx_id(&tx).unwrap();
        let sha = client
            .clone()
            .with_txid_algorithm(TxIdAlgorithm::Sha256)
            .tx_id(&tx)
            .unwrap();
        assert_ne!(keccak, sha);
        assert!(client.tx_id(&Transaction::default()).is_err());
    }
}
