//! Contract handle
//!
//! A [`Contract`] binds a client, a contract address and its [`Abi`]. It
//! encodes calls by method name and decodes what comes back.

use std::sync::Arc;

use tron_primitives::Address;
use tron_proto::{
    ContractResult, CreateSmartContract, ResponseCode, SmartContract, TransactionExtention,
    TriggerSmartContract,
};

use crate::abi::{decode_revert, Abi, Arg, Function, Token};
use crate::client::TronClient;
use crate::context::CallContext;
use crate::error::{SdkError, SdkResult};
use crate::registry::{DecodedEvent, EventRegistry};

/// Outcome of a read-only execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationResult {
    /// Execution finished without revert
    pub success: bool,
    /// Energy the node reports as used
    pub energy_used: i64,
    /// Revert reason, when execution failed
    pub revert_message: Option<String>,
    /// Emitted logs, decoded through the registry
    pub logs: Vec<DecodedEvent>,
    /// Raw return data
    pub return_data: Vec<u8>,
}

/// Deployment request
#[derive(Debug, Clone)]
pub struct DeployParams {
    /// Contract name stored on chain
    pub name: String,
    /// Creation bytecode, without constructor arguments
    pub bytecode: Vec<u8>,
    /// Interface stored alongside the code
    pub abi: Abi,
    /// Constructor arguments
    pub constructor_args: Vec<Arg>,
    /// Native coin sent to the constructor, in base units
    pub call_value: i64,
    /// Share of execution energy paid by callers (0-100)
    pub consume_user_resource_percent: i64,
    /// Cap on energy paid by the deployer per call
    pub origin_energy_limit: i64,
}

impl Default for DeployParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            bytecode: Vec::new(),
            abi: Abi::default(),
            constructor_args: Vec::new(),
            call_value: 0,
            consume_user_resource_percent: 100,
            origin_energy_limit: 10_000_000,
        }
    }
}

/// Handle on one deployed contract
#[derive(Debug, Clone)]
pub struct Contract {
    client: TronClient,
    address: Address,
    abi: Arc<Abi>,
    registry: Option<Arc<EventRegistry>>,
}

impl Contract {
    /// Bind `abi` to `address`
    pub fn new(client: TronClient, address: Address, abi: Abi) -> Self {
        Self {
            client,
            address,
            abi: Arc::new(abi),
            registry: None,
        }
    }

    /// Load the interface stored on chain
    pub async fn from_chain(
        client: TronClient,
        ctx: &CallContext,
        address: Address,
    ) -> SdkResult<Self> {
        let stored: SmartContract = client.get_contract(ctx, &address).await?;
        let proto = stored.abi.ok_or_else(|| {
            SdkError::InvalidAbi(format!("{}: no interface stored on chain", address))
        })?;
        Ok(Self::new(client, address, Abi::from_proto(&proto)))
    }

    /// Decode logs through `registry` instead of the process-wide one
    pub fn with_registry(mut self, registry: Arc<EventRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Add this contract's events to its registry
    pub fn register_events(&self) {
        self.registry().register_interface(&self.abi);
    }

    /// Contract address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Interface
    pub fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Underlying client
    pub fn client(&self) -> &TronClient {
        &self.client
    }

    fn registry(&self) -> &EventRegistry {
        self.registry
            .as_deref()
            .unwrap_or_else(|| EventRegistry::global())
    }

    fn request(
        &self,
        caller: &Address,
        call_value: i64,
        method: &str,
        args: &[Arg],
    ) -> SdkResult<(TriggerSmartContract, &Function)> {
        if call_value < 0 {
            return Err(SdkError::InvalidAmount(format!(
                "call value must not be negative, got {}",
                call_value
            )));
        }
        let function = self.abi.resolve(method, args.len())?;
        let data = function.encode_args(args)?;
        let request = TriggerSmartContract {
            owner_address: caller.as_bytes().to_vec(),
            contract_address: self.address.as_bytes().to_vec(),
            call_value,
            data,
            ..Default::default()
        };
        Ok((request, function))
    }

    /// Build a state-changing call; returns the unsigned transaction and the
    /// node's energy hint
    pub async fn invoke(
        &self,
        ctx: &CallContext,
        caller: &Address,
        call_value: i64,
        method: &str,
        args: &[Arg],
    ) -> SdkResult<(TransactionExtention, i64)> {
        let (request, function) = self.request(caller, call_value, method, args)?;
        tracing::debug!(contract = %self.address, method = function.signature(), "invoke");
        let ext = self.client.trigger_contract(ctx, &request).await?;
        let energy_used = ext.energy_used;
        Ok((ext, energy_used))
    }

    /// Read-only call; decodes the return data against the outputs
    ///
    /// A reverted execution yields `TxReverted` with the decoded reason.
    pub async fn call(
        &self,
        ctx: &CallContext,
        caller: &Address,
        method: &str,
        args: &[Arg],
    ) -> SdkResult<Vec<Token>> {
        let (request, function) = self.request(caller, 0, method, args)?;
        let ext = self.client.trigger_constant_contract(ctx, &request).await?;
        if let Some(message) = execution_failure(&ext) {
            return Err(SdkError::TxReverted {
                tx_id: None,
                message,
            });
        }
        let data = ext.constant_result.first().map(Vec::as_slice).unwrap_or_default();
        function.decode_output(data)
    }

    /// Execute without producing a broadcastable transaction
    ///
    /// Execution failures are reported in the result; transport and
    /// encoding failures are errors.
    pub async fn simulate(
        &self,
        ctx: &CallContext,
        caller: &Address,
        call_value: i64,
        method: &str,
        args: &[Arg],
    ) -> SdkResult<SimulationResult> {
        let (request, _) = self.request(caller, call_value, method, args)?;
        let ext = match self.client.trigger_constant_contract(ctx, &request).await {
            Ok(ext) => ext,
            Err(SdkError::TxBuild {
                code: ResponseCode::ContractExeError | ResponseCode::ContractValidateError,
                message,
            }) => {
                return Ok(SimulationResult {
                    success: false,
                    energy_used: 0,
                    revert_message: Some(message),
                    logs: Vec::new(),
                    return_data: Vec::new(),
                });
            }
            Err(e) => return Err(e),
        };

        let revert_message = execution_failure(&ext);
        Ok(SimulationResult {
            success: revert_message.is_none(),
            energy_used: ext.energy_used,
            revert_message,
            logs: self.registry().decode_logs(&ext.logs)?,
            return_data: ext.constant_result.into_iter().next().unwrap_or_default(),
        })
    }

    /// Build a deployment transaction
    pub async fn deploy(
        client: &TronClient,
        ctx: &CallContext,
        owner: &Address,
        params: DeployParams,
    ) -> SdkResult<TransactionExtention> {
        if params.bytecode.is_empty() {
            return Err(SdkError::InvalidParameter("bytecode is empty".into()));
        }
        if params.call_value < 0 {
            return Err(SdkError::InvalidAmount(format!(
                "call value must not be negative, got {}",
                params.call_value
            )));
        }
        if !(0..=100).contains(&params.consume_user_resource_percent) {
            return Err(SdkError::InvalidParameter(format!(
                "consume_user_resource_percent must be 0-100, got {}",
                params.consume_user_resource_percent
            )));
        }
        if params.origin_energy_limit <= 0 {
            return Err(SdkError::InvalidParameter(format!(
                "origin_energy_limit must be positive, got {}",
                params.origin_energy_limit
            )));
        }

        let mut bytecode = params.bytecode;
        bytecode.extend(params.abi.encode_constructor(&params.constructor_args)?);

        let request = CreateSmartContract {
            owner_address: owner.as_bytes().to_vec(),
            new_contract: Some(SmartContract {
                origin_address: owner.as_bytes().to_vec(),
                abi: Some(params.abi.to_proto()),
                bytecode,
                call_value: params.call_value,
                consume_user_resource_percent: params.consume_user_resource_percent,
                name: params.name,
                origin_energy_limit: params.origin_energy_limit,
                ..Default::default()
            }),
            ..Default::default()
        };
        client.deploy_contract(ctx, &request).await
    }
}

/// Revert reason when the node reports a failed execution
fn execution_failure(ext: &TransactionExtention) -> Option<String> {
    let status = ext
        .transaction
        .as_ref()
        .and_then(|tx| tx.ret.first())
        .map(|r| r.contract_ret())?;
    if matches!(status, ContractResult::Default | ContractResult::Success) {
        return None;
    }
    let reason = ext.constant_result.first().and_then(|d| decode_revert(d));
    Some(reason.unwrap_or_else(|| status.as_str_name().to_string()))
}
