//! Core chain messages: transactions, receipts, blocks, accounts

use crate::any::Any;

// ==================== Transaction ====================

/// A transaction as produced by the node
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Transaction {
    #[prost(message, optional, tag = "1")]
    pub raw_data: ::core::option::Option<TransactionRaw>,
    /// One 65-byte signature per signer
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub signature: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(message, repeated, tag = "5")]
    pub ret: ::prost::alloc::vec::Vec<TransactionResult>,
}

/// The signed portion of a transaction
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionRaw {
    #[prost(bytes = "vec", tag = "1")]
    pub ref_block_bytes: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "3")]
    pub ref_block_num: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub ref_block_hash: ::prost::alloc::vec::Vec<u8>,
    /// Unix milliseconds
    #[prost(int64, tag = "8")]
    pub expiration: i64,
    #[prost(message, repeated, tag = "9")]
    pub auths: ::prost::alloc::vec::Vec<Authority>,
    /// Memo
    #[prost(bytes = "vec", tag = "10")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, repeated, tag = "11")]
    pub contract: ::prost::alloc::vec::Vec<TransactionContract>,
    #[prost(bytes = "vec", tag = "12")]
    pub scripts: ::prost::alloc::vec::Vec<u8>,
    /// Unix milliseconds
    #[prost(int64, tag = "14")]
    pub timestamp: i64,
    /// Base units
    #[prost(int64, tag = "18")]
    pub fee_limit: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AccountId {
    #[prost(bytes = "vec", tag = "1")]
    pub name: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub address: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Authority {
    #[prost(message, optional, tag = "1")]
    pub account: ::core::option::Option<AccountId>,
    #[prost(bytes = "vec", tag = "2")]
    pub permission_name: ::prost::alloc::vec::Vec<u8>,
}

/// One contract entry of a transaction
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionContract {
    #[prost(enumeration = "ContractType", tag = "1")]
    pub r#type: i32,
    #[prost(message, optional, tag = "2")]
    pub parameter: ::core::option::Option<Any>,
    #[prost(bytes = "vec", tag = "3")]
    pub provider: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub contract_name: ::prost::alloc::vec::Vec<u8>,
    /// Account permission that signs this entry (0 = owner)
    #[prost(int32, tag = "5")]
    pub permission_id: i32,
}

impl TransactionContract {
    /// Wrap a contract payload
    pub fn new<M: crate::ContractPayload>(payload: &M) -> Self {
        TransactionContract {
            r#type: M::CONTRACT_TYPE as i32,
            parameter: Some(Any::pack(payload)),
            ..Default::default()
        }
    }
}

/// Per-contract execution result attached to a transaction
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionResult {
    #[prost(int64, tag = "1")]
    pub fee: i64,
    #[prost(enumeration = "TxResultCode", tag = "2")]
    pub ret: i32,
    #[prost(enumeration = "ContractResult", tag = "3")]
    pub contract_ret: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TxResultCode {
    Sucess = 0,
    Failed = 1,
}

/// Kind of a contract entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ContractType {
    AccountCreateContract = 0,
    TransferContract = 1,
    TransferAssetContract = 2,
    VoteAssetContract = 3,
    VoteWitnessContract = 4,
    WitnessCreateContract = 5,
    AssetIssueContract = 6,
    WitnessUpdateContract = 8,
    ParticipateAssetIssueContract = 9,
    AccountUpdateContract = 10,
    FreezeBalanceContract = 11,
    UnfreezeBalanceContract = 12,
    WithdrawBalanceContract = 13,
    UnfreezeAssetContract = 14,
    UpdateAssetContract = 15,
    ProposalCreateContract = 16,
    ProposalApproveContract = 17,
    ProposalDeleteContract = 18,
    SetAccountIdContract = 19,
    CustomContract = 20,
    CreateSmartContract = 30,
    TriggerSmartContract = 31,
    GetContract = 32,
    UpdateSettingContract = 33,
    ExchangeCreateContract = 41,
    ExchangeInjectContract = 42,
    ExchangeWithdrawContract = 43,
    ExchangeTransactionContract = 44,
    UpdateEnergyLimitContract = 45,
    AccountPermissionUpdateContract = 46,
    ClearAbiContract = 48,
    UpdateBrokerageContract = 49,
    ShieldedTransferContract = 51,
    MarketSellAssetContract = 52,
    MarketCancelOrderContract = 53,
    FreezeBalanceV2Contract = 54,
    UnfreezeBalanceV2Contract = 55,
    WithdrawExpireUnfreezeContract = 56,
    DelegateResourceContract = 57,
    UnDelegateResourceContract = 58,
    CancelAllUnfreezeV2Contract = 59,
}

impl ContractType {
    /// Whether this entry runs contract code (and so produces a receipt worth waiting for)
    pub fn executes_code(self) -> bool {
        matches!(
            self,
            ContractType::TriggerSmartContract | ContractType::CreateSmartContract
        )
    }
}

/// VM execution outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ContractResult {
    Default = 0,
    Success = 1,
    Revert = 2,
    BadJumpDestination = 3,
    OutOfMemory = 4,
    PrecompiledContract = 5,
    StackTooSmall = 6,
    StackTooLarge = 7,
    IllegalOperation = 8,
    StackOverflow = 9,
    OutOfEnergy = 10,
    OutOfTime = 11,
    JvmStackOverFlow = 12,
    Unknown = 13,
    TransferFailed = 14,
    InvalidCode = 15,
}

impl ContractResult {
    /// Name as written in the node's schema
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ContractResult::Default => "DEFAULT",
            ContractResult::Success => "SUCCESS",
            ContractResult::Revert => "REVERT",
            ContractResult::BadJumpDestination => "BAD_JUMP_DESTINATION",
            ContractResult::OutOfMemory => "OUT_OF_MEMORY",
            ContractResult::PrecompiledContract => "PRECOMPILED_CONTRACT",
            ContractResult::StackTooSmall => "STACK_TOO_SMALL",
            ContractResult::StackTooLarge => "STACK_TOO_LARGE",
            ContractResult::IllegalOperation => "ILLEGAL_OPERATION",
            ContractResult::StackOverflow => "STACK_OVERFLOW",
            ContractResult::OutOfEnergy => "OUT_OF_ENERGY",
            ContractResult::OutOfTime => "OUT_OF_TIME",
            ContractResult::JvmStackOverFlow => "JVM_STACK_OVER_FLOW",
            ContractResult::Unknown => "UNKNOWN",
            ContractResult::TransferFailed => "TRANSFER_FAILED",
            ContractResult::InvalidCode => "INVALID_CODE",
        }
    }
}

// ==================== Receipts ====================

/// Post-execution record of a transaction
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionInfo {
    #[prost(bytes = "vec", tag = "1")]
    pub id: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "2")]
    pub fee: i64,
    #[prost(int64, tag = "3")]
    pub block_number: i64,
    #[prost(int64, tag = "4")]
    pub block_time_stamp: i64,
    #[prost(bytes = "vec", repeated, tag = "5")]
    pub contract_result: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", tag = "6")]
    pub contract_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "7")]
    pub receipt: ::core::option::Option<ResourceReceipt>,
    #[prost(message, repeated, tag = "8")]
    pub log: ::prost::alloc::vec::Vec<Log>,
    #[prost(enumeration = "TxResultCode", tag = "9")]
    pub result: i32,
    #[prost(bytes = "vec", tag = "10")]
    pub res_message: ::prost::alloc::vec::Vec<u8>,
}

/// Event log emitted during execution
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Log {
    /// 20-byte contract address (no network prefix)
    #[prost(bytes = "vec", tag = "1")]
    pub address: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub topics: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(bytes = "vec", tag = "3")]
    pub data: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ResourceReceipt {
    #[prost(int64, tag = "1")]
    pub energy_usage: i64,
    #[prost(int64, tag = "2")]
    pub energy_fee: i64,
    #[prost(int64, tag = "3")]
    pub origin_energy_usage: i64,
    #[prost(int64, tag = "4")]
    pub energy_usage_total: i64,
    #[prost(int64, tag = "5")]
    pub net_usage: i64,
    #[prost(int64, tag = "6")]
    pub net_fee: i64,
    #[prost(enumeration = "ContractResult", tag = "7")]
    pub result: i32,
    #[prost(int64, tag = "8")]
    pub energy_penalty_total: i64,
}

// ==================== Blocks ====================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockHeader {
    #[prost(message, optional, tag = "1")]
    pub raw_data: ::core::option::Option<BlockHeaderRaw>,
    #[prost(bytes = "vec", tag = "2")]
    pub witness_signature: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockHeaderRaw {
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(bytes = "vec", tag = "2")]
    pub tx_trie_root: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub parent_hash: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "7")]
    pub number: i64,
    #[prost(int64, tag = "8")]
    pub witness_id: i64,
    #[prost(bytes = "vec", tag = "9")]
    pub witness_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int32, tag = "10")]
    pub version: i32,
    #[prost(bytes = "vec", tag = "11")]
    pub account_state_root: ::prost::alloc::vec::Vec<u8>,
}

// ==================== Chain parameters ====================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChainParameters {
    #[prost(message, repeated, tag = "1")]
    pub chain_parameter: ::prost::alloc::vec::Vec<ChainParameter>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChainParameter {
    #[prost(string, tag = "1")]
    pub key: ::prost::alloc::string::String,
    #[prost(int64, tag = "2")]
    pub value: i64,
}

impl ChainParameters {
    /// Look up a parameter by key
    pub fn get(&self, key: &str) -> Option<i64> {
        self.chain_parameter
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value)
    }
}

// ==================== Accounts ====================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Account {
    #[prost(bytes = "vec", tag = "1")]
    pub account_name: ::prost::alloc::vec::Vec<u8>,
    #[prost(int32, tag = "2")]
    pub r#type: i32,
    #[prost(bytes = "vec", tag = "3")]
    pub address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "4")]
    pub balance: i64,
    #[prost(int64, tag = "9")]
    pub create_time: i64,
    #[prost(message, optional, tag = "31")]
    pub owner_permission: ::core::option::Option<Permission>,
    #[prost(message, optional, tag = "32")]
    pub witness_permission: ::core::option::Option<Permission>,
    #[prost(message, repeated, tag = "33")]
    pub active_permission: ::prost::alloc::vec::Vec<Permission>,
}

impl Account {
    /// Permission with the given id (0 = owner, 2.. = active)
    pub fn permission(&self, id: i32) -> Option<&Permission> {
        if id == 0 {
            return self.owner_permission.as_ref();
        }
        self.witness_permission
            .iter()
            .chain(self.active_permission.iter())
            .find(|p| p.id == id)
    }
}

/// Weighted key set with a signing threshold
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Permission {
    #[prost(enumeration = "PermissionType", tag = "1")]
    pub r#type: i32,
    #[prost(int32, tag = "2")]
    pub id: i32,
    #[prost(string, tag = "3")]
    pub permission_name: ::prost::alloc::string::String,
    #[prost(int64, tag = "4")]
    pub threshold: i64,
    #[prost(int32, tag = "5")]
    pub parent_id: i32,
    /// Bitmap of allowed contract types (active permissions only)
    #[prost(bytes = "vec", tag = "6")]
    pub operations: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, repeated, tag = "7")]
    pub keys: ::prost::alloc::vec::Vec<Key>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Key {
    #[prost(bytes = "vec", tag = "1")]
    pub address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "2")]
    pub weight: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PermissionType {
    Owner = 0,
    Witness = 1,
    Active = 2,
}

// ==================== Governance / market listings ====================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Witness {
    #[prost(bytes = "vec", tag = "1")]
    pub address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "2")]
    pub vote_count: i64,
    #[prost(bytes = "vec", tag = "3")]
    pub pub_key: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "4")]
    pub url: ::prost::alloc::string::String,
    #[prost(int64, tag = "5")]
    pub total_produced: i64,
    #[prost(int64, tag = "6")]
    pub total_missed: i64,
    #[prost(int64, tag = "7")]
    pub latest_block_num: i64,
    #[prost(int64, tag = "8")]
    pub latest_slot_num: i64,
    #[prost(bool, tag = "9")]
    pub is_jobs: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Proposal {
    #[prost(int64, tag = "1")]
    pub proposal_id: i64,
    #[prost(bytes = "vec", tag = "2")]
    pub proposer_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(map = "int64, int64", tag = "3")]
    pub parameters: ::std::collections::HashMap<i64, i64>,
    #[prost(int64, tag = "4")]
    pub expiration_time: i64,
    #[prost(int64, tag = "5")]
    pub create_time: i64,
    #[prost(bytes = "vec", repeated, tag = "6")]
    pub approvals: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(enumeration = "ProposalState", tag = "7")]
    pub state: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ProposalState {
    Pending = 0,
    Disapproved = 1,
    Approved = 2,
    Canceled = 3,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Exchange {
    #[prost(int64, tag = "1")]
    pub exchange_id: i64,
    #[prost(bytes = "vec", tag = "2")]
    pub creator_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "3")]
    pub create_time: i64,
    #[prost(bytes = "vec", tag = "6")]
    pub first_token_id: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "7")]
    pub first_token_balance: i64,
    #[prost(bytes = "vec", tag = "8")]
    pub second_token_id: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "9")]
    pub second_token_balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::TriggerSmartContract;
    use prost::Message;

    #[test]
    fn test_raw_encoding_is_field_ordered() {
        let raw = TransactionRaw {
            ref_block_bytes: vec![0x12, 0x34],
            expiration: 1_700_000_060_000,
            timestamp: 1_700_000_000_000,
            fee_limit: 100_000_000,
            ..Default::default()
        };
        let bytes = raw.encode_to_vec();
        // tag 1 (bytes) first, tag 18 (varint) last
        assert_eq!(bytes[0], 0x0a);
        assert_eq!(&bytes[bytes.len() - 6..bytes.len() - 4], &[0x90, 0x01]);
        assert_eq!(TransactionRaw::decode(bytes.as_slice()).unwrap(), raw);
    }

    #[test]
    fn test_contract_entry_type() {
        let entry = TransactionContract::new(&TriggerSmartContract::default());
        assert_eq!(entry.r#type(), ContractType::TriggerSmartContract);
        assert!(entry.r#type().executes_code());
        assert!(!ContractType::TransferContract.executes_code());
    }

    #[test]
    fn test_unknown_contract_result_defaults() {
        let receipt = ResourceReceipt {
            result: 999,
            ..Default::default()
        };
        assert_eq!(receipt.result(), ContractResult::Default);
        assert_eq!(ContractResult::OutOfEnergy.as_str_name(), "OUT_OF_ENERGY");
    }

    #[test]
    fn test_account_permission_lookup() {
        let account = Account {
            owner_permission: Some(Permission {
                id: 0,
                threshold: 1,
                ..Default::default()
            }),
            active_permission: vec![Permission {
                id: 2,
                threshold: 2,
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(account.permission(0).map(|p| p.threshold), Some(1));
        assert_eq!(account.permission(2).map(|p| p.threshold), Some(2));
        assert!(account.permission(3).is_none());
    }

    #[test]
    fn test_chain_parameter_lookup() {
        let params = ChainParameters {
            chain_parameter: vec![ChainParameter {
                key: "getEnergyFee".into(),
                value: 420,
            }],
        };
        assert_eq!(params.get("getEnergyFee"), Some(420));
        assert_eq!(params.get("getTransactionFee"), None);
    }
}
