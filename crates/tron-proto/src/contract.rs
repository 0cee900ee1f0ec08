//! Contract payloads carried inside transaction contract entries

use crate::any::ContractPayload;
use crate::chain::ContractType;

macro_rules! contract_payload {
    ($ty:ident) => {
        impl ContractPayload for $ty {
            const CONTRACT_TYPE: ContractType = ContractType::$ty;
            const TYPE_NAME: &'static str = stringify!($ty);
        }
    };
}

// ==================== Transfers ====================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransferContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub to_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "3")]
    pub amount: i64,
}
contract_payload!(TransferContract);

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransferAssetContract {
    #[prost(bytes = "vec", tag = "1")]
    pub asset_name: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub to_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "4")]
    pub amount: i64,
}
contract_payload!(TransferAssetContract);

// ==================== Smart contracts ====================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TriggerSmartContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "3")]
    pub call_value: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "5")]
    pub call_token_value: i64,
    #[prost(int64, tag = "6")]
    pub token_id: i64,
}
contract_payload!(TriggerSmartContract);

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateSmartContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub new_contract: ::core::option::Option<SmartContract>,
    #[prost(int64, tag = "3")]
    pub call_token_value: i64,
    #[prost(int64, tag = "4")]
    pub token_id: i64,
}
contract_payload!(CreateSmartContract);

/// Deployed (or to-be-deployed) contract
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SmartContract {
    #[prost(bytes = "vec", tag = "1")]
    pub origin_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub contract_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub abi: ::core::option::Option<Abi>,
    #[prost(bytes = "vec", tag = "4")]
    pub bytecode: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "5")]
    pub call_value: i64,
    #[prost(int64, tag = "6")]
    pub consume_user_resource_percent: i64,
    #[prost(string, tag = "7")]
    pub name: ::prost::alloc::string::String,
    #[prost(int64, tag = "8")]
    pub origin_energy_limit: i64,
}

/// Interface description as stored on chain
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Abi {
    #[prost(message, repeated, tag = "1")]
    pub entrys: ::prost::alloc::vec::Vec<AbiEntry>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AbiEntry {
    #[prost(bool, tag = "1")]
    pub anonymous: bool,
    #[prost(bool, tag = "2")]
    pub constant: bool,
    #[prost(string, tag = "3")]
    pub name: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "4")]
    pub inputs: ::prost::alloc::vec::Vec<AbiParam>,
    #[prost(message, repeated, tag = "5")]
    pub outputs: ::prost::alloc::vec::Vec<AbiParam>,
    #[prost(enumeration = "AbiEntryType", tag = "6")]
    pub r#type: i32,
    #[prost(bool, tag = "7")]
    pub payable: bool,
    #[prost(enumeration = "StateMutabilityType", tag = "8")]
    pub state_mutability: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AbiParam {
    #[prost(bool, tag = "1")]
    pub indexed: bool,
    #[prost(string, tag = "2")]
    pub name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub r#type: ::prost::alloc::string::String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AbiEntryType {
    UnknownEntryType = 0,
    Constructor = 1,
    Function = 2,
    Event = 3,
    Fallback = 4,
    Receive = 5,
    Error = 6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum StateMutabilityType {
    UnknownMutabilityType = 0,
    Pure = 1,
    View = 2,
    Nonpayable = 3,
    Payable = 4,
}

// ==================== Resources (stake 2.0) ====================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ResourceCode {
    Bandwidth = 0,
    Energy = 1,
    TronPower = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FreezeBalanceV2Contract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "2")]
    pub frozen_balance: i64,
    #[prost(enumeration = "ResourceCode", tag = "3")]
    pub resource: i32,
}
contract_payload!(FreezeBalanceV2Contract);

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnfreezeBalanceV2Contract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "2")]
    pub unfreeze_balance: i64,
    #[prost(enumeration = "ResourceCode", tag = "3")]
    pub resource: i32,
}
contract_payload!(UnfreezeBalanceV2Contract);

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WithdrawExpireUnfreezeContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
}
contract_payload!(WithdrawExpireUnfreezeContract);

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DelegateResourceContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(enumeration = "ResourceCode", tag = "2")]
    pub resource: i32,
    #[prost(int64, tag = "3")]
    pub balance: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub receiver_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(bool, tag = "5")]
    pub lock: bool,
    #[prost(int64, tag = "6")]
    pub lock_period: i64,
}
contract_payload!(DelegateResourceContract);

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UnDelegateResourceContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(enumeration = "ResourceCode", tag = "2")]
    pub resource: i32,
    #[prost(int64, tag = "3")]
    pub balance: i64,
    #[prost(bytes = "vec", tag = "4")]
    pub receiver_address: ::prost::alloc::vec::Vec<u8>,
}
contract_payload!(UnDelegateResourceContract);

// ==================== Governance ====================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VoteWitnessContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, repeated, tag = "2")]
    pub votes: ::prost::alloc::vec::Vec<Vote>,
    #[prost(bool, tag = "3")]
    pub support: bool,
}
contract_payload!(VoteWitnessContract);

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Vote {
    #[prost(bytes = "vec", tag = "1")]
    pub vote_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "2")]
    pub vote_count: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProposalCreateContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(map = "int64, int64", tag = "2")]
    pub parameters: ::std::collections::HashMap<i64, i64>,
}
contract_payload!(ProposalCreateContract);

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProposalApproveContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "2")]
    pub proposal_id: i64,
    #[prost(bool, tag = "3")]
    pub is_add_approval: bool,
}
contract_payload!(ProposalApproveContract);

// ==================== Exchange / assets ====================

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExchangeTransactionContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "2")]
    pub exchange_id: i64,
    #[prost(bytes = "vec", tag = "3")]
    pub token_id: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "4")]
    pub quant: i64,
    #[prost(int64, tag = "5")]
    pub expected: i64,
}
contract_payload!(ExchangeTransactionContract);

/// Issued-asset (TRC10) description
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AssetIssueContract {
    #[prost(bytes = "vec", tag = "1")]
    pub owner_address: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub name: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub abbr: ::prost::alloc::vec::Vec<u8>,
    #[prost(int64, tag = "4")]
    pub total_supply: i64,
    #[prost(int32, tag = "6")]
    pub trx_num: i32,
    #[prost(int32, tag = "7")]
    pub precision: i32,
    #[prost(int32, tag = "8")]
    pub num: i32,
    #[prost(int64, tag = "9")]
    pub start_time: i64,
    #[prost(int64, tag = "10")]
    pub end_time: i64,
    #[prost(bytes = "vec", tag = "20")]
    pub description: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", tag = "21")]
    pub url: ::prost::alloc::vec::Vec<u8>,
    #[prost(string, tag = "41")]
    pub id: ::prost::alloc::string::String,
}
contract_payload!(AssetIssueContract);
