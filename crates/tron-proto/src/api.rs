//! Wallet-service request and response envelopes

use crate::contract::AssetIssueContract;
use crate::chain::{BlockHeader, Exchange, Log, Proposal, Transaction, Witness};

/// Outcome of a build or broadcast request
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Return {
    #[prost(bool, tag = "1")]
    pub result: bool,
    #[prost(enumeration = "ResponseCode", tag = "2")]
    pub code: i32,
    /// Server message, usually UTF-8
    #[prost(bytes = "vec", tag = "3")]
    pub message: ::prost::alloc::vec::Vec<u8>,
}

impl Return {
    /// Message bytes as text
    pub fn message_text(&self) -> String {
        String::from_utf8_lossy(&self.message).into_owned()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ResponseCode {
    Success = 0,
    Sigerror = 1,
    ContractValidateError = 2,
    ContractExeError = 3,
    BandwithError = 4,
    DupTransactionError = 5,
    TaposError = 6,
    TooBigTransactionError = 7,
    TransactionExpirationError = 8,
    ServerBusy = 9,
    NoConnection = 10,
    NotEnoughEffectiveConnection = 11,
    BlockUnsolidified = 12,
    OtherError = 20,
}

impl ResponseCode {
    /// Name as written in the node's schema
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ResponseCode::Success => "SUCCESS",
            ResponseCode::Sigerror => "SIGERROR",
            ResponseCode::ContractValidateError => "CONTRACT_VALIDATE_ERROR",
            ResponseCode::ContractExeError => "CONTRACT_EXE_ERROR",
            ResponseCode::BandwithError => "BANDWITH_ERROR",
            ResponseCode::DupTransactionError => "DUP_TRANSACTION_ERROR",
            ResponseCode::TaposError => "TAPOS_ERROR",
            ResponseCode::TooBigTransactionError => "TOO_BIG_TRANSACTION_ERROR",
            ResponseCode::TransactionExpirationError => "TRANSACTION_EXPIRATION_ERROR",
            ResponseCode::ServerBusy => "SERVER_BUSY",
            ResponseCode::NoConnection => "NO_CONNECTION",
            ResponseCode::NotEnoughEffectiveConnection => "NOT_ENOUGH_EFFECTIVE_CONNECTION",
            ResponseCode::BlockUnsolidified => "BLOCK_UNSOLIDIFIED",
            ResponseCode::OtherError => "OTHER_ERROR",
        }
    }
}

/// Transaction plus build metadata, returned by every build method
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TransactionExtention {
    #[prost(message, optional, tag = "1")]
    pub transaction: ::core::option::Option<Transaction>,
    #[prost(bytes = "vec", tag = "2")]
    pub txid: ::prost::alloc::vec::Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub constant_result: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
    #[prost(message, optional, tag = "4")]
    pub result: ::core::option::Option<Return>,
    #[prost(int64, tag = "5")]
    pub energy_used: i64,
    #[prost(message, repeated, tag = "6")]
    pub logs: ::prost::alloc::vec::Vec<Log>,
    #[prost(int64, tag = "8")]
    pub energy_penalty: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EstimateEnergyMessage {
    #[prost(message, optional, tag = "1")]
    pub result: ::core::option::Option<Return>,
    #[prost(int64, tag = "2")]
    pub energy_required: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockExtention {
    #[prost(message, repeated, tag = "1")]
    pub transactions: ::prost::alloc::vec::Vec<TransactionExtention>,
    #[prost(message, optional, tag = "2")]
    pub block_header: ::core::option::Option<BlockHeader>,
    #[prost(bytes = "vec", tag = "3")]
    pub blockid: ::prost::alloc::vec::Vec<u8>,
}

impl BlockExtention {
    /// Block height, or 0 when the header is absent
    pub fn number(&self) -> i64 {
        self.block_header
            .as_ref()
            .and_then(|h| h.raw_data.as_ref())
            .map(|r| r.number)
            .unwrap_or_default()
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AccountResourceMessage {
    #[prost(int64, tag = "1")]
    pub free_net_used: i64,
    #[prost(int64, tag = "2")]
    pub free_net_limit: i64,
    #[prost(int64, tag = "3")]
    pub net_used: i64,
    #[prost(int64, tag = "4")]
    pub net_limit: i64,
    #[prost(int64, tag = "7")]
    pub total_net_limit: i64,
    #[prost(int64, tag = "8")]
    pub total_net_weight: i64,
    #[prost(int64, tag = "9")]
    pub total_tron_power_weight: i64,
    #[prost(int64, tag = "10")]
    pub tron_power_used: i64,
    #[prost(int64, tag = "11")]
    pub tron_power_limit: i64,
    #[prost(int64, tag = "13")]
    pub energy_used: i64,
    #[prost(int64, tag = "14")]
    pub energy_limit: i64,
    #[prost(int64, tag = "15")]
    pub total_energy_limit: i64,
    #[prost(int64, tag = "16")]
    pub total_energy_weight: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BytesMessage {
    #[prost(bytes = "vec", tag = "1")]
    pub value: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NumberMessage {
    #[prost(int64, tag = "1")]
    pub num: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EmptyMessage {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WitnessList {
    #[prost(message, repeated, tag = "1")]
    pub witnesses: ::prost::alloc::vec::Vec<Witness>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProposalList {
    #[prost(message, repeated, tag = "1")]
    pub proposals: ::prost::alloc::vec::Vec<Proposal>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExchangeList {
    #[prost(message, repeated, tag = "1")]
    pub exchanges: ::prost::alloc::vec::Vec<Exchange>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AssetIssueList {
    #[prost(message, repeated, tag = "1")]
    pub asset_issue: ::prost::alloc::vec::Vec<AssetIssueContract>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_return_message_text() {
        let ret = Return {
            result: false,
            code: ResponseCode::ContractValidateError as i32,
            message: b"balance is not sufficient".to_vec(),
        };
        assert_eq!(ret.code(), ResponseCode::ContractValidateError);
        assert_eq!(ret.code().as_str_name(), "CONTRACT_VALIDATE_ERROR");
        assert_eq!(ret.message_text(), "balance is not sufficient");
    }

    #[test]
    fn test_extension_decodes_without_transaction() {
        let ext = TransactionExtention {
            result: Some(Return {
                result: true,
                ..Default::default()
            }),
            constant_result: vec![vec![0u8; 32]],
            energy_used: 345,
            ..Default::default()
        };
        let decoded = TransactionExtention::decode(ext.encode_to_vec().as_slice()).unwrap();
        assert!(decoded.transaction.is_none());
        assert_eq!(decoded.energy_used, 345);
    }

    #[test]
    fn test_empty_block_number() {
        assert_eq!(BlockExtention::default().number(), 0);
    }
}
