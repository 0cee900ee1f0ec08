use prost::Message;

use crate::chain::ContractType;

/// Type URL prefix used by the node when packing contract payloads
pub const TYPE_URL_PREFIX: &str = "type.googleapis.com/protocol.";

/// `google.protobuf.Any`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: ::prost::alloc::vec::Vec<u8>,
}

impl Any {
    /// Pack a contract payload under its protocol type URL
    pub fn pack<M: ContractPayload>(payload: &M) -> Self {
        Any {
            type_url: format!("{}{}", TYPE_URL_PREFIX, M::TYPE_NAME),
            value: payload.encode_to_vec(),
        }
    }

    /// Decode the payload if the type URL names `M`
    pub fn unpack<M: ContractPayload>(&self) -> Option<M> {
        let name = self.type_url.rsplit('.').next()?;
        if name != M::TYPE_NAME {
            return None;
        }
        M::decode(self.value.as_slice()).ok()
    }
}

/// A contract message that can ride inside a transaction's contract entry
pub trait ContractPayload: Message + Default + Sized {
    /// Kind recorded in the contract entry
    const CONTRACT_TYPE: ContractType;
    /// Unqualified protobuf message name
    const TYPE_NAME: &'static str;
}
