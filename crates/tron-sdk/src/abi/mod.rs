//! Contract ABI codec
//!
//! This module provides:
//! - Interface compilation from JSON or the node's ABI message
//! - Selector and event-topic hashing
//! - Head/tail encoding of argument tuples
//! - Decoding of return data, event logs and revert payloads
//!
//! # Example
//!
//! ```rust
//! use tron_sdk::abi::{Abi, Arg, Token};
//!
//! let abi = Abi::trc20();
//! let transfer = abi.function("transfer").unwrap();
//! let data = transfer
//!     .encode_args(&[
//!         Arg::from("TWRvzd6FQcsyp7hwCtttjZGpU1kfvVEtNK"),
//!         Arg::from("1000"),
//!     ])
//!     .unwrap();
//! assert_eq!(&data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
//!
//! let mut ret = [0u8; 32];
//! ret[31] = 1;
//! assert_eq!(transfer.decode_output(&ret).unwrap(), vec![Token::Bool(true)]);
//! ```

mod arg;
mod decode;
mod encode;
mod interface;
mod types;

pub use arg::Arg;
pub use decode::{decode, decode_indexed, decode_revert};
pub use encode::{encode, encode_function_call, event_topic, function_selector, parse_type};
pub use interface::{Abi, Event, Function, Param, StateMutability};
pub use types::{ParamType, Token, I256};
