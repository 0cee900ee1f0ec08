//! Event decoder registry
//!
//! Maps 4-byte event selectors to event definitions. One process-wide
//! instance is available through [`EventRegistry::global`]; independent
//! instances can be created for embedding. Registration is last-writer-wins
//! and reads take a shared lock.

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::RwLock;
use tron_primitives::{Address, H256};

use crate::abi::{Abi, Event, Token};
use crate::error::{SdkError, SdkResult};

/// One decoded event parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedParam {
    /// Declared name
    pub name: String,
    /// Canonical type name
    pub kind: String,
    /// Whether the value came from a topic
    pub indexed: bool,
    /// Rendered value
    pub value: String,
    /// Typed value
    pub token: Token,
}

/// Decoded event log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEvent {
    /// Event name, or `unknown_event(0x........)`
    pub event_name: String,
    /// Emitting contract in base58check, empty when unknown
    pub contract_address: String,
    /// Parameters in declaration order
    pub params: Vec<DecodedParam>,
}

impl DecodedEvent {
    /// Parameter by name
    pub fn param(&self, name: &str) -> Option<&DecodedParam> {
        self.params.iter().find(|p| p.name == name)
    }
}

/// Selector to event-definition map
#[derive(Debug, Default)]
pub struct EventRegistry {
    events: RwLock<HashMap<[u8; 4], Event>>,
}

static GLOBAL: OnceLock<EventRegistry> = OnceLock::new();

impl EventRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry
    pub fn global() -> &'static EventRegistry {
        GLOBAL.get_or_init(EventRegistry::new)
    }

    /// Register every non-anonymous event of `abi`
    ///
    /// An existing entry with the same selector is replaced.
    pub fn register_interface(&self, abi: &Abi) {
        let mut events = self.events.write();
        let mut count = 0usize;
        for event in abi.events().iter().filter(|e| !e.anonymous) {
            let selector = event.selector();
            if let Some(previous) = events.insert(selector, event.clone()) {
                if previous.signature() != event.signature() {
                    tracing::debug!(
                        selector = %hex::encode(selector),
                        old = previous.signature(),
                        new = event.signature(),
                        "event selector overwritten"
                    );
                }
            }
            count += 1;
        }
        tracing::debug!(count, total = events.len(), "registered events");
    }

    /// Canonical signature for a selector and whether it is known
    pub fn lookup_selector(&self, selector: [u8; 4]) -> (String, bool) {
        match self.events.read().get(&selector) {
            Some(event) => (event.signature().to_string(), true),
            None => (String::new(), false),
        }
    }

    /// Number of registered selectors
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Decode one log
    ///
    /// An unregistered selector yields `unknown_event(0x........)` with no
    /// parameters. A registered event whose data does not match its shape is
    /// an error.
    pub fn decode_log(&self, topics: &[H256], data: &[u8]) -> SdkResult<DecodedEvent> {
        let selector = topics.first().map(H256::selector).unwrap_or_default();

        // clone out so decoding runs without holding the lock
        let event = self.events.read().get(&selector).cloned();
        let Some(event) = event else {
            return Ok(DecodedEvent {
                event_name: format!("unknown_event(0x{})", hex::encode(selector)),
                contract_address: String::new(),
                params: Vec::new(),
            });
        };

        let values = event.decode_log(topics, data)?;
        let params = event
            .inputs
            .iter()
            .zip(values)
            .map(|(param, token)| DecodedParam {
                name: param.name.clone(),
                kind: param.kind.to_string(),
                indexed: param.indexed,
                value: token.render(),
                token,
            })
            .collect();

        Ok(DecodedEvent {
            event_name: event.name.clone(),
            contract_address: String::new(),
            params,
        })
    }

    /// Decode node logs in order, annotating each with its contract address
    pub fn decode_logs(&self, logs: &[tron_proto::Log]) -> SdkResult<Vec<DecodedEvent>> {
        logs.iter()
            .map(|log| {
                let topics = log
                    .topics
                    .iter()
                    .map(|t| {
                        H256::from_slice(t).map_err(|_| {
                            SdkError::DecodeInvalid(format!("topic of {} bytes", t.len()))
                        })
                    })
                    .collect::<SdkResult<Vec<_>>>()?;
                let mut decoded = self.decode_log(&topics, &log.data)?;
                decoded.contract_address = log_address(&log.address);
                Ok(decoded)
            })
            .collect()
    }
}

/// Logs carry the 20-byte form; 21-byte addresses are accepted as-is
fn log_address(raw: &[u8]) -> String {
    match raw.len() {
        20 => {
            let mut tail = [0u8; 20];
            tail.copy_from_slice(raw);
            Address::from_evm_bytes(tail).to_base58()
        }
        Address::LEN => Address::from_slice(raw)
            .map(|a| a.to_base58())
            .unwrap_or_else(|_| hex::encode(raw)),
        _ => hex::encode(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::{Param, ParamType};

    fn topic_hex(s: &str) -> H256 {
        H256::from_hex(s).unwrap()
    }

    fn transfer_log() -> (Vec<H256>, Vec<u8>) {
        let topics = vec![
            topic_hex("0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"),
            topic_hex("0x000000000000000000000000a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"),
            topic_hex("0x0000000000000000000000004e83362442b8d1bec281594cea3050c8eb01311c"),
        ];
        let mut data = vec![0u8; 32];
        data[30] = 0x03;
        data[31] = 0xe8;
        (topics, data)
    }

    #[test]
    fn test_decode_trc20_transfer() {
        let registry = EventRegistry::new();
        registry.register_interface(&Abi::trc20());

        let (topics, data) = transfer_log();
        let event = registry.decode_log(&topics, &data).unwrap();

        assert_eq!(event.event_name, "Transfer");
        let names: Vec<_> = event.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["from", "to", "value"]);
        assert_eq!(event.params[0].kind, "address");
        assert_eq!(event.params[0].value, "TQd22wygQNcAJt1yRwtPj8wApXtUHYXGhN");
        assert_eq!(event.params[1].value, "TH8LtkoNLhBKYHDV7NecnohMYK4rFoVp6L");
        assert_eq!(event.params[2].value, "1000");
        assert!(event.params[0].indexed && !event.params[2].indexed);
        assert_eq!(event.params[1].token.as_address().unwrap().prefix(), 0x41);
    }

    #[test]
    fn test_unknown_selector() {
        let registry = EventRegistry::new();
        let mut topic = [0u8; 32];
        topic[..4].copy_from_slice(&[0x12, 0x34, 0x56, 0x78]);

        let event = registry.decode_log(&[H256::from_bytes(topic)], &[]).unwrap();
        assert_eq!(event.event_name, "unknown_event(0x12345678)");
        assert!(event.params.is_empty());
    }

    #[test]
    fn test_lookup_selector() {
        let registry = EventRegistry::new();
        assert_eq!(registry.lookup_selector([0xdd, 0xf2, 0x52, 0xad]), (String::new(), false));

        registry.register_interface(&Abi::trc20());
        assert_eq!(registry.len(), 2);
        let (signature, found) = registry.lookup_selector([0xdd, 0xf2, 0x52, 0xad]);
        assert!(found);
        assert_eq!(signature, "Transfer(address,address,uint256)");
    }

    #[test]
    fn test_last_writer_wins() {
        let registry = EventRegistry::new();
        registry.register_interface(&Abi::trc20());

        // same signature, nothing indexed
        let flat = Abi::new(
            vec![],
            vec![Event::new(
                "Transfer",
                vec![
                    Param::new("src", ParamType::Address),
                    Param::new("dst", ParamType::Address),
                    Param::new("wad", ParamType::Uint(256)),
                ],
                false,
            )],
        );
        registry.register_interface(&flat);

        let mut data = vec![0u8; 96];
        data[12..32].copy_from_slice(&[0x11; 20]);
        data[44..64].copy_from_slice(&[0x22; 20]);
        data[95] = 7;
        let topic = flat.events()[0].topic();

        let event = registry.decode_log(&[topic], &data).unwrap();
        let names: Vec<_> = event.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["src", "dst", "wad"]);
        assert!(event.params.iter().all(|p| !p.indexed));
        assert_eq!(event.param("wad").unwrap().value, "7");
    }

    #[test]
    fn test_anonymous_events_not_registered() {
        let registry = EventRegistry::new();
        let abi = Abi::new(vec![], vec![Event::new("Anon", vec![], true)]);
        registry.register_interface(&abi);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_decode_logs_annotates_address() {
        let registry = EventRegistry::new();
        registry.register_interface(&Abi::trc20());

        let (topics, data) = transfer_log();
        let log = tron_proto::Log {
            address: hex::decode("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48").unwrap(),
            topics: topics.iter().map(|t| t.as_bytes().to_vec()).collect(),
            data,
        };
        let unknown = tron_proto::Log {
            address: vec![0x41; 21],
            topics: vec![vec![0xab; 32]],
            data: vec![],
        };

        let events = registry.decode_logs(&[log, unknown]).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_name, "Transfer");
        assert_eq!(events[0].contract_address, "TQd22wygQNcAJt1yRwtPj8wApXtUHYXGhN");
        assert_eq!(events[1].event_name, "unknown_event(0xabababab)");
        assert!(events[1].contract_address.starts_with('T'));
    }

    #[test]
    fn test_decode_logs_rejects_bad_topic() {
        let registry = EventRegistry::new();
        let log = tron_proto::Log {
            address: vec![0; 20],
            topics: vec![vec![1, 2, 3]],
            data: vec![],
        };
        assert!(matches!(
            registry.decode_logs(&[log]),
            Err(SdkError::DecodeInvalid(_))
        ));
    }
}
