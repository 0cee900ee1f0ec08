//! Contract interface descriptions
//!
//! An [`Abi`] is compiled once from JSON or from the node's `SmartContract.abi`
//! message. Functions and events carry their canonical signature and selector
//! so encoding never re-hashes.

use serde::Deserialize;
use tron_primitives::H256;

use super::arg::Arg;
use super::decode::{decode, decode_indexed};
use super::encode::{encode_function_call, event_topic, function_selector, parse_type};
use super::types::{ParamType, Token};
use crate::error::{SdkError, SdkResult};

/// Function state mutability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateMutability {
    /// Reads nothing from state
    Pure,
    /// Reads state only
    View,
    /// Writes state, rejects value
    #[default]
    NonPayable,
    /// Writes state, accepts value
    Payable,
}

impl StateMutability {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pure" => Some(Self::Pure),
            "view" => Some(Self::View),
            "nonpayable" => Some(Self::NonPayable),
            "payable" => Some(Self::Payable),
            _ => None,
        }
    }

    /// Whether calls are read-only
    pub fn is_constant(self) -> bool {
        matches!(self, Self::Pure | Self::View)
    }
}

/// Named, typed parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Declared name, possibly empty
    pub name: String,
    /// Parameter type
    pub kind: ParamType,
    /// Event parameter stored in a topic
    pub indexed: bool,
}

impl Param {
    /// Function or non-indexed event parameter
    pub fn new(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            indexed: false,
        }
    }

    /// Indexed event parameter
    pub fn indexed(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            indexed: true,
        }
    }
}

fn canonical_signature(name: &str, inputs: &[Param]) -> String {
    let types: Vec<String> = inputs.iter().map(|p| p.kind.to_string()).collect();
    format!("{}({})", name, types.join(","))
}

fn kinds(params: &[Param]) -> Vec<ParamType> {
    params.iter().map(|p| p.kind.clone()).collect()
}

// ==================== Function ====================

/// Callable function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Inputs in declaration order
    pub inputs: Vec<Param>,
    /// Outputs in declaration order
    pub outputs: Vec<Param>,
    /// Mutability
    pub state_mutability: StateMutability,
    signature: String,
    selector: [u8; 4],
}

impl Function {
    /// Create a function; signature and selector are derived
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Param>,
        outputs: Vec<Param>,
        state_mutability: StateMutability,
    ) -> Self {
        let name = name.into();
        let signature = canonical_signature(&name, &inputs);
        let selector = function_selector(&signature);
        Self {
            name,
            inputs,
            outputs,
            state_mutability,
            signature,
            selector,
        }
    }

    /// Canonical signature, e.g. `transfer(address,uint256)`
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// 4-byte selector
    pub fn selector(&self) -> [u8; 4] {
        self.selector
    }

    /// Selector followed by the encoded inputs
    pub fn encode_input(&self, tokens: &[Token]) -> SdkResult<Vec<u8>> {
        self.check_arity(tokens.len())?;
        encode_function_call(self.selector, &kinds(&self.inputs), tokens)
    }

    /// Coerce loosely-typed arguments, then encode
    pub fn encode_args(&self, args: &[Arg]) -> SdkResult<Vec<u8>> {
        self.check_arity(args.len())?;
        let tokens = args
            .iter()
            .zip(&self.inputs)
            .map(|(arg, param)| arg.coerce(&param.kind))
            .collect::<SdkResult<Vec<_>>>()?;
        self.encode_input(&tokens)
    }

    /// Decode return data against the outputs
    pub fn decode_output(&self, data: &[u8]) -> SdkResult<Vec<Token>> {
        decode(&kinds(&self.outputs), data)
    }

    fn check_arity(&self, got: usize) -> SdkResult<()> {
        if got != self.inputs.len() {
            return Err(SdkError::ArityMismatch {
                method: self.signature.clone(),
                expected: self.inputs.len(),
                got,
            });
        }
        Ok(())
    }
}

// ==================== Event ====================

/// Event definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name
    pub name: String,
    /// Inputs in declaration order
    pub inputs: Vec<Param>,
    /// Anonymous events do not publish their topic
    pub anonymous: bool,
    signature: String,
    topic: H256,
}

impl Event {
    /// Create an event; signature and topic are derived
    pub fn new(name: impl Into<String>, inputs: Vec<Param>, anonymous: bool) -> Self {
        let name = name.into();
        let signature = canonical_signature(&name, &inputs);
        let topic = event_topic(&signature);
        Self {
            name,
            inputs,
            anonymous,
            signature,
            topic,
        }
    }

    /// Canonical signature, e.g. `Transfer(address,address,uint256)`
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Full 32-byte topic hash
    pub fn topic(&self) -> H256 {
        self.topic
    }

    /// First 4 bytes of the topic hash
    pub fn selector(&self) -> [u8; 4] {
        self.topic.selector()
    }

    /// Decode a log into values in declaration order
    ///
    /// Indexed inputs come from `topics[1..]` (from `topics[0..]` for
    /// anonymous events), the rest from `data`.
    pub fn decode_log(&self, topics: &[H256], data: &[u8]) -> SdkResult<Vec<Token>> {
        let first = usize::from(!self.anonymous);
        let indexed_topics = topics.get(first..).unwrap_or_default();
        let indexed_count = self.inputs.iter().filter(|p| p.indexed).count();
        if indexed_topics.len() < indexed_count {
            return Err(SdkError::DecodeInvalid(format!(
                "{}: expected {} indexed topics, got {}",
                self.signature,
                indexed_count,
                indexed_topics.len()
            )));
        }

        let data_types: Vec<ParamType> = self
            .inputs
            .iter()
            .filter(|p| !p.indexed)
            .map(|p| p.kind.clone())
            .collect();
        let mut data_values = decode(&data_types, data)?.into_iter();
        let mut topic_values = indexed_topics.iter();

        let mut values = Vec::with_capacity(self.inputs.len());
        for param in &self.inputs {
            let value = if param.indexed {
                match topic_values.next() {
                    Some(topic) => decode_indexed(&param.kind, topic)?,
                    None => return Err(SdkError::DecodeInvalid("missing topic".into())),
                }
            } else {
                match data_values.next() {
                    Some(token) => token,
                    None => return Err(SdkError::DecodeInvalid("missing data value".into())),
                }
            };
            values.push(value);
        }
        Ok(values)
    }
}

// ==================== Abi ====================

/// Compiled interface description
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Abi {
    functions: Vec<Function>,
    events: Vec<Event>,
    constructor: Option<Vec<Param>>,
    has_fallback: bool,
    has_receive: bool,
}

impl Abi {
    /// Build from parts
    pub fn new(functions: Vec<Function>, events: Vec<Event>) -> Self {
        Self {
            functions,
            events,
            ..Default::default()
        }
    }

    /// Set the constructor inputs
    pub fn with_constructor(mut self, inputs: Vec<Param>) -> Self {
        self.constructor = Some(inputs);
        self
    }

    /// Parse JSON: a bare entry array, `{"entrys": [...]}` or `{"abi": [...]}`
    pub fn from_json(json: &str) -> SdkResult<Self> {
        let ingress: AbiJson =
            serde_json::from_str(json).map_err(|e| SdkError::InvalidAbi(e.to_string()))?;
        let entries = match ingress {
            AbiJson::Entries(entries) => entries,
            AbiJson::Entrys { entrys } => entrys,
            AbiJson::Wrapped { abi } => abi,
        };

        let mut abi = Abi::default();
        for entry in entries {
            abi.add_json_entry(entry)?;
        }
        Ok(abi)
    }

    fn add_json_entry(&mut self, entry: RawEntry) -> SdkResult<()> {
        let kind = entry
            .kind
            .as_deref()
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| "function".to_string());
        match kind.as_str() {
            "function" => {
                let mutability = entry
                    .state_mutability
                    .as_deref()
                    .and_then(StateMutability::parse)
                    .unwrap_or(if entry.constant {
                        StateMutability::View
                    } else if entry.payable {
                        StateMutability::Payable
                    } else {
                        StateMutability::NonPayable
                    });
                self.functions.push(Function::new(
                    entry.name,
                    resolve_params(&entry.inputs)?,
                    resolve_params(&entry.outputs)?,
                    mutability,
                ));
            }
            "event" => {
                self.events.push(Event::new(
                    entry.name,
                    resolve_params(&entry.inputs)?,
                    entry.anonymous,
                ));
            }
            "constructor" => self.constructor = Some(resolve_params(&entry.inputs)?),
            "fallback" => self.has_fallback = true,
            "receive" => self.has_receive = true,
            "error" => {}
            other => {
                return Err(SdkError::InvalidAbi(format!("unknown entry type '{}'", other)));
            }
        }
        Ok(())
    }

    /// Convert the node's ABI message
    ///
    /// The node keeps struct parameters as a bare `tuple` with no components;
    /// entries using them cannot be compiled and are skipped.
    pub fn from_proto(proto: &tron_proto::Abi) -> Self {
        use tron_proto::{AbiEntryType, StateMutabilityType};

        let mut abi = Abi::default();
        for entry in &proto.entrys {
            let params = |list: &[tron_proto::AbiParam]| -> SdkResult<Vec<Param>> {
                list.iter()
                    .map(|p| {
                        Ok(Param {
                            name: p.name.clone(),
                            kind: parse_type(&p.r#type)?,
                            indexed: p.indexed,
                        })
                    })
                    .collect()
            };

            let compiled = match entry.r#type() {
                AbiEntryType::Function => {
                    let mutability = match entry.state_mutability() {
                        StateMutabilityType::Pure => StateMutability::Pure,
                        StateMutabilityType::View => StateMutability::View,
                        StateMutabilityType::Payable => StateMutability::Payable,
                        StateMutabilityType::Nonpayable => StateMutability::NonPayable,
                        StateMutabilityType::UnknownMutabilityType if entry.constant => {
                            StateMutability::View
                        }
                        StateMutabilityType::UnknownMutabilityType if entry.payable => {
                            StateMutability::Payable
                        }
                        StateMutabilityType::UnknownMutabilityType => StateMutability::NonPayable,
                    };
                    params(&entry.inputs).and_then(|inputs| {
                        let outputs = params(&entry.outputs)?;
                        abi.functions
                            .push(Function::new(&entry.name, inputs, outputs, mutability));
                        Ok(())
                    })
                }
                AbiEntryType::Event => params(&entry.inputs).map(|inputs| {
                    abi.events
                        .push(Event::new(&entry.name, inputs, entry.anonymous));
                }),
                AbiEntryType::Constructor => params(&entry.inputs).map(|inputs| {
                    abi.constructor = Some(inputs);
                }),
                AbiEntryType::Fallback => {
                    abi.has_fallback = true;
                    Ok(())
                }
                AbiEntryType::Receive => {
                    abi.has_receive = true;
                    Ok(())
                }
                AbiEntryType::Error | AbiEntryType::UnknownEntryType => Ok(()),
            };

            if let Err(err) = compiled {
                tracing::debug!(entry = %entry.name, error = %err, "skipping abi entry");
            }
        }
        abi
    }

    /// Node ABI message, as attached to a deployment
    pub fn to_proto(&self) -> tron_proto::Abi {
        use tron_proto::{AbiEntry, AbiEntryType, AbiParam, StateMutabilityType};

        let params = |list: &[Param]| -> Vec<AbiParam> {
            list.iter()
                .map(|p| AbiParam {
                    indexed: p.indexed,
                    name: p.name.clone(),
                    r#type: p.kind.to_string(),
                })
                .collect()
        };
        let bare = |kind: AbiEntryType| AbiEntry {
            r#type: kind as i32,
            ..Default::default()
        };

        let mut entrys = Vec::new();
        if let Some(inputs) = &self.constructor {
            entrys.push(AbiEntry {
                inputs: params(inputs),
                ..bare(AbiEntryType::Constructor)
            });
        }
        for f in &self.functions {
            let mutability = match f.state_mutability {
                StateMutability::Pure => StateMutabilityType::Pure,
                StateMutability::View => StateMutabilityType::View,
                StateMutability::NonPayable => StateMutabilityType::Nonpayable,
                StateMutability::Payable => StateMutabilityType::Payable,
            };
            entrys.push(AbiEntry {
                constant: f.state_mutability.is_constant(),
                name: f.name.clone(),
                inputs: params(&f.inputs),
                outputs: params(&f.outputs),
                payable: f.state_mutability == StateMutability::Payable,
                state_mutability: mutability as i32,
                ..bare(AbiEntryType::Function)
            });
        }
        for e in &self.events {
            entrys.push(AbiEntry {
                anonymous: e.anonymous,
                name: e.name.clone(),
                inputs: params(&e.inputs),
                ..bare(AbiEntryType::Event)
            });
        }
        if self.has_fallback {
            entrys.push(bare(AbiEntryType::Fallback));
        }
        if self.has_receive {
            entrys.push(bare(AbiEntryType::Receive));
        }
        tron_proto::Abi { entrys }
    }

    /// Built-in TRC20 interface
    pub fn trc20() -> Self {
        use ParamType as P;
        use StateMutability::{NonPayable, View};

        let view = |name: &str, inputs: Vec<Param>, output: ParamType| {
            Function::new(name, inputs, vec![Param::new("", output)], View)
        };
        let write = |name: &str, inputs: Vec<Param>| {
            Function::new(name, inputs, vec![Param::new("", P::Bool)], NonPayable)
        };

        Abi::new(
            vec![
                view("name", vec![], P::String),
                view("symbol", vec![], P::String),
                view("decimals", vec![], P::Uint(8)),
                view("totalSupply", vec![], P::Uint(256)),
                view("balanceOf", vec![Param::new("who", P::Address)], P::Uint(256)),
                view(
                    "allowance",
                    vec![Param::new("owner", P::Address), Param::new("spender", P::Address)],
                    P::Uint(256),
                ),
                write(
                    "transfer",
                    vec![Param::new("to", P::Address), Param::new("value", P::Uint(256))],
                ),
                write(
                    "transferFrom",
                    vec![
                        Param::new("from", P::Address),
                        Param::new("to", P::Address),
                        Param::new("value", P::Uint(256)),
                    ],
                ),
                write(
                    "approve",
                    vec![Param::new("spender", P::Address), Param::new("value", P::Uint(256))],
                ),
            ],
            vec![
                Event::new(
                    "Transfer",
                    vec![
                        Param::indexed("from", P::Address),
                        Param::indexed("to", P::Address),
                        Param::new("value", P::Uint(256)),
                    ],
                    false,
                ),
                Event::new(
                    "Approval",
                    vec![
                        Param::indexed("owner", P::Address),
                        Param::indexed("spender", P::Address),
                        Param::new("value", P::Uint(256)),
                    ],
                    false,
                ),
            ],
        )
    }

    /// All functions
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    /// All events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Constructor inputs, if declared
    pub fn constructor(&self) -> Option<&[Param]> {
        self.constructor.as_deref()
    }

    /// Whether a fallback or receive function exists
    pub fn accepts_plain_calls(&self) -> bool {
        self.has_fallback || self.has_receive
    }

    /// Function by name or by canonical signature
    ///
    /// A bare name picks the first overload.
    pub fn function(&self, name_or_signature: &str) -> SdkResult<&Function> {
        let by_signature = name_or_signature.contains('(');
        self.functions
            .iter()
            .find(|f| {
                if by_signature {
                    f.signature == name_or_signature
                } else {
                    f.name == name_or_signature
                }
            })
            .ok_or_else(|| SdkError::UnknownMethod(name_or_signature.to_string()))
    }

    /// Function by name or signature, choosing the overload taking `argc` inputs
    pub fn resolve(&self, name_or_signature: &str, argc: usize) -> SdkResult<&Function> {
        if name_or_signature.contains('(') {
            return self.function(name_or_signature);
        }
        let first = self.function(name_or_signature)?;
        Ok(self
            .functions
            .iter()
            .find(|f| f.name == name_or_signature && f.inputs.len() == argc)
            .unwrap_or(first))
    }

    /// Event by name
    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Encode constructor arguments (no selector) for deployment
    pub fn encode_constructor(&self, args: &[Arg]) -> SdkResult<Vec<u8>> {
        let inputs = self.constructor.as_deref().unwrap_or_default();
        if args.len() != inputs.len() {
            return Err(SdkError::ArityMismatch {
                method: "constructor".into(),
                expected: inputs.len(),
                got: args.len(),
            });
        }
        let tokens = args
            .iter()
            .zip(inputs)
            .map(|(arg, param)| arg.coerce(&param.kind))
            .collect::<SdkResult<Vec<_>>>()?;
        super::encode::encode(&kinds(inputs), &tokens)
    }
}

// ==================== JSON ingress ====================

#[derive(Deserialize)]
#[serde(untagged)]
enum AbiJson {
    Entries(Vec<RawEntry>),
    Entrys { entrys: Vec<RawEntry> },
    Wrapped { abi: Vec<RawEntry> },
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct RawEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    name: String,
    inputs: Vec<RawParam>,
    outputs: Vec<RawParam>,
    state_mutability: Option<String>,
    constant: bool,
    payable: bool,
    anonymous: bool,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawParam {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    indexed: bool,
    components: Vec<RawParam>,
}

fn resolve_params(raw: &[RawParam]) -> SdkResult<Vec<Param>> {
    raw.iter()
        .map(|p| {
            Ok(Param {
                name: p.name.clone(),
                kind: resolve_type(p)?,
                indexed: p.indexed,
            })
        })
        .collect()
}

/// `tuple`, `tuple[]`, `tuple[2][]` take their shape from `components`
fn resolve_type(raw: &RawParam) -> SdkResult<ParamType> {
    let Some(suffix) = raw.kind.strip_prefix("tuple") else {
        return parse_type(&raw.kind);
    };
    if raw.components.is_empty() {
        return Err(SdkError::InvalidAbi(format!(
            "{}: tuple without components",
            raw.name
        )));
    }
    let members = raw
        .components
        .iter()
        .map(resolve_type)
        .collect::<SdkResult<Vec<_>>>()?;
    let tuple = ParamType::Tuple(members);
    if suffix.is_empty() {
        return Ok(tuple);
    }
    // reuse the array grammar with a placeholder element
    match parse_type(&format!("bool{}", suffix))? {
        array @ (ParamType::Array(_) | ParamType::FixedArray(..)) => {
            Ok(replace_element(array, tuple))
        }
        _ => Err(SdkError::UnsupportedType(raw.kind.clone())),
    }
}

fn replace_element(shape: ParamType, element: ParamType) -> ParamType {
    match shape {
        ParamType::Array(inner) => ParamType::Array(Box::new(replace_element(*inner, element))),
        ParamType::FixedArray(inner, size) => {
            ParamType::FixedArray(Box::new(replace_element(*inner, element)), size)
        }
        _ => element,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tron_primitives::{Address, U256};

    const ERC20_JSON: &str = r#"[
        {"type":"function","name":"balanceOf","inputs":[{"name":"who","type":"address"}],
         "outputs":[{"name":"","type":"uint256"}],"stateMutability":"view"},
        {"type":"function","name":"transfer","inputs":[{"name":"to","type":"address"},{"name":"value","type":"uint"}],
         "outputs":[{"name":"","type":"bool"}],"stateMutability":"nonpayable"},
        {"type":"event","name":"Transfer","anonymous":false,"inputs":[
            {"name":"from","type":"address","indexed":true},
            {"name":"to","type":"address","indexed":true},
            {"name":"value","type":"uint256","indexed":false}]},
        {"type":"constructor","inputs":[{"name":"supply","type":"uint256"}]}
    ]"#;

    #[test]
    fn test_json_array_ingress() {
        let abi = Abi::from_json(ERC20_JSON).unwrap();
        assert_eq!(abi.functions().len(), 2);
        assert_eq!(abi.events().len(), 1);
        assert_eq!(abi.constructor().map(<[Param]>::len), Some(1));

        let transfer = abi.function("transfer").unwrap();
        assert_eq!(transfer.signature(), "transfer(address,uint256)");
        assert_eq!(transfer.selector(), [0xa9, 0x05, 0x9c, 0xbb]);
        assert!(abi.function("balanceOf").unwrap().state_mutability.is_constant());
    }

    #[test]
    fn test_json_wrapped_ingress() {
        let entrys = format!(r#"{{"entrys": {}}}"#, ERC20_JSON);
        let wrapped = format!(r#"{{"abi": {}}}"#, ERC20_JSON);
        let a = Abi::from_json(ERC20_JSON).unwrap();
        assert_eq!(Abi::from_json(&entrys).unwrap(), a);
        assert_eq!(Abi::from_json(&wrapped).unwrap(), a);
    }

    #[test]
    fn test_node_style_capitalised_kinds() {
        let json = r#"{"entrys":[{"type":"Function","name":"get","outputs":[{"type":"uint256"}],"stateMutability":"View"}]}"#;
        let abi = Abi::from_json(json).unwrap();
        assert_eq!(abi.function("get").unwrap().state_mutability, StateMutability::View);
    }

    #[test]
    fn test_tuple_components() {
        let json = r#"[{"type":"function","name":"submit","inputs":[
            {"name":"orders","type":"tuple[]","components":[
                {"name":"maker","type":"address"},
                {"name":"amounts","type":"uint256[2]"}]}]}]"#;
        let abi = Abi::from_json(json).unwrap();
        assert_eq!(
            abi.function("submit").unwrap().signature(),
            "submit((address,uint256[2])[])"
        );
    }

    #[test]
    fn test_invalid_abi() {
        assert!(matches!(Abi::from_json("{"), Err(SdkError::InvalidAbi(_))));
        let bad_kind = r#"[{"type":"modifier","name":"x"}]"#;
        assert!(matches!(Abi::from_json(bad_kind), Err(SdkError::InvalidAbi(_))));
        let bad_type = r#"[{"type":"function","name":"x","inputs":[{"type":"fixed128x18"}]}]"#;
        assert!(matches!(Abi::from_json(bad_type), Err(SdkError::UnsupportedType(_))));
    }

    #[test]
    fn test_unknown_method_and_arity() {
        let abi = Abi::trc20();
        assert_eq!(
            abi.function("mint").unwrap_err(),
            SdkError::UnknownMethod("mint".into())
        );
        let err = abi.function("transfer").unwrap().encode_input(&[]).unwrap_err();
        assert_eq!(
            err,
            SdkError::ArityMismatch {
                method: "transfer(address,uint256)".into(),
                expected: 2,
                got: 0
            }
        );
    }

    #[test]
    fn test_overload_resolution() {
        let abi = Abi::new(
            vec![
                Function::new(
                    "safeTransfer",
                    vec![Param::new("to", ParamType::Address)],
                    vec![],
                    StateMutability::NonPayable,
                ),
                Function::new(
                    "safeTransfer",
                    vec![
                        Param::new("to", ParamType::Address),
                        Param::new("data", ParamType::Bytes),
                    ],
                    vec![],
                    StateMutability::NonPayable,
                ),
            ],
            vec![],
        );
        assert_eq!(abi.resolve("safeTransfer", 2).unwrap().inputs.len(), 2);
        assert_eq!(abi.resolve("safeTransfer", 1).unwrap().inputs.len(), 1);
        assert_eq!(
            abi.resolve("safeTransfer(address,bytes)", 0).unwrap().inputs.len(),
            2
        );
    }

    #[test]
    fn test_encode_args_coerces() {
        let abi = Abi::trc20();
        let transfer = abi.function("transfer").unwrap();
        let to = Address::from_evm_bytes([0x22; 20]);

        let typed = transfer
            .encode_input(&[Token::Address(to), Token::Uint(U256::from(1000))])
            .unwrap();
        let loose = transfer
            .encode_args(&[Arg::from(to.to_base58()), Arg::from("1000")])
            .unwrap();
        assert_eq!(typed, loose);
    }

    #[test]
    fn test_from_proto_skips_bare_tuples() {
        use tron_proto::{AbiEntry, AbiEntryType, AbiParam, StateMutabilityType};

        let entry = |name: &str, ty: &str| AbiEntry {
            name: name.into(),
            r#type: AbiEntryType::Function as i32,
            state_mutability: StateMutabilityType::View as i32,
            inputs: vec![AbiParam {
                name: "x".into(),
                r#type: ty.into(),
                indexed: false,
            }],
            ..Default::default()
        };
        let proto = tron_proto::Abi {
            entrys: vec![entry("ok", "uint256"), entry("skipped", "tuple")],
        };

        let abi = Abi::from_proto(&proto);
        assert_eq!(abi.functions().len(), 1);
        assert_eq!(abi.function("ok").unwrap().state_mutability, StateMutability::View);
    }

    #[test]
    fn test_proto_conversion_keeps_shape() {
        let abi = Abi::from_json(ERC20_JSON).unwrap();
        let back = Abi::from_proto(&abi.to_proto());
        assert_eq!(back, abi);
    }

    #[test]
    fn test_event_decode_declaration_order() {
        // value indexed in the middle of two data params
        let event = Event::new(
            "Mixed",
            vec![
                Param::new("a", ParamType::Uint(256)),
                Param::indexed("b", ParamType::Uint(256)),
                Param::new("c", ParamType::Bool),
            ],
            false,
        );
        let mut data = vec![0u8; 64];
        data[31] = 5;
        data[63] = 1;
        let mut b = [0u8; 32];
        b[31] = 9;
        let values = event
            .decode_log(&[event.topic(), H256::from_bytes(b)], &data)
            .unwrap();
        assert_eq!(
            values,
            vec![
                Token::Uint(U256::from(5)),
                Token::Uint(U256::from(9)),
                Token::Bool(true)
            ]
        );

        assert!(event.decode_log(&[event.topic()], &data).is_err());
    }
}
