//! ABI encoding

use tron_crypto::keccak256;
use tron_primitives::{H256, U256};

use super::types::{ParamType, Token};
use crate::error::{SdkError, SdkResult};

/// Encode a token tuple against its declared types
///
/// Every token is checked against its type; integers outside the declared
/// width fail with `EncodeOverflow` instead of being truncated.
pub fn encode(types: &[ParamType], tokens: &[Token]) -> SdkResult<Vec<u8>> {
    if types.len() != tokens.len() {
        return Err(SdkError::TypeMismatch {
            expected: format!("{} values", types.len()),
            got: format!("{} values", tokens.len()),
        });
    }
    let mut out = Vec::new();
    encode_params(types, tokens, &mut out)?;
    Ok(out)
}

/// Encode a function call: selector followed by the argument tuple
pub fn encode_function_call(
    selector: [u8; 4],
    types: &[ParamType],
    tokens: &[Token],
) -> SdkResult<Vec<u8>> {
    let mut result = selector.to_vec();
    result.extend(encode(types, tokens)?);
    Ok(result)
}

/// Head/tail encoding of a tuple
fn encode_params(types: &[ParamType], tokens: &[Token], out: &mut Vec<u8>) -> SdkResult<()> {
    let head_size: usize = types.iter().map(ParamType::head_length).sum();

    let mut head = Vec::with_capacity(head_size);
    let mut tail = Vec::new();

    for (param_type, token) in types.iter().zip(tokens) {
        if param_type.is_dynamic() {
            let offset = head_size + tail.len();
            head.extend_from_slice(&u256_word(&U256::from(offset)));
            encode_token(param_type, token, &mut tail)?;
        } else {
            encode_token(param_type, token, &mut head)?;
        }
    }

    out.extend(head);
    out.extend(tail);
    Ok(())
}

fn mismatch(param_type: &ParamType, token: &Token) -> SdkError {
    SdkError::TypeMismatch {
        expected: param_type.to_string(),
        got: token.describe(),
    }
}

fn overflow(param_type: &ParamType, value: impl ToString) -> SdkError {
    SdkError::EncodeOverflow {
        kind: param_type.to_string(),
        value: value.to_string(),
    }
}

/// Encode a single token
fn encode_token(param_type: &ParamType, token: &Token, out: &mut Vec<u8>) -> SdkResult<()> {
    match (param_type, token) {
        (ParamType::Address, Token::Address(addr)) => {
            // the network prefix byte is dropped
            let mut word = [0u8; 32];
            word[12..].copy_from_slice(&addr.evm_bytes());
            out.extend_from_slice(&word);
        }
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if *bits < 256 && value.bits() > *bits {
                return Err(overflow(param_type, value));
            }
            out.extend_from_slice(&u256_word(value));
        }
        (ParamType::Int(bits), Token::Int(value)) => {
            if !value.fits(*bits) {
                return Err(overflow(param_type, value));
            }
            out.extend_from_slice(&value.to_be_bytes());
        }
        (ParamType::Bool, Token::Bool(b)) => {
            let mut word = [0u8; 32];
            word[31] = u8::from(*b);
            out.extend_from_slice(&word);
        }
        (ParamType::FixedBytes(size), Token::FixedBytes(data) | Token::Bytes(data)) => {
            if data.len() > *size {
                return Err(overflow(param_type, format!("0x{}", hex::encode(data))));
            }
            let mut word = [0u8; 32];
            word[..data.len()].copy_from_slice(data);
            out.extend_from_slice(&word);
        }
        (ParamType::Bytes, Token::Bytes(data) | Token::FixedBytes(data)) => {
            encode_bytes(data, out);
        }
        (ParamType::String, Token::String(s)) => {
            encode_bytes(s.as_bytes(), out);
        }
        (ParamType::Array(inner), Token::Array(items)) => {
            out.extend_from_slice(&u256_word(&U256::from(items.len())));
            let inner_types = vec![(**inner).clone(); items.len()];
            encode_params(&inner_types, items, out)?;
        }
        (ParamType::FixedArray(inner, size), Token::FixedArray(items) | Token::Array(items)) => {
            if items.len() != *size {
                return Err(mismatch(param_type, token));
            }
            let inner_types = vec![(**inner).clone(); *size];
            encode_params(&inner_types, items, out)?;
        }
        (ParamType::Tuple(types), Token::Tuple(items)) => {
            if items.len() != types.len() {
                return Err(mismatch(param_type, token));
            }
            encode_params(types, items, out)?;
        }
        _ => return Err(mismatch(param_type, token)),
    }
    Ok(())
}

/// Convert U256 to a 32-byte big-endian word
pub(crate) fn u256_word(value: &U256) -> [u8; 32] {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes
}

/// Length word followed by the content, right-padded to 32 bytes
fn encode_bytes(data: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&u256_word(&U256::from(data.len())));
    out.extend_from_slice(data);
    let padded_len = data.len().div_ceil(32) * 32;
    out.resize(out.len() + padded_len - data.len(), 0);
}

/// Function selector: first 4 bytes of keccak256(signature)
pub fn function_selector(signature: &str) -> [u8; 4] {
    keccak256(signature.as_bytes()).selector()
}

/// Event topic: full keccak256(signature)
pub fn event_topic(signature: &str) -> H256 {
    keccak256(signature.as_bytes())
}

/// Parse a type string (`uint256`, `address[]`, `bytes32[4]`, `(uint8,bool)`)
///
/// `uint`/`int` mean 256 bits. A bare `tuple` needs its components and is
/// resolved by the interface loader instead.
pub fn parse_type(s: &str) -> SdkResult<ParamType> {
    let s = s.trim();

    if let Some(prefix) = s.strip_suffix(']') {
        let open = prefix
            .rfind('[')
            .ok_or_else(|| SdkError::UnsupportedType(s.to_string()))?;
        let inner = parse_type(&prefix[..open])?;
        let size = &prefix[open + 1..];
        if size.is_empty() {
            return Ok(ParamType::Array(Box::new(inner)));
        }
        let size: usize = size
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| SdkError::UnsupportedType(s.to_string()))?;
        return Ok(ParamType::FixedArray(Box::new(inner), size));
    }

    if let Some(body) = s.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
        let types = split_top_level(body)
            .into_iter()
            .map(parse_type)
            .collect::<SdkResult<Vec<_>>>()?;
        return Ok(ParamType::Tuple(types));
    }

    match s {
        "address" => return Ok(ParamType::Address),
        "bool" => return Ok(ParamType::Bool),
        "string" => return Ok(ParamType::String),
        "bytes" => return Ok(ParamType::Bytes),
        // trcToken ids are plain integers on the wire
        "trcToken" => return Ok(ParamType::Uint(256)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("uint") {
        return int_width(s, rest).map(ParamType::Uint);
    }
    if let Some(rest) = s.strip_prefix("int") {
        return int_width(s, rest).map(ParamType::Int);
    }
    if let Some(rest) = s.strip_prefix("bytes") {
        let size: usize = rest
            .parse()
            .ok()
            .filter(|n| (1..=32).contains(n))
            .ok_or_else(|| SdkError::UnsupportedType(s.to_string()))?;
        return Ok(ParamType::FixedBytes(size));
    }

    Err(SdkError::UnsupportedType(s.to_string()))
}

fn int_width(full: &str, rest: &str) -> SdkResult<usize> {
    if rest.is_empty() {
        return Ok(256);
    }
    rest.parse()
        .ok()
        .filter(|bits| *bits >= 8 && *bits <= 256 && bits % 8 == 0)
        .ok_or_else(|| SdkError::UnsupportedType(full.to_string()))
}

/// Split `a,(b,c),d` on commas outside parentheses
fn split_top_level(body: &str) -> Vec<&str> {
    if body.trim().is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::types::I256;
    use tron_primitives::Address;

    fn tail_of(addr: &Address) -> [u8; 20] {
        addr.evm_bytes()
    }

    #[test]
    fn test_encode_address_drops_prefix() {
        let addr = Address::from_base58("TWRvzd6FQcsyp7hwCtttjZGpU1kfvVEtNK").unwrap();
        let encoded = encode(&[ParamType::Address], &[Token::Address(addr)]).unwrap();

        assert_eq!(encoded.len(), 32);
        assert_eq!(&encoded[..12], &[0u8; 12]);
        assert_eq!(&encoded[12..], &tail_of(&addr));
    }

    #[test]
    fn test_encode_dynamic_bytes() {
        let data = vec![0x01, 0x02, 0x03];
        let encoded = encode(&[ParamType::Bytes], &[Token::Bytes(data.clone())]).unwrap();

        assert_eq!(encoded.len(), 96);
        assert_eq!(encoded[31], 32);
        assert_eq!(encoded[63], 3);
        assert_eq!(&encoded[64..67], &data[..]);
    }

    #[test]
    fn test_encode_nested_dynamic_offsets() {
        // f(string[]) with ["a", "bc"]
        let types = [ParamType::Array(Box::new(ParamType::String))];
        let tokens = [Token::Array(vec![
            Token::String("a".into()),
            Token::String("bc".into()),
        ])];
        let encoded = encode(&types, &tokens).unwrap();

        let word = |i: usize| U256::from_big_endian(&encoded[i * 32..(i + 1) * 32]);
        assert_eq!(word(0), U256::from(32)); // offset of the array
        assert_eq!(word(1), U256::from(2)); // length
        assert_eq!(word(2), U256::from(64)); // "a" relative to the element heads
        assert_eq!(word(3), U256::from(128)); // "bc"
        assert_eq!(word(4), U256::from(1));
        assert_eq!(encoded[5 * 32], b'a');
        assert_eq!(word(6), U256::from(2));
        assert_eq!(encoded.len(), 8 * 32);
    }

    #[test]
    fn test_encode_overflow() {
        let err = encode(&[ParamType::Uint(8)], &[Token::Uint(U256::from(256))]).unwrap_err();
        assert!(matches!(err, SdkError::EncodeOverflow { .. }));

        let err = encode(&[ParamType::Int(16)], &[Token::Int(I256::from_i128(-40_000))]).unwrap_err();
        assert!(matches!(err, SdkError::EncodeOverflow { .. }));

        let err = encode(&[ParamType::FixedBytes(2)], &[Token::FixedBytes(vec![1, 2, 3])]).unwrap_err();
        assert!(matches!(err, SdkError::EncodeOverflow { .. }));

        assert!(encode(&[ParamType::Uint(8)], &[Token::Uint(U256::from(255))]).is_ok());
    }

    #[test]
    fn test_encode_type_mismatch() {
        let err = encode(&[ParamType::Bool], &[Token::Uint(U256::one())]).unwrap_err();
        assert_eq!(
            err,
            SdkError::TypeMismatch {
                expected: "bool".into(),
                got: "uint".into()
            }
        );
        let fixed = ParamType::FixedArray(Box::new(ParamType::Bool), 2);
        assert!(encode(&[fixed], &[Token::FixedArray(vec![Token::Bool(true)])]).is_err());
    }

    #[test]
    fn test_encode_negative_int() {
        let encoded = encode(&[ParamType::Int(256)], &[Token::Int(I256::from_i128(-2))]).unwrap();
        let mut expected = [0xffu8; 32];
        expected[31] = 0xfe;
        assert_eq!(encoded, expected);
    }

    #[test]
    fn test_selectors_and_topics() {
        assert_eq!(function_selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(function_selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(
            event_topic("Transfer(address,address,uint256)").to_hex(),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn test_encode_function_call() {
        let to = Address::from_evm_bytes([0x11; 20]);
        let selector = function_selector("transfer(address,uint256)");
        let encoded = encode_function_call(
            selector,
            &[ParamType::Address, ParamType::Uint(256)],
            &[Token::Address(to), Token::Uint(U256::from(1000))],
        )
        .unwrap();

        assert_eq!(encoded.len(), 68);
        assert_eq!(&encoded[..4], &selector);
    }

    #[test]
    fn test_parse_type() {
        assert_eq!(parse_type("address").unwrap(), ParamType::Address);
        assert_eq!(parse_type("uint").unwrap(), ParamType::Uint(256));
        assert_eq!(parse_type("int8").unwrap(), ParamType::Int(8));
        assert_eq!(parse_type("bytes32").unwrap(), ParamType::FixedBytes(32));
        assert_eq!(parse_type("trcToken").unwrap(), ParamType::Uint(256));
        assert_eq!(
            parse_type("uint256[]").unwrap(),
            ParamType::Array(Box::new(ParamType::Uint(256)))
        );
        assert_eq!(
            parse_type("address[3][]").unwrap(),
            ParamType::Array(Box::new(ParamType::FixedArray(Box::new(ParamType::Address), 3)))
        );
        assert_eq!(
            parse_type("(uint8,(bool,string))").unwrap(),
            ParamType::Tuple(vec![
                ParamType::Uint(8),
                ParamType::Tuple(vec![ParamType::Bool, ParamType::String]),
            ])
        );
    }

    #[test]
    fn test_parse_type_rejects() {
        for bad in ["uint7", "uint512", "bytes0", "bytes33", "fixed128x18", "tuple", "int[0]"] {
            assert!(
                matches!(parse_type(bad), Err(SdkError::UnsupportedType(_))),
                "accepted {}",
                bad
            );
        }
    }
}
