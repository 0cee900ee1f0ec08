//! ABI decoding

use tron_primitives::{Address, H256, U256};

use super::encode::function_selector;
use super::types::{ParamType, Token, I256};
use crate::error::{SdkError, SdkResult};

/// Array lengths beyond this are treated as corrupt input
const MAX_ARRAY_LEN: usize = 1 << 16;

/// Decode a tuple of `types` from `data`
pub fn decode(types: &[ParamType], data: &[u8]) -> SdkResult<Vec<Token>> {
    Decoder::new(data).params(types, 0)
}

/// Input words one decode may read, per word of input
const READS_PER_WORD: usize = 2;

/// Reader over one payload that meters every word it reads
///
/// Canonical encodings read each word once. Offsets that alias the same
/// region are allowed until the meter runs out, which keeps decoding linear
/// in the input size.
struct Decoder<'a> {
    data: &'a [u8],
    budget: usize,
}

impl<'a> Decoder<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            budget: (data.len() / 32 + 1) * READS_PER_WORD,
        }
    }

    fn charge(&mut self, words: usize) -> SdkResult<()> {
        self.budget = self.budget.checked_sub(words).ok_or_else(|| {
            SdkError::DecodeInvalid(format!(
                "aliased offsets exceed the read budget for {} bytes",
                self.data.len()
            ))
        })?;
        Ok(())
    }

    /// Decode a tuple whose heads start at `base`; offsets are relative to `base`
    fn params(&mut self, types: &[ParamType], base: usize) -> SdkResult<Vec<Token>> {
        let mut tokens = Vec::with_capacity(types.len());
        let mut head = base;

        for param_type in types {
            let token = if param_type.is_dynamic() {
                let offset = self.read_usize(head)?;
                let at = base
                    .checked_add(offset)
                    .filter(|at| *at <= self.data.len())
                    .ok_or_else(|| {
                        SdkError::DecodeInvalid(format!("offset {} out of range", offset))
                    })?;
                self.value(param_type, at)?
            } else {
                self.value(param_type, head)?
            };
            tokens.push(token);
            head += param_type.head_length();
        }

        Ok(tokens)
    }

    /// Decode one value whose encoding starts at `at`
    fn value(&mut self, param_type: &ParamType, at: usize) -> SdkResult<Token> {
        match param_type {
            ParamType::Address => {
                let word = self.read_word(at)?;
                let mut tail = [0u8; 20];
                tail.copy_from_slice(&word[12..]);
                Ok(Token::Address(Address::from_evm_bytes(tail)))
            }
            ParamType::Uint(bits) => {
                let value = U256::from_big_endian(&self.read_word(at)?);
                if value.bits() > *bits {
                    return Err(SdkError::DecodeInvalid(format!(
                        "value {} exceeds uint{}",
                        value, bits
                    )));
                }
                Ok(Token::Uint(value))
            }
            ParamType::Int(_) => Ok(Token::Int(I256::from_be_bytes(&self.read_word(at)?))),
            ParamType::Bool => {
                let word = self.read_word(at)?;
                if word[..31].iter().any(|b| *b != 0) || word[31] > 1 {
                    return Err(SdkError::DecodeInvalid(format!(
                        "invalid bool 0x{}",
                        hex::encode(word)
                    )));
                }
                Ok(Token::Bool(word[31] == 1))
            }
            ParamType::FixedBytes(size) => {
                let word = self.read_word(at)?;
                Ok(Token::FixedBytes(word[..*size].to_vec()))
            }
            ParamType::Bytes => Ok(Token::Bytes(self.read_dynamic_bytes(at)?)),
            ParamType::String => {
                let bytes = self.read_dynamic_bytes(at)?;
                String::from_utf8(bytes)
                    .map(Token::String)
                    .map_err(|_| SdkError::DecodeInvalid("string is not valid UTF-8".into()))
            }
            ParamType::Array(inner) => {
                let len = self.read_usize(at)?;
                let remaining = self.data.len().saturating_sub(at + 32);
                // every element needs at least one head word after the length
                let needed = len.saturating_mul(inner.head_length().max(32));
                if len > MAX_ARRAY_LEN || needed > remaining {
                    return Err(SdkError::DecodeInvalid(format!(
                        "array length {} does not fit in {} bytes",
                        len, remaining
                    )));
                }
                let types = vec![(**inner).clone(); len];
                self.params(&types, at + 32).map(Token::Array)
            }
            ParamType::FixedArray(inner, size) => {
                let types = vec![(**inner).clone(); *size];
                self.params(&types, at).map(Token::FixedArray)
            }
            ParamType::Tuple(types) => self.params(types, at).map(Token::Tuple),
        }
    }

    fn read_word(&mut self, at: usize) -> SdkResult<[u8; 32]> {
        let data = self.data;
        let end = at.checked_add(32).ok_or(SdkError::DecodeShort {
            need: usize::MAX,
            have: data.len(),
        })?;
        let slice = data.get(at..end).ok_or(SdkError::DecodeShort {
            need: end,
            have: data.len(),
        })?;
        self.charge(1)?;
        let mut word = [0u8; 32];
        word.copy_from_slice(slice);
        Ok(word)
    }

    fn read_usize(&mut self, at: usize) -> SdkResult<usize> {
        let value = U256::from_big_endian(&self.read_word(at)?);
        if value.bits() > 32 {
            return Err(SdkError::DecodeInvalid(format!(
                "length or offset {} too large",
                value
            )));
        }
        Ok(value.as_usize())
    }

    fn read_dynamic_bytes(&mut self, at: usize) -> SdkResult<Vec<u8>> {
        let len = self.read_usize(at)?;
        let start = at + 32;
        let end = start + len;
        let data = self.data;
        let bytes = data.get(start..end).ok_or(SdkError::DecodeShort {
            need: end,
            have: data.len(),
        })?;
        self.charge(len.div_ceil(32))?;
        Ok(bytes.to_vec())
    }
}

/// Decode an indexed event parameter from its topic word
///
/// Reference types are stored as the keccak256 of their encoding and come
/// back as the raw 32-byte hash.
pub fn decode_indexed(param_type: &ParamType, topic: &H256) -> SdkResult<Token> {
    if param_type.is_hashed_in_topic() {
        return Ok(Token::bytes32(*topic));
    }
    Decoder::new(topic.as_bytes()).value(param_type, 0)
}

/// Human-readable revert reason from a revert payload
///
/// `Error(string)` yields its message and `Panic(uint256)` its code; other
/// payloads give `None`.
pub fn decode_revert(data: &[u8]) -> Option<String> {
    if data.len() < 4 {
        return None;
    }
    let (selector, body) = data.split_at(4);
    if selector == function_selector("Error(string)") {
        return decode(&[ParamType::String], body)
            .ok()
            .and_then(|mut t| t.pop())
            .and_then(|t| match t {
                Token::String(s) => Some(s),
                _ => None,
            });
    }
    if selector == function_selector("Panic(uint256)") {
        return decode(&[ParamType::Uint(256)], body)
            .ok()
            .and_then(|t| t.first().and_then(Token::as_uint))
            .map(|code| format!("panic code 0x{:x}", code));
    }
    None
}
