//! Loosely-typed call arguments
//!
//! [`Arg`] lets callers pass native integers, decimal strings, base58 or hex
//! addresses and hex byte strings; [`Arg::coerce`] converts against the
//! declared parameter type.

use tron_primitives::{Address, U256};

use super::types::{ParamType, Token, I256};
use crate::error::{SdkError, SdkResult};

/// Call argument before type coercion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Native signed integer
    Int(i128),
    /// Big unsigned integer
    Uint(U256),
    /// Text: decimal/`0x` integer, `true`/`false`, address, hex bytes, or string
    Str(String),
    /// Boolean
    Bool(bool),
    /// 21-byte address
    Address(Address),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Array elements
    Array(Vec<Arg>),
    /// Tuple members
    Tuple(Vec<Arg>),
    /// Already-typed token, passed through after a type check
    Token(Token),
}

macro_rules! arg_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Arg {
            fn from(value: $t) -> Self {
                Arg::Int(i128::from(value))
            }
        })*
    };
}

arg_from_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl From<U256> for Arg {
    fn from(value: U256) -> Self {
        Arg::Uint(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Str(value)
    }
}

impl From<Address> for Arg {
    fn from(value: Address) -> Self {
        Arg::Address(value)
    }
}

impl From<Vec<u8>> for Arg {
    fn from(value: Vec<u8>) -> Self {
        Arg::Bytes(value)
    }
}

impl From<Token> for Arg {
    fn from(value: Token) -> Self {
        Arg::Token(value)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(items: Vec<Arg>) -> Self {
        Arg::Array(items)
    }
}

impl Arg {
    /// Convert to a token of `kind`
    pub fn coerce(&self, kind: &ParamType) -> SdkResult<Token> {
        match (kind, self) {
            (_, Arg::Token(token)) => check_token(kind, token),

            (ParamType::Uint(bits), _) => {
                let value = self.to_uint(kind)?;
                if *bits < 256 && value.bits() > *bits {
                    return Err(overflow(kind, value));
                }
                Ok(Token::Uint(value))
            }
            (ParamType::Int(bits), _) => {
                let value = self.to_int(kind)?;
                if !value.fits(*bits) {
                    return Err(overflow(kind, value));
                }
                Ok(Token::Int(value))
            }
            (ParamType::Bool, Arg::Bool(b)) => Ok(Token::Bool(*b)),
            (ParamType::Bool, Arg::Str(s)) => match s.as_str() {
                "true" => Ok(Token::Bool(true)),
                "false" => Ok(Token::Bool(false)),
                _ => Err(self.mismatch(kind)),
            },
            (ParamType::Address, Arg::Address(a)) => Ok(Token::Address(*a)),
            (ParamType::Address, Arg::Str(s)) => s
                .parse::<Address>()
                .map(Token::Address)
                .map_err(|e| SdkError::InvalidAddress(format!("{}: {}", s, e))),
            (ParamType::Address, Arg::Bytes(b)) => Address::from_slice(b)
                .map(Token::Address)
                .map_err(|e| SdkError::InvalidAddress(e.to_string())),
            (ParamType::String, Arg::Str(s)) => Ok(Token::String(s.clone())),
            (ParamType::Bytes, _) => Ok(Token::Bytes(self.to_bytes(kind)?)),
            (ParamType::FixedBytes(size), _) => {
                let bytes = self.to_bytes(kind)?;
                if bytes.len() > *size {
                    return Err(overflow(kind, format!("0x{}", hex::encode(&bytes))));
                }
                Ok(Token::FixedBytes(bytes))
            }
            (ParamType::Array(inner), Arg::Array(items)) => items
                .iter()
                .map(|item| item.coerce(inner))
                .collect::<SdkResult<Vec<_>>>()
                .map(Token::Array),
            (ParamType::FixedArray(inner, size), Arg::Array(items)) => {
                if items.len() != *size {
                    return Err(self.mismatch(kind));
                }
                items
                    .iter()
                    .map(|item| item.coerce(inner))
                    .collect::<SdkResult<Vec<_>>>()
                    .map(Token::FixedArray)
            }
            (ParamType::Tuple(types), Arg::Tuple(items)) => {
                if items.len() != types.len() {
                    return Err(self.mismatch(kind));
                }
                items
                    .iter()
                    .zip(types)
                    .map(|(item, t)| item.coerce(t))
                    .collect::<SdkResult<Vec<_>>>()
                    .map(Token::Tuple)
            }
            _ => Err(self.mismatch(kind)),
        }
    }

    fn describe(&self) -> String {
        match self {
            Arg::Int(v) => format!("integer {}", v),
            Arg::Uint(v) => format!("integer {}", v),
            Arg::Str(s) => format!("string '{}'", s),
            Arg::Bool(b) => format!("bool {}", b),
            Arg::Address(_) => "address".into(),
            Arg::Bytes(b) => format!("{} bytes", b.len()),
            Arg::Array(items) => format!("array of {}", items.len()),
            Arg::Tuple(items) => format!("tuple of {}", items.len()),
            Arg::Token(t) => t.describe(),
        }
    }

    fn mismatch(&self, kind: &ParamType) -> SdkError {
        SdkError::TypeMismatch {
            expected: kind.to_string(),
            got: self.describe(),
        }
    }

    fn to_uint(&self, kind: &ParamType) -> SdkResult<U256> {
        match self {
            Arg::Uint(v) => Ok(*v),
            Arg::Int(v) if *v >= 0 => Ok(U256::from(v.unsigned_abs())),
            Arg::Int(v) => Err(overflow(kind, v)),
            Arg::Str(s) => parse_uint(s).ok_or_else(|| self.mismatch(kind)),
            _ => Err(self.mismatch(kind)),
        }
    }

    fn to_int(&self, kind: &ParamType) -> SdkResult<I256> {
        match self {
            Arg::Int(v) => Ok(I256::from_i128(*v)),
            Arg::Uint(v) => Ok(I256::new(*v, false)),
            Arg::Str(s) => {
                let (negative, digits) = match s.strip_prefix('-') {
                    Some(rest) => (true, rest),
                    None => (false, s.as_str()),
                };
                parse_uint(digits)
                    .map(|abs| I256::new(abs, negative))
                    .ok_or_else(|| self.mismatch(kind))
            }
            _ => Err(self.mismatch(kind)),
        }
    }

    fn to_bytes(&self, kind: &ParamType) -> SdkResult<Vec<u8>> {
        match self {
            Arg::Bytes(b) => Ok(b.clone()),
            Arg::Str(s) => {
                let digits = s.strip_prefix("0x").unwrap_or(s);
                hex::decode(digits).map_err(|_| self.mismatch(kind))
            }
            _ => Err(self.mismatch(kind)),
        }
    }
}

/// Decimal or `0x`-prefixed hex
fn parse_uint(s: &str) -> Option<U256> {
    if s.is_empty() {
        return None;
    }
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if !hex.is_empty() => U256::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None => U256::from_dec_str(s).ok(),
    }
}

fn overflow(kind: &ParamType, value: impl ToString) -> SdkError {
    SdkError::EncodeOverflow {
        kind: kind.to_string(),
        value: value.to_string(),
    }
}

/// Pre-typed tokens only pass if their shape matches
fn check_token(kind: &ParamType, token: &Token) -> SdkResult<Token> {
    let ok = match (kind, token) {
        (ParamType::Address, Token::Address(_))
        | (ParamType::Uint(_), Token::Uint(_))
        | (ParamType::Int(_), Token::Int(_))
        | (ParamType::Bool, Token::Bool(_))
        | (ParamType::Bytes, Token::Bytes(_))
        | (ParamType::FixedBytes(_), Token::FixedBytes(_))
        | (ParamType::String, Token::String(_))
        | (ParamType::Array(_), Token::Array(_))
        | (ParamType::FixedArray(..), Token::FixedArray(_))
        | (ParamType::Tuple(_), Token::Tuple(_)) => true,
        _ => false,
    };
    if !ok {
        return Err(SdkError::TypeMismatch {
            expected: kind.to_string(),
            got: token.describe(),
        });
    }
    Ok(token.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_inputs() {
        let kind = ParamType::Uint(256);
        let expected = Token::Uint(U256::from(1000));
        assert_eq!(Arg::from(1000u64).coerce(&kind).unwrap(), expected);
        assert_eq!(Arg::from(U256::from(1000)).coerce(&kind).unwrap(), expected);
        assert_eq!(Arg::from("1000").coerce(&kind).unwrap(), expected);
        assert_eq!(Arg::from("0x3e8").coerce(&kind).unwrap(), expected);
    }

    #[test]
    fn test_integer_bounds() {
        assert!(matches!(
            Arg::from(-1).coerce(&ParamType::Uint(256)),
            Err(SdkError::EncodeOverflow { .. })
        ));
        assert!(matches!(
            Arg::from(300).coerce(&ParamType::Uint(8)),
            Err(SdkError::EncodeOverflow { .. })
        ));
        assert_eq!(
            Arg::from("-128").coerce(&ParamType::Int(8)).unwrap(),
            Token::Int(I256::from_i128(-128))
        );
        assert!(Arg::from("-129").coerce(&ParamType::Int(8)).is_err());
        assert!(matches!(
            Arg::from("12abc").coerce(&ParamType::Uint(256)),
            Err(SdkError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_bool_inputs() {
        assert_eq!(Arg::from(true).coerce(&ParamType::Bool).unwrap(), Token::Bool(true));
        assert_eq!(Arg::from("false").coerce(&ParamType::Bool).unwrap(), Token::Bool(false));
        assert!(Arg::from("yes").coerce(&ParamType::Bool).is_err());
    }

    #[test]
    fn test_address_inputs() {
        let base58 = "TWRvzd6FQcsyp7hwCtttjZGpU1kfvVEtNK";
        let hex = "41e070625db515d06890ef7a8a2d3d672c2d4274e8";
        let addr: Address = base58.parse().unwrap();

        let expected = Token::Address(addr);
        assert_eq!(Arg::from(base58).coerce(&ParamType::Address).unwrap(), expected);
        assert_eq!(Arg::from(hex).coerce(&ParamType::Address).unwrap(), expected);
        assert_eq!(Arg::from(addr).coerce(&ParamType::Address).unwrap(), expected);
        assert!(matches!(
            Arg::from("Tnope").coerce(&ParamType::Address),
            Err(SdkError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_bytes_inputs() {
        assert_eq!(
            Arg::from("0xdead").coerce(&ParamType::Bytes).unwrap(),
            Token::Bytes(vec![0xde, 0xad])
        );
        assert_eq!(
            Arg::from(vec![1u8, 2]).coerce(&ParamType::FixedBytes(4)).unwrap(),
            Token::FixedBytes(vec![1, 2])
        );
        assert!(Arg::from("0x010203").coerce(&ParamType::FixedBytes(2)).is_err());
    }

    #[test]
    fn test_composite_inputs() {
        let kind = ParamType::Array(Box::new(ParamType::Uint(256)));
        let arg = Arg::from(vec![Arg::from(1u64), Arg::from("2")]);
        assert_eq!(
            arg.coerce(&kind).unwrap(),
            Token::Array(vec![Token::Uint(U256::one()), Token::Uint(U256::from(2))])
        );

        let tuple = ParamType::Tuple(vec![ParamType::Bool, ParamType::String]);
        let arg = Arg::Tuple(vec![Arg::from(true), Arg::from("x")]);
        assert_eq!(
            arg.coerce(&tuple).unwrap(),
            Token::Tuple(vec![Token::Bool(true), Token::String("x".into())])
        );
    }

    #[test]
    fn test_token_passthrough_checked() {
        let token = Token::Uint(U256::from(5));
        assert_eq!(Arg::from(token.clone()).coerce(&ParamType::Uint(256)).unwrap(), token);
        assert!(Arg::from(token).coerce(&ParamType::Bool).is_err());
    }
}
