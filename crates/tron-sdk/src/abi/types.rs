//! ABI type definitions

use std::fmt;

use tron_primitives::{Address, H256, U256};

/// Contract ABI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// 21-byte network address (encoded as its 20-byte tail)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Signed integer (8-256 bits)
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Dynamic array
    Array(Vec<Token>),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Tuple (struct)
    Tuple(Vec<Token>),
}

/// Signed 256-bit integer as sign and magnitude
///
/// Zero is always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I256 {
    /// Absolute value
    pub abs: U256,
    /// Sign (true if negative)
    pub negative: bool,
}

impl I256 {
    /// Create a new I256; a negative zero is normalised
    pub fn new(abs: U256, negative: bool) -> Self {
        Self {
            abs,
            negative: negative && !abs.is_zero(),
        }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self::new(U256::from(value.unsigned_abs()), value < 0)
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    /// Whether the value fits a signed integer of `bits` width
    pub fn fits(&self, bits: usize) -> bool {
        if bits >= 256 {
            // |min| = 2^255
            let limit = U256::one() << 255;
            return if self.negative {
                self.abs <= limit
            } else {
                self.abs < limit
            };
        }
        let limit = U256::one() << (bits - 1);
        if self.negative {
            self.abs <= limit
        } else {
            self.abs < limit
        }
    }

    /// 32-byte two's complement encoding
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        self.abs.to_big_endian(&mut bytes);
        if self.negative {
            negate(&mut bytes);
        }
        bytes
    }

    /// Decode a 32-byte two's complement word
    pub fn from_be_bytes(word: &[u8; 32]) -> Self {
        let negative = word[0] & 0x80 != 0;
        let mut bytes = *word;
        if negative {
            negate(&mut bytes);
        }
        Self::new(U256::from_big_endian(&bytes), negative)
    }
}

/// In-place two's complement negation
fn negate(bytes: &mut [u8; 32]) {
    let mut carry = 1u16;
    for b in bytes.iter_mut().rev() {
        let sum = (!*b as u16) + carry;
        *b = sum as u8;
        carry = sum >> 8;
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

/// Contract ABI parameter type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Address
    Address,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Boolean
    Bool,
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// UTF-8 string
    String,
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(types) => types.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }

    /// Whether an indexed event parameter of this type is stored as a hash
    pub fn is_hashed_in_topic(&self) -> bool {
        matches!(
            self,
            ParamType::Bytes
                | ParamType::String
                | ParamType::Array(_)
                | ParamType::FixedArray(..)
                | ParamType::Tuple(_)
        )
    }

    /// Bytes this type occupies in the head of an enclosing tuple
    pub fn head_length(&self) -> usize {
        match self {
            ParamType::FixedArray(inner, size) if !self.is_dynamic() => {
                inner.head_length() * size
            }
            ParamType::Tuple(types) if !self.is_dynamic() => {
                types.iter().map(ParamType::head_length).sum()
            }
            _ => 32,
        }
    }
}

/// Canonical type name as used in signatures (`uint256`, `(address,bool)[]`)
impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::FixedBytes(size) => write!(f, "bytes{}", size),
            ParamType::String => write!(f, "string"),
            ParamType::Array(inner) => write!(f, "{}[]", inner),
            ParamType::FixedArray(inner, size) => write!(f, "{}[{}]", inner, size),
            ParamType::Tuple(types) => {
                write!(f, "(")?;
                for (i, t) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Token {
    /// Create a bytes32 token
    pub fn bytes32(data: H256) -> Self {
        Token::FixedBytes(data.as_bytes().to_vec())
    }

    /// Human-readable value
    ///
    /// Integers in decimal, booleans as `true`/`false`, byte strings as
    /// lowercase hex without `0x`, addresses as base58check. Arrays render
    /// as `[a,b]` and tuples as `(a,b)`.
    pub fn render(&self) -> String {
        match self {
            Token::Address(addr) => addr.to_base58(),
            Token::Uint(v) => v.to_string(),
            Token::Int(v) => v.to_string(),
            Token::Bool(b) => b.to_string(),
            Token::Bytes(b) | Token::FixedBytes(b) => hex::encode(b),
            Token::String(s) => s.clone(),
            Token::Array(items) | Token::FixedArray(items) => {
                format!("[{}]", render_list(items))
            }
            Token::Tuple(items) => format!("({})", render_list(items)),
        }
    }

    /// Short description of the value's shape, for error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Address(_) => "address".into(),
            Token::Uint(_) => "uint".into(),
            Token::Int(_) => "int".into(),
            Token::Bool(_) => "bool".into(),
            Token::Bytes(_) => "bytes".into(),
            Token::FixedBytes(b) => format!("bytes{}", b.len()),
            Token::String(_) => "string".into(),
            Token::Array(items) => format!("array of {}", items.len()),
            Token::FixedArray(items) => format!("fixed array of {}", items.len()),
            Token::Tuple(items) => format!("tuple of {}", items.len()),
        }
    }

    /// Unsigned integer value, if this is one
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Token::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Address value, if this is one
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Token::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// Boolean value, if this is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Token::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String value, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }
}

fn render_list(items: &[Token]) -> String {
    items
        .iter()
        .map(Token::render)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_is_dynamic() {
        assert!(!ParamType::Address.is_dynamic());
        assert!(!ParamType::FixedBytes(32).is_dynamic());
        assert!(!ParamType::FixedArray(Box::new(ParamType::Uint(8)), 3).is_dynamic());

        assert!(ParamType::String.is_dynamic());
        assert!(ParamType::FixedArray(Box::new(ParamType::String), 2).is_dynamic());
        assert!(ParamType::Tuple(vec![ParamType::Bool, ParamType::Bytes]).is_dynamic());
    }

    #[test]
    fn test_head_length_of_static_composites() {
        let arr = ParamType::FixedArray(Box::new(ParamType::Uint(256)), 3);
        assert_eq!(arr.head_length(), 96);
        let tuple = ParamType::Tuple(vec![ParamType::Address, arr]);
        assert_eq!(tuple.head_length(), 128);
        assert_eq!(ParamType::Array(Box::new(ParamType::Bool)).head_length(), 32);
    }

    #[test]
    fn test_canonical_names() {
        let t = ParamType::Array(Box::new(ParamType::Tuple(vec![
            ParamType::Address,
            ParamType::FixedArray(Box::new(ParamType::Uint(256)), 2),
        ])));
        assert_eq!(t.to_string(), "(address,uint256[2])[]");
    }

    #[test]
    fn test_i256_two_complement() {
        let minus_one = I256::from_i128(-1);
        assert_eq!(minus_one.to_be_bytes(), [0xff; 32]);
        assert_eq!(I256::from_be_bytes(&[0xff; 32]), minus_one);
        assert_eq!(minus_one.to_string(), "-1");

        let zero = I256::new(U256::zero(), true);
        assert!(!zero.negative);
        assert_eq!(zero.to_be_bytes(), [0; 32]);
    }

    #[test]
    fn test_i256_fits() {
        assert!(I256::from_i128(127).fits(8));
        assert!(!I256::from_i128(128).fits(8));
        assert!(I256::from_i128(-128).fits(8));
        assert!(!I256::from_i128(-129).fits(8));
        assert!(I256::new(U256::one() << 255, true).fits(256));
        assert!(!I256::new(U256::one() << 255, false).fits(256));
    }

    #[test]
    fn test_render() {
        let addr = Address::from_base58("TWRvzd6FQcsyp7hwCtttjZGpU1kfvVEtNK").unwrap();
        let tuple = Token::Tuple(vec![
            Token::Address(addr),
            Token::Uint(U256::from(1000)),
            Token::Bool(true),
            Token::Bytes(vec![0xde, 0xad]),
            Token::Array(vec![Token::Int(I256::from_i128(-5))]),
        ]);
        assert_eq!(
            tuple.render(),
            "(TWRvzd6FQcsyp7hwCtttjZGpU1kfvVEtNK,1000,true,dead,[-5])"
        );
    }
}
