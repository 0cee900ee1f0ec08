//! Decimal <-> base-unit conversion
//!
//! Human-facing amounts are [`Decimal`] values; on-chain amounts are integer
//! base units scaled by `10^decimals`. Conversion never rounds: an amount
//! carrying more significant fractional digits than the token allows is
//! rejected. Values read back from chain are [`TokenAmount`]s, which keep
//! the full 256-bit base-unit value and render it exactly.

use std::fmt;

use primitive_types::U256;
use rust_decimal::Decimal;

use crate::error::PrimitiveError;

/// Largest mantissa a [`Decimal`] can hold (2^96 - 1)
const MAX_MANTISSA: u128 = (1u128 << 96) - 1;

/// Largest scale a [`Decimal`] can hold
const MAX_SCALE: u32 = 28;

/// Number of significant fractional digits (trailing zeros ignored)
pub fn fractional_digits(amount: &Decimal) -> u32 {
    amount.normalize().scale()
}

/// Convert a decimal amount to base units
///
/// Fails if the amount is negative, has more than `decimals` significant
/// fractional digits, or does not fit in 256 bits.
pub fn to_base_units(amount: Decimal, decimals: u32) -> Result<U256, PrimitiveError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PrimitiveError::Amount(format!("negative amount: {}", amount)));
    }

    let normalized = amount.normalize();
    let scale = normalized.scale();
    if scale > decimals {
        return Err(PrimitiveError::Amount(format!(
            "too many decimal places: got {}, max {}",
            scale, decimals
        )));
    }

    let mantissa = U256::from(normalized.mantissa().unsigned_abs());
    let factor = pow10(decimals - scale)?;
    mantissa
        .checked_mul(factor)
        .ok_or_else(|| PrimitiveError::Amount(format!("{} overflows 256 bits", amount)))
}

/// Convert base units to a decimal amount
///
/// Places the decimal point `decimals` places from the right. Fails only
/// when the value cannot be represented by [`Decimal`] without rounding.
pub fn from_base_units(value: U256, decimals: u32) -> Result<Decimal, PrimitiveError> {
    let mut value = value;
    let mut scale = decimals;
    let ten = U256::from(10u8);

    // Trailing zeros are dropped until the value fits the decimal representation
    while (scale > MAX_SCALE || value > U256::from(MAX_MANTISSA))
        && scale > 0
        && (value % ten).is_zero()
    {
        value /= ten;
        scale -= 1;
    }

    if scale > MAX_SCALE || value > U256::from(MAX_MANTISSA) {
        return Err(PrimitiveError::Amount(format!(
            "{} base units with {} decimals is not representable",
            value, decimals
        )));
    }

    // value <= 2^96 - 1, so it fits an i128
    let mantissa = value.low_u128() as i128;
    Decimal::try_from_i128_with_scale(mantissa, scale)
        .map_err(|e| PrimitiveError::Amount(e.to_string()))
}

/// Render base units as a decimal string without going through [`Decimal`]
///
/// Works for any 256-bit value; trailing fractional zeros are trimmed.
pub fn format_units(value: U256, decimals: u32) -> String {
    let digits = value.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals - digits.len() + 1), digits)
    } else {
        digits
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// On-chain amount with its token's decimal places
///
/// Displays as an exact decimal string for every 256-bit value. Use
/// [`TokenAmount::to_decimal`] when the value is known to fit a [`Decimal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenAmount {
    raw: U256,
    decimals: u32,
}

impl TokenAmount {
    /// Wrap `raw` base units of a token with `decimals` places
    pub fn new(raw: U256, decimals: u32) -> Self {
        Self { raw, decimals }
    }

    /// Integer base units
    pub fn raw(&self) -> U256 {
        self.raw
    }

    /// Decimal places of the token
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Whether the amount is zero
    pub fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }

    /// Convert to a [`Decimal`]; fails when the value exceeds its 96-bit range
    pub fn to_decimal(&self) -> Result<Decimal, PrimitiveError> {
        from_base_units(self.raw, self.decimals)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.raw, self.decimals))
    }
}

fn pow10(exp: u32) -> Result<U256, PrimitiveError> {
    U256::from(10u8)
        .checked_pow(U256::from(exp))
        .ok_or_else(|| PrimitiveError::Amount(format!("10^{} overflows 256 bits", exp)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_to_base_units_basic() {
        assert_eq!(to_base_units(dec("123.456789"), 6).unwrap(), U256::from(123_456_789u64));
        assert_eq!(to_base_units(dec("1"), 6).unwrap(), U256::from(1_000_000u64));
        assert_eq!(to_base_units(dec("0"), 18).unwrap(), U256::zero());
        assert_eq!(
            to_base_units(dec("1.5"), 18).unwrap(),
            U256::from(1_500_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_from_base_units_basic() {
        assert_eq!(from_base_units(U256::from(123_456_789u64), 6).unwrap(), dec("123.456789"));
        assert_eq!(from_base_units(U256::zero(), 6).unwrap(), Decimal::ZERO);
        assert_eq!(from_base_units(U256::from(1000u64), 0).unwrap(), dec("1000"));
    }

    #[test]
    fn test_too_many_fraction_digits() {
        let err = to_base_units(dec("0.1234567"), 6).unwrap_err();
        assert!(matches!(err, PrimitiveError::Amount(_)));
    }

    #[test]
    fn test_trailing_zeros_not_significant() {
        assert_eq!(fractional_digits(&dec("1.500000000")), 1);
        assert_eq!(to_base_units(dec("1.500000000"), 6).unwrap(), U256::from(1_500_000u64));
    }

    #[test]
    fn test_negative_rejected() {
        assert!(to_base_units(dec("-1"), 6).is_err());
        // negative zero is still zero
        assert_eq!(to_base_units(dec("-0"), 6).unwrap(), U256::zero());
    }

    #[test]
    fn test_overflow_rejected() {
        let big = Decimal::MAX;
        assert!(to_base_units(big, 60).is_err());
        assert!(to_base_units(dec("1"), 100).is_err());
    }

    #[test]
    fn test_from_base_units_large_decimals() {
        // 1 whole unit of a 30-decimal token
        let one = U256::from(10u8).pow(U256::from(30u8));
        assert_eq!(from_base_units(one, 30).unwrap(), Decimal::ONE);
        // a value that cannot be reduced below scale 28
        assert!(from_base_units(U256::one(), 30).is_err());
    }

    #[test]
    fn test_from_base_units_too_wide() {
        assert!(from_base_units(U256::MAX, 0).is_err());
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(123_456_789u64), 6), "123.456789");
        assert_eq!(format_units(U256::from(1_000_000u64), 6), "1");
        assert_eq!(format_units(U256::from(5u64), 6), "0.000005");
        assert_eq!(format_units(U256::zero(), 6), "0");
        assert_eq!(format_units(U256::from(42u64), 0), "42");
    }

    #[test]
    fn test_token_amount_wider_than_decimal() {
        let raw = U256::from_dec_str("123456789012345678901234567891").unwrap();
        let amount = TokenAmount::new(raw, 18);

        assert_eq!(amount.to_string(), "123456789012.345678901234567891");
        assert_eq!(amount.raw(), raw);
        assert!(amount.to_decimal().is_err());
    }

    #[test]
    fn test_token_amount_full_range() {
        let amount = TokenAmount::new(U256::MAX, 77);
        assert_eq!(
            amount.to_string(),
            "1.15792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
        assert_eq!(TokenAmount::new(U256::MAX, 0).to_string(), U256::MAX.to_string());
    }

    #[test]
    fn test_token_amount_to_decimal() {
        let amount = TokenAmount::new(U256::from(1_500_000u64), 6);
        assert_eq!(amount.to_string(), "1.5");
        assert_eq!(amount.to_decimal().unwrap(), dec("1.5"));
        assert!(TokenAmount::new(U256::zero(), 6).is_zero());
    }
}
