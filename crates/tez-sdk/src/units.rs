//! Conversion between raw token amounts and human-readable decimals

use num_bigint::BigUint;
use num_traits::Zero;

use crate::SdkError;

/// Render `raw / 10^decimals` exactly, trimming trailing fractional zeros
pub fn format_units(raw: &BigUint, decimals: u32) -> String {
    let digits = raw.to_string();
    if decimals == 0 {
        return digits;
    }

    let scale = decimals as usize;
    let padded = if digits.len() <= scale {
        format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
    } else {
        digits
    };

    let (whole, fraction) = padded.split_at(padded.len() - scale);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

/// Parse a decimal string into raw units
pub fn parse_units(human: &str, decimals: u32) -> Result<BigUint, SdkError> {
    let human = human.trim();
    let (whole, fraction) = human.split_once('.').unwrap_or((human, ""));

    if whole.is_empty() && fraction.is_empty() {
        return Err(SdkError::InvalidAmount(format!("'{}' has no digits", human)));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(SdkError::InvalidAmount(format!("'{}' is not a decimal number", human)));
    }
    if fraction.len() > decimals as usize {
        return Err(SdkError::InvalidAmount(format!(
            "'{}' has more than {} fractional digits",
            human, decimals
        )));
    }

    let digits = format!("{}{:0<width$}", whole, fraction, width = decimals as usize);
    if digits.is_empty() {
        return Ok(BigUint::zero());
    }
    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| SdkError::InvalidAmount(format!("'{}' is not a decimal number", human)))
}
