// src/blockchain/amount.rs

use ethers::types::U256;

use crate::error::IntentError;

/// Convert a human decimal string into integer base units.
///
/// `"5"` with 6 decimals is `5_000_000`; `"0.000001"` is `1`. No floating
/// point is involved at any step and nothing is rounded: more fractional
/// digits than `decimals` is an error.
pub fn parse_amount(s: &str, decimals: u8) -> Result<U256, IntentError> {
    let trimmed = s.trim();

    let mut parts = trimmed.split('.');
    let whole = parts.next().unwrap_or("");
    let frac = parts.next().unwrap_or("");
    if parts.next().is_some() {
        return Err(IntentError::invalid_amount(s, "more than one decimal point"));
    }
    if whole.is_empty() && frac.is_empty() {
        return Err(IntentError::invalid_amount(s, "no digits"));
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(IntentError::invalid_amount(s, "only ASCII digits and one '.' are allowed"));
    }
    if frac.len() > usize::from(decimals) {
        return Err(IntentError::invalid_amount(
            s,
            format!(
                "{} fractional digits exceed token precision of {}",
                frac.len(),
                decimals
            ),
        ));
    }

    let overflow = || IntentError::invalid_amount(s, "amount does not fit in 256 bits");

    let scale = U256::from(10u8)
        .checked_pow(U256::from(decimals))
        .ok_or_else(overflow)?;
    let whole_units = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| overflow())?
    };
    let padded = format!("{:0<width$}", frac, width = usize::from(decimals));
    let frac_units = if padded.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(&padded).map_err(|_| overflow())?
    };

    whole_units
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac_units))
        .ok_or_else(overflow)
}

/// Narrow base units to the 64-bit magnitude the Solana aggregator expects.
pub fn to_u64_units(amount: U256, original: &str) -> Result<u64, IntentError> {
    if amount > U256::from(u64::MAX) {
        return Err(IntentError::invalid_amount(original, "amount exceeds 64-bit range"));
    }
    Ok(amount.as_u64())
}

/// Render base units back as a decimal string with `decimals` precision,
/// trailing zeros trimmed.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let digits = amount.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return digits;
    }
    let padded = format!("{:0>width$}", digits, width = decimals + 1);
    let (whole, frac) = padded.split_at(padded.len() - decimals);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac)
    }
}
