use crate::error::ProcessingError;

/// Decimals between wei and ether
pub const WEI_DECIMALS: u32 = 18;

/// Parse a JSON-RPC hex quantity ("0x1bc16d674ec80000") into an integer amount
pub fn parse_quantity(quantity: &str) -> Result<u128, ProcessingError> {
    let digits = quantity.strip_prefix("0x").unwrap_or(quantity);
    if digits.is_empty() {
        return Err(ProcessingError::AmountParsing(format!("Empty quantity '{}'", quantity)));
    }

    u128::from_str_radix(digits, 16)
        .map_err(|e| ProcessingError::AmountParsing(format!("Failed to parse quantity '{}': {}", quantity, e)))
}

/// Render an amount in the smallest unit as a decimal string in the display unit.
///
/// Trailing zeros of the fraction are dropped but one digit is always kept,
/// so one ether renders as `1.0` and one wei as `0.000000000000000001`.
pub fn format_units(value: u128, decimals: u32) -> String {
    if decimals == 0 {
        return format!("{}.0", value);
    }

    // Past 10^38 every u128 is below the base
    let (whole, fraction) = match 10u128.checked_pow(decimals) {
        Some(base) => (value / base, value % base),
        None => (0, value),
    };

    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    let fraction = fraction.trim_end_matches('0');

    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}

pub fn format_ether(wei: u128) -> String {
    format_units(wei, WEI_DECIMALS)
}
