//! Unit conversions and display helpers.

/// Wei per gwei.
pub const GWEI: u128 = 1_000_000_000;

pub fn gwei_to_wei(gwei: u64) -> u128 {
    u128::from(gwei) * GWEI
}

/// Render a credit amount, e.g. `1 ton CO₂` or `50 tons CO₂`.
pub fn format_tons(amount: u32) -> String {
    if amount == 1 {
        "1 ton CO₂".to_string()
    } else {
        format!("{amount} tons CO₂")
    }
}
