//! Display helpers for balances, addresses and counters.

/// Chain balances are fixed-point integers with 18 decimals
pub const DECIMALS: u32 = 18;
pub const UNIT: u128 = 10u128.pow(DECIMALS);

/// Number of fractional digits kept by [`format_balance`]
const MAX_FRACTION_DIGITS: usize = 4;

/// Format a raw balance as a decimal string. Trailing zeros are trimmed
/// from the full 18-digit fraction first, then at most four fractional
/// digits are kept, so dust still shows as `0.0000`.
///
/// `0` stays `0`, `10^18` becomes `1`, `1.5 * 10^18` becomes `1.5`.
pub fn format_balance(raw: u128) -> String {
    let whole = raw / UNIT;
    let frac = raw % UNIT;
    if frac == 0 {
        return whole.to_string();
    }

    let frac = format!("{:018}", frac);
    let frac = frac.trim_end_matches('0');
    format!("{whole}.{}", &frac[..frac.len().min(MAX_FRACTION_DIGITS)])
}

/// Compact balance for stat cards: `K` / `M` suffixes with one decimal
/// above a thousand units, plain value (two decimals max) below.
pub fn format_balance_short(raw: u128) -> String {
    if raw == 0 {
        return "0".to_string();
    }

    // hundredths of a unit, truncated
    let cents = raw / (UNIT / 100);
    let num = cents as f64 / 100.0;

    if num >= 1_000_000.0 {
        format!("{:.1}M", num / 1_000_000.0)
    } else if num >= 1_000.0 {
        format!("{:.1}K", num / 1_000.0)
    } else {
        num.to_string()
    }
}

/// Shorten a long address to `head...tail`
pub fn short_addr(addr: &str) -> String {
    if addr.is_empty() {
        return "-".to_string();
    }
    let chars: Vec<char> = addr.chars().collect();
    if chars.len() > 16 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 6..].iter().collect();
        format!("{head}...{tail}")
    } else {
        addr.to_string()
    }
}

/// Format a counter with thousands separators (1234567 -> 1,234,567)
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn hex0x(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}
