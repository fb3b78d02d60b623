//! Naira display helpers.

const NAIRA: char = '₦';

/// Dashboard-card style: `₦3.5M`, `₦850K`, `₦420`.
pub fn format_naira_compact(amount: f64) -> String {
    if amount >= 1_000_000.0 {
        return format!("{NAIRA}{:.1}M", amount / 1_000_000.0);
    }
    if amount >= 1_000.0 {
        return format!("{NAIRA}{:.0}K", amount / 1_000.0);
    }
    format!("{NAIRA}{:.0}", amount)
}

/// Whole naira with thousands separators: `₦1,400,000`, `-₦72,000`.
pub fn format_naira(amount: f64) -> String {
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}{NAIRA}{grouped}")
}

/// One-decimal rendering where exact halfway values round away from zero
/// (`22.25` -> `22.3`), matching how the dashboard displayed percentages.
pub fn to_fixed_1(value: f64) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    if !is_exact_tenths_tie(value) {
        return format!("{value:.1}");
    }

    let tenths = (value.abs() * 10.0).ceil() as u64;
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{}.{}", tenths / 10, tenths % 10)
}

// True when |value| is exactly (2k+1)/20, i.e. value*20 is an odd integer.
fn is_exact_tenths_tie(value: f64) -> bool {
    let bits = value.abs().to_bits();
    let exp_bits = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1u64 << 52) - 1);
    if exp_bits == 0x7ff {
        return false;
    }
    let (mantissa, exp) = if exp_bits == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1u64 << 52), exp_bits - 1075)
    };
    // value = mantissa * 2^exp and value * 20 = mantissa * 5 * 2^(exp + 2).
    mantissa != 0 && -exp == 2 + mantissa.trailing_zeros() as i32
}
