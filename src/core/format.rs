//! Display formatting for currency, counts and percentages (en-US style).

pub fn format_currency(value: f64) -> String {
    let rounded = finite_or_zero(value).round();
    let digits = group_thousands(&format!("{:.0}", rounded.abs()));
    if rounded < 0.0 {
        format!("-${digits}")
    } else {
        format!("${digits}")
    }
}

pub fn format_number(value: f64, decimals: usize) -> String {
    signed_grouped(finite_or_zero(value), decimals)
}

/// Formats a fraction as a percentage, e.g. `0.0303` -> `3.0%` with one decimal.
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    format!(
        "{}%",
        signed_grouped(finite_or_zero(fraction) * 100.0, decimals)
    )
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

fn signed_grouped(value: f64, decimals: usize) -> String {
    let fixed = round_half_away(value.abs(), decimals);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + 4);
    let is_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    if value < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Rounds the shortest decimal rendering of a non-negative value, half away
/// from zero, so `4.35` becomes `4.4` rather than following the binary value.
fn round_half_away(value: f64, decimals: usize) -> String {
    let shortest = format!("{value}");
    let (int_part, frac_part) = shortest
        .split_once('.')
        .unwrap_or((shortest.as_str(), ""));

    if frac_part.len() <= decimals {
        let mut out = String::from(int_part);
        if decimals > 0 {
            out.push('.');
            out.push_str(frac_part);
            out.push_str(&"0".repeat(decimals - frac_part.len()));
        }
        return out;
    }

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(decimals))
        .collect();
    if frac_part.as_bytes()[decimals] >= b'5' {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - decimals;
    let mut out: String = digits[..split].iter().map(|&b| char::from(b)).collect();
    if decimals > 0 {
        out.push('.');
        out.extend(digits[split..].iter().map(|&b| char::from(b)));
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
