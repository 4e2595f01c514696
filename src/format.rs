/// `$1.23B` style money with the given number of decimals; `N/A` when absent.
pub fn compact_usd(value: Option<f64>, digits: usize) -> String {
    let Some(v) = value else {
        return "N/A".to_string();
    };
    let sign = if v < 0.0 { "-" } else { "" };
    let abs = v.abs();
    if abs >= 1e9 {
        format!("{}${:.*}B", sign, digits, abs / 1e9)
    } else if abs >= 1e6 {
        format!("{}${:.*}M", sign, digits, abs / 1e6)
    } else if abs >= 1e3 {
        format!("{}${:.*}K", sign, digits, abs / 1e3)
    } else {
        format!("{}${:.*}", sign, digits, abs)
    }
}

/// Spot price with more precision for sub-dollar assets.
pub fn price_usd(value: f64) -> String {
    if value.abs() >= 1.0 {
        format!("${}", group_thousands(&format!("{:.2}", value)))
    } else {
        format!("${:.6}", value)
    }
}

pub fn percent_change(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:+.2}%", v),
        None => "—".to_string(),
    }
}

fn group_thousands(fixed: &str) -> String {
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
