/// en-US currency with no cents: `$1,234,568`, `-$5,000`. Halves round away
/// from zero.
pub fn currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "-".to_string();
    }
    let rounded = amount.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(rounded.abs()))
}

/// A fraction rendered as a percentage with two decimals: `0.0675` -> `6.75%`.
pub fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Shortest plain rendering of a user-entered number: `1` or `2.5`.
pub fn plain_number(value: f64) -> String {
    format!("{value}")
}

fn group_thousands(whole: f64) -> String {
    let digits = format!("{whole:.0}");
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_rounds_to_whole_dollars_with_grouping() {
        assert_eq!(currency(0.0), "$0");
        assert_eq!(currency(999.4), "$999");
        assert_eq!(currency(999.5), "$1,000");
        assert_eq!(currency(75_000.0), "$75,000");
        assert_eq!(currency(1_234_567.89), "$1,234,568");
        assert_eq!(currency(-5_000.2), "-$5,000");
        assert_eq!(currency(-0.4), "$0");
        assert_eq!(currency(f64::NAN), "-");
    }

    #[test]
    fn percent_uses_two_decimals() {
        assert_eq!(percent(0.0675), "6.75%");
        assert_eq!(percent(0.04), "4.00%");
        assert_eq!(percent(0.0), "0.00%");
        assert_eq!(percent(-0.015), "-1.50%");
    }

    #[test]
    fn plain_number_drops_trailing_zeroes() {
        assert_eq!(plain_number(1.0), "1");
        assert_eq!(plain_number(2.5), "2.5");
    }
}
