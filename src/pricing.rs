//! Chilean peso and RUT display formatting.

const THOUSANDS_SEPARATOR: char = '.';

/// Groups the digits of `amount` in threes, separated by dots.
pub fn format_thousands(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(THOUSANDS_SEPARATOR);
        }
        grouped.push(digit);
    }

    grouped
}

/// Formats a CLP amount for display, e.g. `$12.990`.
pub fn format_price(amount: u64) -> String {
    format!("${}", format_thousands(amount))
}

/// Renders a RUT with its check digit, e.g. `12.345.678-5`.
///
/// Returns `None` when `rut` is not a number.
pub fn format_rut(rut: &str, check_digit: char) -> Option<String> {
    let value: u64 = rut.parse().ok()?;
    Some(format!(
        "{}-{}",
        format_thousands(value),
        check_digit.to_ascii_uppercase()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1.000");
        assert_eq!(format_thousands(12990), "12.990");
        assert_eq!(format_thousands(1234567), "1.234.567");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(0), "$0");
        assert_eq!(format_price(12990), "$12.990");
        assert_eq!(format_price(159900), "$159.900");
    }

    #[test]
    fn test_format_rut() {
        assert_eq!(format_rut("12345678", '5').as_deref(), Some("12.345.678-5"));
        assert_eq!(format_rut("1000005", 'k').as_deref(), Some("1.000.005-K"));
        assert_eq!(format_rut("12a", '5'), None);
    }
}
