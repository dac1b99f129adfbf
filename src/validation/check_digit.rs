//! Module-11 verifier for Chilean RUT numbers.

/// Computes the check digit ("DV") for a string of RUT digits.
///
/// Returns `None` when the input does not parse as an unsigned integer. The
/// result is always an ASCII digit or `'K'`.
pub fn compute_check_digit(rut: &str) -> Option<char> {
    let mut value: u64 = rut.parse().ok()?;
    let mut sum: u64 = 1;
    let mut position: u64 = 0;

    while value != 0 {
        let digit = value % 10;
        let weight = 9 - (position % 6);
        sum = (sum + digit * weight) % 11;
        position += 1;
        value /= 10;
    }

    if sum == 0 {
        Some('K')
    } else {
        // sum is in 1..=10, so this lands on '0'..='9'.
        Some(char::from(b'/' + sum as u8))
    }
}
