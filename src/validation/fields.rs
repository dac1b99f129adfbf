use std::sync::LazyLock;

use regex::Regex;

use super::{FieldError, ValidationResult, compute_check_digit, is_blank};

const EMAIL_MIN_LENGTH: usize = 8;
const PHONE_LENGTH: usize = 9;
const RUT_LENGTH: std::ops::RangeInclusive<usize> = 7..=8;
const PASSWORD_MIN_LENGTH: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9+._%\-]{1,256}@[a-zA-Z0-9][a-zA-Z0-9\-]{0,64}(\.[a-zA-Z0-9][a-zA-Z0-9\-]{0,25})+$",
    )
    .expect("email pattern is valid")
});

static LATIN_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{Latin} ]+$").expect("letters pattern is valid"));

pub fn validate_email(email: &str) -> ValidationResult {
    if is_blank(email) {
        return Some(FieldError::Required);
    }
    let len = email.chars().count();
    if len < EMAIL_MIN_LENGTH {
        tracing::debug!(length = len, "Email validation failed: too short");
        return Some(FieldError::EmailTooShort);
    }
    if !EMAIL_PATTERN.is_match(email) {
        tracing::debug!("Email validation failed: does not match address grammar");
        return Some(FieldError::EmailInvalidFormat);
    }
    None
}

pub fn validate_name_letters_only(name: &str) -> ValidationResult {
    if is_blank(name) {
        return Some(FieldError::Required);
    }
    letters_only(name)
}

/// Surname is optional, so an empty value passes.
pub fn validate_surname(surname: &str) -> ValidationResult {
    if surname.is_empty() {
        return None;
    }
    letters_only(surname)
}

fn letters_only(value: &str) -> ValidationResult {
    if LATIN_LETTERS.is_match(value) {
        None
    } else {
        tracing::debug!("Name validation failed: contains characters outside Latin letters");
        Some(FieldError::LettersOnly)
    }
}

pub fn validate_phone_digits_only(phone: &str) -> ValidationResult {
    if is_blank(phone) {
        return Some(FieldError::Required);
    }
    if !all_digits(phone) {
        return Some(FieldError::DigitsOnly);
    }
    if phone.len() != PHONE_LENGTH {
        tracing::debug!(length = phone.len(), "Phone validation failed: wrong length");
        return Some(FieldError::PhoneLength);
    }
    None
}

pub fn validate_rut(rut: &str) -> ValidationResult {
    if is_blank(rut) {
        return Some(FieldError::Required);
    }
    if !all_digits(rut) {
        return Some(FieldError::DigitsOnly);
    }
    if !RUT_LENGTH.contains(&rut.len()) {
        tracing::debug!(length = rut.len(), "RUT validation failed: wrong length");
        return Some(FieldError::RutLength);
    }
    None
}

/// Validates the check digit against its RUT.
///
/// While the RUT itself is invalid the comparison is deferred and the check
/// digit is reported as valid, so only the RUT field carries an error.
pub fn validate_check_digit(check_digit: &str, rut: &str) -> ValidationResult {
    if is_blank(check_digit) {
        return Some(FieldError::Required);
    }

    let mut chars = check_digit.chars();
    let (Some(supplied), None) = (chars.next(), chars.next()) else {
        return Some(FieldError::CheckDigitLength);
    };
    if !(supplied.is_ascii_digit() || supplied.eq_ignore_ascii_case(&'k')) {
        return Some(FieldError::CheckDigitCharacter);
    }

    if validate_rut(rut).is_some() {
        return None;
    }

    match compute_check_digit(rut) {
        Some(expected) if expected.eq_ignore_ascii_case(&supplied) => None,
        expected => {
            tracing::debug!(
                computable = expected.is_some(),
                "Check digit validation failed: mismatch"
            );
            Some(FieldError::CheckDigitMismatch)
        }
    }
}

/// First failing rule wins, in the order: blank, length, uppercase, digit,
/// symbol, spaces.
pub fn validate_strong_password(password: &str) -> ValidationResult {
    if is_blank(password) {
        return Some(FieldError::Required);
    }
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Some(FieldError::PasswordTooShort);
    }
    if !password.chars().any(char::is_uppercase) {
        return Some(FieldError::PasswordMissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Some(FieldError::PasswordMissingDigit);
    }
    if password.chars().all(char::is_alphanumeric) {
        return Some(FieldError::PasswordMissingSymbol);
    }
    if password.contains(' ') {
        return Some(FieldError::PasswordContainsSpace);
    }
    None
}

pub fn validate_confirmation(password: &str, confirmation: &str) -> ValidationResult {
    if is_blank(confirmation) {
        return Some(FieldError::ConfirmationRequired);
    }
    if password != confirmation {
        return Some(FieldError::PasswordMismatch);
    }
    None
}

fn all_digits(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_rules() {
        assert_eq!(validate_email(""), Some(FieldError::Required));
        assert_eq!(validate_email("   "), Some(FieldError::Required));
        assert_eq!(validate_email("a@b.cl"), Some(FieldError::EmailTooShort));
        assert_eq!(
            validate_email("no-at-sign.cl"),
            Some(FieldError::EmailInvalidFormat)
        );
        assert_eq!(
            validate_email("user@domain"),
            Some(FieldError::EmailInvalidFormat)
        );
        assert_eq!(validate_email("test@duoc.cl"), None);
        assert_eq!(validate_email("first.last+tag@mail.example.com"), None);
    }

    #[test]
    fn test_name_accepts_spanish_letters() {
        assert_eq!(validate_name_letters_only("José Ñúñez"), None);
        assert_eq!(validate_name_letters_only("María José"), None);
        assert_eq!(validate_name_letters_only(""), Some(FieldError::Required));
        assert_eq!(
            validate_name_letters_only("R2D2"),
            Some(FieldError::LettersOnly)
        );
        assert_eq!(
            validate_name_letters_only("Ana-María"),
            Some(FieldError::LettersOnly)
        );
    }

    #[test]
    fn test_surname_is_optional() {
        assert_eq!(validate_surname(""), None);
        assert_eq!(validate_surname("Pérez"), None);
        assert_eq!(validate_surname("Pérez 3"), Some(FieldError::LettersOnly));
    }

    #[test]
    fn test_phone_rules() {
        assert_eq!(validate_phone_digits_only(""), Some(FieldError::Required));
        assert_eq!(
            validate_phone_digits_only("+56912345678"),
            Some(FieldError::DigitsOnly)
        );
        assert_eq!(
            validate_phone_digits_only("91234567"),
            Some(FieldError::PhoneLength)
        );
        assert_eq!(validate_phone_digits_only("912345678"), None);
    }

    #[test]
    fn test_rut_rules() {
        assert_eq!(validate_rut(""), Some(FieldError::Required));
        assert_eq!(validate_rut("12.345.678"), Some(FieldError::DigitsOnly));
        assert_eq!(validate_rut("123456"), Some(FieldError::RutLength));
        assert_eq!(validate_rut("123456789"), Some(FieldError::RutLength));
        assert_eq!(validate_rut("1234567"), None);
        assert_eq!(validate_rut("12345678"), None);
    }

    #[test]
    fn test_check_digit_rules() {
        assert_eq!(
            validate_check_digit("", "12345678"),
            Some(FieldError::Required)
        );
        assert_eq!(
            validate_check_digit("55", "12345678"),
            Some(FieldError::CheckDigitLength)
        );
        assert_eq!(
            validate_check_digit("x", "12345678"),
            Some(FieldError::CheckDigitCharacter)
        );
        assert_eq!(
            validate_check_digit("4", "12345678"),
            Some(FieldError::CheckDigitMismatch)
        );
        assert_eq!(validate_check_digit("5", "12345678"), None);
        assert_eq!(validate_check_digit("k", "1000005"), None);
        assert_eq!(validate_check_digit("K", "1000005"), None);
    }

    #[test]
    fn test_check_digit_deferred_while_rut_invalid() {
        assert_eq!(validate_check_digit("4", "123"), None);
        assert_eq!(validate_check_digit("4", ""), None);
        // Format errors are still reported.
        assert_eq!(
            validate_check_digit("x", "123"),
            Some(FieldError::CheckDigitCharacter)
        );
    }

    #[test]
    fn test_password_rule_order() {
        assert_eq!(validate_strong_password(""), Some(FieldError::Required));
        assert_eq!(
            validate_strong_password("Ab1!"),
            Some(FieldError::PasswordTooShort)
        );
        assert_eq!(
            validate_strong_password("clave123!"),
            Some(FieldError::PasswordMissingUppercase)
        );
        assert_eq!(
            validate_strong_password("ClaveSegura!"),
            Some(FieldError::PasswordMissingDigit)
        );
        assert_eq!(
            validate_strong_password("ClaveSegura1"),
            Some(FieldError::PasswordMissingSymbol)
        );
        assert_eq!(
            validate_strong_password("Clave Segura1"),
            Some(FieldError::PasswordContainsSpace)
        );
        assert_eq!(validate_strong_password("ClaveSegura1!"), None);
    }

    #[test]
    fn test_confirmation_rules() {
        assert_eq!(
            validate_confirmation("ClaveSegura1!", ""),
            Some(FieldError::ConfirmationRequired)
        );
        assert_eq!(
            validate_confirmation("ClaveSegura1!", "ClaveSegura2!"),
            Some(FieldError::PasswordMismatch)
        );
        assert_eq!(validate_confirmation("ClaveSegura1!", "ClaveSegura1!"), None);
    }
}

#[cfg(test)]
mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
        #[test]
        fn rut_accepts_seven_or_eight_digits(rut in "[0-9]{7,8}") {
            prop_assert_eq!(validate_rut(&rut), None);
        }

        #[test]
        fn rut_rejects_other_lengths(rut in "[0-9]{1,6}|[0-9]{9,12}") {
            prop_assert!(validate_rut(&rut).is_some());
        }

        #[test]
        fn rut_rejects_non_digits(prefix in "[0-9]{0,4}", bad in "[^0-9]", suffix in "[0-9]{0,4}") {
            let rut = format!("{prefix}{bad}{suffix}");
            prop_assert!(validate_rut(&rut).is_some());
        }

        #[test]
        fn check_digit_is_case_insensitive(rut in "[0-9]{7,8}", dv in "[0-9kK]") {
            prop_assert_eq!(
                validate_check_digit(&dv, &rut),
                validate_check_digit(&dv.to_uppercase(), &rut)
            );
        }

        #[test]
        fn computed_check_digit_validates(rut in "[0-9]{7,8}") {
            let dv = compute_check_digit(&rut).expect("digit strings are computable");
            prop_assert_eq!(validate_check_digit(&dv.to_string(), &rut), None);
        }
    }
}
