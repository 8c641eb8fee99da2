use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::models::FieldName;
use crate::utils::{is_blank, parse_decimal};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles")
});

static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9][0-9 \-]*[0-9]$").expect("phone pattern compiles"));

/// Blank check. Returns the message to show next to `field`, if any.
pub fn validate_required(
    field: FieldName,
    value: &str,
) -> Option<String> {
    is_blank(value).then(|| format!("{} is required", field.label()))
}

pub fn validate_email(
    field: FieldName,
    value: &str,
) -> Option<String> {
    (!EMAIL.is_match(value.trim()))
        .then(|| format!("{} must be a valid email address", field.label()))
}

/// 7 to 15 digits, optionally prefixed with `+`, spaces and dashes allowed
/// between digits.
pub fn validate_phone(
    field: FieldName,
    value: &str,
) -> Option<String> {
    let value = value.trim();
    let digits = value.chars().filter(char::is_ascii_digit).count();
    let ok = PHONE.is_match(value) && (7..=15).contains(&digits);
    (!ok).then(|| format!("{} must be a valid phone number", field.label()))
}

/// Non-negative amount; grouping commas are accepted.
pub fn validate_amount(
    field: FieldName,
    value: &str,
) -> Option<String> {
    match parse_decimal(value) {
        Ok(amount) if amount >= Decimal::ZERO => None,
        _ => Some(format!("{} must be a non-negative amount", field.label())),
    }
}

pub fn validate_age(
    field: FieldName,
    value: &str,
) -> Option<String> {
    match value.trim().parse::<u8>() {
        Ok(age) if (1..=120).contains(&age) => None,
        _ => Some(format!(
            "{} must be a whole number between 1 and 120",
            field.label()
        )),
    }
}

/// Format check for fields whose label implies a shape.
///
/// Blank values always pass; whether a field may be blank is the
/// required-field check's concern.
pub fn validate_format(
    field: FieldName,
    value: &str,
) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    match field {
        FieldName::FatherEmail | FieldName::MotherEmail => validate_email(field, value),
        FieldName::FatherPhone | FieldName::MotherPhone => validate_phone(field, value),
        FieldName::FatherIncome | FieldName::MotherIncome | FieldName::SchoolBudget => {
            validate_amount(field, value)
        }
        FieldName::FatherAge | FieldName::MotherAge => validate_age(field, value),
        _ => None,
    }
}
