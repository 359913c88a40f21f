//! Reading literal text as a typed value.

use std::cmp::Ordering;

use hql_core::{ValueType, VocabularyLookup};
use time::{Date, Month};

use super::ScalarValue;

/// Coerces `text` to `value_type`, resolving references through
/// `vocabulary`. Returns `None` when the text is not a valid value.
pub(super) fn coerce<V>(value_type: &ValueType, text: &str, vocabulary: &V) -> Option<ScalarValue>
where
    V: VocabularyLookup + ?Sized,
{
    match value_type {
        ValueType::String => Some(ScalarValue::Text(text.to_owned())),
        ValueType::Integer | ValueType::Range => text.parse().ok().map(ScalarValue::Integer),
        ValueType::Size => parse_size(text).map(ScalarValue::Integer),
        ValueType::Date => parse_date(text).map(ScalarValue::Date),
        ValueType::Boolean => parse_boolean(text).map(ScalarValue::Boolean),
        ValueType::Enum(values) => values
            .iter()
            .find(|known| known.to_lowercase() == text.to_lowercase())
            .map(|known| ScalarValue::Enum(known.clone())),
        ValueType::Reference(kind) => Some(ScalarValue::Reference(vocabulary.resolve(*kind, text))),
    }
}

/// Describes the values a type accepts, for error messages.
pub(super) fn expectation(value_type: &ValueType) -> String {
    match value_type {
        ValueType::String => String::from("text"),
        ValueType::Integer | ValueType::Range => String::from("an integer"),
        ValueType::Size => String::from("a size such as 512KB"),
        ValueType::Date => String::from("a date as YYYY-MM-DD"),
        ValueType::Boolean => String::from("true or false"),
        ValueType::Enum(values) => format!("one of {}", values.join(", ")),
        ValueType::Reference(kind) => format!("a {kind} name"),
    }
}

/// Orders two bounds of the same ordered type.
pub(super) fn compare(lower: &ScalarValue, upper: &ScalarValue) -> Option<Ordering> {
    match (lower, upper) {
        (ScalarValue::Integer(left), ScalarValue::Integer(right)) => Some(left.cmp(right)),
        (ScalarValue::Date(left), ScalarValue::Date(right)) => Some(left.cmp(right)),
        _ => None,
    }
}

/// Parses a byte size: a decimal number with an optional 1024-based unit.
fn parse_size(text: &str) -> Option<i64> {
    let split = text
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(text.len());
    let (number, unit) = text.split_at_checked(split)?;
    let multiplier = unit_multiplier(unit)?;
    let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() {
        return None;
    }
    let bytes = whole.parse::<i64>().ok()?.checked_mul(multiplier)?;
    if fraction.is_empty() {
        return Some(bytes);
    }
    let scale = 10_i64.checked_pow(u32::try_from(fraction.len()).ok()?)?;
    let part = fraction
        .parse::<i64>()
        .ok()?
        .checked_mul(multiplier)?
        .checked_div(scale)?;
    bytes.checked_add(part)
}

fn unit_multiplier(unit: &str) -> Option<i64> {
    let exponent = match unit.to_ascii_uppercase().as_str() {
        "" | "B" => 0,
        "K" | "KB" => 1,
        "M" | "MB" => 2,
        "G" | "GB" => 3,
        "T" | "TB" => 4,
        _ => return None,
    };
    1024_i64.checked_pow(exponent)
}

fn parse_date(text: &str) -> Option<Date> {
    let mut parts = text.splitn(3, '-');
    let year = parts.next()?.parse::<i32>().ok()?;
    let month_number = parts.next()?.parse::<u8>().ok()?;
    let day = parts.next()?.parse::<u8>().ok()?;
    let month = Month::try_from(month_number).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

fn parse_boolean(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
