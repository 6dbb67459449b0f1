//! Canonical normalization of raw attribute codes.
//!
//! Accident exports store the weather and lighting codes inconsistently:
//! sometimes as JSON numbers, sometimes as strings, and sometimes as
//! float-formatted strings such as `"11.0"` left over from spreadsheet
//! round-trips. Every category lookup goes through [`normalize_code`] so
//! that all of these compare equal.

/// A raw attribute value as it appears in a source record.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCode {
    /// Field absent or `null`.
    Missing,
    /// Numeric JSON value.
    Number(f64),
    /// Any textual value, including numeric strings and sentinels like `"nan"`.
    Text(String),
}

impl From<&str> for RawCode {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawCode {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RawCode {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for RawCode {
    #[allow(clippy::cast_precision_loss)]
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl<T: Into<Self>> From<Option<T>> for RawCode {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Into::into)
    }
}

/// Normalizes a raw code to its canonical integer string.
///
/// Text is parsed by its leading integer: surrounding whitespace and an
/// optional sign are accepted, and parsing stops at the first non-digit,
/// so `"11.0"` and `" 11 "` both become `"11"`. Numbers are truncated
/// toward zero. Anything without a leading integer (`"nan"`, `"none"`,
/// `""`, missing) normalizes to the empty string, as does an integer
/// outside the `i64` range.
#[must_use]
pub fn normalize_code(raw: &RawCode) -> String {
    match raw {
        RawCode::Missing => String::new(),
        RawCode::Number(n) => normalize_number(*n),
        RawCode::Text(s) => normalize_text(s),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn normalize_number(n: f64) -> String {
    if !n.is_finite() {
        return String::new();
    }
    let truncated = n.trunc();
    if truncated.abs() < i64::MAX as f64 {
        // `-0.0` becomes `0`
        (truncated as i64).to_string()
    } else {
        String::new()
    }
}

fn normalize_text(s: &str) -> String {
    let trimmed = s.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return String::new();
    }

    let digits = &rest[..digits_len];
    let value = if negative {
        format!("-{digits}").parse::<i64>()
    } else {
        digits.parse::<i64>()
    };
    value.map_or_else(|_| String::new(), |v| v.to_string())
}
