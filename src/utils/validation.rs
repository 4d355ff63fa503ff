//! Validation utilities
//!
//! Parse-with-default helpers for the loosely typed form and query fields,
//! plus the custom validators used by the vehicle models.
//!
//! Defaulting rules, per field kind:
//! - counts (`year`, `km`, `page`, `limit`): integer text; a finite
//!   non-negative decimal is truncated; anything else falls back to the default.
//! - amounts (`price`): any finite decimal; anything else is `0.0`, which the
//!   `price > 0` rule then rejects.
//! - text: a blank value counts as "not supplied".

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    static ref UNSAFE_FILENAME_CHARS: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// Returns the trimmed value, or `None` when absent or blank
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parse a non-negative integer, falling back to `default`
pub fn parse_count_or(value: Option<&str>, default: u64) -> u64 {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return default;
    };

    if let Ok(n) = raw.parse::<u64>() {
        return n;
    }

    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 && n <= u64::MAX as f64 => n.trunc() as u64,
        _ => default,
    }
}

/// Parse an integer coerced to be at least 1, falling back to `default` when malformed
pub fn parse_positive_or(value: Option<&str>, default: u64) -> u64 {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return default;
    };

    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => {
            if n < 1.0 {
                1
            } else if n >= u64::MAX as f64 {
                u64::MAX
            } else {
                n.trunc() as u64
            }
        }
        _ => default,
    }
}

/// Parse a monetary amount; unparseable or non-finite input becomes `0.0`
pub fn parse_amount_or_zero(value: Option<&str>) -> f64 {
    value
        .map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`
pub fn sanitize_filename(name: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(name, "_").into_owned()
}

/// Lowercased extension of a file name, without the dot
pub fn file_extension(name: &str) -> Option<String> {
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_ascii_lowercase())
    }
}

/// Custom validator: price must be strictly positive
pub fn validate_positive_price(price: f64) -> Result<(), ValidationError> {
    if price > 0.0 {
        return Ok(());
    }
    let mut error = ValidationError::new("positive_price");
    error.message = Some("Price must be greater than 0".into());
    error.add_param("actual".into(), &price);
    Err(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_default_when_malformed() {
        assert_eq!(parse_count_or(Some("2019"), 0), 2019);
        assert_eq!(parse_count_or(Some(" 85000 "), 0), 85000);
        assert_eq!(parse_count_or(Some("12.9"), 0), 12);
        assert_eq!(parse_count_or(Some("abc"), 0), 0);
        assert_eq!(parse_count_or(Some("-5"), 0), 0);
        assert_eq!(parse_count_or(Some(""), 7), 7);
        assert_eq!(parse_count_or(None, 7), 7);
    }

    #[test]
    fn positive_values_are_clamped_to_one() {
        assert_eq!(parse_positive_or(Some("3"), 1), 3);
        assert_eq!(parse_positive_or(Some("0"), 1), 1);
        assert_eq!(parse_positive_or(Some("-4"), 6), 1);
        assert_eq!(parse_positive_or(Some("2.7"), 1), 2);
        assert_eq!(parse_positive_or(Some("many"), 6), 6);
        assert_eq!(parse_positive_or(None, 6), 6);
    }

    #[test]
    fn amounts_fall_back_to_zero() {
        assert_eq!(parse_amount_or_zero(Some("15000")), 15000.0);
        assert_eq!(parse_amount_or_zero(Some("9999.5")), 9999.5);
        assert_eq!(parse_amount_or_zero(Some("NaN")), 0.0);
        assert_eq!(parse_amount_or_zero(Some("free")), 0.0);
        assert_eq!(parse_amount_or_zero(None), 0.0);
    }

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename("my car (1).JPG"), "my_car__1_.JPG");
        assert_eq!(sanitize_filename("../../etc/passwd"), ".._.._etc_passwd");
        assert_eq!(sanitize_filename("fiat-panda_2.webp"), "fiat-panda_2.webp");
    }

    #[test]
    fn extensions_are_lowercased() {
        assert_eq!(file_extension("photo.JPEG").as_deref(), Some("jpeg"));
        assert_eq!(file_extension("archive.tar.png").as_deref(), Some("png"));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("trailing."), None);
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(Some("  Diesel ")).as_deref(), Some("Diesel"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn price_must_be_positive() {
        assert!(validate_positive_price(1.0).is_ok());
        assert!(validate_positive_price(0.0).is_err());
        assert!(validate_positive_price(-10.0).is_err());
    }
}
