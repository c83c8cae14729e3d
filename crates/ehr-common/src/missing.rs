//! Recognised missing-value sentinels.
//!
//! Exported flat files encode absent values in several ways besides a null
//! cell. A label or source column containing any of these is incomplete.

use polars::prelude::AnyValue;

/// Text sentinels treated as missing, compared case-insensitively.
pub const MISSING_SENTINELS: &[&str] = &["null", "nan", "nat", "none", "undefined", "unknown"];

/// Returns true for blank text or a recognised sentinel.
pub fn is_missing_text(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return true;
    }
    MISSING_SENTINELS
        .iter()
        .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
}

/// Returns true for nulls, NaN floats and missing text.
pub fn is_missing_value(value: &AnyValue<'_>) -> bool {
    match value {
        AnyValue::Null => true,
        AnyValue::Float32(v) => v.is_nan(),
        AnyValue::Float64(v) => v.is_nan(),
        AnyValue::String(s) => is_missing_text(s),
        AnyValue::StringOwned(s) => is_missing_text(s),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_sentinels_in_any_case() {
        for value in ["null", "NULL", "NaN", "Undefined", "UNKNOWN", " none ", "NaT", ""] {
            assert!(is_missing_text(value), "{value:?} should be missing");
        }
        assert!(!is_missing_text("0"));
        assert!(!is_missing_text("false"));
        assert!(!is_missing_text("nullable"));
    }

    #[test]
    fn recognises_missing_values() {
        assert!(is_missing_value(&AnyValue::Null));
        assert!(is_missing_value(&AnyValue::Float64(f64::NAN)));
        assert!(is_missing_value(&AnyValue::String("unknown")));
        assert!(!is_missing_value(&AnyValue::Int64(0)));
        assert!(!is_missing_value(&AnyValue::Boolean(false)));
    }
}
