//! Internal helpers for validation and conversion.

use uuid::Uuid;

use crate::{LedgerError, ResultLedger};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultLedger<Uuid> {
    Uuid::parse_str(value).map_err(|_| LedgerError::Validation(format!("invalid {label} id")))
}

/// Trim a required name, rejecting empty input.
pub(crate) fn normalize_required(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim optional free text, mapping blanks to `None`.
pub(crate) fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_names_are_trimmed() {
        assert_eq!(normalize_required("  Cash ", "name").unwrap(), "Cash");
        assert!(normalize_required("   ", "name").is_err());
    }

    #[test]
    fn blank_optional_text_is_dropped() {
        assert_eq!(normalize_optional(Some("  ")), None);
        assert_eq!(normalize_optional(Some(" note ")), Some("note".to_string()));
        assert_eq!(normalize_optional(None), None);
    }
}
