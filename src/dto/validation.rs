//! Validation helpers for DTOs.

use validator::ValidationError;

use super::parse_timestamp;

/// Rejects empty or whitespace-only text.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }

    Ok(())
}

/// Accepts RFC 3339 timestamps only (`2025-03-14T18:30:00Z`, `2025-03-14T18:30:00-03:00`).
pub fn validate_rfc3339(value: &str) -> Result<(), ValidationError> {
    if parse_timestamp(value).is_none() {
        let mut err = ValidationError::new("rfc3339");
        err.message = Some(format!("`{value}` is not an RFC 3339 timestamp").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_is_rejected() {
        assert!(validate_not_blank("Los Pumas").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   ").is_err());
    }

    #[test]
    fn timestamps_must_carry_an_offset() {
        assert!(validate_rfc3339("2025-03-14T18:30:00Z").is_ok());
        assert!(validate_rfc3339("2025-03-14T18:30:00-03:00").is_ok());
        assert!(validate_rfc3339("2025-03-14 18:30").is_err());
        assert!(validate_rfc3339("2025-03-14T18:30:00").is_err());
    }
}
