//! Handle format rules.

use crate::config::HandleRenameConfig;
use crate::domain::error::DomainError;

/// Whether `c` may appear in a handle (`[A-Za-z0-9_-]`).
#[must_use]
pub fn is_handle_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Length, charset and reserved-word checks for handles.
#[derive(Debug, Clone)]
pub struct HandleRules {
    min_len: usize,
    max_len: usize,
    reserved: Vec<String>,
}

impl HandleRules {
    #[must_use]
    pub fn from_config(cfg: &HandleRenameConfig) -> Self {
        Self {
            min_len: cfg.min_handle_length,
            max_len: cfg.max_handle_length,
            reserved: cfg
                .reserved_handles
                .iter()
                .map(|h| h.to_ascii_lowercase())
                .collect(),
        }
    }

    /// Charset and minimum length only. Handles stored before today's length limit
    /// was configured must stay renamable.
    pub fn check_existing(&self, field: &str, handle: &str) -> Result<(), DomainError> {
        if handle.is_empty() {
            return Err(DomainError::validation(field, "must not be empty"));
        }
        if handle.chars().count() < self.min_len {
            return Err(DomainError::validation(
                field,
                format!("must be at least {} characters", self.min_len),
            ));
        }
        if let Some(bad) = handle.chars().find(|c| !is_handle_char(*c)) {
            return Err(DomainError::validation(
                field,
                format!("invalid character '{bad}', allowed: letters, digits, '_' and '-'"),
            ));
        }
        Ok(())
    }

    /// [`check_existing`](Self::check_existing) plus the configured maximum length.
    pub fn check_format(&self, field: &str, handle: &str) -> Result<(), DomainError> {
        self.check_existing(field, handle)?;
        if handle.chars().count() > self.max_len {
            return Err(DomainError::validation(
                field,
                format!("must be at most {} characters", self.max_len),
            ));
        }
        Ok(())
    }

    /// Full check of a handle a user wants to take.
    pub fn check_new_handle(&self, handle: &str) -> Result<(), DomainError> {
        self.check_format("new_handle", handle)?;
        let lowered = handle.to_ascii_lowercase();
        if self.reserved.iter().any(|r| *r == lowered) {
            return Err(DomainError::validation(
                "new_handle",
                format!("'{handle}' is reserved"),
            ));
        }
        Ok(())
    }

    /// Checks run by the content rewriter before touching any table.
    pub fn check_pair(&self, old_handle: &str, new_handle: &str) -> Result<(), DomainError> {
        self.check_existing("old_handle", old_handle)?;
        self.check_format("new_handle", new_handle)?;
        if old_handle == new_handle {
            return Err(DomainError::validation(
                "new_handle",
                "must differ from the old handle",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> HandleRules {
        HandleRules::from_config(&HandleRenameConfig::default())
    }

    fn message(err: DomainError) -> String {
        match err {
            DomainError::Validation { field, message } => format!("{field}: {message}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn accepts_handles_in_charset() {
        let rules = rules();
        for handle in ["alice", "alice_2024", "a-b-c", "ABC", "x".repeat(50).as_str()] {
            assert!(rules.check_new_handle(handle).is_ok(), "{handle}");
        }
    }

    #[test]
    fn rejects_bad_format() {
        let rules = rules();
        assert_eq!(
            message(rules.check_new_handle("").unwrap_err()),
            "new_handle: must not be empty"
        );
        assert_eq!(
            message(rules.check_new_handle("ab").unwrap_err()),
            "new_handle: must be at least 3 characters"
        );
        assert!(rules.check_new_handle(&"x".repeat(51)).is_err());
        assert!(
            message(rules.check_new_handle("al ice").unwrap_err()).contains("invalid character ' '")
        );
        assert!(rules.check_new_handle("al.ice").is_err());
        assert!(rules.check_new_handle("alicé").is_err());
    }

    #[test]
    fn reserved_handles_are_case_insensitive() {
        let rules = rules();
        assert!(rules.check_new_handle("Admin").is_err());
        assert!(rules.check_new_handle("administrator").is_ok());
    }

    #[test]
    fn pair_must_differ() {
        let rules = rules();
        assert!(rules.check_pair("alice", "alice2").is_ok());
        assert_eq!(
            message(rules.check_pair("alice", "alice").unwrap_err()),
            "new_handle: must differ from the old handle"
        );
        assert!(rules.check_pair("al", "alice").is_err());
    }

    #[test]
    fn over_long_legacy_handle_can_still_be_renamed_away() {
        let rules = rules();
        let legacy = "l".repeat(60);

        assert!(rules.check_pair(&legacy, "alice").is_ok());
        assert!(rules.check_existing("old_handle", &legacy).is_ok());
        assert!(rules.check_format("old_handle", &legacy).is_err());
        assert!(rules.check_pair("alice", &legacy).is_err());
        assert!(rules.check_existing("old_handle", "bad handle").is_err());
    }
}
