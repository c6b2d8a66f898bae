//! Validation helpers for DTOs.

use validator::ValidationError;

/// Maximum length of a player name.
pub const PLAYER_NAME_MAX_LEN: usize = 30;

/// Validates that a trimmed player name is between 1 and 30 characters.
///
/// # Examples
///
/// ```ignore
/// validate_player_name("Alice")  // Ok
/// validate_player_name("   ")    // Err - empty once trimmed
/// ```
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        let mut err = ValidationError::new("player_name_empty");
        err.message = Some("Player name must not be empty".into());
        return Err(err);
    }

    if trimmed.chars().count() > PLAYER_NAME_MAX_LEN {
        let mut err = ValidationError::new("player_name_length");
        err.message = Some(
            format!(
                "Player name must be at most {} characters (got {})",
                PLAYER_NAME_MAX_LEN,
                trimmed.chars().count()
            )
            .into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_name_valid() {
        assert!(validate_player_name("Alice").is_ok());
        assert!(validate_player_name("  Bob  ").is_ok()); // trimmed before checking
        assert!(validate_player_name(&"x".repeat(30)).is_ok());
    }

    #[test]
    fn test_validate_player_name_empty() {
        assert!(validate_player_name("").is_err());
        assert!(validate_player_name("   ").is_err());
        assert!(validate_player_name("\t\n").is_err());
    }

    #[test]
    fn test_validate_player_name_too_long() {
        assert!(validate_player_name(&"x".repeat(31)).is_err());
        assert!(validate_player_name(&format!("  {}  ", "x".repeat(30))).is_ok()); // padding ignored
    }
}
