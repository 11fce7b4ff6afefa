//! Title rules shared by the server and its clients.

use thiserror::Error;

/// Maximum title length, counted in characters after trimming.
pub const MAX_TITLE_LEN: usize = 200;

/// Why a title was rejected. The `Display` text is what the API returns to
/// the caller as the 400 body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleError {
    #[error("Task title is required.")]
    Empty,

    #[error("Task title must not exceed {max} characters.", max = MAX_TITLE_LEN)]
    TooLong { len: usize },
}

/// Trim `raw` and check it against the title rules, returning the trimmed
/// title to store.
pub fn normalize_title(raw: &str) -> Result<&str, TitleError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TitleError::Empty);
    }
    let len = trimmed.chars().count();
    if len > MAX_TITLE_LEN {
        return Err(TitleError::TooLong { len });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize_title("  Buy milk \t").unwrap(), "Buy milk");
    }

    #[test]
    fn rejects_blank_titles() {
        for raw in ["", " ", "\t\n", "   \r\n  "] {
            assert_eq!(normalize_title(raw), Err(TitleError::Empty), "{raw:?}");
        }
    }

    #[test]
    fn accepts_boundary_lengths() {
        assert_eq!(normalize_title("a").unwrap(), "a");
        let max = "x".repeat(MAX_TITLE_LEN);
        assert_eq!(normalize_title(&max).unwrap(), max);
    }

    #[test]
    fn length_is_measured_after_trimming() {
        let padded = format!("   {}   ", "x".repeat(MAX_TITLE_LEN));
        assert_eq!(normalize_title(&padded).unwrap().len(), MAX_TITLE_LEN);
    }

    #[test]
    fn rejects_titles_over_the_limit() {
        let long = "x".repeat(MAX_TITLE_LEN + 1);
        assert_eq!(
            normalize_title(&long),
            Err(TitleError::TooLong { len: MAX_TITLE_LEN + 1 })
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        let cyrillic = "я".repeat(MAX_TITLE_LEN);
        assert!(cyrillic.len() > MAX_TITLE_LEN);
        assert!(normalize_title(&cyrillic).is_ok());
    }
}
