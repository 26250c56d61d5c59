//! Input checks shared by the API and the database layer.

use crate::{GOOD_RATING_THRESHOLD, RATING_MAX, RATING_MIN, REVIEW_MAX_CHARS, REVIEW_MIN_CHARS};
use serde::Deserialize;
use thiserror::Error;

/// A problem with user input. Nothing is written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("rating must be between {} and {}, got {}", RATING_MIN, RATING_MAX, .0)]
    RatingOutOfRange(i64),
    #[error("review text must be at least {} characters, got {}", REVIEW_MIN_CHARS, .0)]
    ReviewTooShort(usize),
    #[error("review text must be at most {} characters, got {}", REVIEW_MAX_CHARS, .0)]
    ReviewTooLong(usize),
    #[error("review has already been edited")]
    AlreadyEdited,
    #[error("review has been deleted")]
    ReviewDeleted,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("an account with email '{0}' already exists")]
    DuplicateEmail(String),
    #[error("an account with username '{0}' already exists")]
    DuplicateUsername(String),
    #[error("school '{0}' already exists")]
    DuplicateSchool(String),
    #[error("student '{0}' is already on this school's roster")]
    DuplicateStudent(String),
    #[error("school '{0}' does not exist")]
    UnknownSchool(String),
}

/// Review text and rating as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    pub text: String,
    pub rating: i64,
}

/// A review that passed validation, with its derived verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidReview {
    pub text: String,
    pub rating: u8,
    pub is_good: bool,
}

/// Check review length and rating bounds and derive `is_good`.
///
/// # Errors
/// Returns the first problem found with the input.
pub fn validate_review(input: &ReviewInput) -> Result<ValidReview, ValidationError> {
    let text = input.text.trim();
    let chars = text.chars().count();
    if chars < REVIEW_MIN_CHARS {
        return Err(ValidationError::ReviewTooShort(chars));
    }
    if chars > REVIEW_MAX_CHARS {
        return Err(ValidationError::ReviewTooLong(chars));
    }
    let rating = u8::try_from(input.rating)
        .ok()
        .filter(|r| (RATING_MIN..=RATING_MAX).contains(r))
        .ok_or(ValidationError::RatingOutOfRange(input.rating))?;

    Ok(ValidReview {
        text: text.to_string(),
        rating,
        is_good: rating >= GOOD_RATING_THRESHOLD,
    })
}

/// Account details submitted when registering staff or a school admin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistrationInput {
    pub school: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Check that every required field is present and the email looks like one.
/// Uniqueness is checked against the database by the caller.
///
/// # Errors
/// Returns the first problem found with the input.
pub fn validate_registration(input: &RegistrationInput) -> Result<(), ValidationError> {
    let required = [
        ("school", &input.school),
        ("email", &input.email),
        ("username", &input.username),
        ("first_name", &input.first_name),
        ("last_name", &input.last_name),
    ];
    if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(ValidationError::MissingField { field: *field });
    }
    if !looks_like_email(input.email.trim()) {
        return Err(ValidationError::InvalidEmail(input.email.clone()));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(text: &str, rating: i64) -> ReviewInput {
        ReviewInput {
            text: text.to_string(),
            rating,
        }
    }

    fn registration() -> RegistrationInput {
        RegistrationInput {
            school: "ASJA Boys".to_string(),
            email: "asja@gmail.com".to_string(),
            username: "test".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        }
    }

    const LONG_ENOUGH: &str =
        "Consistently prepared for class and helps classmates work through problems.";

    #[test_log::test]
    fn test_valid_review_derives_is_good() {
        let good = validate_review(&review(LONG_ENOUGH, 3)).unwrap();
        assert!(good.is_good);
        let bad = validate_review(&review(LONG_ENOUGH, 2)).unwrap();
        assert!(!bad.is_good);
        assert_eq!(bad.rating, 2);
    }

    #[test_log::test]
    fn test_short_review_rejected() {
        assert_eq!(
            validate_review(&review("Nice kid.", 5)),
            Err(ValidationError::ReviewTooShort(9))
        );
    }

    #[test_log::test]
    fn test_padding_does_not_count_toward_length() {
        let padded = format!("{:<80}", "Too short once trimmed.");
        assert!(matches!(
            validate_review(&review(&padded, 4)),
            Err(ValidationError::ReviewTooShort(_))
        ));
    }

    #[test_log::test]
    fn test_long_review_rejected() {
        let text = "a".repeat(REVIEW_MAX_CHARS + 1);
        assert!(matches!(
            validate_review(&review(&text, 4)),
            Err(ValidationError::ReviewTooLong(_))
        ));
    }

    #[test_log::test]
    fn test_rating_bounds() {
        for rating in [0, 6, -1, 300] {
            assert_eq!(
                validate_review(&review(LONG_ENOUGH, rating)),
                Err(ValidationError::RatingOutOfRange(rating))
            );
        }
        for rating in 1..=5 {
            assert!(validate_review(&review(LONG_ENOUGH, rating)).is_ok());
        }
    }

    #[test_log::test]
    fn test_valid_registration() {
        assert_eq!(validate_registration(&registration()), Ok(()));
    }

    #[test_log::test]
    fn test_missing_fields() {
        let input = RegistrationInput {
            school: "ASJA Boys".to_string(),
            email: "asja@gmail.com".to_string(),
            ..RegistrationInput::default()
        };
        assert_eq!(
            validate_registration(&input),
            Err(ValidationError::MissingField { field: "username" })
        );
    }

    #[test_log::test]
    fn test_invalid_email() {
        for email in ["asja", "asja@", "@gmail.com", "a@b", "a b@gmail.com", "a@@b.com"] {
            let input = RegistrationInput {
                email: email.to_string(),
                ..registration()
            };
            assert!(
                matches!(
                    validate_registration(&input),
                    Err(ValidationError::InvalidEmail(_))
                ),
                "{email} should be rejected"
            );
        }
    }
}
