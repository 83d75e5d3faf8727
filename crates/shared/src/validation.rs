//! Common validation utilities.

use validator::{ValidateEmail, ValidationError};

lazy_static::lazy_static! {
    /// Lower-case kebab slug: `retirement-checklist-2024`.
    pub static ref SLUG_REGEX: regex::Regex =
        regex::Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Loose phone format: digits plus the usual separators, 7-20 characters.
    pub static ref PHONE_REGEX: regex::Regex =
        regex::Regex::new(r"^\+?[0-9 ().-]{7,20}$").unwrap();
}

/// Normalizes an email address for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates an email address as it will be stored, ignoring surrounding whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().to_string().validate_email() {
        Ok(())
    } else {
        let mut err = ValidationError::new("email");
        err.message = Some("Invalid email format".into());
        Err(err)
    }
}

/// Validates a person's name: 1-120 characters once trimmed.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if (1..=120).contains(&len) {
        Ok(())
    } else {
        let mut err = ValidationError::new("length");
        err.message = Some("Name must be 1-120 characters".into());
        Err(err)
    }
}

/// Rejects text that is empty once trimmed.
pub fn validate_not_blank(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a blog slug is lower-case kebab case.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_REGEX.is_match(slug) && slug.len() <= 120 {
        Ok(())
    } else {
        let mut err = ValidationError::new("slug_format");
        err.message =
            Some("Slug must contain lowercase letters, digits and single hyphens".into());
        Err(err)
    }
}

/// Validates a phone number format and that it has at least seven digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if PHONE_REGEX.is_match(phone.trim()) && digits >= 7 {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_format");
        err.message = Some("Phone number is not valid".into());
        Err(err)
    }
}

/// Validates that an amount is strictly positive.
pub fn validate_positive(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        let mut err = ValidationError::new("positive");
        err.message = Some("Value must be greater than zero".into());
        Err(err)
    }
}

/// Turns a title into a slug: lower-case ASCII words joined with single hyphens.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Jane.Doe@Example.COM "), "jane.doe@example.com");
    }

    #[test]
    fn test_normalize_email_idempotent() {
        let email: String = SafeEmail().fake();
        let once = normalize_email(&email);
        assert_eq!(normalize_email(&once), once);
    }

    #[test]
    fn test_validate_email_ignores_surrounding_whitespace() {
        assert!(validate_email(" jane@example.com ").is_ok());
        assert!(validate_email("\tJane@Example.com\n").is_ok());
        assert!(validate_email("   ").is_err());
        assert!(validate_email("jane at example.com").is_err());
        assert_eq!(validate_email("nope").unwrap_err().code, "email");
    }

    #[test]
    fn test_validate_name_counts_trimmed_chars() {
        assert!(validate_name("  Jane  ").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("").is_err());
        assert!(validate_name(&format!(" {} ", "é".repeat(120))).is_ok());
        assert!(validate_name(&"x".repeat(121)).is_err());
    }

    #[test]
    fn test_validate_not_blank() {
        assert!(validate_not_blank(" hi ").is_ok());
        assert!(validate_not_blank(" \n\t ").is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("tfsa-vs-rrsp").is_ok());
        assert!(validate_slug("2024-outlook").is_ok());
        assert!(validate_slug("Bad-Slug").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("").is_err());
    }

    #[test]
    fn test_validate_slug_error_message() {
        let err = validate_slug("Nope").unwrap_err();
        assert_eq!(err.code, "slug_format");
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+1 (416) 555-0199").is_ok());
        assert!(validate_phone("416.555.0199").is_ok());
        assert!(validate_phone("555").is_err());
        assert!(validate_phone("call me maybe").is_err());
        assert!(validate_phone("(((((((").is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive(0.01).is_ok());
        assert!(validate_positive(0.0).is_err());
        assert!(validate_positive(-5.0).is_err());
        assert!(validate_positive(f64::NAN).is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("TFSA vs. RRSP: Which First?"), "tfsa-vs-rrsp-which-first");
        assert_eq!(slugify("  2024 Outlook  "), "2024-outlook");
        assert_eq!(slugify("Crème brûlée"), "cr-me-br-l-e");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_output_is_valid_slug() {
        let slug = slugify("Planning for Retirement in Your 40s");
        assert!(validate_slug(&slug).is_ok());
    }
}
