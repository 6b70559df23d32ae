use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

pub const MAX_CHARFIELD_LEN: usize = 200;
pub const MAX_USER_CHARFIELD_LEN: usize = 150;
pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_COLOR_LEN: usize = 7;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MIN_COOKING_TIME: i32 = 1;
pub const MIN_INGREDIENT_AMOUNT: i32 = 1;

/// `me` shadows the profile route and is never a valid username.
const RESERVED_USERNAME: &str = "me";

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.@+-]+$").expect("valid username regex"));

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));

static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid color regex"));

/// A single invalid field, surfaced to clients as
/// `{"<field>": ["<message>"]}`.
#[derive(Debug, Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_username(username: &str) -> Result<(), FieldError> {
    if username.is_empty() || username.len() > MAX_USER_CHARFIELD_LEN {
        return Err(FieldError::new(
            "username",
            format!("Must be 1-{MAX_USER_CHARFIELD_LEN} characters"),
        ));
    }
    if !USERNAME_RE.is_match(username) {
        return Err(FieldError::new(
            "username",
            "May only contain letters, digits and @/./+/-/_",
        ));
    }
    if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
        return Err(FieldError::new(
            "username",
            format!("'{RESERVED_USERNAME}' is a reserved username"),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(FieldError::new(
            "email",
            format!("Must be 1-{MAX_EMAIL_LEN} characters"),
        ));
    }

    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(FieldError::new("email", "Enter a valid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(FieldError::new(
            "password",
            format!("Must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if password.len() > MAX_USER_CHARFIELD_LEN {
        return Err(FieldError::new(
            "password",
            format!("Must be at most {MAX_USER_CHARFIELD_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_person_name(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.is_empty() || value.len() > MAX_USER_CHARFIELD_LEN {
        return Err(FieldError::new(
            field,
            format!("Must be 1-{MAX_USER_CHARFIELD_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_recipe_name(name: &str) -> Result<(), FieldError> {
    if name.trim().is_empty() || name.len() > MAX_CHARFIELD_LEN {
        return Err(FieldError::new(
            "name",
            format!("Must be 1-{MAX_CHARFIELD_LEN} characters"),
        ));
    }
    Ok(())
}

pub fn validate_recipe_text(text: &str) -> Result<(), FieldError> {
    if text.trim().is_empty() {
        return Err(FieldError::new("text", "Must not be empty"));
    }
    Ok(())
}

pub fn validate_cooking_time(minutes: i32) -> Result<(), FieldError> {
    if minutes < MIN_COOKING_TIME {
        return Err(FieldError::new(
            "cooking_time",
            format!("Must be at least {MIN_COOKING_TIME} minute"),
        ));
    }
    Ok(())
}

/// Amounts must all be >= 1 and ingredient ids must not repeat within
/// one payload.
pub fn validate_ingredient_amounts(pairs: &[(i32, i32)]) -> Result<(), FieldError> {
    if pairs.is_empty() {
        return Err(FieldError::new(
            "ingredients",
            "At least one ingredient is required",
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for (id, amount) in pairs {
        if *amount < MIN_INGREDIENT_AMOUNT {
            return Err(FieldError::new(
                "ingredients",
                format!("Amount must be at least {MIN_INGREDIENT_AMOUNT}"),
            ));
        }
        if !seen.insert(*id) {
            return Err(FieldError::new(
                "ingredients",
                format!("Ingredient {id} is listed more than once"),
            ));
        }
    }
    Ok(())
}

pub fn validate_tag_ids(tag_ids: &[i32]) -> Result<(), FieldError> {
    if tag_ids.is_empty() {
        return Err(FieldError::new("tags", "At least one tag is required"));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), FieldError> {
    if slug.is_empty() || slug.len() > MAX_CHARFIELD_LEN || !SLUG_RE.is_match(slug) {
        return Err(FieldError::new(
            "slug",
            "May only contain letters, digits, hyphens and underscores",
        ));
    }
    Ok(())
}

pub fn validate_color(color: &str) -> Result<(), FieldError> {
    if color.len() > MAX_COLOR_LEN || !COLOR_RE.is_match(color) {
        return Err(FieldError::new(
            "color",
            "Must be a hex color code like #63C144",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_username_is_rejected_case_insensitively() {
        for candidate in ["me", "Me", "ME", "mE"] {
            assert!(validate_username(candidate).is_err(), "{candidate}");
        }
        assert!(validate_username("melissa").is_ok());
    }

    #[test]
    fn username_charset() {
        assert!(validate_username("chef_anna.42+@-").is_ok());
        assert!(validate_username("chef anna").is_err());
        assert!(validate_username("").is_err());
    }

    #[test]
    fn email_needs_local_part_and_dotted_domain() {
        assert!(validate_email("anna@example.com").is_ok());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("anna@localhost").is_err());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn ingredient_amounts_must_be_positive_and_unique() {
        assert!(validate_ingredient_amounts(&[(1, 10), (2, 1)]).is_ok());
        assert!(validate_ingredient_amounts(&[(1, 0)]).is_err());
        assert!(validate_ingredient_amounts(&[(1, 5), (1, 7)]).is_err());
        assert!(validate_ingredient_amounts(&[]).is_err());
    }

    #[test]
    fn cooking_time_lower_bound() {
        assert!(validate_cooking_time(0).is_err());
        assert!(validate_cooking_time(1).is_ok());
    }

    #[test]
    fn slug_and_color_formats() {
        assert!(validate_slug("breakfast_2-go").is_ok());
        assert!(validate_slug("завтрак").is_err());
        assert!(validate_color("#63C144").is_ok());
        assert!(validate_color("63C144").is_err());
        assert!(validate_color("#63C1").is_err());
    }
}
