// Copyright (c) Fizzgrid Team
// SPDX-License-Identifier: Apache-2.0

use crate::error::ApiError;

/// Username rules: 4-30 chars, no whitespace, `[A-Za-z0-9_]` only.
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    let len = username.chars().count();
    if !(4..=30).contains(&len) {
        return Err(ApiError::BadRequest(
            "Username must be between 4 and 30 characters".to_string(),
        ));
    }
    if username.split_whitespace().count() != 1 || username.chars().any(char::is_whitespace) {
        return Err(ApiError::BadRequest(
            "Username can not contain spaces".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ApiError::BadRequest(
            "Username must be made up of a-z, 1-9, _".to_string(),
        ));
    }
    Ok(())
}

/// Minimal email shape check: `local@domain` with a dotted domain and no
/// whitespace.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let invalid = || ApiError::BadRequest("Enter a valid email address".to_string());

    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if host.is_empty() || tld.is_empty() {
        return Err(invalid());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_usernames() {
        for name in ["abcd", "user_1", "A_very_long_username_under_30c"] {
            assert!(validate_username(name).is_ok(), "rejected {name}");
        }
    }

    #[test]
    fn rejects_short_and_long_usernames() {
        assert!(validate_username("abc").is_err());
        assert!(validate_username(&"a".repeat(31)).is_err());
    }

    #[test]
    fn rejects_whitespace_in_usernames() {
        assert!(validate_username("user name").is_err());
        assert!(validate_username("user\tname").is_err());
    }

    #[test]
    fn rejects_usernames_outside_charset() {
        assert!(validate_username("user-name").is_err());
        assert!(validate_username("user!").is_err());
        assert!(validate_username("usér").is_err());
    }

    #[test]
    fn accepts_valid_emails() {
        for email in ["a@b.co", "user.name@example.org", "x_y@sub.example.com"] {
            assert!(validate_email(email).is_ok(), "rejected {email}");
        }
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["", "plain", "a@b", "@b.co", "a@", "a b@c.de", "a@@b.co"] {
            assert!(validate_email(email).is_err(), "accepted {email}");
        }
    }
}
