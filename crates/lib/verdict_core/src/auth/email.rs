//! Email normalisation and validation.
//!
//! Emails are trimmed and lower-cased at every boundary (signup, login,
//! member invitation), so uniqueness in the `users` table is case-insensitive.

use std::sync::OnceLock;

use regex::Regex;

fn email_re() -> &'static Regex {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9._%+\-]+@(?:[a-z0-9](?:[a-z0-9\-]*[a-z0-9])?\.)+[a-z]{2,}$")
            .expect("email regex compiles")
    })
}

/// Trim and lower-case an email address.
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check the shape of a normalised email address.
pub fn is_valid(email: &str) -> bool {
    email_re().is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_rejects() {
        let cases = [
            ("test@example.com", true),
            ("TEST@example.com", true),
            ("test@example.museum", true),
            ("test@sub.example.com", true),
            ("first.last+tag@example.co.uk", true),
            ("invalid-email", false),
            ("@example.com", false),
            ("test@", false),
            ("test@example", false),
            ("test@-example.com", false),
            ("", false),
        ];
        for (email, expected) in cases {
            assert_eq!(is_valid(&normalize(email)), expected, "email {email:?}");
        }
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Alice@Example.COM "), "alice@example.com");
    }
}
