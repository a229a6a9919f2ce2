//! Account constants and email handling.

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum length of a first or last name.
pub const MAX_NAME_LENGTH: u64 = 150;

/// Name of the unique constraint on `users.email`.
pub const UNIQUE_EMAIL_CONSTRAINT: &str = "uq_users_email";

/// Message returned for any failed login, whatever the reason.
pub const LOGIN_FAILED_MESSAGE: &str = "Unable to log in with provided credentials.";

/// Message returned when registering an email that is already taken.
pub const DUPLICATE_EMAIL_MESSAGE: &str = "A user with this email already exists.";

/// Message returned when `password` and `re_password` differ.
pub const PASSWORD_MISMATCH_MESSAGE: &str = "The two password fields didn't match.";

/// Normalize an email address for storage and lookup.
///
/// Surrounding whitespace is removed and the domain part is lower-cased. The
/// local part is kept as typed since some mail servers treat it as
/// case-sensitive.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => email.to_string(),
    }
}
