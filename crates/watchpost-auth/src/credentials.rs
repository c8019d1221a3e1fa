//! Credential rules applied by callers before [`AuthGateway::register`].
//!
//! The gateway itself accepts any username and password; these checks belong
//! to whichever front end collects them.
//!
//! [`AuthGateway::register`]: crate::AuthGateway::register

use thiserror::Error;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
  #[error("Username must be at least 3 characters long.")]
  UsernameTooShort,
  #[error("Username cannot contain whitespace.")]
  UsernameWhitespace,
  #[error("Password must be at least 8 characters long.")]
  PasswordTooShort,
}

pub fn validate_username(username: &str) -> Result<(), CredentialError> {
  if username.chars().count() < MIN_USERNAME_LEN {
    return Err(CredentialError::UsernameTooShort);
  }
  if username.chars().any(char::is_whitespace) {
    return Err(CredentialError::UsernameWhitespace);
  }
  Ok(())
}

pub fn validate_password(password: &str) -> Result<(), CredentialError> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(CredentialError::PasswordTooShort);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn usernames() {
    assert_eq!(validate_username("al"), Err(CredentialError::UsernameTooShort));
    assert_eq!(validate_username("al ice"), Err(CredentialError::UsernameWhitespace));
    assert_eq!(validate_username("alice2"), Ok(()));
  }

  #[test]
  fn passwords() {
    assert_eq!(validate_password("short"), Err(CredentialError::PasswordTooShort));
    assert_eq!(validate_password("SecurePass123!"), Ok(()));
  }

  #[test]
  fn messages_name_the_limit() {
    assert_eq!(
      CredentialError::PasswordTooShort.to_string(),
      "Password must be at least 8 characters long."
    );
  }
}
