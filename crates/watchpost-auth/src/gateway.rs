//! Registration and login.
//!
//! Expected failures (taken username, unknown user, wrong password) are
//! returned as outcomes carrying a human-readable message. Only store and
//! hashing faults surface as `Err`.

use std::fmt;

use tracing::{debug, info};
use watchpost_core::{record::User, store::RecordStore};

use crate::{Digester, Error, Result};

// ─── Outcomes ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
  Registered { id: i64, username: String },
  UsernameTaken { username: String },
}

impl RegisterOutcome {
  pub fn is_success(&self) -> bool { matches!(self, Self::Registered { .. }) }

  pub fn message(&self) -> String { self.to_string() }
}

impl fmt::Display for RegisterOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Registered { username, .. } => {
        write!(f, "User '{username}' registered successfully.")
      }
      Self::UsernameTaken { username } => write!(f, "Username '{username}' already exists."),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
  Authenticated(User),
  UserNotFound,
  IncorrectPassword,
}

impl LoginOutcome {
  pub fn is_success(&self) -> bool { matches!(self, Self::Authenticated(_)) }

  pub fn message(&self) -> String { self.to_string() }
}

impl fmt::Display for LoginOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Authenticated(_) => f.write_str("Login successful!"),
      Self::UserNotFound => f.write_str("User not found."),
      Self::IncorrectPassword => f.write_str("Incorrect password."),
    }
  }
}

// ─── Gateway ─────────────────────────────────────────────────────────────────

/// Registers and authenticates users held in a [`RecordStore`].
///
/// Authentication is a one-shot check; no session state is kept.
pub struct AuthGateway<'s, S, D> {
  store:    &'s S,
  digester: D,
}

impl<'s, S, D> AuthGateway<'s, S, D>
where
  S: RecordStore,
  D: Digester,
{
  pub fn new(store: &'s S, digester: D) -> Self { Self { store, digester } }

  /// Create a user with `role`, unless the username is already taken.
  pub fn register(&self, username: &str, password: &str, role: &str) -> Result<RegisterOutcome> {
    if self.find(username)?.is_some() {
      debug!(username, "registration rejected: username taken");
      return Ok(RegisterOutcome::UsernameTaken { username: username.to_owned() });
    }

    let digest = self.digester.hash(password)?;
    let id = self
      .store
      .insert_user(username, &digest, role)
      .map_err(|e| Error::Store(Box::new(e)))?;

    info!(username, role, id, "user registered");
    Ok(RegisterOutcome::Registered { id, username: username.to_owned() })
  }

  /// Check `password` against the stored digest for `username`.
  pub fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
    let Some(user) = self.find(username)? else {
      debug!(username, "login rejected: user not found");
      return Ok(LoginOutcome::UserNotFound);
    };

    if !self.digester.verify(password, &user.password_digest) {
      debug!(username, "login rejected: incorrect password");
      return Ok(LoginOutcome::IncorrectPassword);
    }

    info!(username, "login succeeded");
    Ok(LoginOutcome::Authenticated(user))
  }

  fn find(&self, username: &str) -> Result<Option<User>> {
    self
      .store
      .find_user_by_username(username)
      .map_err(|e| Error::Store(Box::new(e)))
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use watchpost_core::{
    record::{DEFAULT_ROLE, Incident, NewIncident},
    schema::Table,
  };
  use watchpost_store_sqlite::SqliteStore;

  use super::*;
  use crate::digest::tests::cheap;

  // A minimal user-only store for exercising the gateway without SQLite.
  #[derive(Default)]
  struct MemoryStore {
    users: RefCell<Vec<User>>,
  }

  impl RecordStore for MemoryStore {
    type Error = std::convert::Infallible;
    fn insert_incident(&self, _: &NewIncident) -> Result<i64, Self::Error> { unimplemented!() }
    fn list_incidents(&self) -> Result<Vec<Incident>, Self::Error> { unimplemented!() }
    fn update_incident_status(&self, _: i64, _: &str) -> Result<usize, Self::Error> { unimplemented!() }
    fn delete_incident(&self, _: i64) -> Result<usize, Self::Error> { unimplemented!() }

    fn find_user_by_username(&self, username: &str) -> Result<Option<User>, Self::Error> {
      Ok(self.users.borrow().iter().find(|u| u.username == username).cloned())
    }

    fn insert_user(&self, username: &str, digest: &str, role: &str) -> Result<i64, Self::Error> {
      let mut users = self.users.borrow_mut();
      let id = users.len() as i64 + 1;
      users.push(User {
        id,
        username:        username.to_owned(),
        password_digest: digest.to_owned(),
        role:            role.to_owned(),
      });
      Ok(id)
    }
  }

  #[test]
  fn register_then_login() {
    let store = MemoryStore::default();
    let gw = AuthGateway::new(&store, cheap());

    let reg = gw.register("alice2", "SecurePass123!", "analyst").unwrap();
    assert!(reg.is_success());
    assert_eq!(reg.message(), "User 'alice2' registered successfully.");

    let login = gw.login("alice2", "SecurePass123!").unwrap();
    assert!(login.is_success());
    assert_eq!(login.message(), "Login successful!");
    let LoginOutcome::Authenticated(user) = login else { unreachable!() };
    assert_eq!(user.role, "analyst");
  }

  #[test]
  fn password_is_never_stored_in_plaintext() {
    let store = MemoryStore::default();
    let gw = AuthGateway::new(&store, cheap());
    gw.register("bob", "hunter2hunter2", DEFAULT_ROLE).unwrap();

    let stored = store.find_user_by_username("bob").unwrap().unwrap();
    assert_ne!(stored.password_digest, "hunter2hunter2");
    assert!(stored.password_digest.starts_with("$argon2id$"));
  }

  #[test]
  fn wrong_password_is_rejected() {
    let store = MemoryStore::default();
    let gw = AuthGateway::new(&store, cheap());
    gw.register("alice", "SecurePass123!", DEFAULT_ROLE).unwrap();

    let login = gw.login("alice", "nope").unwrap();
    assert_eq!(login, LoginOutcome::IncorrectPassword);
    assert!(!login.is_success());
    assert_eq!(login.message(), "Incorrect password.");
  }

  #[test]
  fn unknown_user_is_rejected() {
    let store = MemoryStore::default();
    let gw = AuthGateway::new(&store, cheap());

    let login = gw.login("ghost", "whatever").unwrap();
    assert_eq!(login, LoginOutcome::UserNotFound);
    assert!(login.message().contains("not found"));
  }

  #[test]
  fn duplicate_registration_fails_and_keeps_one_row() {
    let store = SqliteStore::open_in_memory().unwrap();
    let gw = AuthGateway::new(&store, cheap());

    assert!(gw.register("alice", "SecurePass123!", DEFAULT_ROLE).unwrap().is_success());
    assert!(gw.register("bob", "hunter2hunter2", DEFAULT_ROLE).unwrap().is_success());
    let second = gw.register("alice", "OtherPass456!", "admin").unwrap();
    assert!(!second.is_success());
    assert!(second.message().contains("already exists"));

    // The original password still works; the second one was never stored.
    assert!(gw.login("alice", "SecurePass123!").unwrap().is_success());
    assert_eq!(
      gw.login("alice", "OtherPass456!").unwrap(),
      LoginOutcome::IncorrectPassword
    );
    let user = store.find_user_by_username("alice").unwrap().unwrap();
    assert_eq!(user.role, DEFAULT_ROLE);
    assert_eq!(store.count(Table::Users).unwrap(), 2);
  }

  #[test]
  fn gateway_works_over_sqlite() {
    let store = SqliteStore::open_in_memory().unwrap();
    let gw = AuthGateway::new(&store, cheap());

    gw.register("carol", "CorrectHorse9", "admin").unwrap();
    assert!(gw.login("carol", "CorrectHorse9").unwrap().is_success());
    assert_eq!(gw.login("dave", "x").unwrap(), LoginOutcome::UserNotFound);
  }
}
