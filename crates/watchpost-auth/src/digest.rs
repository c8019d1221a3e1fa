//! Password digests.

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{Error, Result};

/// A salted, deliberately slow one-way password hash.
///
/// The salt is embedded in the digest, so `verify` needs nothing but the
/// plaintext and the stored string.
pub trait Digester {
  fn hash(&self, plaintext: &str) -> Result<String>;

  /// Recompute and compare. A digest that cannot be parsed never matches.
  fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Argon2id with a random 16-byte salt, producing PHC strings such as
/// `$argon2id$v=19$m=19456,t=2,p=1$…`.
#[derive(Clone, Default)]
pub struct Argon2Digester {
  argon2: Argon2<'static>,
}

impl Argon2Digester {
  /// Use custom argon2 parameters. Verification always honours the
  /// parameters recorded in the digest itself.
  pub fn new(argon2: Argon2<'static>) -> Self { Self { argon2 } }
}

impl Digester for Argon2Digester {
  fn hash(&self, plaintext: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = self
      .argon2
      .hash_password(plaintext.as_bytes(), &salt)
      .map_err(|e| Error::Hash(e.to_string()))?;
    Ok(hash.to_string())
  }

  fn verify(&self, plaintext: &str, digest: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(digest) else {
      return false;
    };
    self
      .argon2
      .verify_password(plaintext.as_bytes(), &parsed)
      .is_ok()
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use argon2::{Algorithm, Params, Version};

  use super::*;

  /// Minimum-cost parameters so tests stay fast.
  pub(crate) fn cheap() -> Argon2Digester {
    let params = Params::new(8, 1, 1, None).unwrap();
    Argon2Digester::new(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
  }

  #[test]
  fn digest_is_phc_and_salted() {
    let d = cheap();
    let a = d.hash("SecurePass123!").unwrap();
    let b = d.hash("SecurePass123!").unwrap();
    assert!(a.starts_with("$argon2id$"));
    assert_ne!(a, b, "each digest carries its own salt");
  }

  #[test]
  fn verify_matches_only_the_original_password() {
    let d = cheap();
    let digest = d.hash("SecurePass123!").unwrap();
    assert!(d.verify("SecurePass123!", &digest));
    assert!(!d.verify("securepass123!", &digest));
  }

  #[test]
  fn garbage_digest_never_matches() {
    let d = cheap();
    assert!(!d.verify("anything", "not-a-phc-string"));
  }

  #[test]
  fn default_parameters_verify_cheap_digests() {
    let digest = cheap().hash("pw").unwrap();
    assert!(Argon2Digester::default().verify("pw", &digest));
  }
}
