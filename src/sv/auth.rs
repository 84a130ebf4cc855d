use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::{entity::user, prelude::*};

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

/// Bearer token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub id: i32,
  pub role: String,
  pub name: String,
  pub iat: i64,
  pub exp: i64,
}

/// Caller identity attached to a request once its token is verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
  pub id: i32,
  pub role: String,
  pub name: String,
}

impl Identity {
  pub fn has_role(&self, roles: &[&str]) -> bool {
    roles.iter().any(|role| role.eq_ignore_ascii_case(&self.role))
  }
}

impl From<Claims> for Identity {
  fn from(claims: Claims) -> Self {
    Self { id: claims.id, role: claims.role, name: claims.name }
  }
}

impl From<&user::Model> for Identity {
  fn from(user: &user::Model) -> Self {
    Self {
      id: user.id,
      role: user.role.as_str().to_string(),
      name: user.name.clone(),
    }
  }
}

pub struct Auth {
  encoding: EncodingKey,
  decoding: DecodingKey,
  validation: Validation,
  ttl: Duration,
}

impl Auth {
  pub fn new(secret: &str, ttl: Duration) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);

    Self {
      encoding: EncodingKey::from_secret(secret.as_bytes()),
      decoding: DecodingKey::from_secret(secret.as_bytes()),
      validation,
      ttl,
    }
  }

  pub fn issue(&self, identity: &Identity) -> Result<String> {
    let iat = Utc::now().timestamp();
    let claims = Claims {
      id: identity.id,
      role: identity.role.clone(),
      name: identity.name.clone(),
      iat,
      exp: iat + self.ttl.as_secs() as i64,
    };
    self.sign(&claims)
  }

  pub fn sign(&self, claims: &Claims) -> Result<String> {
    Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
  }

  pub fn verify(&self, token: &str) -> Result<Identity> {
    decode::<Claims>(token, &self.decoding, &self.validation)
      .map(|data| data.claims.into())
      .map_err(|err| {
        debug!("Token rejected: {err}");
        Error::InvalidToken
      })
  }
}

/// Bcrypt hash in modular crypt format; salt and cost travel inside it.
pub fn hash_password(password: &str) -> Result<String> {
  bcrypt::hash(password, HASH_COST)
    .map_err(|err| Error::Internal(format!("Password hashing failed: {err}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
  bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn auth() -> Auth {
    Auth::new("test-secret", Duration::from_secs(3600))
  }

  fn identity() -> Identity {
    Identity { id: 7, role: "user".into(), name: "Alice".into() }
  }

  #[test]
  fn test_issue_and_verify() {
    let auth = auth();
    let token = auth.issue(&identity()).unwrap();
    assert_eq!(auth.verify(&token).unwrap(), identity());
  }

  #[test]
  fn test_expired_token_rejected() {
    let auth = auth();
    let now = Utc::now().timestamp();
    let token = auth
      .sign(&Claims {
        id: 7,
        role: "user".into(),
        name: "Alice".into(),
        iat: now - 120,
        exp: now - 60,
      })
      .unwrap();

    assert!(matches!(auth.verify(&token), Err(Error::InvalidToken)));
  }

  #[test]
  fn test_foreign_signature_rejected() {
    let other = Auth::new("other-secret", Duration::from_secs(3600));
    let token = other.issue(&identity()).unwrap();
    assert!(matches!(auth().verify(&token), Err(Error::InvalidToken)));
    assert!(matches!(auth().verify("garbage"), Err(Error::InvalidToken)));
  }

  #[test]
  fn test_role_check_ignores_case() {
    let admin = Identity { id: 1, role: "Admin".into(), name: "Root".into() };
    assert!(admin.has_role(&["admin"]));
    assert!(!identity().has_role(&["admin"]));
  }

  #[test]
  fn test_password_hashing() {
    let hash = hash_password("hunter22").unwrap();
    assert!(hash.starts_with("$2"));
    assert!(verify_password("hunter22", &hash));
    assert!(!verify_password("hunter23", &hash));

    // Fresh salt per hash
    let again = hash_password("hunter22").unwrap();
    assert_ne!(hash, again);
    assert!(verify_password("hunter22", &again));

    assert!(!verify_password("hunter22", "not-a-bcrypt-hash"));
  }

  #[test]
  fn test_password_hash_has_work_factor() {
    let hash = hash_password("hunter22").unwrap();
    let cost: u32 = hash.split('$').nth(2).unwrap().parse().unwrap();
    assert_eq!(cost, HASH_COST);
  }
}
