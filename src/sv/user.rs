use crate::{
  entity::{user, user::UserRole},
  prelude::*,
  sv::auth::{hash_password, verify_password},
};

const MIN_PASSWORD_LEN: usize = 6;

pub struct User<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn register(
    &self,
    email: &str,
    name: &str,
    password: &str,
  ) -> Result<user::Model> {
    let email = normalize_email(email)?;
    let name = name.trim();

    if name.is_empty() {
      return Err(Error::InvalidArgs("Name is required".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
      return Err(Error::InvalidArgs(format!(
        "Password must be at least {MIN_PASSWORD_LEN} characters"
      )));
    }

    if self.by_email(&email).await?.is_some() {
      return Err(Error::Conflict("Email already registered".into()));
    }

    self.insert(email, name, password, UserRole::User).await
  }

  pub async fn login(
    &self,
    email: &str,
    password: &str,
  ) -> Result<user::Model> {
    let email = email.trim().to_lowercase();

    let Some(user) = self.by_email(&email).await? else {
      return Err(Error::Unauthorized("Invalid credentials"));
    };

    if !verify_password(password, &user.password_hash) {
      return Err(Error::Unauthorized("Invalid credentials"));
    }

    Ok(user)
  }

  /// Creates the admin account, or promotes an existing account with the
  /// same email. Safe to run on every startup.
  pub async fn bootstrap_admin(
    &self,
    email: &str,
    password: &str,
    name: &str,
  ) -> Result<user::Model> {
    let email = normalize_email(email)?;

    if let Some(user) = self.by_email(&email).await? {
      if user.role == UserRole::Admin {
        return Ok(user);
      }
      info!("Promoting {} to admin", user.email);
      return self.set_role(user.id, UserRole::Admin).await;
    }

    info!("Creating admin account {email}");
    self.insert(email, name, password, UserRole::Admin).await
  }

  pub async fn by_email(&self, email: &str) -> Result<Option<user::Model>> {
    let user = user::Entity::find()
      .filter(user::Column::Email.eq(email))
      .one(self.db)
      .await?;
    Ok(user)
  }

  pub async fn set_role(&self, id: i32, role: UserRole) -> Result<user::Model> {
    let user = user::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    let user = user::ActiveModel { role: Set(role), ..user.into() }
      .update(self.db)
      .await?;
    Ok(user)
  }

  async fn insert(
    &self,
    email: String,
    name: &str,
    password: &str,
    role: UserRole,
  ) -> Result<user::Model> {
    let password_hash = hash_password(password)?;

    let user = user::ActiveModel {
      email: Set(email),
      name: Set(name.to_string()),
      password_hash: Set(password_hash),
      role: Set(role),
      created_at: Set(Utc::now().naive_utc()),
      ..Default::default()
    };

    Ok(user.insert(self.db).await?)
  }
}

fn normalize_email(email: &str) -> Result<String> {
  let email = email.trim().to_lowercase();
  if !email.contains('@') {
    return Err(Error::InvalidArgs("Invalid email".into()));
  }
  Ok(email)
}
