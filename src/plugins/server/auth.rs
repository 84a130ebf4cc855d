//! Bearer-token gate for protected routes.

use axum::{
  extract::{Request, State},
  http::{HeaderMap, header::AUTHORIZATION},
  middleware::Next,
  response::Response,
};

use crate::{prelude::*, state::AppState};

pub const ANY_ROLE: &[&str] = &[];
pub const ADMIN: &[&str] = &["admin"];

/// Gate configuration: who may pass. An empty role list admits any
/// authenticated caller.
#[derive(Clone)]
pub struct Gate {
  app: Arc<AppState>,
  roles: &'static [&'static str],
}

impl Gate {
  pub fn new(app: Arc<AppState>, roles: &'static [&'static str]) -> Self {
    Self { app, roles }
  }
}

/// Verifies the bearer token and attaches the caller's
/// [`Identity`](crate::sv::Identity) to the request.
pub async fn gate(
  State(gate): State<Gate>,
  mut request: Request,
  next: Next,
) -> Result<Response> {
  let token = bearer(request.headers())
    .ok_or(Error::Unauthorized("No token provided"))?;

  let identity = gate.app.auth.verify(token)?;

  if !gate.roles.is_empty() && !identity.has_role(gate.roles) {
    debug!("User {} with role `{}` denied", identity.id, identity.role);
    return Err(Error::Forbidden);
  }

  request.extensions_mut().insert(identity);
  Ok(next.run(request).await)
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.trim().split_once(' ')?;
  let token = token.trim();

  (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
