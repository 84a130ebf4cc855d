use crate::prelude::*;

pub const CENTS: f64 = 100.0;

/// Largest absolute amount, in currency units, accepted from clients.
pub const MAX_AMOUNT: f64 = 1e9;

/// Decimal amount from the API to integer cents, rounded half away from zero.
/// Saturates outside the `i64` range, see [`checked_cents`].
pub fn to_cents(amount: f64) -> i64 {
  (amount * CENTS).round() as i64
}

/// [`to_cents`] for untrusted input: `None` for non-finite amounts and
/// anything beyond [`MAX_AMOUNT`].
pub fn checked_cents(amount: f64) -> Option<i64> {
  let in_range = amount.is_finite() && amount.abs() <= MAX_AMOUNT;
  in_range.then(|| to_cents(amount))
}

pub fn from_cents(cents: i64) -> f64 {
  cents as f64 / CENTS
}

/// Parses a numeric path segment, e.g. `/api/products/{id}`.
pub fn parse_id(raw: &str, what: &str) -> Result<i32> {
  raw
    .trim()
    .parse()
    .map_err(|_| Error::InvalidArgs(format!("Invalid {what} id `{raw}`")))
}
