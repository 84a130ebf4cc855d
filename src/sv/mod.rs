pub mod auth;
pub mod fallback;
pub mod feedback;
pub mod order;
pub mod product;
#[cfg(test)]
pub mod test_utils;
pub mod user;

pub use auth::{Auth, Identity};
pub use fallback::Fallback;
pub use feedback::Feedback;
pub use order::Order;
pub use product::Product;
pub use user::User;
