pub mod feedback;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use user::UserRole;
