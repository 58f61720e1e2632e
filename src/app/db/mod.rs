pub mod organizations;
pub mod plans;
pub mod profiles;
pub mod sessions;
pub mod subscriptions;
pub mod users;

pub use users::{find_by_email, NewUser, User};
