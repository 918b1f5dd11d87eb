pub mod federated_user;
pub mod nonlocal_user;
pub mod user;

pub use federated_user::NewFederatedUser;
pub use nonlocal_user::{NewNonLocalUser, UserAttrs};
pub use user::{UserRow, UserView, filter_user};
