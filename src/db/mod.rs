pub mod federated_users;
pub mod nonlocal_users;
pub mod users;
