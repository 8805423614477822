// ABOUTME: Data layer for userreg
// ABOUTME: SQLite-backed user registration store with uniqueness and authentication

pub mod error;
pub mod password;
pub mod types;
pub mod users;

pub use error::{StorageError, StorageResult};
pub use password::PasswordScheme;
pub use types::{NewUser, User};
pub use users::{StoreConfig, UserStore};
