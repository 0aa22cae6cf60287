pub mod auth_service;
pub mod credential_store;
pub mod organization_service;
pub mod password;
pub mod token_service;

pub use auth_service::SessionManager;
pub use credential_store::MongoCredentialStore;
pub use password::BcryptHasher;
pub use token_service::{Claims, TokenCodec};
