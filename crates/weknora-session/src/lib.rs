//! WeKnora Session Management
//!
//! - A realm (admin or end-user) owns exactly one credential bundle
//! - Bundles are mirrored to durable storage on every mutation
//! - Hydration at startup tolerates missing or corrupt slots
//! - The two realms never share or synchronise state

mod error;
mod realm;
mod store;
mod user;

pub use error::SessionError;
pub use realm::{Realm, StorageKeys};
pub use store::SessionStore;
pub use user::{CredentialBundle, UserInfo};

pub type Result<T> = std::result::Result<T, SessionError>;
