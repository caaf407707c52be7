//! API service models

pub mod collection;
pub mod link;
pub mod user;

// Re-export for convenience
pub use collection::{Collection, CollectionWithLinks, CreateCollectionRequest};
pub use link::{CreateLinkRequest, Link};
pub use user::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User, UserSummary};
