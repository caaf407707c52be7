//! Database repositories
//!
//! Every query touching collections or links is parameterized by the owning
//! user's id; delete operations filter on ownership in the same statement
//! that deletes, so the match-and-delete is atomic.

pub mod collection;
pub mod link;
pub mod user;

pub use collection::CollectionRepository;
pub use link::LinkRepository;
pub use user::UserRepository;
