//! Type definitions for taskhub storage.

mod chat;
mod codes;
mod ids;
mod projects;
mod requests;
mod roles;
mod tasks;
mod users;

// Re-export all types from submodules
pub use chat::*;
pub use codes::*;
pub use ids::*;
pub use projects::*;
pub use requests::*;
pub use roles::*;
pub use tasks::*;
pub use users::*;
