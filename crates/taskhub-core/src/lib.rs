//! Core domain logic for taskhub: ownership resolution, human-readable code
//! generation, entity services, and the task-access request workflow.
//!
//! Everything here is transport-agnostic. Operations take an authenticated
//! [`Principal`] (produced by the auth layer, which is out of scope) and a
//! [`Store`](taskhub_storage::Store) handle; routing, sessions, and
//! serialization live elsewhere.

pub mod access;
pub mod chat;
pub mod codes;
mod error;
mod principal;
pub mod projects;
pub mod requests;
pub mod stats;
pub mod tasks;
pub mod users;

pub use error::{CoreError, CoreResult};
pub use principal::Principal;
