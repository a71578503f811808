//! Permission system types and utilities.
//!
//! - Roles: platform-wide `User < Moderator < Admin`
//! - Ownership: who may edit or delete a post or comment

pub mod ownership;
pub mod role;

pub use ownership::{
    can_delete, can_edit, require_delete, require_edit, Actor, OwnedResource, PermissionError,
};
pub use role::{Role, UnknownRole};
