//! Quill Server
//!
//! Blogging API: accounts, posts, comments and tags, with ownership and
//! role-based authorization on every mutation.

pub mod api;
pub mod auth;
pub mod comments;
pub mod config;
pub mod db;
pub mod error;
pub mod permissions;
pub mod posts;
pub mod repository;
pub mod tags;
pub mod users;
pub mod util;
