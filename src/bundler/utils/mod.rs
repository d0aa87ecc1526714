//! Shared file system and network helpers.

pub mod fs;
pub mod http;
