//! Data models for the campus tree catalog.
//!
//! Wire-facing models serialize as camelCase for the web client.

mod admin;
mod tree;

pub use admin::*;
pub use tree::*;
