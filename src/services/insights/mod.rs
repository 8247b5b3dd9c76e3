//! Insights service for the Marketing API.
//!
//! Reads performance rows for accounts and campaigns, singly or batched.

mod requests;
mod service;

pub use requests::*;
pub use service::*;
