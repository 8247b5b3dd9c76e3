//! Campaigns service for the Marketing API.
//!
//! Lists, creates, updates and deletes campaigns under an ad account.

mod requests;
mod service;

pub use requests::*;
pub use service::*;
