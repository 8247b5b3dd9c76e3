//! Ad accounts service for the Marketing API.
//!
//! Lists the ad accounts visible to the token and reads single accounts.

mod requests;
mod service;

pub use requests::*;
pub use service::*;
