//! Service implementations for Marketing API endpoints.
//!
//! Each service module validates its inputs locally and then delegates to
//! [`MetaBusinessClient`](crate::client::MetaBusinessClient).

pub mod ad_accounts;
pub mod campaigns;
pub mod endpoints;
pub mod insights;
pub mod validation;

pub use ad_accounts::AdAccountsService;
pub use campaigns::CampaignsService;
pub use endpoints::MetaEndpoints;
pub use insights::InsightsService;
