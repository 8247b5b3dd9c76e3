//! Common types for the Graph and Marketing APIs.
//!
//! Defines shared data structures used across services.

use serde::{Deserialize, Serialize};

pub mod account;
pub mod batch;
pub mod campaign;
pub mod insights;
pub mod params;

pub use account::*;
pub use batch::{BatchHeader, BatchRequestItem, BatchResponseItem, MAX_BATCH_SIZE};
pub use campaign::*;
pub use insights::*;
pub use params::*;

/// Cursor pair for edge pagination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursors {
    /// Cursor of the first item
    #[serde(default)]
    pub before: Option<String>,
    /// Cursor of the last item
    #[serde(default)]
    pub after: Option<String>,
}

/// Paging block of an edge response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Cursors
    #[serde(default)]
    pub cursors: Option<Cursors>,
    /// Absolute URL of the next page
    #[serde(default)]
    pub next: Option<String>,
    /// Absolute URL of the previous page
    #[serde(default)]
    pub previous: Option<String>,
}

/// A page of an edge, e.g. `/me/adaccounts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Paging information
    #[serde(default)]
    pub paging: Option<Paging>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            paging: None,
        }
    }
}

impl<T> Page<T> {
    /// Cursor to pass as `after` for the next page, if there is one
    pub fn next_cursor(&self) -> Option<&str> {
        let paging = self.paging.as_ref()?;
        paging.next.as_ref()?;
        paging.cursors.as_ref()?.after.as_deref()
    }

    /// Whether another page exists
    pub fn has_next(&self) -> bool {
        self.next_cursor().is_some()
    }
}

/// `{"success": true}` acknowledgement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    /// Whether the operation was applied
    #[serde(default)]
    pub success: bool,
}

/// `{"id": "..."}` returned when an object is created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedObject {
    /// ID of the new object
    pub id: String,
}
