//! # monitor-transfer-types
//!
//! Wire types for the monitor endpoints of the data-observability platform.
//!
//! Only the fields the transfer pipeline reads are modelled. Everything else
//! the platform returns (monitor details, converted code) stays an opaque
//! [`serde_json::Value`] so that it round-trips without loss.
//!
//! ## Example
//!
//! ```rust
//! use monitor_transfer_types::{MonitorQuery, SearchRequest};
//!
//! let query = MonitorQuery::new("5d862786-origin").with_tag(Some("07247885-tag"));
//! let request = SearchRequest::page(&query, 0, 500);
//!
//! let body = serde_json::to_value(&request).unwrap();
//! assert_eq!(body["datasource"][0], "5d862786-origin");
//! assert_eq!(body["tag"][0], "07247885-tag");
//! ```

mod monitor;
mod query;

pub use monitor::*;
pub use query::*;

/// Placeholder written for fields the platform left out.
pub const N_A: &str = "N/A";
