//! # monitor-transfer-client
//!
//! Client for the four monitor endpoints the transfer pipeline needs:
//! search, fetch detail, convert to code, and tag.
//!
//! [`MonitorApi`] is the seam the pipeline depends on; [`PlatformClient`] is
//! the reqwest implementation talking to `https://{tenant}.{domain}`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use monitor_transfer_client::{MonitorApi, PlatformClient};
//! use monitor_transfer_types::MonitorQuery;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PlatformClient::builder()
//!         .tenant("demo")
//!         .token("eyJhbGciOi...")
//!         .build()?;
//!
//!     let query = MonitorQuery::new("5d862786-4998-4091-baf9-c44a4383e48d");
//!     let monitors = client.list_monitors(&query, 500).await?;
//!
//!     println!("Found {} monitors", monitors.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;

pub use api::{MonitorApi, TagOutcome, MAX_PAGES};
pub use client::{PlatformClient, PlatformClientBuilder, DEFAULT_PLATFORM_DOMAIN};
pub use error::{ApiError, Operation};

// Re-export types for convenience
pub use monitor_transfer_types::{MonitorDetail, MonitorPage, MonitorQuery, MonitorSummary};
