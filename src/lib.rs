//! # monitor-transfer
//!
//! Copies data-quality monitors from one data source to another on the
//! data-observability platform.
//!
//! A run lists the monitors attached to an origin data source (optionally
//! only those carrying a tag), saves each one in its declarative
//! (monitors-as-code) form, rewrites the copies so they target a destination
//! data source, and marks the originals with a "transferred" tag. The
//! rewritten documents are left in a directory, ready to be applied with the
//! platform's own CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Orchestrator                            │
//! │                                                                  │
//! │  MonitorApi ──▶ inventory (csv) ──▶ DocumentStore (origin yaml)  │
//! │      ▲                                      │                    │
//! │      │                                      ▼                    │
//! │  tag_monitor ◀── DocumentStore (dest) ◀── transform              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`config`]**: [`RunConfig`], layered from a file, the environment and CLI flags
//! - **[`inventory`]**: the `id,name,createdBy` CSV of monitors selected for transfer
//! - **[`store`]**: one YAML document per monitor on disk
//! - **[`transform`]**: retargeting of a document at the destination data source
//! - **[`orchestrator`]**: the pipeline itself, producing a [`RunReport`]
//! - **[`lock`]**: keeps two runs off the same directories
//!
//! ## Usage
//!
//! ```bash
//! MONITOR_TRANSFER_TOKEN=... monitor-transfer \
//!     --tenant onboarding \
//!     --origin-datasource 5d862786-4998-4091-baf9-c44a4383e48d \
//!     --destination-datasource 79a5e543-40b3-4651-b4e3-6eff5c38a447 \
//!     --origin-dir yaml_origin --destination-dir yaml_destination \
//!     --prefix "Source XYZ"
//! ```

pub mod config;
pub mod error;
pub mod inventory;
pub mod lock;
pub mod orchestrator;
pub mod report;
pub mod store;
pub mod transform;

// Re-export main types for convenience
pub use config::{ConfigError, RunConfig, TagAfter};
pub use error::TransferError;
pub use orchestrator::{Orchestrator, CONVERTED_PREFIX};
pub use report::{RunFailure, RunReport, RunStatus, Stage};
pub use store::{Document, DocumentStore, StoredDocument};
pub use transform::{transform, Retarget};
