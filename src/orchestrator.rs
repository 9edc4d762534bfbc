//! The transfer pipeline.
//!
//! ```text
//! CLEANING ─▶ LISTING ─▶ INVENTORYING ─▶ per id: FETCHING ─▶ CONVERTING ─▶ SAVING
//!                │                                                      │
//!                └─▶ (empty / failed: stop)                 (tag_after = convert: TAGGING)
//!                                                                       │
//!                          TRANSFORM_AND_COPY ◀────────────────────────┘
//!                                  │
//!                  (tag_after = copy: TAGGING) ─▶ DONE
//! ```
//!
//! Stages run strictly in order on a single task. Failures are contained at
//! the item they concern and recorded in the [`RunReport`].

use monitor_transfer_client::{MonitorApi, TagOutcome};
use monitor_transfer_types::MonitorQuery;

use crate::config::{RunConfig, TagAfter};
use crate::error::{Result, TransferError};
use crate::inventory::{read_inventory_ids, write_inventory};
use crate::lock::RunLock;
use crate::report::{RunReport, RunStatus, Stage};
use crate::store::{document_from_json, DocumentStore};
use crate::transform::{transform, Retarget};

/// Prefix of destination document names.
pub const CONVERTED_PREFIX: &str = "converted-";

/// Runs a transfer against a [`MonitorApi`].
#[derive(Debug)]
pub struct Orchestrator<A> {
    api: A,
    config: RunConfig,
}

impl<A: MonitorApi> Orchestrator<A> {
    pub fn new(api: A, config: RunConfig) -> Self {
        Self { api, config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Run every stage once.
    ///
    /// Only failing to lock the working directories is returned as an
    /// error; everything else ends up in the report.
    pub async fn run(&self) -> Result<RunReport> {
        let _lock = RunLock::acquire(&[
            self.config.origin_dir.as_path(),
            self.config.destination_dir.as_path(),
        ])?;

        let origin = DocumentStore::new(&self.config.origin_dir);
        let destination = DocumentStore::new(&self.config.destination_dir);
        let mut report = RunReport::default();

        self.clean(&[&origin, &destination], &mut report);

        let query = MonitorQuery::new(&self.config.origin_datasource)
            .with_tag(self.config.filter_tag.as_deref());
        tracing::info!(
            stage = %Stage::Listing,
            datasource = %query.datasource,
            tag = ?query.tag,
            "Listing origin monitors"
        );
        let monitors = match self.api.list_monitors(&query, self.config.page_size).await {
            Ok(monitors) => monitors,
            Err(e) => {
                report.record(Stage::Listing, &self.config.origin_datasource, e.into());
                report.status = RunStatus::ListingFailed;
                return Ok(report);
            }
        };
        report.listed = monitors.len();

        let inventory_path = self.config.inventory_path();
        tracing::info!(
            stage = %Stage::Inventorying,
            monitors = monitors.len(),
            file = %inventory_path.display(),
            "Writing inventory"
        );
        if let Err(e) = write_inventory(&monitors, &inventory_path) {
            report.record(Stage::Inventorying, inventory_path.display().to_string(), e);
        }

        if monitors.is_empty() {
            tracing::info!("No monitors found");
            report.status = RunStatus::NoMonitors;
            return Ok(report);
        }

        let ids = match read_inventory_ids(&inventory_path) {
            Ok(ids) => ids,
            Err(e) => {
                report.record(Stage::Inventorying, inventory_path.display().to_string(), e);
                monitors
                    .iter()
                    .filter_map(|m| m.id.clone())
                    .filter(|id| !id.is_empty())
                    .collect()
            }
        };
        report.attempted = ids.len();

        tracing::info!(stage = %Stage::Fetching, monitors = ids.len(), "Requesting monitor details");
        for monitor_id in &ids {
            if self.stage_monitor(monitor_id, &origin, &mut report).await
                && self.config.tag_after == TagAfter::Convert
            {
                self.tag(monitor_id, &mut report).await;
            }
        }

        self.transform_and_copy(&origin, &destination, &mut report);

        if self.config.tag_after == TagAfter::Copy {
            for monitor_id in report.copied.clone() {
                self.tag(&monitor_id, &mut report).await;
            }
        }

        report.status = RunStatus::Completed;
        tracing::info!(
            stage = %Stage::Done,
            attempted = report.attempted,
            copied = report.copied.len(),
            failures = report.failures.len(),
            "Transfer finished"
        );
        Ok(report)
    }

    fn clean(&self, stores: &[&DocumentStore], report: &mut RunReport) {
        for store in stores {
            tracing::info!(stage = %Stage::Cleaning, dir = %store.dir().display(), "Cleaning directory");
            let summary = store.clear();
            report.cleared += summary.removed;
            for error in summary.failures {
                report.record(Stage::Cleaning, store.dir().display().to_string(), error);
            }
        }
    }

    /// Fetch, convert and save one monitor. Returns whether it was saved.
    async fn stage_monitor(
        &self,
        monitor_id: &str,
        origin: &DocumentStore,
        report: &mut RunReport,
    ) -> bool {
        let detail = match self.api.fetch_monitor(monitor_id).await {
            Ok(detail) => detail,
            Err(e) => {
                report.record(Stage::Fetching, monitor_id, e.into());
                return false;
            }
        };

        let code = match self.api.convert_to_code(&detail).await {
            Ok(code) => code,
            Err(e) => {
                report.record(Stage::Converting, monitor_id, e.into());
                return false;
            }
        };

        let document = match document_from_json(code) {
            Ok(document) => document,
            Err(source) => {
                let error = TransferError::Serialization {
                    path: origin.path_for(monitor_id),
                    source,
                };
                report.record(Stage::Converting, monitor_id, error);
                return false;
            }
        };

        match origin.save(monitor_id, &document) {
            Ok(path) => {
                tracing::info!(monitor_id, file = %path.display(), "Saved converted monitor");
                report.saved.push(monitor_id.to_string());
                true
            }
            Err(e) => {
                report.record(Stage::Saving, monitor_id, e);
                false
            }
        }
    }

    fn transform_and_copy(
        &self,
        origin: &DocumentStore,
        destination: &DocumentStore,
        report: &mut RunReport,
    ) {
        tracing::info!(
            stage = %Stage::TransformAndCopy,
            dir = %destination.dir().display(),
            "Retargeting monitors"
        );
        let target = Retarget::new(&self.config.prefix, &self.config.destination_datasource);

        let documents = match origin.load_all() {
            Ok(documents) => documents,
            Err(e) => {
                report.record(Stage::TransformAndCopy, origin.dir().display().to_string(), e);
                return;
            }
        };

        for loaded in documents {
            let stored = match loaded {
                Ok(stored) => stored,
                Err(e) => {
                    report.record(Stage::TransformAndCopy, origin.dir().display().to_string(), e);
                    continue;
                }
            };
            let monitor_id = stored.base_name().to_string();

            let converted = match transform(stored.document, &target, &stored.file_name) {
                Ok(converted) => converted,
                Err(e) => {
                    report.record(Stage::TransformAndCopy, &stored.file_name, e);
                    continue;
                }
            };

            let name = format!("{}{}", CONVERTED_PREFIX, monitor_id);
            match destination.save(&name, &converted) {
                Ok(path) => {
                    tracing::info!(monitor_id = %monitor_id, file = %path.display(), "Copied monitor");
                    if report.saved.contains(&monitor_id) {
                        report.copied.push(monitor_id);
                    }
                }
                Err(e) => report.record(Stage::TransformAndCopy, &stored.file_name, e),
            }
        }
    }

    async fn tag(&self, monitor_id: &str, report: &mut RunReport) {
        match self
            .api
            .tag_monitor(monitor_id, self.config.transferred_tag.as_deref())
            .await
        {
            Ok(TagOutcome::Tagged) => {
                tracing::info!(stage = %Stage::Tagging, monitor_id, "Tagged monitor as transferred");
                report.tagged.push(monitor_id.to_string());
            }
            Ok(TagOutcome::Skipped) => {
                tracing::debug!(monitor_id, "No transferred tag configured, skipping tag");
                report.tags_skipped += 1;
            }
            Err(e) => report.record(Stage::Tagging, monitor_id, e.into()),
        }
    }
}
