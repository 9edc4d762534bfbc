//! Run-level report: what a transfer did and what went wrong along the way.

use std::fmt;

use crate::error::TransferError;

/// Exit code of a clean run.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code when the origin has no matching monitors.
pub const EXIT_NO_MONITORS: u8 = 1;
/// Exit code when the run finished but recorded failures.
pub const EXIT_PARTIAL_FAILURE: u8 = 2;
/// Exit code when the run could not proceed at all.
pub const EXIT_FATAL: u8 = 3;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Cleaning,
    Listing,
    Inventorying,
    Fetching,
    Converting,
    Saving,
    Tagging,
    TransformAndCopy,
    Done,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Cleaning => "cleaning",
            Stage::Listing => "listing",
            Stage::Inventorying => "inventorying",
            Stage::Fetching => "fetching",
            Stage::Converting => "converting",
            Stage::Saving => "saving",
            Stage::Tagging => "tagging",
            Stage::TransformAndCopy => "transform-and-copy",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunStatus {
    /// Every stage ran (individual items may still have failed).
    #[default]
    Completed,
    /// Listing returned nothing; the run stopped early.
    NoMonitors,
    /// Listing itself failed; the run stopped early.
    ListingFailed,
}

/// A failure contained at the point it happened.
#[derive(Debug)]
pub struct RunFailure {
    pub stage: Stage,
    /// Monitor id, file or directory the failure is about.
    pub subject: String,
    pub error: TransferError,
}

/// Everything a run did.
#[derive(Debug, Default)]
pub struct RunReport {
    pub status: RunStatus,
    /// Files removed while cleaning the working directories.
    pub cleared: usize,
    /// Monitors returned by the listing.
    pub listed: usize,
    /// Monitor ids read from the inventory and attempted.
    pub attempted: usize,
    /// Monitor ids whose converted document was saved on the origin side.
    pub saved: Vec<String>,
    /// Monitor ids whose retargeted document was written to the destination.
    pub copied: Vec<String>,
    /// Monitor ids tagged as transferred.
    pub tagged: Vec<String>,
    /// Tag steps skipped because no transferred tag is configured.
    pub tags_skipped: usize,
    pub failures: Vec<RunFailure>,
}

impl RunReport {
    /// Log a failure and keep it for the final report.
    pub fn record(&mut self, stage: Stage, subject: impl Into<String>, error: TransferError) {
        let subject = subject.into();
        tracing::warn!(stage = %stage, subject = %subject, error = %error, "Step failed, skipping");
        self.failures.push(RunFailure {
            stage,
            subject,
            error,
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Failures recorded at `stage`.
    pub fn failures_at(&self, stage: Stage) -> impl Iterator<Item = &RunFailure> {
        self.failures.iter().filter(move |f| f.stage == stage)
    }

    /// Process exit code for this report.
    pub fn exit_code(&self) -> u8 {
        match self.status {
            RunStatus::ListingFailed => EXIT_FATAL,
            RunStatus::NoMonitors => EXIT_NO_MONITORS,
            RunStatus::Completed if self.has_failures() => EXIT_PARTIAL_FAILURE,
            RunStatus::Completed => EXIT_SUCCESS,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            RunStatus::NoMonitors => return writeln!(f, "No monitors found."),
            RunStatus::ListingFailed => {
                writeln!(f, "Listing origin monitors failed.")?;
            }
            RunStatus::Completed => {
                writeln!(f, "Converted {} monitors.", self.attempted)?;
                writeln!(
                    f,
                    "  listed: {}  saved: {}  copied: {}  tagged: {}",
                    self.listed,
                    self.saved.len(),
                    self.copied.len(),
                    self.tagged.len()
                )?;
            }
        }

        if self.has_failures() {
            writeln!(f, "{} failures:", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "  [{}] {}: {}", failure.stage, failure.subject, failure.error)?;
            }
        }

        if self.status == RunStatus::Completed && !self.copied.is_empty() {
            writeln!(
                f,
                "Create and apply a workspace from the destination directory with the platform CLI."
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_transfer_client::{ApiError, Operation};

    fn remote_failure() -> TransferError {
        TransferError::Remote(ApiError::Status {
            operation: Operation::FetchMonitor,
            status: 500,
        })
    }

    #[test]
    fn test_exit_codes() {
        let mut report = RunReport::default();
        assert_eq!(report.exit_code(), EXIT_SUCCESS);

        report.record(Stage::Fetching, "m2", remote_failure());
        assert_eq!(report.exit_code(), EXIT_PARTIAL_FAILURE);

        report.status = RunStatus::NoMonitors;
        assert_eq!(report.exit_code(), EXIT_NO_MONITORS);

        report.status = RunStatus::ListingFailed;
        assert_eq!(report.exit_code(), EXIT_FATAL);
    }

    #[test]
    fn test_failures_at_stage() {
        let mut report = RunReport::default();
        report.record(Stage::Fetching, "m2", remote_failure());
        report.record(Stage::Tagging, "m1", remote_failure());

        let fetching: Vec<_> = report.failures_at(Stage::Fetching).collect();
        assert_eq!(fetching.len(), 1);
        assert_eq!(fetching[0].subject, "m2");
    }

    #[test]
    fn test_summary_lists_failures() {
        let mut report = RunReport {
            listed: 2,
            attempted: 2,
            saved: vec!["m1".to_string()],
            copied: vec!["m1".to_string()],
            ..Default::default()
        };
        report.record(Stage::Fetching, "m2", remote_failure());

        let text = report.to_string();
        assert!(text.starts_with("Converted 2 monitors."));
        assert!(text.contains("[fetching] m2: remote error: fetch monitor failed with status 500"));
    }

    #[test]
    fn test_summary_no_monitors() {
        let report = RunReport {
            status: RunStatus::NoMonitors,
            ..Default::default()
        };
        assert_eq!(report.to_string(), "No monitors found.\n");
    }
}
