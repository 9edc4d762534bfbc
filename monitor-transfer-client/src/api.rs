//! The platform operations the transfer pipeline relies on.

use async_trait::async_trait;
use monitor_transfer_types::{MonitorDetail, MonitorPage, MonitorQuery, MonitorSummary, TagPatch};

use crate::ApiError;

/// Upper bound on pages fetched by [`MonitorApi::list_monitors`].
pub const MAX_PAGES: u32 = 10_000;

/// Result of [`MonitorApi::tag_monitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagOutcome {
    Tagged,
    /// No tag was configured, nothing was sent.
    Skipped,
}

/// Monitor endpoints of the platform.
///
/// Implementors provide the four raw calls. Paging and the "no tag
/// configured" short-circuit are shared by every implementation.
#[async_trait]
pub trait MonitorApi: Send + Sync {
    /// Fetch one page of monitors matching `query`.
    async fn search_page(
        &self,
        query: &MonitorQuery,
        page: u32,
        items_per_page: u32,
    ) -> Result<MonitorPage, ApiError>;

    /// Fetch the full definition of a monitor.
    async fn fetch_monitor(&self, monitor_id: &str) -> Result<MonitorDetail, ApiError>;

    /// Convert a monitor definition into its declarative (monitors-as-code) form.
    async fn convert_to_code(&self, detail: &MonitorDetail) -> Result<serde_json::Value, ApiError>;

    /// Replace the tags of a monitor.
    async fn patch_tags(&self, monitor_id: &str, patch: &TagPatch) -> Result<(), ApiError>;

    /// Fetch every monitor matching `query`, one page at a time.
    ///
    /// When the platform reports `totalElements`, paging goes on until that
    /// many monitors arrived or a page comes back empty, so a server capping
    /// its page size below `page_size` does not truncate the listing.
    /// Without a total, a short page is the last one.
    async fn list_monitors(
        &self,
        query: &MonitorQuery,
        page_size: u32,
    ) -> Result<Vec<MonitorSummary>, ApiError> {
        let page_size = page_size.max(1);
        let mut monitors = Vec::new();

        for page in 0..MAX_PAGES {
            let batch = self.search_page(query, page, page_size).await?;
            let received = batch.data.len();
            monitors.extend(batch.data);

            tracing::debug!(page, received, total = ?batch.total_elements, "Received monitor page");

            let last_page = match batch.total_elements {
                Some(total) if monitors.len() as u64 >= total => true,
                Some(total) if received == 0 => {
                    tracing::warn!(
                        listed = monitors.len(),
                        total,
                        "Platform returned an empty page before the reported total"
                    );
                    true
                }
                Some(_) => false,
                None => received < page_size as usize,
            };
            if last_page {
                return Ok(monitors);
            }
        }

        tracing::warn!(
            pages = MAX_PAGES,
            monitors = monitors.len(),
            "Stopped paging before the platform signalled the last page"
        );
        Ok(monitors)
    }

    /// Mark a monitor with `tag_id`. Unset or empty tags are skipped without
    /// a request.
    async fn tag_monitor(
        &self,
        monitor_id: &str,
        tag_id: Option<&str>,
    ) -> Result<TagOutcome, ApiError> {
        match tag_id.filter(|tag| !tag.is_empty()) {
            None => Ok(TagOutcome::Skipped),
            Some(tag) => {
                self.patch_tags(monitor_id, &TagPatch::single(tag)).await?;
                Ok(TagOutcome::Tagged)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::Operation;

    /// Serves a fixed list of monitors in pages and records patch calls.
    struct PagedFake {
        monitors: Vec<MonitorSummary>,
        report_total: bool,
        /// Largest page the fake serves, whatever the caller asks for.
        max_page_size: Option<u32>,
        /// Reported instead of the real count when set.
        claimed_total: Option<u64>,
        pages_requested: Mutex<Vec<u32>>,
        patches: Mutex<Vec<(String, TagPatch)>>,
    }

    impl PagedFake {
        fn new(count: usize, report_total: bool) -> Self {
            Self {
                monitors: (0..count)
                    .map(|i| MonitorSummary::new(format!("m{i}"), format!("monitor {i}"), "ada"))
                    .collect(),
                report_total,
                max_page_size: None,
                claimed_total: None,
                pages_requested: Mutex::new(Vec::new()),
                patches: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MonitorApi for PagedFake {
        async fn search_page(
            &self,
            _query: &MonitorQuery,
            page: u32,
            items_per_page: u32,
        ) -> Result<MonitorPage, ApiError> {
            self.pages_requested.lock().unwrap().push(page);
            let items_per_page = self
                .max_page_size
                .map_or(items_per_page, |max| items_per_page.min(max));
            let start = (page * items_per_page) as usize;
            let data = self
                .monitors
                .iter()
                .skip(start)
                .take(items_per_page as usize)
                .cloned()
                .collect();
            Ok(MonitorPage {
                data,
                total_elements: self
                    .report_total
                    .then(|| self.claimed_total.unwrap_or(self.monitors.len() as u64)),
            })
        }

        async fn fetch_monitor(&self, _monitor_id: &str) -> Result<MonitorDetail, ApiError> {
            Err(ApiError::Status {
                operation: Operation::FetchMonitor,
                status: 500,
            })
        }

        async fn convert_to_code(
            &self,
            _detail: &MonitorDetail,
        ) -> Result<serde_json::Value, ApiError> {
            Ok(serde_json::Value::Null)
        }

        async fn patch_tags(&self, monitor_id: &str, patch: &TagPatch) -> Result<(), ApiError> {
            self.patches
                .lock()
                .unwrap()
                .push((monitor_id.to_string(), patch.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_list_pages_until_short_page() {
        let api = PagedFake::new(5, false);
        let monitors = api.list_monitors(&MonitorQuery::new("ds"), 2).await.unwrap();

        assert_eq!(monitors.len(), 5);
        assert_eq!(monitors[4].id.as_deref(), Some("m4"));
        assert_eq!(*api.pages_requested.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_list_exact_multiple_needs_empty_page_without_total() {
        let api = PagedFake::new(4, false);
        let monitors = api.list_monitors(&MonitorQuery::new("ds"), 2).await.unwrap();

        assert_eq!(monitors.len(), 4);
        assert_eq!(*api.pages_requested.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_list_stops_at_reported_total() {
        let api = PagedFake::new(4, true);
        let monitors = api.list_monitors(&MonitorQuery::new("ds"), 2).await.unwrap();

        assert_eq!(monitors.len(), 4);
        assert_eq!(*api.pages_requested.lock().unwrap(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_list_capped_pages_continue_to_reported_total() {
        let api = PagedFake {
            max_page_size: Some(3),
            ..PagedFake::new(7, true)
        };
        let monitors = api.list_monitors(&MonitorQuery::new("ds"), 5).await.unwrap();

        assert_eq!(monitors.len(), 7);
        assert_eq!(monitors[6].id.as_deref(), Some("m6"));
        assert_eq!(*api.pages_requested.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_list_empty_page_below_total_stops() {
        let api = PagedFake {
            claimed_total: Some(3),
            ..PagedFake::new(2, true)
        };
        let monitors = api.list_monitors(&MonitorQuery::new("ds"), 2).await.unwrap();

        assert_eq!(monitors.len(), 2);
        assert_eq!(*api.pages_requested.lock().unwrap(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_list_empty() {
        let api = PagedFake::new(0, true);
        let monitors = api.list_monitors(&MonitorQuery::new("ds"), 100).await.unwrap();
        assert!(monitors.is_empty());
    }

    #[tokio::test]
    async fn test_tag_monitor_skips_unset_tag() {
        let api = PagedFake::new(0, false);

        assert_eq!(api.tag_monitor("m1", None).await.unwrap(), TagOutcome::Skipped);
        assert_eq!(api.tag_monitor("m1", Some("")).await.unwrap(), TagOutcome::Skipped);
        assert!(api.patches.lock().unwrap().is_empty());

        assert_eq!(api.tag_monitor("m1", Some("t-9")).await.unwrap(), TagOutcome::Tagged);
        let patches = api.patches.lock().unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0], ("m1".to_string(), TagPatch::single("t-9")));
    }
}
