//! Monitor search request and response.

use serde::{Deserialize, Serialize};

use crate::MonitorSummary;

/// Sort order requested from the search endpoint.
pub const SORT_LAST_RUN_ASC: &str = "lastRunDate,ASC";

/// Domain scope covering every domain of the tenant.
pub const DOMAIN_ALL: &str = "All";

/// What to search for, independent of paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorQuery {
    /// Data source the monitors are attached to.
    pub datasource: String,
    /// Optional tag the monitors must carry.
    pub tag: Option<String>,
}

impl MonitorQuery {
    pub fn new(datasource: impl Into<String>) -> Self {
        Self {
            datasource: datasource.into(),
            tag: None,
        }
    }

    /// Restrict the query to a tag. Empty strings count as no tag.
    pub fn with_tag(mut self, tag: Option<&str>) -> Self {
        self.tag = tag.filter(|t| !t.is_empty()).map(str::to_string);
        self
    }
}

/// Body of the monitor search call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub text_search: String,
    pub criticality: Vec<u8>,
    pub datasource: Vec<String>,
    /// Omitted from the body entirely when no tag filter applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<Vec<String>>,
    pub sort: Vec<String>,
    pub items_per_page: u32,
    pub page: u32,
    pub domain: String,
}

impl SearchRequest {
    /// Build the request for one page of `query`.
    pub fn page(query: &MonitorQuery, page: u32, items_per_page: u32) -> Self {
        Self {
            text_search: String::new(),
            criticality: Vec::new(),
            datasource: vec![query.datasource.clone()],
            tag: query.tag.clone().map(|tag| vec![tag]),
            sort: vec![SORT_LAST_RUN_ASC.to_string()],
            items_per_page,
            page,
            domain: DOMAIN_ALL.to_string(),
        }
    }
}

/// Envelope of the monitor search response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub search_rules: MonitorPage,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorPage {
    #[serde(default)]
    pub data: Vec<MonitorSummary>,
    /// Total number of matches across all pages, when the platform reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_elements: Option<u64>,
}
