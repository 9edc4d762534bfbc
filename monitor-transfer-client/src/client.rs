//! reqwest implementation of [`MonitorApi`].
//!
//! Every call authenticates with a bearer token and treats any status other
//! than `200 OK` as an [`ApiError::Status`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use monitor_transfer_client::{MonitorApi, PlatformClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PlatformClient::builder()
//!         .tenant("onboarding")
//!         .token("eyJhbGciOi...")
//!         .timeout(Duration::from_secs(10))
//!         .build()?;
//!
//!     let detail = client.fetch_monitor("9ad958f1-913e-46eb-8e7a-cefd57f46a19").await?;
//!     let code = client.convert_to_code(&detail).await?;
//!     println!("{}", code);
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response, StatusCode};

use monitor_transfer_types::{
    MonitorDetail, MonitorPage, MonitorQuery, SearchRequest, SearchResponse, TagPatch,
};

use crate::{ApiError, MonitorApi, Operation};

/// Domain the tenant subdomain is prefixed to.
pub const DEFAULT_PLATFORM_DOMAIN: &str = "siffletdata.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the platform's monitor endpoints.
#[derive(Clone)]
pub struct PlatformClient {
    client: Client,
    base_url: String,
    token: String,
}

impl PlatformClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> PlatformClientBuilder {
        PlatformClientBuilder::default()
    }

    /// Root URL every endpoint path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn rule_url(&self, monitor_id: &str) -> String {
        self.url(&format!("/api/ui/v1/rules/{}", encode_segment(monitor_id)))
    }
}

impl fmt::Debug for PlatformClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl MonitorApi for PlatformClient {
    async fn search_page(
        &self,
        query: &MonitorQuery,
        page: u32,
        items_per_page: u32,
    ) -> Result<MonitorPage, ApiError> {
        let request = SearchRequest::page(query, page, items_per_page);

        let response = self
            .client
            .post(self.url("/api/v1/monitors"))
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await?;
        let response = expect_ok(Operation::ListMonitors, response)?;

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(body.search_rules)
    }

    async fn fetch_monitor(&self, monitor_id: &str) -> Result<MonitorDetail, ApiError> {
        let response = self
            .client
            .get(self.rule_url(monitor_id))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let response = expect_ok(Operation::FetchMonitor, response)?;

        let detail: MonitorDetail = response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))?;

        Ok(detail)
    }

    async fn convert_to_code(&self, detail: &MonitorDetail) -> Result<serde_json::Value, ApiError> {
        let response = self
            .client
            .post(self.url("/api/ui/v1/rules/_convert-to-code"))
            .bearer_auth(&self.token)
            .json(detail)
            .send()
            .await?;
        let response = expect_ok(Operation::ConvertToCode, response)?;

        response
            .json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn patch_tags(&self, monitor_id: &str, patch: &TagPatch) -> Result<(), ApiError> {
        let response = self
            .client
            .patch(self.rule_url(monitor_id))
            .bearer_auth(&self.token)
            .json(patch)
            .send()
            .await?;
        expect_ok(Operation::TagMonitor, response)?;
        Ok(())
    }
}

fn expect_ok(operation: Operation, response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status != StatusCode::OK {
        tracing::debug!(%operation, status = status.as_u16(), url = %response.url(), "Unexpected status");
        return Err(ApiError::Status {
            operation,
            status: status.as_u16(),
        });
    }
    Ok(response)
}

/// Builder for [`PlatformClient`].
#[derive(Debug, Default)]
pub struct PlatformClientBuilder {
    tenant: Option<String>,
    platform_domain: Option<String>,
    base_url: Option<String>,
    token: Option<String>,
    timeout: Option<Duration>,
}

impl PlatformClientBuilder {
    /// Set the tenant, i.e. the `demo` in `https://demo.siffletdata.com`.
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Set the domain the tenant is a subdomain of (default: `siffletdata.com`).
    pub fn platform_domain(mut self, domain: impl Into<String>) -> Self {
        self.platform_domain = Some(domain.into());
        self
    }

    /// Use a full base URL instead of deriving it from the tenant.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the API bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the per-request timeout (default: 30 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<PlatformClient, ApiError> {
        let base_url = match (self.base_url, self.tenant) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(tenant)) if !tenant.is_empty() => {
                let domain = self
                    .platform_domain
                    .unwrap_or_else(|| DEFAULT_PLATFORM_DOMAIN.to_string());
                format!("https://{}.{}", tenant, domain)
            }
            _ => return Err(ApiError::Config("a tenant or base URL is required".to_string())),
        };

        let token = self
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Config("an API token is required".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(PlatformClient {
            client,
            base_url,
            token,
        })
    }
}

// Escape characters that would change the path structure
fn encode_segment(s: &str) -> String {
    s.replace('%', "%25")
        .replace('/', "%2F")
        .replace('?', "%3F")
        .replace('#', "%23")
}
