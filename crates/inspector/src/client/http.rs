//! Image inspector service HTTP API.
//!
//! Both service strategies talk to the same two endpoints:
//! - `GET {base}/health`
//! - `GET {base}/getbdio?tarfile=..&resultingcontainerfspath=..&cleanup=..`
//!
//! The response body of `getbdio` is the inspection document. It is only
//! checked for being JSON; its content is opaque here.

use std::time::Duration;

use tracing::{debug, error};

use crate::error::InspectorError;

const HEALTH_PATH: &str = "health";
const GET_BDIO_PATH: &str = "getbdio";
const MAX_REDIRECTS: usize = 10;

/// Parameters of one `getbdio` call. Paths are container-side paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BdioQuery {
    pub tarfile: String,
    pub resulting_container_fs_path: String,
    pub cleanup: bool,
    pub image_repo: String,
    pub image_tag: String,
    pub hub_project_name: String,
    pub hub_project_version: String,
    pub codelocation_prefix: String,
}

impl BdioQuery {
    /// Query pairs; optional values are omitted when blank.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("tarfile", self.tarfile.clone()),
            (
                "resultingcontainerfspath",
                self.resulting_container_fs_path.clone(),
            ),
            ("cleanup", self.cleanup.to_string()),
        ];
        for (name, value) in [
            ("imagerepo", &self.image_repo),
            ("imagetag", &self.image_tag),
            ("hubprojectname", &self.hub_project_name),
            ("hubprojectversion", &self.hub_project_version),
            ("codelocationprefix", &self.codelocation_prefix),
        ] {
            if !value.trim().is_empty() {
                pairs.push((name, value.trim().to_owned()));
            }
        }
        pairs
    }
}

/// HTTP client for one image inspector service.
#[derive(Debug, Clone)]
pub struct ImageInspectorApi {
    client: reqwest::Client,
    base_url: String,
}

impl ImageInspectorApi {
    /// Creates a client; every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, InspectorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| InspectorError::RemoteInspectionFailed {
                url: base_url.to_owned(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Returns true if the health endpoint answers with a 2xx status.
    pub async fn is_healthy(&self) -> bool {
        let url = self.endpoint(HEALTH_PATH);
        match self.client.get(&url).send().await {
            Ok(response) => {
                let healthy = response.status().is_success();
                debug!(url = %url, status = %response.status(), healthy, "health check");
                healthy
            }
            Err(e) => {
                debug!(url = %url, error = %e, "health check failed");
                false
            }
        }
    }

    /// Requests the inspection document for an archive.
    pub async fn get_bdio(&self, query: &BdioQuery) -> Result<String, InspectorError> {
        let url = self.endpoint(GET_BDIO_PATH);
        debug!(url = %url, tarfile = query.tarfile.as_str(), "requesting inspection document");

        let failed = |reason: String| InspectorError::RemoteInspectionFailed {
            url: url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .query(&query.pairs())
            .send()
            .await
            .map_err(|e| failed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "image inspector service returned an error");
            return Err(failed(format!("status {status}: {body}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| failed(format!("failed to read response body: {e}")))?;

        if let Err(e) = serde_json::from_str::<serde_json::Value>(&body) {
            return Err(failed(format!("response is not a JSON document: {e}")));
        }

        debug!(bytes = body.len(), "received inspection document");
        Ok(body)
    }
}
