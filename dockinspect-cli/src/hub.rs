//! Hub upload client.
//!
//! Posts the final inspection document to the Hub BOM import endpoint.
//! Proxy settings come from the `hub.proxy.*` options or, when no proxy host
//! is configured, from `-Dhttp(s).proxy.*=` entries in `SCAN_CLI_OPTS`.

use std::time::Duration;

use tracing::{debug, error, info};

use dockinspect_core::config::Config;
use dockinspect_inspector::InspectorError;

const BOM_IMPORT_PATH: &str = "/api/bom-import";
const BDIO_CONTENT_TYPE: &str = "application/ld+json";

/// Proxy settings for Hub connections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySettings {
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
}

impl ProxySettings {
    /// Resolves proxy settings from the configuration.
    ///
    /// `SCAN_CLI_OPTS` is consulted only when `hub.proxy.host` is blank.
    pub fn resolve(config: &Config, scan_cli_opts: Option<&str>) -> Self {
        let configured = Self {
            host: config.hub_proxy_host.clone(),
            port: config.hub_proxy_port.clone(),
            username: config.hub_proxy_username.clone(),
            password: config.hub_proxy_password.clone(),
        };
        match scan_cli_opts {
            Some(opts) if configured.host.trim().is_empty() && !opts.trim().is_empty() => {
                configured.with_scan_cli_opts(opts)
            }
            _ => configured,
        }
    }

    /// Overlays `-Dhttp.proxy.*=` / `-Dhttps.proxy.*=` entries onto these settings.
    pub fn with_scan_cli_opts(mut self, opts: &str) -> Self {
        for opt in opts.split_whitespace() {
            let Some((name, value)) = opt.split_once('=') else {
                continue;
            };
            let field = name
                .strip_prefix("-Dhttp.proxy.")
                .or_else(|| name.strip_prefix("-Dhttps.proxy."));
            match field {
                Some("host") => self.host = value.to_owned(),
                Some("port") => self.port = value.to_owned(),
                Some("username") => self.username = value.to_owned(),
                Some("password") => self.password = value.to_owned(),
                _ => {}
            }
        }
        self
    }

    pub fn is_configured(&self) -> bool {
        !self.host.trim().is_empty()
    }

    /// Proxy URL, e.g. `http://proxy.example.com:3128`.
    pub fn url(&self) -> String {
        if self.port.trim().is_empty() {
            format!("http://{}", self.host.trim())
        } else {
            format!("http://{}:{}", self.host.trim(), self.port.trim())
        }
    }
}

/// Credentials used for the import request.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Credentials {
    Token(String),
    Basic { username: String, password: String },
    None,
}

/// Hub BOM import client.
pub struct HubUploader {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl HubUploader {
    /// Builds an uploader when upload is enabled and a Hub URL is configured.
    pub fn from_config(
        config: &Config,
        scan_cli_opts: Option<&str>,
    ) -> Result<Option<Self>, InspectorError> {
        if !config.upload_bdio || config.hub_url.trim().is_empty() {
            debug!("hub upload disabled");
            return Ok(None);
        }
        Self::new(config, scan_cli_opts).map(Some)
    }

    /// Creates a new uploader for `hub.url`.
    pub fn new(config: &Config, scan_cli_opts: Option<&str>) -> Result<Self, InspectorError> {
        let base_url = config.hub_url.trim().trim_end_matches('/').to_owned();
        let upload_error = |reason: String| InspectorError::Upload {
            url: base_url.clone(),
            reason,
        };

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.hub_timeout_secs))
            .danger_accept_invalid_certs(config.hub_always_trust_cert);

        let proxy = ProxySettings::resolve(config, scan_cli_opts);
        if proxy.is_configured() {
            let mut reqwest_proxy = reqwest::Proxy::all(proxy.url())
                .map_err(|e| upload_error(format!("invalid proxy {}: {e}", proxy.url())))?;
            if !proxy.username.is_empty() {
                reqwest_proxy = reqwest_proxy.basic_auth(&proxy.username, &proxy.password);
            }
            debug!(proxy = %proxy.url(), "using proxy for hub connections");
            builder = builder.proxy(reqwest_proxy);
        }

        let client = builder
            .build()
            .map_err(|e| upload_error(format!("failed to build HTTP client: {e}")))?;

        let credentials = if !config.hub_api_token.is_empty() {
            Credentials::Token(config.hub_api_token.clone())
        } else if !config.hub_username.is_empty() {
            Credentials::Basic {
                username: config.hub_username.clone(),
                password: config.hub_password.clone(),
            }
        } else {
            Credentials::None
        };

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Uploads a BDIO document.
    pub async fn upload(&self, file_name: &str, document: &str) -> Result<(), InspectorError> {
        let url = format!("{}{}", self.base_url, BOM_IMPORT_PATH);
        debug!(url = %url, file = %file_name, bytes = document.len(), "uploading document");

        let request = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, BDIO_CONTENT_TYPE)
            .body(document.to_owned());
        let request = match &self.credentials {
            Credentials::Token(token) => request.bearer_auth(token),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            Credentials::None => request,
        };

        let response = request.send().await.map_err(|e| InspectorError::Upload {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Failed to upload document");
            return Err(InspectorError::Upload {
                url,
                reason: format!("{status} - {body}"),
            });
        }

        info!(file = %file_name, hub = %self.base_url, "uploaded document");
        Ok(())
    }
}
