//! [`EditorSink`] speaking the JOSM remote-control protocol.
//!
//! Commands become `GET {base}/load_object?objects=w123…` requests. JOSM
//! answers with a plain-text body that is ignored; only the status matters.

use std::time::Duration;

use log::debug;
use toponym_core::{EditorCommand, EditorSink, SinkError};
use url::Url;

use crate::http::{BlockingClient, ClientBuildError, DEFAULT_USER_AGENT};

/// Default remote-control endpoint of a local JOSM instance.
pub const DEFAULT_EDITOR_URL: &str = "http://127.0.0.1:8111";

const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Configuration for [`JosmSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JosmSinkConfig {
    /// Remote-control base URL.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for JosmSinkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EDITOR_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl JosmSinkConfig {
    /// Configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Sends editor commands to JOSM.
#[derive(Debug)]
pub struct JosmSink {
    http: BlockingClient,
    endpoint: Url,
}

impl JosmSink {
    /// Sink with default settings for `base_url`.
    ///
    /// # Errors
    /// Returns [`ClientBuildError`] if the URL is invalid or the client
    /// cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(JosmSinkConfig::new(base_url))
    }

    /// Sink with explicit configuration.
    ///
    /// # Errors
    /// Returns [`ClientBuildError`] if the URL is invalid or the client
    /// cannot be built.
    pub fn with_config(config: JosmSinkConfig) -> Result<Self, ClientBuildError> {
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|url| url.join("load_object"))
            .map_err(|source| ClientBuildError::InvalidUrl {
                url: config.base_url.clone(),
                source,
            })?;
        Ok(Self {
            http: BlockingClient::new(&config.user_agent, config.timeout)?,
            endpoint,
        })
    }

    /// Request URL for `command`.
    #[must_use]
    pub fn command_url(&self, command: &EditorCommand) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair(
                "objects",
                &format!("{}{}", command.object.kind.prefix(), command.object.id),
            );
            if let Some(new_layer) = command.new_layer {
                query.append_pair("new_layer", if new_layer { "true" } else { "false" });
            }
            if let Some((key, value)) = &command.add_tags {
                query.append_pair("addtags", &format!("{key}={value}"));
            }
            if let Some(name) = &command.layer_name {
                query.append_pair("layer_name", name);
            }
        }
        url
    }

    async fn submit_async(&self, url: Url) -> Result<(), SinkError> {
        let response = self
            .http
            .client()
            .get(url.clone())
            .send()
            .await
            .map_err(|err| SinkError::Unreachable {
                url: url.to_string(),
                message: err.to_string(),
            })?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SinkError::Rejected {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

impl EditorSink for JosmSink {
    fn submit(&self, command: &EditorCommand) -> Result<(), SinkError> {
        let url = self.command_url(command);
        debug!("editor request {url}");
        self.http.block_on(self.submit_async(url))
    }
}
