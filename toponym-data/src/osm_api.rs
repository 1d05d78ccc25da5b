//! [`EntityFetcher`] backed by the OpenStreetMap API 0.6.
//!
//! `GET {base}/api/0.6/{kind}/{id}` returns an `<osm>` document holding the
//! current version of the element. HTTP 404 and 410 mean the element is gone.
//!
//! # Example
//!
//! ```no_run
//! use toponym_core::{EntityFetcher, EntityKind};
//! use toponym_data::HttpEntityFetcher;
//!
//! let fetcher = HttpEntityFetcher::new("https://api.openstreetmap.org")?;
//! let outcome = fetcher.fetch(EntityKind::Way, 42)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::time::Duration;

use log::debug;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use reqwest::StatusCode;
use toponym_core::{EntityFetcher, EntityKind, EntityRef, FetchError, FetchOutcome, Tags};

use crate::http::{BlockingClient, ClientBuildError, DEFAULT_USER_AGENT, join_url};

/// Default API endpoint.
pub const DEFAULT_OSM_API_URL: &str = "https://api.openstreetmap.org";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`HttpEntityFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpEntityFetcherConfig {
    /// API base URL, without the `/api/0.6` suffix.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for HttpEntityFetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OSM_API_URL.to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl HttpEntityFetcherConfig {
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

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Fetches current tags from the OpenStreetMap API.
#[derive(Debug)]
pub struct HttpEntityFetcher {
    http: BlockingClient,
    config: HttpEntityFetcherConfig,
}

impl HttpEntityFetcher {
    /// Fetcher with default settings for `base_url`.
    ///
    /// # Errors
    /// Returns [`ClientBuildError`] if the client or runtime cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(HttpEntityFetcherConfig::new(base_url))
    }

    /// Fetcher with explicit configuration.
    ///
    /// # Errors
    /// Returns [`ClientBuildError`] if the client or runtime cannot be built,
    /// or the base URL is invalid.
    pub fn with_config(config: HttpEntityFetcherConfig) -> Result<Self, ClientBuildError> {
        url::Url::parse(&config.base_url).map_err(|source| ClientBuildError::InvalidUrl {
            url: config.base_url.clone(),
            source,
        })?;
        Ok(Self {
            http: BlockingClient::new(&config.user_agent, config.timeout)?,
            config,
        })
    }

    fn element_url(&self, kind: EntityKind, id: i64) -> String {
        join_url(&self.config.base_url, &format!("api/0.6/{kind}/{id}"))
    }

    async fn fetch_async(&self, kind: EntityKind, id: i64) -> Result<FetchOutcome, FetchError> {
        let url = self.element_url(kind, id);
        debug!("fetching {url}");
        let response = self
            .http
            .client()
            .get(&url)
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            return Ok(FetchOutcome::Gone);
        }
        let response = response
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        let body = response
            .text()
            .await
            .map_err(|err| self.convert_reqwest_error(&err, &url))?;
        parse_element(&body, EntityRef::new(kind, id), &url).map(FetchOutcome::Found)
    }

    fn convert_reqwest_error(&self, error: &reqwest::Error, url: &str) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }
        if let Some(status) = error.status() {
            return FetchError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.to_string(),
            };
        }
        FetchError::Network {
            url: url.to_owned(),
            message: error.to_string(),
        }
    }
}

impl EntityFetcher for HttpEntityFetcher {
    fn fetch(&self, kind: EntityKind, id: i64) -> Result<FetchOutcome, FetchError> {
        self.http.block_on(self.fetch_async(kind, id))
    }
}

/// Extract the tags of `entity` from an `<osm>` document.
fn parse_element(body: &str, entity: EntityRef, url: &str) -> Result<Tags, FetchError> {
    let parse_error = |message: String| FetchError::Parse {
        url: url.to_owned(),
        message,
    };
    let kind = entity.kind.as_str().as_bytes();
    let mut reader = Reader::from_str(body);
    let mut tags: Option<Tags> = None;

    loop {
        match reader.read_event().map_err(|err| parse_error(err.to_string()))? {
            Event::Start(element) if element.name().as_ref() == kind => {
                if element_id(&element, url)? == Some(entity.id) {
                    tags = Some(Tags::new());
                }
            }
            Event::Empty(element) if element.name().as_ref() == kind => {
                if element_id(&element, url)? == Some(entity.id) {
                    return Ok(Tags::new());
                }
            }
            Event::Empty(element) | Event::Start(element) if element.name().as_ref() == b"tag" => {
                if let Some(current) = tags.as_mut() {
                    let (key, value) = tag_pair(&element, url)?;
                    current.insert(key, value);
                }
            }
            Event::End(element) if element.name().as_ref() == kind => {
                if let Some(found) = tags.take() {
                    return Ok(found);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Err(FetchError::MissingElement {
        url: url.to_owned(),
        entity,
    })
}

fn attribute(element: &BytesStart<'_>, name: &[u8], url: &str) -> Result<Option<String>, FetchError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|err| FetchError::Parse {
            url: url.to_owned(),
            message: err.to_string(),
        })?;
        if attr.key.as_ref() == name {
            let value = attr.unescape_value().map_err(|err| FetchError::Parse {
                url: url.to_owned(),
                message: err.to_string(),
            })?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn element_id(element: &BytesStart<'_>, url: &str) -> Result<Option<i64>, FetchError> {
    attribute(element, b"id", url)?
        .map(|raw| {
            raw.parse().map_err(|_| FetchError::Parse {
                url: url.to_owned(),
                message: format!("invalid element id {raw:?}"),
            })
        })
        .transpose()
}

fn tag_pair(element: &BytesStart<'_>, url: &str) -> Result<(String, String), FetchError> {
    let missing = |name: &str| FetchError::Parse {
        url: url.to_owned(),
        message: format!("tag without {name} attribute"),
    };
    let key = attribute(element, b"k", url)?.ok_or_else(|| missing("k"))?;
    let value = attribute(element, b"v", url)?.ok_or_else(|| missing("v"))?;
    Ok((key, value))
}
