use bytes::Bytes;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};

use crate::config::FilterConfig;
use crate::error::{FilterError, Result};

/// Downloads the complete payload behind a URL.
///
/// Parquet needs random access to its footer, so a remote source is buffered
/// whole before the lazy scan is built over it.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// Blocking HTTP transport with a fixed `User-Agent` / `Referer` pair.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, referer: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value(user_agent)?);
        headers.insert(REFERER, header_value(referer)?);

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|source| FilterError::Transport {
                url: String::new(),
                source,
            })?;
        Ok(Self { client })
    }

    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        Self::new(&config.user_agent, &config.referer)
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| FilterError::Config {
        path: "<http headers>".into(),
        message: format!("invalid header value {value:?}: {e}"),
    })
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Bytes> {
        log::info!("fetching {url}");
        let transport = |source| FilterError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FilterError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(transport)?;
        log::debug!("fetched {} bytes from {url}", body.len());
        Ok(body)
    }
}
