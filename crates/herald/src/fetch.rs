// ABOUTME: HTTP fetch layer: browser-like request profile, single attempts, and bounded retry.
// ABOUTME: Handles content-length limits and charset decoding of the downloaded body.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::error::ScrapeError;
use crate::options::ScraperOptions;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Desktop Chrome on Windows.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_HEADERS: [(&str, &str); 6] = [
    ("user-agent", DEFAULT_USER_AGENT),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.5"),
    ("connection", "keep-alive"),
    ("upgrade-insecure-requests", "1"),
    ("cache-control", "max-age=0"),
];

/// A successfully downloaded page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchedPage {
    /// Decode the body as text, using the charset from the content-type header
    /// or detection when absent.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Issues GET requests with a fixed header profile and retries failed attempts.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    headers: HeaderMap,
    timeout: Duration,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Fetcher {
    /// Build a fetcher from scraper options. Uses `opts.http_client` when set;
    /// `opts.timeout` bounds every attempt either way.
    pub fn new(opts: &ScraperOptions) -> Result<Self, ScrapeError> {
        let headers = build_headers(&opts.headers)?;
        let client = match opts.http_client {
            Some(ref client) => client.clone(),
            None => reqwest::Client::builder()
                .timeout(opts.timeout)
                .cookie_store(true)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .map_err(|e| {
                    ScrapeError::fetch("", "BuildClient", Some(anyhow::anyhow!(e)))
                })?,
        };
        Ok(Self {
            client,
            headers,
            timeout: opts.timeout,
            max_attempts: opts.max_attempts.max(1),
            retry_delay: opts.retry_delay,
        })
    }

    /// Number of attempts `fetch` makes before giving up.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fetch `url`, retrying failed attempts after a fixed delay.
    ///
    /// Invalid URLs fail immediately. Otherwise the error of the last attempt
    /// is returned once all attempts are used up.
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
        let mut attempt = 1;
        loop {
            match self.fetch_once(url).await {
                Ok(page) => return Ok(page),
                Err(err) if err.is_invalid_url() => return Err(err),
                Err(err) => {
                    warn!(
                        url,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "fetch attempt failed"
                    );
                    if attempt >= self.max_attempts {
                        return Err(err);
                    }
                }
            }
            attempt += 1;
            tokio::time::sleep(self.retry_delay).await;
        }
    }

    /// Make a single GET request for `url`. Any non-2xx status is an error.
    pub async fn fetch_once(&self, url: &str) -> Result<FetchedPage, ScrapeError> {
        validate_url(url)?;

        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
            ));
        }

        if let Some(len) = response.content_length() {
            if len as usize > MAX_CONTENT_LENGTH {
                return Err(ScrapeError::fetch(
                    url,
                    "Fetch",
                    Some(anyhow::anyhow!("content too large")),
                ));
            }
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(url, e))?;

        if body.len() > MAX_CONTENT_LENGTH {
            return Err(ScrapeError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }

        Ok(FetchedPage {
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn validate_url(url: &str) -> Result<(), ScrapeError> {
    if url.is_empty() {
        return Err(ScrapeError::invalid_url(url, "Fetch", None));
    }
    let parsed = url::Url::parse(url).map_err(|e| {
        ScrapeError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ScrapeError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        )),
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> ScrapeError {
    if err.is_timeout() {
        ScrapeError::timeout(url, "Fetch", Some(anyhow::anyhow!("request timed out")))
    } else {
        ScrapeError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", err)))
    }
}

fn build_headers(extra: &HashMap<String, String>) -> Result<HeaderMap, ScrapeError> {
    let mut map = HeaderMap::new();
    for (name, value) in DEFAULT_HEADERS {
        map.insert(name, HeaderValue::from_static(value));
    }
    for (name, value) in extra {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            ScrapeError::fetch(
                "",
                "BuildClient",
                Some(anyhow::anyhow!("bad header name: {}", e)),
            )
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            ScrapeError::fetch(
                "",
                "BuildClient",
                Some(anyhow::anyhow!("bad header value: {}", e)),
            )
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|cs| cs.trim_matches('"').trim_matches('\'').to_string())
    })
}
