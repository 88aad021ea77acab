use std::time::Duration;

use card_logging::card_debug;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use crate::{FailureKind, FetchError, FetchMetadata, ImageOutput};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Origin of the image endpoint; request paths are resolved against it.
    pub origin: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            origin: "http://localhost:3000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 20 * 1024 * 1024,
            allowed_content_types: vec!["image/jpeg".to_string(), "image/png".to_string()],
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `path` (absolute path plus optional query) from the image endpoint.
    async fn fetch(&self, path: &str) -> Result<ImageOutput, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Appends a request path to the configured origin.
    ///
    /// A path prefix on the origin is kept, so the fetched URL is the same
    /// string the user is shown and copies.
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        let invalid =
            |err: url::ParseError| FetchError::new(FailureKind::InvalidUrl, err.to_string());
        Url::parse(&self.settings.origin).map_err(invalid)?;
        let joined = format!("{}{}", self.settings.origin.trim_end_matches('/'), path);
        Url::parse(&joined).map_err(invalid)
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(
                self.settings.redirect_limit,
            ))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, path: &str) -> Result<ImageOutput, FetchError> {
        let url = self.resolve(path)?;
        let client = self.build_client()?;

        card_debug!("GET {}", url);
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus {
                    code: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or_default().to_string(),
                },
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        let metadata = FetchMetadata {
            url: url.to_string(),
            content_type,
            byte_len: bytes.len() as u64,
        };

        Ok(ImageOutput { bytes, metadata })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_path_and_query_against_origin() {
        let fetcher = ReqwestFetcher::new(FetchSettings {
            origin: "https://card.example/".to_string(),
            ..FetchSettings::default()
        });
        let url = fetcher.resolve("/20.jpg?scale=3").unwrap();
        assert_eq!(url.as_str(), "https://card.example/20.jpg?scale=3");
    }

    #[test]
    fn origin_path_prefix_is_kept() {
        let fetcher = ReqwestFetcher::new(FetchSettings {
            origin: "https://host.example/cards".to_string(),
            ..FetchSettings::default()
        });
        let url = fetcher.resolve("/20.jpg?scale=3").unwrap();
        assert_eq!(url.as_str(), "https://host.example/cards/20.jpg?scale=3");

        let fetcher = ReqwestFetcher::new(FetchSettings {
            origin: "https://host.example/cards/".to_string(),
            ..FetchSettings::default()
        });
        let url = fetcher.resolve("/20.jpg").unwrap();
        assert_eq!(url.as_str(), "https://host.example/cards/20.jpg");
    }

    #[test]
    fn bad_origin_is_invalid_url() {
        let fetcher = ReqwestFetcher::new(FetchSettings {
            origin: "not a url".to_string(),
            ..FetchSettings::default()
        });
        assert_eq!(
            fetcher.resolve("/20.jpg").unwrap_err().kind,
            FailureKind::InvalidUrl
        );
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        let fetcher = ReqwestFetcher::new(FetchSettings::default());
        assert!(fetcher.is_content_type_allowed("image/PNG; charset=binary"));
        assert!(!fetcher.is_content_type_allowed("text/html"));
    }
}
