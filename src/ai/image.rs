use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::warn;
use reqwest::Client;

use super::AiError;

/// CORS proxy tried before fetching the image directly.
pub const PROXY_PREFIX: &str = "https://api.allorigins.win/raw?url=";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub mime_type: String,
    pub base64_data: String,
}

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, src_url: &str) -> Result<FetchedImage, AiError>;
}

pub struct HttpImageFetcher {
    client: Client,
    proxy_prefix: Option<String>,
}

impl HttpImageFetcher {
    pub fn new() -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AiError::Request(e.to_string()))?;
        Ok(Self {
            client,
            proxy_prefix: Some(PROXY_PREFIX.to_string()),
        })
    }

    pub fn without_proxy(mut self) -> Self {
        self.proxy_prefix = None;
        self
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, AiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AiError::ImageFetch(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AiError::ImageFetch(format!("status {}", response.status())));
        }
        Ok(response)
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, src_url: &str) -> Result<FetchedImage, AiError> {
        let proxied = match &self.proxy_prefix {
            Some(prefix) => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(src_url.as_bytes()).collect();
                let target = format!("{prefix}{encoded}");
                match self.get(&target).await {
                    Ok(response) => Some(response),
                    Err(err) => {
                        warn!("Image proxy fetch failed, trying direct fetch: {err}");
                        None
                    }
                }
            }
            None => None,
        };
        let response = match proxied {
            Some(response) => response,
            None => self.get(src_url).await?,
        };

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.split(';').next().unwrap_or_default().trim().to_string())
            .unwrap_or_default();
        if !mime_type.starts_with("image/") {
            return Err(AiError::NotAnImage(mime_type));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AiError::ImageFetch(e.to_string()))?;
        Ok(FetchedImage {
            mime_type,
            base64_data: STANDARD.encode(&bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn encodes_image_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cat.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(b"hello".to_vec()),
            )
            .mount(&server)
            .await;

        let fetcher = HttpImageFetcher::new().unwrap().without_proxy();
        let image = fetcher
            .fetch(&format!("{}/cat.png", server.uri()))
            .await
            .unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.base64_data, "aGVsbG8=");
    }

    #[tokio::test]
    async fn rejects_non_images() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(b"<html></html>".to_vec(), "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let fetcher = HttpImageFetcher::new().unwrap().without_proxy();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, AiError::NotAnImage(mime) if mime == "text/html"));
    }
}
