use crate::config::toml_config::ImagesConfig;
use crate::domain::ports::ImageSource;
use crate::utils::error::{RekognizerError, Result};
use async_trait::async_trait;
use image::RgbImage;
use reqwest::Client;
use url::Url;

/// Downloads user supplied images. Every failure here is the caller's
/// fault (bad URL, unreachable host, not an image), so it maps to `BadRequest`.
pub struct HttpImageSource {
    client: Client,
    max_bytes: usize,
}

impl HttpImageSource {
    pub fn new(config: &ImagesConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            max_bytes: config.max_bytes,
        })
    }
}

#[async_trait]
impl ImageSource for HttpImageSource {
    async fn fetch(&self, url: &Url) -> Result<RgbImage> {
        tracing::debug!("Fetching image: {}", url);
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RekognizerError::bad_request(format!("Could not fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RekognizerError::bad_request(format!(
                "Could not fetch {}: HTTP {}",
                url, status
            )));
        }

        let too_large = || {
            RekognizerError::bad_request(format!(
                "Image {} is larger than {} bytes",
                url, self.max_bytes
            ))
        };
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes as u64)
        {
            return Err(too_large());
        }

        // Content-Length may be absent (chunked), so the limit holds while reading.
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| RekognizerError::bad_request(format!("Could not read {}: {}", url, e)))?
        {
            if bytes.len() + chunk.len() > self.max_bytes {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        let image = image::load_from_memory(&bytes).map_err(|e| {
            RekognizerError::bad_request(format!("{} is not a supported image: {}", url, e))
        })?;
        tracing::debug!("Decoded {}x{} image", image.width(), image.height());

        Ok(image.to_rgb8())
    }
}
