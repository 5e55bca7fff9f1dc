use crate::config::toml_config::DetectorConfig;
use crate::domain::model::DetectedFace;
use crate::domain::ports::FaceDetector;
use crate::utils::error::{RekognizerError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, RgbImage};
use reqwest::Client;
use serde::Serialize;
use std::io::Cursor;

/// Talks to an MTCNN detection service: PNG in, list of boxes out.
pub struct HttpFaceDetector {
    client: Client,
    endpoint: String,
}

#[derive(Serialize)]
struct DetectRequest {
    image: String,
}

impl HttpFaceDetector {
    pub fn new(config: &DetectorConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(config.timeout()).build()?,
            endpoint: config.endpoint.clone(),
        })
    }
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

#[async_trait]
impl FaceDetector for HttpFaceDetector {
    async fn detect_faces(&self, image: &RgbImage) -> Result<Vec<DetectedFace>> {
        let request = DetectRequest {
            image: STANDARD.encode(encode_png(image)?),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RekognizerError::upstream("detector", status.as_u16(), body));
        }

        Ok(response.json().await?)
    }
}
