use crate::config::toml_config::FacenetConfig;
use crate::domain::model::{Embedding, FaceTensor};
use crate::domain::ports::EmbeddingModel;
use crate::utils::error::{RekognizerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Client for a FaceNet model served by TensorFlow Serving's REST API.
pub struct FacenetClient {
    client: Client,
    predict_url: String,
    signature_name: String,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    signature_name: &'a str,
    inputs: PredictInputs<'a>,
}

#[derive(Serialize)]
struct PredictInputs<'a> {
    images: &'a [FaceTensor],
    phase: bool,
}

#[derive(Deserialize)]
struct PredictResponse {
    outputs: Vec<Embedding>,
}

impl FacenetClient {
    pub fn new(config: &FacenetConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(config.timeout()).build()?,
            predict_url: config.predict_url(),
            signature_name: config.signature_name.clone(),
        })
    }

    pub fn predict_url(&self) -> &str {
        &self.predict_url
    }
}

#[async_trait]
impl EmbeddingModel for FacenetClient {
    async fn get_embeddings(&self, faces: &[FaceTensor]) -> Result<Vec<Embedding>> {
        if faces.is_empty() {
            return Ok(Vec::new());
        }

        let request = PredictRequest {
            signature_name: &self.signature_name,
            inputs: PredictInputs {
                images: faces,
                phase: false,
            },
        };

        tracing::debug!("Requesting {} embeddings from {}", faces.len(), self.predict_url);
        let response = self
            .client
            .post(&self.predict_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RekognizerError::upstream("facenet", status.as_u16(), body));
        }

        let PredictResponse { outputs }: PredictResponse = response.json().await?;
        if outputs.len() != faces.len() {
            return Err(RekognizerError::upstream(
                "facenet",
                status.as_u16(),
                format!("expected {} embeddings, got {}", faces.len(), outputs.len()),
            ));
        }

        Ok(outputs)
    }
}
