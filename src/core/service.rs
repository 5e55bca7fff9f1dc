use crate::config::ServiceConfig;
use crate::core::image::{face_tensor, resize_image};
use crate::core::similarity::{closest_match, get_distances, get_similarities};
use crate::domain::model::{Embedding, EmbeddingRecord, FaceTensor, Recognition, Verification};
use crate::domain::ports::{EmbeddingModel, EmbeddingStore, FaceDetector, ImageSource};
use crate::utils::error::{RekognizerError, Result};
use futures::{StreamExt, TryStreamExt};
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub threshold: f64,
    pub image_size: u32,
    pub margin: u32,
    pub min_confidence: f32,
    pub max_image_width: Option<u32>,
    pub concurrent_fetches: usize,
}

impl From<&ServiceConfig> for ServiceSettings {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            threshold: config.facenet.threshold,
            image_size: config.facenet.image_size,
            margin: config.detector.margin,
            min_confidence: config.detector.min_confidence,
            max_image_width: config.images.max_image_width,
            concurrent_fetches: config.images.concurrent_fetches,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            threshold: crate::core::similarity::THRESHOLD,
            image_size: 160,
            margin: 0,
            min_confidence: 0.0,
            max_image_width: None,
            concurrent_fetches: 4,
        }
    }
}

pub struct RekognizerService {
    images: Arc<dyn ImageSource>,
    detector: Arc<dyn FaceDetector>,
    model: Arc<dyn EmbeddingModel>,
    store: Arc<dyn EmbeddingStore>,
    settings: ServiceSettings,
}

impl RekognizerService {
    pub fn new(
        images: Arc<dyn ImageSource>,
        detector: Arc<dyn FaceDetector>,
        model: Arc<dyn EmbeddingModel>,
        store: Arc<dyn EmbeddingStore>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            images,
            detector,
            model,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    pub fn hello(&self, name: &str) -> String {
        format!("Hello, {}!", name)
    }

    /// Compares every image against the first one.
    pub async fn verify(&self, image_urls: &[Url]) -> Result<Verification> {
        if image_urls.is_empty() {
            return Err(RekognizerError::validation("image_urls must not be empty"));
        }

        tracing::debug!("Verifying {} images", image_urls.len());
        let faces: Vec<FaceTensor> = futures::stream::iter(image_urls.iter().cloned())
            .map(|url| async move { self.extract_face(&url).await })
            .buffered(self.settings.concurrent_fetches.max(1))
            .try_collect()
            .await?;

        let embeddings = self.embed(&faces).await?;
        let verification = Verification {
            similarities: get_similarities(&embeddings, self.settings.threshold),
            distances: get_distances(&embeddings),
        };

        tracing::info!(
            images = image_urls.len(),
            matches = verification.similarities.iter().skip(1).filter(|m| **m).count(),
            "Verification finished"
        );
        Ok(verification)
    }

    pub async fn enroll(&self, user_id: i32, image_url: &Url) -> Result<EmbeddingRecord> {
        let embedding = self.embed_single(image_url).await?;
        let record = self.store.insert(user_id, &embedding).await?;

        tracing::info!(user_id, embedding_id = record.id, "Enrolled face");
        Ok(record)
    }

    pub async fn recognize(&self, image_url: &Url) -> Result<Recognition> {
        let probe = self.embed_single(image_url).await?;
        let records = self.store.all().await?;
        tracing::debug!("Comparing probe against {} stored embeddings", records.len());

        let found = closest_match(&probe, &records, self.settings.threshold)
            .ok_or(RekognizerError::UnknownPerson)?;

        tracing::info!(user_id = found.user_id, distance = found.distance, "Recognized face");
        Ok(found)
    }

    pub async fn faces(&self, user_id: i32) -> Result<Vec<EmbeddingRecord>> {
        self.store.for_user(user_id).await
    }

    pub async fn forget(&self, user_id: i32) -> Result<u64> {
        let deleted = self.store.delete_for_user(user_id).await?;
        tracing::info!(user_id, deleted, "Removed enrolled faces");
        Ok(deleted)
    }

    async fn embed_single(&self, image_url: &Url) -> Result<Embedding> {
        let face = self.extract_face(image_url).await?;
        self.embed(std::slice::from_ref(&face))
            .await?
            .pop()
            .ok_or_else(|| RekognizerError::upstream("facenet", 200, "no embedding returned"))
    }

    async fn embed(&self, faces: &[FaceTensor]) -> Result<Vec<Embedding>> {
        let embeddings = self.model.get_embeddings(faces).await?;
        if embeddings.len() != faces.len() {
            return Err(RekognizerError::upstream(
                "facenet",
                200,
                format!(
                    "expected {} embeddings, got {}",
                    faces.len(),
                    embeddings.len()
                ),
            ));
        }
        Ok(embeddings)
    }

    /// Fetches the image and returns the preprocessed crop of its only face.
    async fn extract_face(&self, image_url: &Url) -> Result<FaceTensor> {
        let image = self.images.fetch(image_url).await?;
        let image = match self.settings.max_image_width {
            Some(max_width) if image.width() > max_width => {
                resize_image(&image, Some(max_width), None)
            }
            _ => image,
        };

        let faces: Vec<_> = self
            .detector
            .detect_faces(&image)
            .await?
            .into_iter()
            .filter(|face| face.confidence >= self.settings.min_confidence)
            .collect();
        tracing::debug!("Detected {} faces in {}", faces.len(), image_url);

        let no_face = || RekognizerError::NoFace {
            image: image_url.to_string(),
        };

        match faces.as_slice() {
            [] => Err(no_face()),
            [face] => face_tensor(
                &image,
                &face.bounding_box,
                self.settings.margin,
                self.settings.image_size,
            )
            .ok_or_else(no_face),
            many => Err(RekognizerError::TooManyFaces {
                image: image_url.to_string(),
                count: many.len(),
            }),
        }
    }
}
