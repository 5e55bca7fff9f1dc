use crate::domain::model::{DetectedFace, Embedding, EmbeddingRecord, FaceTensor};
use crate::utils::error::Result;
use async_trait::async_trait;
use image::RgbImage;
use url::Url;

#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<RgbImage>;
}

#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn detect_faces(&self, image: &RgbImage) -> Result<Vec<DetectedFace>>;
}

#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Returns one embedding per face, in input order.
    async fn get_embeddings(&self, faces: &[FaceTensor]) -> Result<Vec<Embedding>>;
}

#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    async fn insert(&self, user_id: i32, embedding: &Embedding) -> Result<EmbeddingRecord>;
    async fn all(&self) -> Result<Vec<EmbeddingRecord>>;
    async fn for_user(&self, user_id: i32) -> Result<Vec<EmbeddingRecord>>;
    async fn delete_for_user(&self, user_id: i32) -> Result<u64>;
}
