#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use image::{Rgb, RgbImage};
use rekognizer::core::{
    DetectedFace, Embedding, EmbeddingModel, EmbeddingRecord, EmbeddingStore, FaceBox,
    FaceDetector, FaceTensor, ImageSource, RekognizerService, ServiceSettings,
};
use rekognizer::{RekognizerError, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

pub fn test_image(width: u32) -> RgbImage {
    RgbImage::from_fn(width, 200, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
    })
}

pub fn face(x: i64, y: i64, width: i64, height: i64, confidence: f32) -> DetectedFace {
    DetectedFace {
        bounding_box: FaceBox::new(x, y, width, height),
        confidence,
        keypoints: None,
    }
}

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

/// Images served from memory, keyed by URL.
#[derive(Default)]
pub struct StaticImages {
    images: HashMap<String, RgbImage>,
}

impl StaticImages {
    pub fn with(mut self, url: &str, image: RgbImage) -> Self {
        self.images.insert(url.to_string(), image);
        self
    }
}

#[async_trait]
impl ImageSource for StaticImages {
    async fn fetch(&self, url: &Url) -> Result<RgbImage> {
        self.images
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| RekognizerError::bad_request(format!("Could not fetch {}", url)))
    }
}

/// Answers by image width, so each test image gets its own faces.
#[derive(Default)]
pub struct ScriptedDetector {
    faces: HashMap<u32, Vec<DetectedFace>>,
}

impl ScriptedDetector {
    pub fn with(mut self, width: u32, faces: Vec<DetectedFace>) -> Self {
        self.faces.insert(width, faces);
        self
    }
}

#[async_trait]
impl FaceDetector for ScriptedDetector {
    async fn detect_faces(&self, image: &RgbImage) -> Result<Vec<DetectedFace>> {
        Ok(self.faces.get(&image.width()).cloned().unwrap_or_default())
    }
}

/// Hands out queued embeddings in order and records batch sizes.
#[derive(Default)]
pub struct QueueModel {
    embeddings: Mutex<VecDeque<Embedding>>,
    batches: Mutex<Vec<usize>>,
}

impl QueueModel {
    pub fn new(embeddings: Vec<Embedding>) -> Self {
        Self {
            embeddings: Mutex::new(embeddings.into()),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub async fn batches(&self) -> Vec<usize> {
        self.batches.lock().await.clone()
    }
}

#[async_trait]
impl EmbeddingModel for QueueModel {
    async fn get_embeddings(&self, faces: &[FaceTensor]) -> Result<Vec<Embedding>> {
        self.batches.lock().await.push(faces.len());
        let mut queue = self.embeddings.lock().await;
        Ok((0..faces.len()).filter_map(|_| queue.pop_front()).collect())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<EmbeddingRecord>>,
}

impl MemoryStore {
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl EmbeddingStore for MemoryStore {
    async fn insert(&self, user_id: i32, embedding: &Embedding) -> Result<EmbeddingRecord> {
        let mut records = self.records.lock().await;
        let record = EmbeddingRecord {
            id: records.len() as i32 + 1,
            user_id,
            embedding: embedding.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn all(&self) -> Result<Vec<EmbeddingRecord>> {
        Ok(self.records.lock().await.clone())
    }

    async fn for_user(&self, user_id: i32) -> Result<Vec<EmbeddingRecord>> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn delete_for_user(&self, user_id: i32) -> Result<u64> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.user_id != user_id);
        Ok((before - records.len()) as u64)
    }
}

pub fn build_service(
    images: StaticImages,
    detector: ScriptedDetector,
    model: Arc<QueueModel>,
    store: Arc<MemoryStore>,
    settings: ServiceSettings,
) -> RekognizerService {
    RekognizerService::new(
        Arc::new(images),
        Arc::new(detector),
        model,
        store,
        settings,
    )
}
