use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type Embedding = Vec<f64>;

/// Preprocessed face crop, `[height][width][rgb]`.
pub type FaceTensor = Vec<Vec<[f32; 3]>>;

/// Pixel box in MTCNN's `[x, y, width, height]` layout. The detector may
/// report a negative origin for faces touching the border.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct FaceBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl FaceBox {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<[f64; 4]> for FaceBox {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        Self::new(
            x.round() as i64,
            y.round() as i64,
            width.round() as i64,
            height.round() as i64,
        )
    }
}

impl From<FaceBox> for [f64; 4] {
    fn from(b: FaceBox) -> Self {
        [b.x as f64, b.y as f64, b.width as f64, b.height as f64]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoints {
    pub left_eye: (f32, f32),
    pub right_eye: (f32, f32),
    pub nose: (f32, f32),
    pub mouth_left: (f32, f32),
    pub mouth_right: (f32, f32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    #[serde(rename = "box")]
    pub bounding_box: FaceBox,
    pub confidence: f32,
    #[serde(default)]
    pub keypoints: Option<Keypoints>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmbeddingRecord {
    pub id: i32,
    pub user_id: i32,
    pub embedding: Embedding,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Index 0 is the reference image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub similarities: Vec<bool>,
    pub distances: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub user_id: i32,
    pub distance: f64,
}
