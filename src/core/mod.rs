pub mod image;
pub mod service;
pub mod similarity;

pub use crate::domain::model::{
    DetectedFace, Embedding, EmbeddingRecord, FaceBox, FaceTensor, Recognition, Verification,
};
pub use crate::domain::ports::{EmbeddingModel, EmbeddingStore, FaceDetector, ImageSource};
pub use crate::utils::error::Result;
pub use service::{RekognizerService, ServiceSettings};
