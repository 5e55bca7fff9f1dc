// Adapters layer: concrete implementations of the domain ports.

pub mod detector;
pub mod facenet;
pub mod http;
pub mod postgres;

pub use detector::HttpFaceDetector;
pub use facenet::FacenetClient;
pub use http::HttpImageSource;
pub use postgres::PgEmbeddingStore;
