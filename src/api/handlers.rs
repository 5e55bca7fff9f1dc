//! HTTP request handlers

use super::error::ValidJson;
use super::AppState;
use crate::domain::model::{EmbeddingRecord, Recognition, Verification};
use crate::utils::error::{RekognizerError, Result};
use crate::utils::validation::parse_image_url;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::Url;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub image_urls: Vec<String>,
}

impl VerifyRequest {
    pub fn urls(&self) -> Result<Vec<Url>> {
        if self.image_urls.is_empty() {
            return Err(RekognizerError::validation("image_urls must not be empty"));
        }
        self.image_urls
            .iter()
            .enumerate()
            .map(|(i, url)| parse_image_url(&format!("image_urls[{}]", i), url))
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct ImageRequest {
    pub image_url: String,
}

impl ImageRequest {
    pub fn url(&self) -> Result<Url> {
        parse_image_url("image_url", &self.image_url)
    }
}

/// Stored face as returned to clients; the raw embedding stays internal.
#[derive(Debug, Serialize)]
pub struct FaceResponse {
    pub id: i32,
    pub user_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<EmbeddingRecord> for FaceResponse {
    fn from(record: EmbeddingRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FacesResponse {
    pub user_id: i32,
    pub faces: Vec<FaceResponse>,
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().timestamp(),
        "service": "rekognizer"
    }))
}

pub async fn hello(State(state): State<AppState>, Path(name): Path<String>) -> String {
    state.service.hello(&name)
}

pub async fn verify(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<VerifyRequest>,
) -> Result<Json<Verification>> {
    let urls = request.urls()?;
    Ok(Json(state.service.verify(&urls).await?))
}

pub async fn recognize(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<ImageRequest>,
) -> Result<Json<Recognition>> {
    let url = request.url()?;
    Ok(Json(state.service.recognize(&url).await?))
}

pub async fn enroll(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    ValidJson(request): ValidJson<ImageRequest>,
) -> Result<(StatusCode, Json<FaceResponse>)> {
    let url = request.url()?;
    let record = state.service.enroll(user_id, &url).await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

pub async fn list_faces(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<FacesResponse>> {
    let faces = state.service.faces(user_id).await?;
    Ok(Json(FacesResponse {
        user_id,
        faces: faces.into_iter().map(Into::into).collect(),
    }))
}

pub async fn forget(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> Result<Json<Value>> {
    let deleted = state.service.forget(user_id).await?;
    Ok(Json(json!({ "user_id": user_id, "deleted": deleted })))
}
