use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::ConverterConfig;
use crate::error::ConverterError;
use crate::logic::{resolve_query, ReferenceConverter};
use crate::model::{total_references, ConversionMode, ConversionResult, ReferenceOccurrence};
use crate::store::traits::DocumentStore;

pub type AppState<S> = Arc<Mutex<ReferenceConverter<S>>>;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Simple health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

fn error_response(error: ConverterError) -> ApiError {
    let status = match &error {
        ConverterError::Configuration(_) => StatusCode::BAD_REQUEST,
        ConverterError::Query(_) => StatusCode::BAD_GATEWAY,
        ConverterError::NothingToConvert => StatusCode::CONFLICT,
    };
    (status, Json(ErrorResponse::new(&error.to_string())))
}

/// One scanned document as shown to API clients
#[derive(Debug, Serialize)]
pub struct ScannedDocument {
    pub document_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub occurrences: Vec<ReferenceOccurrence>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub mode: ConversionMode,
    pub query: String,
    pub document_count: usize,
    pub reference_count: usize,
    pub documents: Vec<ScannedDocument>,
}

pub async fn get_config<S: DocumentStore + 'static>(
    State(state): State<AppState<S>>,
) -> Json<ConverterConfig> {
    let converter = state.lock().await;
    Json(converter.config().clone())
}

pub async fn update_config<S: DocumentStore + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<RequestJson<ConverterConfig>, JsonRejection>,
) -> Result<Json<ConverterConfig>, ApiError> {
    let RequestJson(config) = payload.map_err(|rejection| {
        (
            rejection.status(),
            Json(ErrorResponse::new(&rejection.body_text())),
        )
    })?;
    let mut converter = state.lock().await;
    converter.configure(config).map_err(error_response)?;
    Ok(Json(converter.config().clone()))
}

pub async fn scan<S: DocumentStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<ScanResponse>, ApiError> {
    let mut converter = state.lock().await;
    let mode = converter.config().mode;
    let query = resolve_query(converter.config());

    let groups = converter.scan().await.map_err(error_response)?;

    let documents = groups
        .iter()
        .map(|group| ScannedDocument {
            document_id: group.document_id().to_string(),
            document_type: group.document.doc_type().map(str::to_string),
            title: group.document.title().map(str::to_string),
            occurrences: group.occurrences.clone(),
        })
        .collect::<Vec<_>>();

    Ok(Json(ScanResponse {
        mode,
        query,
        document_count: documents.len(),
        reference_count: total_references(groups),
        documents,
    }))
}

pub async fn convert<S: DocumentStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<ConversionResult>, ApiError> {
    let mut converter = state.lock().await;
    let result = converter.convert().await.map_err(error_response)?;
    Ok(Json(result))
}
