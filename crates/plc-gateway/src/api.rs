use std::sync::Arc;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::post,
};
use chrono::{DateTime, Utc};
use domain::{DomainError, TagTypeMap, TagValueResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::auth::require_token;
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/get_tag_list", post(get_tag_list))
        .route("/get_tag_value", post(get_tag_value))
        .route("/get_tag_batch", post(get_tag_batch))
        .layer(middleware::from_fn_with_state(state.clone(), require_token))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// --- Requests / responses ---

#[derive(Debug, Deserialize)]
pub struct TagListRequest {
    pub plc_id: String,
}

/// Either `tag_name` or `tag_list`; a non-empty `tag_name` wins when both are sent
#[derive(Debug, Deserialize)]
pub struct TagValueRequest {
    pub plc_id: String,
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub tag_list: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct TagBatchRequest {
    pub tag_batch_id: String,
}

#[derive(Debug, Serialize)]
pub struct TagListResponse {
    pub plc_id: String,
    pub tag_list: TagTypeMap,
    pub plc_time: f64,
}

#[derive(Debug, Serialize)]
pub struct TagValuesResponse {
    pub tag_values: Vec<TagValueResult>,
    pub plc_time: f64,
}

/// Seconds since the Unix epoch with sub-second precision
fn unix_seconds(ts: DateTime<Utc>) -> f64 {
    ts.timestamp_millis() as f64 / 1000.0
}

// --- Errors ---

/// JSON error body `{title, description}` with the matching status code
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    description: String,
}

impl ApiError {
    pub fn new(status: StatusCode, description: impl Into<String>) -> Self {
        Self {
            status,
            description: description.into(),
        }
    }

    pub fn bad_request(description: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, description)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "Authentication failed. Please check your AUTH TOKEN and try again.",
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        let status = match &e {
            DomainError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            DomainError::DeviceNotFound(_) | DomainError::BatchNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            DomainError::CatalogueUnavailable { .. } | DomainError::DeviceUnavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", e);
        } else if status == StatusCode::SERVICE_UNAVAILABLE {
            warn!("Request failed: {}", e);
        }

        Self::new(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let title = self
            .status
            .canonical_reason()
            .unwrap_or("Error")
            .to_string();
        let body = Json(json!({ "title": title, "description": self.description }));
        (self.status, body).into_response()
    }
}

// --- Handlers ---

async fn get_tag_list(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TagListRequest>, JsonRejection>,
) -> Result<Json<TagListResponse>, ApiError> {
    let Json(request) = payload?;

    let catalogue = state.values.get_catalogue(&request.plc_id).await?;

    Ok(Json(TagListResponse {
        plc_id: request.plc_id,
        tag_list: catalogue.entries.clone(),
        plc_time: unix_seconds(catalogue.updated_at),
    }))
}

async fn get_tag_value(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TagValueRequest>, JsonRejection>,
) -> Result<Json<TagValuesResponse>, ApiError> {
    let Json(request) = payload?;

    let batch = match (request.tag_name, request.tag_list) {
        (Some(tag_name), _) if !tag_name.is_empty() => {
            state.values.get_value(&request.plc_id, &tag_name).await?
        }
        (_, Some(tag_list)) => state.values.get_values(&request.plc_id, &tag_list).await?,
        (_, None) => {
            return Err(ApiError::bad_request(
                "Request must contain either 'tag_name' or 'tag_list'",
            ));
        }
    };

    Ok(Json(TagValuesResponse {
        tag_values: batch.results,
        plc_time: unix_seconds(batch.device_time),
    }))
}

async fn get_tag_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TagBatchRequest>, JsonRejection>,
) -> Result<Json<TagValuesResponse>, ApiError> {
    let Json(request) = payload?;

    let batch = state
        .values
        .get_values_for_batch(&request.tag_batch_id)
        .await?;

    Ok(Json(TagValuesResponse {
        tag_values: batch.results,
        plc_time: unix_seconds(batch.device_time),
    }))
}
