// src/server/handlers.rs
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::errors::ServiceError;
use crate::interpretation::{InterpretationPage, InterpretationQuery};
use crate::models::{PredictionResult, SiteObservation};
use crate::prediction;

use super::api_error::ApiError;
use super::state::AppState;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Default, Deserialize)]
pub struct MetaQuery {
    pub cultivo: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub cultivos: Vec<String>,
    pub class_names: Vec<String>,
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
}

pub async fn home() -> Json<JsonValue> {
    Json(json!({ "status": "ok", "msg": "Servidor funcionando" }))
}

pub async fn meta(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MetaQuery>,
) -> ApiResult<MetaResponse> {
    let profile = match query.cultivo.as_deref() {
        Some(requested) => state.resolve_crop(Some(requested))?,
        None => state
            .schema_crop()
            .ok_or_else(|| ServiceError::CropUnavailable("any crop".to_string()))?,
    };
    let bundle = &profile.bundle;
    Ok(Json(MetaResponse {
        cultivos: state.crop_names(),
        class_names: bundle.class_labels.clone(),
        numeric: bundle.numeric_columns.clone(),
        categorical: bundle.categorical_columns.clone(),
    }))
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SiteObservation>, JsonRejection>,
) -> ApiResult<PredictionResult> {
    let Json(observation) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
    let profile = state
        .resolve_crop(observation.cultivo.as_deref())
        .map_err(ApiError::prediction)?;
    debug!("POST /predict for {}", profile.name);
    let result = prediction::predict(profile, &observation).map_err(ApiError::prediction)?;
    Ok(Json(result))
}

pub async fn interpretation_rows(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InterpretationQuery>,
) -> ApiResult<InterpretationPage> {
    debug!("GET /interpretation/rows {:?}", query);
    let page = tokio::task::spawn_blocking(move || state.interpretations.lookup(&query))
        .await
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Interpretation lookup aborted: {}", e),
            )
        })??;
    Ok(Json(page))
}
