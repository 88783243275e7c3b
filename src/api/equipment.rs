use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};

use super::error::ApiResult;
use super::extract::ApiJson;
use crate::domain::EquipmentInput;
use crate::infrastructure::AppState;
use crate::services::equipment_service;

pub async fn list_equipment(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let items = equipment_service::list(state.equipment_repo.as_ref()).await?;
    Ok(Json(items))
}

pub async fn get_equipment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let item = equipment_service::get(state.equipment_repo.as_ref(), id).await?;
    Ok(Json(item))
}

pub async fn create_equipment(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<EquipmentInput>,
) -> ApiResult<impl IntoResponse> {
    let item = equipment_service::create(state.equipment_repo.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_equipment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<EquipmentInput>,
) -> ApiResult<impl IntoResponse> {
    let item = equipment_service::update(state.equipment_repo.as_ref(), id, input).await?;
    Ok(Json(item))
}

pub async fn delete_equipment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    equipment_service::delete(state.equipment_repo.as_ref(), id).await?;
    Ok(Json(json!({ "message": "Equipment deleted" })))
}
