use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::ApiResult;
use super::extract::{ApiJson, optional_json};
use crate::domain::{CategoriesInput, CopyInput, DomainError, Removal};
use crate::infrastructure::AppState;
use crate::services::inventory_service;

#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    pub company: Option<String>,
    pub page: Option<String>,
    pub search: Option<String>,
    /// Comma separated category names
    pub categories: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecreaseCopyRequest {
    pub copy_id: Option<i32>,
}

fn parse_page(page: Option<&str>) -> Result<u64, DomainError> {
    match page.map(str::trim).filter(|p| !p.is_empty()) {
        None => Ok(1),
        Some(p) => p
            .parse::<u64>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| DomainError::validation("page must be a positive integer")),
    }
}

fn removal_response(removal: Removal) -> Json<Value> {
    match removal {
        Removal::Decreased(view) => Json(json!(view)),
        Removal::GroupDeleted { group_id, .. } => Json(json!({
            "message": "Last copy removed, book deleted",
            "deleted": true,
            "groupId": group_id,
        })),
    }
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(
        ("company" = String, Query, description = "Tenant owning the inventory"),
        ("page" = Option<u64>, Query, description = "1-based page, 12 groups per page"),
        ("search" = Option<String>, Query, description = "Substring of title, author or code"),
        ("categories" = Option<String>, Query, description = "Comma separated categories (any of)")
    ),
    responses(
        (status = 200, description = "One page of copy groups"),
        (status = 400, description = "Missing company or invalid page")
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListBooksQuery>,
) -> ApiResult<Json<Value>> {
    let page = parse_page(query.page.as_deref())?;
    let categories = query
        .categories
        .map(|c| CategoriesInput::One(c).normalize())
        .unwrap_or_default();

    let result = inventory_service::list_groups(
        state.copy_repo.as_ref(),
        query.company.as_deref(),
        query.search.as_deref(),
        categories,
        page,
    )
    .await?;

    Ok(Json(json!({
        "books": result.items,
        "currentPage": result.current_page,
        "totalPages": result.total_pages,
        "totalBooks": result.total_items,
    })))
}

pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(
        inventory_service::categories(state.copy_repo.as_ref()).await?,
    ))
}

pub async fn list_companies(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(
        inventory_service::companies(state.copy_repo.as_ref()).await?,
    ))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let view = inventory_service::get_group(state.copy_repo.as_ref(), id).await?;
    Ok(Json(view))
}

pub async fn get_group(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let view = inventory_service::get_group_by_group_id(state.copy_repo.as_ref(), &group_id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    post,
    path = "/api/books",
    responses(
        (status = 201, description = "Group created with its first copy"),
        (status = 400, description = "Missing or malformed field")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CopyInput>,
) -> ApiResult<impl IntoResponse> {
    let copy = inventory_service::create_group(state.copy_repo.as_ref(), input).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<CopyInput>,
) -> ApiResult<impl IntoResponse> {
    let copy = inventory_service::update_book(state.copy_repo.as_ref(), id, input).await?;
    Ok(Json(copy))
}

pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Value>> {
    let removal = inventory_service::remove_copy(state.copy_repo.as_ref(), id).await?;
    Ok(match removal {
        Removal::Decreased(view) => Json(json!({
            "message": "Book deleted",
            "book": view,
        })),
        Removal::GroupDeleted { group_id, deleted } => Json(json!({
            "message": "Last copy removed, book deleted",
            "deleted": true,
            "groupId": group_id,
            "copiesDeleted": deleted,
        })),
    })
}

pub async fn add_copy(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let input = optional_json::<CopyInput>(&body)?.unwrap_or_default();
    let copy = inventory_service::add_copy(state.copy_repo.as_ref(), id, input).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

pub async fn decrease_copy(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let copy_id = optional_json::<DecreaseCopyRequest>(&body)?.and_then(|req| req.copy_id);
    let removal = inventory_service::decrease_copy(state.copy_repo.as_ref(), id, copy_id).await?;
    Ok(removal_response(removal))
}

/// Mounted as `PUT /books/:id/general`; the segment carries the group id
pub async fn update_general_info(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    ApiJson(input): ApiJson<CopyInput>,
) -> ApiResult<Json<Value>> {
    let (updated, view) =
        inventory_service::update_general_info(state.copy_repo.as_ref(), &group_id, input).await?;
    Ok(Json(json!({
        "message": format!("Updated {} copies", updated),
        "updated": updated,
        "book": view,
    })))
}

pub async fn update_copy_info(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    ApiJson(input): ApiJson<CopyInput>,
) -> ApiResult<impl IntoResponse> {
    let copy = inventory_service::update_copy_info(state.copy_repo.as_ref(), id, input).await?;
    Ok(Json(copy))
}
