use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::ApiResult;
use crate::infrastructure::AppState;
use crate::services::inventory_service;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub company: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/books/search",
    params(
        ("q" = Option<String>, Query, description = "Substring of title, author or code"),
        ("company" = Option<String>, Query, description = "Restrict to one tenant")
    ),
    responses(
        (status = 200, description = "Up to 10 groups with their available copies")
    )
)]
pub async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Value>> {
    tracing::debug!("Book search: {:?}", query.q);

    let books = inventory_service::search(
        state.copy_repo.as_ref(),
        query.q.as_deref(),
        query.company.as_deref(),
    )
    .await?;

    Ok(Json(json!({ "books": books })))
}
