use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};

use super::error::LendingResult;
use super::extract::{LendingJson, optional_json};
use crate::domain::{BorrowInput, HistoryQuery, ReturnInput};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::Claims;
use crate::services::lending_service;

#[utoipa::path(
    post,
    path = "/api/borrow",
    responses(
        (status = 201, description = "Copy lent, borrow record created"),
        (status = 400, description = "Invalid input or copy not available"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Copy not found")
    ),
    security(("bearer" = []))
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    claims: Claims,
    LendingJson(input): LendingJson<BorrowInput>,
) -> LendingResult<impl IntoResponse> {
    let record = lending_service::borrow(
        state.copy_repo.as_ref(),
        state.loan_repo.as_ref(),
        &claims.company,
        claims.user_id,
        input,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "borrowRecord": record })),
    ))
}

pub async fn return_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    body: Bytes,
) -> LendingResult<Json<Value>> {
    let comments = optional_json::<ReturnInput>(&body)?.and_then(|input| input.comments);
    let record = lending_service::return_loan(
        state.copy_repo.as_ref(),
        state.loan_repo.as_ref(),
        &claims.company,
        claims.user_id,
        id,
        comments,
    )
    .await?;

    Ok(Json(json!({ "success": true, "borrowRecord": record })))
}

#[utoipa::path(
    get,
    path = "/api/history",
    params(
        ("search" = Option<String>, Query, description = "Substring of borrower name or copy code"),
        ("status" = Option<String>, Query, description = "all, borrowed, returned or overdue"),
        ("startDate" = Option<String>, Query, description = "Earliest borrow date"),
        ("endDate" = Option<String>, Query, description = "Latest borrow date, a bare date covers the whole day")
    ),
    responses(
        (status = 200, description = "Borrow records, newest first"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer" = []))
)]
pub async fn history(
    State(state): State<AppState>,
    claims: Claims,
    Query(query): Query<HistoryQuery>,
) -> LendingResult<Json<Value>> {
    let records = lending_service::history(
        state.copy_repo.as_ref(),
        state.loan_repo.as_ref(),
        state.user_repo.as_ref(),
        &claims.company,
        query,
    )
    .await?;

    Ok(Json(json!({ "success": true, "records": records })))
}

pub async fn active_borrows(
    State(state): State<AppState>,
    claims: Claims,
) -> LendingResult<Json<Value>> {
    let records = lending_service::active_borrows(
        state.copy_repo.as_ref(),
        state.loan_repo.as_ref(),
        state.user_repo.as_ref(),
        &claims.company,
    )
    .await?;

    Ok(Json(json!({ "success": true, "records": records })))
}

pub async fn borrower_names(
    State(state): State<AppState>,
    claims: Claims,
) -> LendingResult<Json<Value>> {
    let names = lending_service::borrower_names(state.loan_repo.as_ref(), &claims.company).await?;
    Ok(Json(json!({ "success": true, "borrowerNames": names })))
}
