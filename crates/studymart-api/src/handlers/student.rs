//! Student handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use studymart_db::NewStudent;

use crate::dto::{
    ApiResponse, OrderResponse, PaginatedResponse, PaginationParams, RegisterStudentRequest,
    StudentResponse, MAX_PAGE_SIZE,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Register a student
#[utoipa::path(
    post,
    path = "/api/v1/students",
    tag = "Students",
    request_body = RegisterStudentRequest,
    responses(
        (status = 200, description = "Student registered"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn register_student(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterStudentRequest>,
) -> ApiResult<Json<ApiResponse<StudentResponse>>> {
    request.validate()?;
    let student = state
        .db
        .student_repo()
        .create(&NewStudent {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
            phone: request.phone,
            college: request.college,
        })
        .await?;
    Ok(Json(ApiResponse::new(student.into())))
}

/// Fetch a single student
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    tag = "Students",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "Student"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn get_student(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<StudentResponse>>> {
    let student = state
        .db
        .student_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Student {id}")))?;
    Ok(Json(ApiResponse::new(student.into())))
}

/// Orders a student participated in, as buyer or seller, newest first
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/orders",
    tag = "Students",
    params(("id" = Uuid, Path, description = "Student id")),
    responses(
        (status = 200, description = "Orders"),
        (status = 404, description = "Student not found")
    )
)]
pub async fn list_student_orders(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<PaginatedResponse<OrderResponse>>> {
    if state.db.student_repo().find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Student {id}")));
    }

    let limit = pagination.clamped_limit(MAX_PAGE_SIZE);
    let orders = state
        .db
        .escrow_order_repo()
        .find_by_party(id, limit, pagination.offset())
        .await?;

    let mut data = Vec::with_capacity(orders.len());
    for order in orders {
        let order = order.into_domain().map_err(|e| {
            tracing::error!(error = %e, "Corrupt order row");
            ApiError::InternalError
        })?;
        data.push(OrderResponse::from(order));
    }

    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page,
        limit,
        None,
    )))
}
