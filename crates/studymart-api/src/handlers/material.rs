//! Material listing handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use studymart_db::{MaterialFilter, NewMaterial};
use studymart_types::money::to_minor_units;

use crate::dto::{
    ApiResponse, CreateMaterialRequest, MaterialListQuery, MaterialResponse, PaginatedResponse,
    PaginationParams, SuccessResponse, MAX_PAGE_SIZE,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// List a material for sale
#[utoipa::path(
    post,
    path = "/api/v1/materials",
    tag = "Materials",
    request_body = CreateMaterialRequest,
    responses(
        (status = 200, description = "Material listed"),
        (status = 404, description = "Seller not found"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_material(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateMaterialRequest>,
) -> ApiResult<Json<ApiResponse<MaterialResponse>>> {
    request.validate()?;
    // Same price rules the gateway boundary enforces: positive, no
    // sub-minor precision.
    to_minor_units(request.price)
        .map_err(|e| ApiError::Validation(vec![format!("price: {e}")]))?;

    let seller = state.db.student_repo().find_by_id(request.seller_id).await?;
    if seller.is_none() {
        return Err(ApiError::NotFound(format!("Student {}", request.seller_id)));
    }

    let material = state
        .db
        .material_repo()
        .create(&NewMaterial {
            id: Uuid::new_v4(),
            seller_id: request.seller_id,
            title: request.title,
            subject: request.subject,
            description: request.description,
            price: request.price,
        })
        .await?;
    Ok(Json(ApiResponse::new(material.into())))
}

/// Browse material listings
#[utoipa::path(
    get,
    path = "/api/v1/materials",
    tag = "Materials",
    responses(
        (status = 200, description = "Material listings")
    )
)]
pub async fn list_materials(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<MaterialListQuery>,
    Query(pagination): Query<PaginationParams>,
) -> ApiResult<Json<PaginatedResponse<MaterialResponse>>> {
    let filter = MaterialFilter {
        subject: filter.subject,
        seller_id: filter.seller_id,
        max_price: filter.max_price,
        active_only: !filter.include_inactive,
    };
    let limit = pagination.clamped_limit(MAX_PAGE_SIZE);
    let repo = state.db.material_repo();

    let total = repo.count(&filter).await?;
    let materials = repo.list(&filter, limit, pagination.offset()).await?;
    let data = materials.into_iter().map(MaterialResponse::from).collect();

    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page,
        limit,
        Some(total),
    )))
}

/// Fetch a single material
#[utoipa::path(
    get,
    path = "/api/v1/materials/{id}",
    tag = "Materials",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 200, description = "Material"),
        (status = 404, description = "Material not found")
    )
)]
pub async fn get_material(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<MaterialResponse>>> {
    let material = state
        .db
        .material_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Material {id}")))?;
    Ok(Json(ApiResponse::new(material.into())))
}

/// Delist a material. The row is kept; existing orders still reference it.
#[utoipa::path(
    delete,
    path = "/api/v1/materials/{id}",
    tag = "Materials",
    params(("id" = Uuid, Path, description = "Material id")),
    responses(
        (status = 200, description = "Material delisted", body = SuccessResponse),
        (status = 404, description = "Material not found")
    )
)]
pub async fn delist_material(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse>> {
    state
        .db
        .material_repo()
        .set_active(id, false)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Material {id}")))?;
    Ok(Json(SuccessResponse::with_message("Material delisted")))
}
