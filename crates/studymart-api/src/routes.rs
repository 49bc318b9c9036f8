//! API routes

use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Create API v1 routes
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Payment / escrow lifecycle
        .nest("/payment", payment_routes())
        // Catalog
        .route("/materials", post(handlers::material::create_material))
        .route("/materials", get(handlers::material::list_materials))
        .route("/materials/:id", get(handlers::material::get_material))
        .route("/materials/:id", delete(handlers::material::delist_material))
        // Students
        .route("/students", post(handlers::student::register_student))
        .route("/students/:id", get(handlers::student::get_student))
        .route("/students/:id/orders", get(handlers::student::list_student_orders))
}

/// Escrow payment routes
fn payment_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(handlers::payment::create_payment))
        .route("/webhook", post(handlers::payment::payment_webhook))
        .route("/mark-delivered", post(handlers::payment::mark_delivered))
        .route("/confirm-delivery", post(handlers::payment::confirm_delivery))
        .route("/orders/:id", get(handlers::payment::get_order))
}

/// Create Swagger UI routes
pub fn swagger_routes() -> Router<Arc<AppState>> {
    use crate::openapi::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
