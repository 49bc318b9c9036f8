//! OpenAPI documentation

use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

/// OpenAPI document for the StudyMart REST API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "StudyMart API",
        description = "Escrow-backed marketplace for student study materials",
    ),
    paths(
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::payment::create_payment,
        handlers::payment::payment_webhook,
        handlers::payment::mark_delivered,
        handlers::payment::confirm_delivery,
        handlers::payment::get_order,
        handlers::material::create_material,
        handlers::material::list_materials,
        handlers::material::get_material,
        handlers::material::delist_material,
        handlers::student::register_student,
        handlers::student::get_student,
        handlers::student::list_student_orders,
    ),
    components(schemas(
        ErrorResponse,
        dto::SuccessResponse,
        dto::CreatePaymentRequest,
        dto::MarkDeliveredRequest,
        dto::ConfirmDeliveryRequest,
        dto::OrderResponse,
        dto::WebhookAck,
        dto::CreateMaterialRequest,
        dto::MaterialResponse,
        dto::RegisterStudentRequest,
        dto::StudentResponse,
        handlers::health::HealthResponse,
        handlers::health::ReadinessResponse,
    )),
    tags(
        (name = "Payment", description = "Escrow order lifecycle"),
        (name = "Materials", description = "Study material listings"),
        (name = "Students", description = "Student registration"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/payment/create"));
        assert!(doc.paths.paths.contains_key("/api/v1/payment/webhook"));
    }
}
