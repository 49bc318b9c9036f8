//! Data transfer objects for the REST API

pub mod common;
pub mod material;
pub mod payment;
pub mod student;

pub use common::{ApiResponse, PaginatedResponse, PaginationParams, SuccessResponse, MAX_PAGE_SIZE};
pub use material::{CreateMaterialRequest, MaterialListQuery, MaterialResponse};
pub use payment::{
    ConfirmDeliveryRequest, CreatePaymentRequest, MarkDeliveredRequest, OrderResponse, WebhookAck,
};
pub use student::{RegisterStudentRequest, StudentResponse};
