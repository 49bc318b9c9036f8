//! Material listing DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use studymart_db::DbMaterial;

/// Request to list a material for sale
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateMaterialRequest {
    /// Selling student
    pub seller_id: Uuid,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    /// Price in major units; must be positive
    pub price: Decimal,
}

/// Filters for the material listing
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct MaterialListQuery {
    pub subject: Option<String>,
    pub seller_id: Option<Uuid>,
    pub max_price: Option<Decimal>,
    /// Include delisted materials; off by default
    #[serde(default)]
    pub include_inactive: bool,
}

/// A material listing as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaterialResponse {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbMaterial> for MaterialResponse {
    fn from(m: DbMaterial) -> Self {
        Self {
            id: m.id,
            seller_id: m.seller_id,
            title: m.title,
            subject: m.subject,
            description: m.description,
            price: m.price,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
