//! Material repository

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbMaterial, DbResult};

/// Fields for a new material listing
#[derive(Debug, Clone)]
pub struct NewMaterial {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub title: String,
    pub subject: String,
    pub description: Option<String>,
    pub price: Decimal,
}

/// Typed list filter. Client-supplied keys outside this struct are ignored
/// rather than interpolated into the query.
#[derive(Debug, Clone, Default)]
pub struct MaterialFilter {
    pub subject: Option<String>,
    pub seller_id: Option<Uuid>,
    pub max_price: Option<Decimal>,
    pub active_only: bool,
}

pub struct MaterialRepo {
    pool: PgPool,
}

impl MaterialRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, material: &NewMaterial) -> DbResult<DbMaterial> {
        let m = sqlx::query_as::<_, DbMaterial>(
            r#"
            INSERT INTO materials (id, seller_id, title, subject, description, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(material.id)
        .bind(material.seller_id)
        .bind(&material.title)
        .bind(&material.subject)
        .bind(&material.description)
        .bind(material.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(m)
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbMaterial>> {
        let material = sqlx::query_as::<_, DbMaterial>("SELECT * FROM materials WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(material)
    }

    pub async fn list(
        &self,
        filter: &MaterialFilter,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<DbMaterial>> {
        let materials = sqlx::query_as::<_, DbMaterial>(
            r#"
            SELECT * FROM materials
            WHERE ($1::text IS NULL OR subject = $1)
              AND ($2::uuid IS NULL OR seller_id = $2)
              AND ($3::numeric IS NULL OR price <= $3)
              AND (NOT $4 OR active)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(&filter.subject)
        .bind(filter.seller_id)
        .bind(filter.max_price)
        .bind(filter.active_only)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(materials)
    }

    pub async fn count(&self, filter: &MaterialFilter) -> DbResult<i64> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM materials
            WHERE ($1::text IS NULL OR subject = $1)
              AND ($2::uuid IS NULL OR seller_id = $2)
              AND ($3::numeric IS NULL OR price <= $3)
              AND (NOT $4 OR active)
            "#,
        )
        .bind(&filter.subject)
        .bind(filter.seller_id)
        .bind(filter.max_price)
        .bind(filter.active_only)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn set_active(&self, id: Uuid, active: bool) -> DbResult<Option<DbMaterial>> {
        let material = sqlx::query_as::<_, DbMaterial>(
            "UPDATE materials SET active = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(material)
    }
}
