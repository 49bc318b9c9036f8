//! Escrow order repository
//!
//! Every lifecycle transition is a conditional UPDATE on the current state
//! (`WHERE state = $expected`). A caller that loses the race gets `None`
//! back and must not fire gateway side effects.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbEscrowOrder, DbResult};

/// Fields required to insert a provisional order
#[derive(Debug, Clone)]
pub struct NewEscrowOrder {
    pub id: Uuid,
    pub material_id: Uuid,
    pub seller_id: Uuid,
    pub buyer_id: Uuid,
    pub amount: Decimal,
}

pub struct EscrowOrderRepo {
    pool: PgPool,
}

impl EscrowOrderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a provisional order in `pending_hold`.
    ///
    /// `receipt_no` comes from the table's sequence, never count-then-insert.
    pub async fn insert_pending(&self, order: &NewEscrowOrder) -> DbResult<DbEscrowOrder> {
        let o = sqlx::query_as::<_, DbEscrowOrder>(
            r#"
            INSERT INTO escrow_orders (id, material_id, seller_id, buyer_id, amount, state)
            VALUES ($1, $2, $3, $4, $5, 'pending_hold')
            RETURNING *
            "#,
        )
        .bind(order.id)
        .bind(order.material_id)
        .bind(order.seller_id)
        .bind(order.buyer_id)
        .bind(order.amount)
        .fetch_one(&self.pool)
        .await?;
        Ok(o)
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbEscrowOrder>> {
        let order = sqlx::query_as::<_, DbEscrowOrder>("SELECT * FROM escrow_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    pub async fn find_by_gateway_order_id(
        &self,
        gateway_order_id: &str,
    ) -> DbResult<Option<DbEscrowOrder>> {
        let order = sqlx::query_as::<_, DbEscrowOrder>(
            "SELECT * FROM escrow_orders WHERE gateway_order_id = $1",
        )
        .bind(gateway_order_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    /// CAS `pending_hold -> created` once the gateway hold exists.
    pub async fn finalize_hold(
        &self,
        id: Uuid,
        gateway_order_id: &str,
        payment_deadline: DateTime<Utc>,
    ) -> DbResult<Option<DbEscrowOrder>> {
        let order = sqlx::query_as::<_, DbEscrowOrder>(
            r#"
            UPDATE escrow_orders
            SET state = 'created', gateway_order_id = $2, payment_deadline = $3, updated_at = now()
            WHERE id = $1 AND state = 'pending_hold'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(gateway_order_id)
        .bind(payment_deadline)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    /// CAS `created -> paid` when the gateway reports a capture.
    pub async fn mark_paid(
        &self,
        id: Uuid,
        capture_id: &str,
        delivery_deadline: DateTime<Utc>,
    ) -> DbResult<Option<DbEscrowOrder>> {
        let order = sqlx::query_as::<_, DbEscrowOrder>(
            r#"
            UPDATE escrow_orders
            SET state = 'paid', capture_id = $2, delivery_deadline = $3, updated_at = now()
            WHERE id = $1 AND state = 'created'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(capture_id)
        .bind(delivery_deadline)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    /// CAS `paid`/`delivered -> delivered`, installing a fresh OTP.
    ///
    /// Re-marking a delivered order supersedes the previous unconsumed code.
    pub async fn mark_delivered(
        &self,
        id: Uuid,
        otp_code: &str,
        otp_expires_at: DateTime<Utc>,
    ) -> DbResult<Option<DbEscrowOrder>> {
        let order = sqlx::query_as::<_, DbEscrowOrder>(
            r#"
            UPDATE escrow_orders
            SET state = 'delivered', otp_code = $2, otp_expires_at = $3, updated_at = now()
            WHERE id = $1 AND state IN ('paid', 'delivered')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(otp_code)
        .bind(otp_expires_at)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    /// CAS `delivered -> completed`, clearing the consumed OTP.
    ///
    /// The row starts unsettled; `mark_settled` confirms the gateway capture.
    pub async fn complete(&self, id: Uuid) -> DbResult<Option<DbEscrowOrder>> {
        let order = sqlx::query_as::<_, DbEscrowOrder>(
            r#"
            UPDATE escrow_orders
            SET state = 'completed', settled = FALSE,
                otp_code = NULL, otp_expires_at = NULL, updated_at = now()
            WHERE id = $1 AND state = 'delivered'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    /// CAS `paid`/`delivered -> refunded`, clearing any outstanding OTP.
    ///
    /// The row starts unsettled; `mark_settled` confirms the gateway refund.
    pub async fn refund(&self, id: Uuid) -> DbResult<Option<DbEscrowOrder>> {
        let order = sqlx::query_as::<_, DbEscrowOrder>(
            r#"
            UPDATE escrow_orders
            SET state = 'refunded', settled = FALSE,
                otp_code = NULL, otp_expires_at = NULL, updated_at = now()
            WHERE id = $1 AND state IN ('paid', 'delivered')
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    /// Record that the gateway accepted the capture or refund for a
    /// terminal order.
    pub async fn mark_settled(&self, id: Uuid) -> DbResult<Option<DbEscrowOrder>> {
        let order = sqlx::query_as::<_, DbEscrowOrder>(
            r#"
            UPDATE escrow_orders
            SET settled = TRUE, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    /// Terminal orders whose gateway money movement has not been confirmed,
    /// oldest first.
    pub async fn find_unsettled(&self) -> DbResult<Vec<DbEscrowOrder>> {
        let orders = sqlx::query_as::<_, DbEscrowOrder>(
            r#"
            SELECT * FROM escrow_orders
            WHERE settled = FALSE AND state IN ('completed', 'refunded')
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// CAS `pending_hold`/`created -> cancelled`.
    pub async fn cancel(&self, id: Uuid) -> DbResult<Option<DbEscrowOrder>> {
        let order = sqlx::query_as::<_, DbEscrowOrder>(
            r#"
            UPDATE escrow_orders
            SET state = 'cancelled', updated_at = now()
            WHERE id = $1 AND state IN ('pending_hold', 'created')
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(order)
    }

    /// Non-terminal orders whose relevant deadline has passed.
    ///
    /// `pending_hold` rows use `created_at + grace` as their deadline; the
    /// other states use the explicit deadline columns.
    pub async fn find_sweepable(
        &self,
        now: DateTime<Utc>,
        pending_hold_cutoff: DateTime<Utc>,
    ) -> DbResult<Vec<DbEscrowOrder>> {
        let orders = sqlx::query_as::<_, DbEscrowOrder>(
            r#"
            SELECT * FROM escrow_orders
            WHERE (state = 'pending_hold' AND created_at < $2)
               OR (state = 'created' AND payment_deadline < $1)
               OR (state = 'paid' AND delivery_deadline < $1)
               OR (state = 'delivered' AND otp_expires_at < $1)
            ORDER BY created_at
            "#,
        )
        .bind(now)
        .bind(pending_hold_cutoff)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// Orders a student participated in, newest first.
    pub async fn find_by_party(
        &self,
        student_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<DbEscrowOrder>> {
        let orders = sqlx::query_as::<_, DbEscrowOrder>(
            r#"
            SELECT * FROM escrow_orders
            WHERE buyer_id = $1 OR seller_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(student_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }
}
