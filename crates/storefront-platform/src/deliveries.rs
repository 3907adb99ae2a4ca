use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, PgPool, Row};
use storefront_core::{
    DeliveryStore, EventDelivery, EventDeliveryAttempt, EventDeliveryStatus, EventPayload, Webhook,
};
use uuid::Uuid;

const WEBHOOK_COLUMNS: &str = r#"
    w.id, w.app_id, w.name, w.target_url, w.secret_key, w.is_active,
    ARRAY(
        SELECT e.event_type FROM webhook_event e
        WHERE e.webhook_id = w.id
        ORDER BY e.event_type
    ) AS events
"#;

#[derive(Clone)]
pub struct PgDeliveryStore {
    pool: PgPool,
}

impl PgDeliveryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryStore for PgDeliveryStore {
    async fn insert_payload(&self, payload: String) -> Result<EventPayload> {
        let event_payload = EventPayload::new(payload);
        insert_payload_row(&self.pool, &event_payload).await?;
        Ok(event_payload)
    }

    async fn payload(&self, payload_id: Uuid) -> Result<Option<EventPayload>> {
        let row = sqlx::query(
            "SELECT id, payload, created_at FROM webhook_event_payload WHERE id = $1",
        )
        .bind(payload_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<EventPayload> {
            Ok(EventPayload {
                id: row.try_get("id")?,
                payload: row.try_get("payload")?,
                created_at: row.try_get("created_at")?,
            })
        })
        .transpose()
    }

    async fn webhooks_for_event(&self, event_type: &str) -> Result<Vec<Webhook>> {
        let sql = format!(
            r#"
            SELECT {WEBHOOK_COLUMNS}
            FROM webhook w
            JOIN app a ON a.id = w.app_id
            WHERE w.is_active
              AND a.is_active
              AND EXISTS (
                    SELECT 1 FROM webhook_event e
                    WHERE e.webhook_id = w.id AND e.event_type = $1
              )
            ORDER BY w.created_at, w.id
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(event_type)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(webhook_from_row).collect()
    }

    async fn webhook(&self, webhook_id: Uuid) -> Result<Option<Webhook>> {
        let sql = format!("SELECT {WEBHOOK_COLUMNS} FROM webhook w WHERE w.id = $1");
        let row = sqlx::query(&sql)
            .bind(webhook_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(webhook_from_row).transpose()
    }

    async fn insert_deliveries(
        &self,
        deliveries: Vec<EventDelivery>,
    ) -> Result<Vec<EventDelivery>> {
        insert_delivery_rows(&self.pool, &deliveries).await?;
        Ok(deliveries)
    }

    async fn insert_event(
        &self,
        payload: EventPayload,
        deliveries: Vec<EventDelivery>,
    ) -> Result<(EventPayload, Vec<EventDelivery>)> {
        let mut tx = self.pool.begin().await?;

        insert_payload_row(&mut *tx, &payload).await?;
        insert_delivery_rows(&mut *tx, &deliveries).await?;

        tx.commit().await.context("failed to commit event")?;
        Ok((payload, deliveries))
    }

    async fn delivery(&self, delivery_id: Uuid) -> Result<Option<EventDelivery>> {
        let row = sqlx::query(
            r#"
            SELECT id, status, event_type, payload_id, webhook_id, created_at
            FROM webhook_event_delivery
            WHERE id = $1
            "#,
        )
        .bind(delivery_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(delivery_from_row).transpose()
    }

    async fn save_delivery_status(
        &self,
        delivery_id: Uuid,
        status: EventDeliveryStatus,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE webhook_event_delivery SET status = $2 WHERE id = $1")
            .bind(delivery_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            bail!("event delivery {delivery_id} not found");
        }
        Ok(())
    }

    async fn delete_delivery(&self, delivery_id: Uuid) -> Result<()> {
        // attempts reference deliveries with ON DELETE SET NULL
        sqlx::query("DELETE FROM webhook_event_delivery WHERE id = $1")
            .bind(delivery_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_attempt(&self, attempt: EventDeliveryAttempt) -> Result<EventDeliveryAttempt> {
        sqlx::query(
            r#"
            INSERT INTO webhook_event_delivery_attempt (
                id, delivery_id, task_id, duration, response,
                request_headers, response_headers, status, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(attempt.id)
        .bind(attempt.delivery_id)
        .bind(attempt.task_id.as_deref())
        .bind(attempt.duration)
        .bind(attempt.response.as_deref())
        .bind(attempt.request_headers.as_deref())
        .bind(attempt.response_headers.as_deref())
        .bind(attempt.status.as_str())
        .bind(attempt.created_at)
        .execute(&self.pool)
        .await
        .context("failed to persist delivery attempt")?;

        Ok(attempt)
    }

    async fn save_attempt_outcome(&self, attempt: &EventDeliveryAttempt) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE webhook_event_delivery_attempt
            SET
                duration = $2,
                response = $3,
                request_headers = $4,
                response_headers = $5,
                status = $6
            WHERE id = $1
            "#,
        )
        .bind(attempt.id)
        .bind(attempt.duration)
        .bind(attempt.response.as_deref())
        .bind(attempt.request_headers.as_deref())
        .bind(attempt.response_headers.as_deref())
        .bind(attempt.status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            bail!("event delivery attempt {} not found", attempt.id);
        }
        Ok(())
    }

    async fn attempts(&self, delivery_id: Uuid) -> Result<Vec<EventDeliveryAttempt>> {
        let rows = sqlx::query(
            r#"
            SELECT
                id, delivery_id, task_id, duration, response,
                request_headers, response_headers, status, created_at
            FROM webhook_event_delivery_attempt
            WHERE delivery_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(delivery_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(attempt_from_row).collect()
    }
}

async fn insert_payload_row<'e, E>(executor: E, payload: &EventPayload) -> Result<()>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO webhook_event_payload (id, payload, created_at)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(payload.id)
    .bind(&payload.payload)
    .bind(payload.created_at)
    .execute(executor)
    .await
    .context("failed to persist event payload")?;

    Ok(())
}

/// Single-statement batch insert over `UNNEST`.
async fn insert_delivery_rows<'e, E>(executor: E, deliveries: &[EventDelivery]) -> Result<()>
where
    E: PgExecutor<'e>,
{
    if deliveries.is_empty() {
        return Ok(());
    }

    let ids: Vec<Uuid> = deliveries.iter().map(|delivery| delivery.id).collect();
    let statuses: Vec<&str> = deliveries
        .iter()
        .map(|delivery| delivery.status.as_str())
        .collect();
    let event_types: Vec<&str> = deliveries
        .iter()
        .map(|delivery| delivery.event_type.as_str())
        .collect();
    let payload_ids: Vec<Uuid> = deliveries
        .iter()
        .map(|delivery| delivery.payload_id)
        .collect();
    let webhook_ids: Vec<Uuid> = deliveries
        .iter()
        .map(|delivery| delivery.webhook_id)
        .collect();
    let created_at: Vec<DateTime<Utc>> = deliveries
        .iter()
        .map(|delivery| delivery.created_at)
        .collect();

    sqlx::query(
        r#"
        INSERT INTO webhook_event_delivery (
            id, status, event_type, payload_id, webhook_id, created_at
        )
        SELECT * FROM UNNEST(
            $1::uuid[], $2::text[], $3::text[], $4::uuid[], $5::uuid[], $6::timestamptz[]
        )
        "#,
    )
    .bind(&ids)
    .bind(&statuses)
    .bind(&event_types)
    .bind(&payload_ids)
    .bind(&webhook_ids)
    .bind(&created_at)
    .execute(executor)
    .await
    .context("failed to persist event deliveries")?;

    Ok(())
}

fn webhook_from_row(row: &PgRow) -> Result<Webhook> {
    Ok(Webhook {
        id: row.try_get("id")?,
        app_id: row.try_get("app_id")?,
        name: row.try_get("name")?,
        target_url: row.try_get("target_url")?,
        secret_key: row.try_get("secret_key")?,
        is_active: row.try_get("is_active")?,
        events: row.try_get("events")?,
    })
}

fn delivery_from_row(row: &PgRow) -> Result<EventDelivery> {
    Ok(EventDelivery {
        id: row.try_get("id")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        event_type: row.try_get("event_type")?,
        payload_id: row.try_get("payload_id")?,
        webhook_id: row.try_get("webhook_id")?,
        created_at: row.try_get("created_at")?,
    })
}

fn attempt_from_row(row: &PgRow) -> Result<EventDeliveryAttempt> {
    Ok(EventDeliveryAttempt {
        id: row.try_get("id")?,
        delivery_id: row.try_get("delivery_id")?,
        task_id: row.try_get("task_id")?,
        duration: row.try_get("duration")?,
        response: row.try_get("response")?,
        request_headers: row.try_get("request_headers")?,
        response_headers: row.try_get("response_headers")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        created_at: row.try_get("created_at")?,
    })
}
