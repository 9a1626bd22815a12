//! Audit trail repository

use sqlx::PgPool;

use crate::{DbAuditEvent, DbResult};

pub struct AuditRepo {
    pool: PgPool,
}

impl AuditRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        event_type: &str,
        actor: Option<&str>,
        target: Option<&str>,
        source_ip: Option<&str>,
        detail: Option<&str>,
    ) -> DbResult<DbAuditEvent> {
        let event = sqlx::query_as::<_, DbAuditEvent>(
            r#"
            INSERT INTO audit_events (event_type, actor, target, source_ip, detail)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(event_type)
        .bind(actor)
        .bind(target)
        .bind(source_ip)
        .bind(detail)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    pub async fn list_recent(&self, limit: i64, offset: i64) -> DbResult<Vec<DbAuditEvent>> {
        let events = sqlx::query_as::<_, DbAuditEvent>(
            "SELECT * FROM audit_events ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }
}
