//! Refresh token ledger repository
//!
//! Persists every issued refresh token. Rows are never deleted: revoked and
//! expired tokens stay behind as the historical record of every session.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbResult, DbRefreshToken};

const TOKEN_COLUMNS: &str = "id, token, user_id, created_at, expires_at, revoked";

pub struct RefreshTokenRepo {
    pool: PgPool,
}

impl RefreshTokenRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a newly issued token
    pub async fn insert(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> DbResult<DbRefreshToken> {
        let row = sqlx::query_as::<_, DbRefreshToken>(&format!(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Look up a token row by its exact bearer value
    pub async fn find_by_token(&self, token: &str) -> DbResult<Option<DbRefreshToken>> {
        let row = sqlx::query_as::<_, DbRefreshToken>(&format!(
            "SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Retire a token and persist its successor in one transaction. The
    /// WHERE clause on the update is the concurrency guard: of two racing
    /// callers, only the one whose update affects a row wins and inserts the
    /// successor. Returns the new row, or None when the old token was
    /// missing, revoked, or expired.
    pub async fn rotate(
        &self,
        old_token: &str,
        new_token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> DbResult<Option<DbRefreshToken>> {
        let mut tx = self.pool.begin().await?;

        let claimed = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE \
             WHERE token = $1 AND revoked = FALSE AND expires_at > NOW()",
        )
        .bind(old_token)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() != 1 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, DbRefreshToken>(&format!(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            RETURNING {TOKEN_COLUMNS}
            "#
        ))
        .bind(new_token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(row))
    }

    /// Mark a token revoked. Idempotent: revoking an already-revoked token is
    /// not an error here.
    pub async fn mark_revoked(&self, token: &str) -> DbResult<()> {
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Revoke every outstanding token for a user (cascading disable).
    /// Returns the number of tokens revoked.
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> DbResult<u64> {
        let result =
            sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE user_id = $1 AND revoked = FALSE")
                .bind(user_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
