//! User repository - the credential store

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbError, DbResult, DbUser};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, disabled, roles, created_at, updated_at";

/// User repository for identity and credential management
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        roles: &[String],
    ) -> DbResult<DbUser> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, roles)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(roles)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("users_username_key") {
                    return DbError::Duplicate(format!("Username {} already exists", username));
                }
            }
            DbError::Query(e)
        })?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: Uuid) -> DbResult<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by username
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<DbUser>> {
        let user = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List all users, newest first
    pub async fn list(&self, limit: i64, offset: i64) -> DbResult<Vec<DbUser>> {
        let users = sqlx::query_as::<_, DbUser>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Update user email
    pub async fn update_email(&self, user_id: Uuid, email: &str) -> DbResult<()> {
        sqlx::query("UPDATE users SET email = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Update user password
    pub async fn update_password(&self, user_id: Uuid, password_hash: &str) -> DbResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Set the disabled flag
    pub async fn set_disabled(&self, user_id: Uuid, disabled: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE users SET disabled = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(disabled)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    /// Add a role to the user's role set
    pub async fn add_role(&self, user_id: Uuid, role: &str) -> DbResult<()> {
        sqlx::query(
            "UPDATE users SET roles = array_append(roles, $2), updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove a role from the user's role set
    pub async fn remove_role(&self, user_id: Uuid, role: &str) -> DbResult<()> {
        sqlx::query(
            "UPDATE users SET roles = array_remove(roles, $2), updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
