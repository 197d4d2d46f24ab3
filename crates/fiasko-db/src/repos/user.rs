use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user. Returns `None` when the email or username is
    /// already taken (unique constraint), leaving the table unchanged.
    pub async fn create(
        pool: &SqlitePool,
        user_id: Uuid,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<Option<UserRow>> {
        let res = sqlx::query_as::<_, UserRow>(
            r#"INSERT INTO "user" (user_id, email, username, password_hash, created_at)
               VALUES (?, ?, ?, ?, ?)
               RETURNING user_id, email, username, password_hash, created_at"#,
        )
        .bind(user_id)
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_one(pool)
        .await;
        match res {
            Ok(row) => Ok(Some(row)),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
            Err(e) => Err(e).context("Failed to create user"),
        }
    }

    pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT user_id, email, username, password_hash, created_at FROM "user" WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by email")?;
        Ok(row)
    }

    pub async fn get_by_id(pool: &SqlitePool, user_id: Uuid) -> Result<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT user_id, email, username, password_hash, created_at FROM "user" WHERE user_id = ?"#,
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get user by id")?;
        Ok(row)
    }
}
