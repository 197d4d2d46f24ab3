use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub post_id: Uuid,
    pub title: String,
    pub content: String,
    pub display_item: String,
    pub is_public: bool,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Post joined with its author's username, for feed responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostWithAuthorRow {
    pub post_id: Uuid,
    pub title: String,
    pub content: String,
    pub display_item: String,
    pub is_public: bool,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub author_username: String,
}

/// Result of an ownership-checked visibility toggle
#[derive(Debug, Clone)]
pub enum ToggleOutcome {
    Updated(PostRow),
    NotFound,
    NotOwner,
}

pub struct PostRepo;

impl PostRepo {
    pub async fn create(
        pool: &SqlitePool,
        post_id: Uuid,
        title: &str,
        content: &str,
        display_item: &str,
        is_public: bool,
        author_id: Uuid,
    ) -> Result<PostRow> {
        let row = sqlx::query_as::<_, PostRow>(
            "INSERT INTO post (post_id, title, content, display_item, is_public, author_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING post_id, title, content, display_item, is_public, author_id, created_at",
        )
        .bind(post_id)
        .bind(title)
        .bind(content)
        .bind(display_item)
        .bind(is_public)
        .bind(author_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .context("Failed to create post")?;
        Ok(row)
    }

    pub async fn get(pool: &SqlitePool, post_id: Uuid) -> Result<Option<PostRow>> {
        let row = sqlx::query_as::<_, PostRow>(
            "SELECT post_id, title, content, display_item, is_public, author_id, created_at
             FROM post WHERE post_id = ?",
        )
        .bind(post_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post")?;
        Ok(row)
    }

    /// The public feed: public posts only, newest first, whoever asks
    pub async fn list_public(pool: &SqlitePool) -> Result<Vec<PostWithAuthorRow>> {
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(
            r#"SELECT p.post_id, p.title, p.content, p.display_item, p.is_public, p.author_id,
                      p.created_at, u.username AS author_username
               FROM post p
               JOIN "user" u ON u.user_id = p.author_id
               WHERE p.is_public = 1
               ORDER BY p.created_at DESC"#,
        )
        .fetch_all(pool)
        .await
        .context("Failed to list public posts")?;
        Ok(rows)
    }

    /// Every post owned by `author_id`, public or private, newest first
    pub async fn list_by_author(
        pool: &SqlitePool,
        author_id: Uuid,
    ) -> Result<Vec<PostWithAuthorRow>> {
        let rows = sqlx::query_as::<_, PostWithAuthorRow>(
            r#"SELECT p.post_id, p.title, p.content, p.display_item, p.is_public, p.author_id,
                      p.created_at, u.username AS author_username
               FROM post p
               JOIN "user" u ON u.user_id = p.author_id
               WHERE p.author_id = ?
               ORDER BY p.created_at DESC"#,
        )
        .bind(author_id)
        .fetch_all(pool)
        .await
        .context("Failed to list posts by author")?;
        Ok(rows)
    }

    /// Flip the visibility flag iff `author_id` owns the post. The flip and
    /// the echoed row come from one UPDATE .. RETURNING statement, so
    /// concurrent toggles of the same post serialize on the row and the
    /// returned state is always the state this request produced.
    pub async fn toggle_visibility(
        pool: &SqlitePool,
        post_id: Uuid,
        author_id: Uuid,
    ) -> Result<ToggleOutcome> {
        let updated = sqlx::query_as::<_, PostRow>(
            "UPDATE post SET is_public = NOT is_public
             WHERE post_id = ? AND author_id = ?
             RETURNING post_id, title, content, display_item, is_public, author_id, created_at",
        )
        .bind(post_id)
        .bind(author_id)
        .fetch_optional(pool)
        .await
        .context("Failed to toggle post visibility")?;

        if let Some(row) = updated {
            return Ok(ToggleOutcome::Updated(row));
        }

        // Zero rows: either the post doesn't exist or someone else owns it
        match Self::get(pool, post_id).await? {
            Some(_) => Ok(ToggleOutcome::NotOwner),
            None => Ok(ToggleOutcome::NotFound),
        }
    }
}
