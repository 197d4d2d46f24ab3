use crate::state::AppState;
use crate::web::api::middleware::AuthUser;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use fiasko_common::models::exhibit::{Author, CreatePostRequest, Exhibit};
use fiasko_db::{PostRepo, PostRow, PostWithAuthorRow, ToggleOutcome};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

/// Frame color used when the submission doesn't pick one
const DEFAULT_COLOR: &str = "#800020";

/// The stored blob is opaque; whatever JSON it holds is passed through
fn display_item_json(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or(serde_json::Value::Null)
}

fn exhibit_from_joined(row: &PostWithAuthorRow) -> Exhibit {
    Exhibit {
        post_id: row.post_id,
        title: row.title.clone(),
        content: row.content.clone(),
        display_item: display_item_json(&row.display_item),
        is_public: row.is_public,
        author: Author {
            username: row.author_username.clone(),
        },
        created_at: row.created_at,
    }
}

fn exhibit_from_row(row: &PostRow, username: &str) -> Exhibit {
    Exhibit {
        post_id: row.post_id,
        title: row.title.clone(),
        content: row.content.clone(),
        display_item: display_item_json(&row.display_item),
        is_public: row.is_public,
        author: Author {
            username: username.to_string(),
        },
        created_at: row.created_at,
    }
}

/// GET /api/posts -- the public museum feed. No auth; private posts never
/// appear here, whoever asks.
#[tracing::instrument(skip(state))]
pub async fn list_posts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match PostRepo::list_public(&state.pool).await {
        Ok(rows) => {
            let exhibits: Vec<Exhibit> = rows.iter().map(exhibit_from_joined).collect();
            Json(exhibits).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list public posts: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        }
    }
}

/// GET /api/posts/mine -- the attic: every post owned by the requester,
/// public or not
#[tracing::instrument(skip(state))]
pub async fn list_mine(State(state): State<Arc<AppState>>, auth: AuthUser) -> impl IntoResponse {
    let author_id: Uuid = match auth.0.sub.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Invalid user ID in token"})),
            )
                .into_response()
        }
    };

    match PostRepo::list_by_author(&state.pool, author_id).await {
        Ok(rows) => {
            let exhibits: Vec<Exhibit> = rows.iter().map(exhibit_from_joined).collect();
            Json(exhibits).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list posts for {}: {:#}", author_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        }
    }
}

/// POST /api/posts -- submit a new exhibit. The owner is always the
/// verified identity; nothing in the body can set it.
#[tracing::instrument(skip(state, req))]
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(req): Json<CreatePostRequest>,
) -> impl IntoResponse {
    let author_id: Uuid = match auth.0.sub.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Invalid user ID in token"})),
            )
                .into_response()
        }
    };

    if req.title.trim().is_empty() || req.content.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Title and content are required"})),
        )
            .into_response();
    }

    let color = req.color.as_deref().unwrap_or(DEFAULT_COLOR);
    let display_item = json!({"type": "painting", "color": color}).to_string();
    let is_public = req.is_public.unwrap_or(true);

    match PostRepo::create(
        &state.pool,
        Uuid::new_v4(),
        &req.title,
        &req.content,
        &display_item,
        is_public,
        author_id,
    )
    .await
    {
        Ok(row) => (
            StatusCode::CREATED,
            Json(exhibit_from_row(&row, &auth.0.username)),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to create post: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        }
    }
}

/// PATCH /api/posts/{id}/privacy -- flip an exhibit between the museum and
/// the attic. Owner only; the echoed exhibit is the authoritative
/// post-toggle state.
#[tracing::instrument(skip(state))]
pub async fn toggle_privacy(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let post_id = match id.parse::<Uuid>() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid post ID"})),
            )
                .into_response()
        }
    };

    let author_id: Uuid = match auth.0.sub.parse() {
        Ok(id) => id,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Invalid user ID in token"})),
            )
                .into_response()
        }
    };

    match PostRepo::toggle_visibility(&state.pool, post_id, author_id).await {
        Ok(ToggleOutcome::Updated(row)) => {
            Json(exhibit_from_row(&row, &auth.0.username)).into_response()
        }
        Ok(ToggleOutcome::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Exhibit not found"})),
        )
            .into_response(),
        Ok(ToggleOutcome::NotOwner) => (
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Not the owner of this exhibit"})),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to toggle visibility of {}: {:#}", post_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_display_item_passthrough() {
        let value = display_item_json(r##"{"type":"painting","color":"#1a2b3c"}"##);
        assert_eq!(value["type"], "painting");
        assert_eq!(value["color"], "#1a2b3c");
    }

    #[test]
    fn test_display_item_invalid_blob_is_null() {
        assert_eq!(display_item_json("not json"), serde_json::Value::Null);
    }

    #[test]
    fn test_exhibit_author_is_username_only() {
        let row = PostRow {
            post_id: Uuid::new_v4(),
            title: "New Coke".to_string(),
            content: "Classic formula changed".to_string(),
            display_item: r##"{"type":"painting","color":"#e61d2b"}"##.to_string(),
            is_public: true,
            author_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        let exhibit = exhibit_from_row(&row, "alice");
        let rendered = serde_json::to_value(&exhibit).unwrap();
        assert_eq!(rendered["author"], json!({"username": "alice"}));
    }
}
