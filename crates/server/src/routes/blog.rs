use axum::extract::{Path, State};
use axum::Json;
use serde_json::{Map, Value};

use models::{Post, PostDraft, PostPatch};

use crate::errors::ApiError;
use crate::state::AppState;

/// Get all blog posts as an id-keyed object, in blob insertion order.
/// Public, no authentication required.
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Map<String, Value>>, ApiError> {
    let posts = state.repo.list().await?;
    let mut out = Map::new();
    for post in posts {
        let id = post.id.clone();
        let value =
            serde_json::to_value(post).map_err(|e| ApiError::StoreUnavailable(e.to_string()))?;
        out.insert(id, value);
    }
    Ok(Json(out))
}

/// Get a single blog post. Public, no authentication required.
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, ApiError> {
    let post = state.repo.get(&id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(post))
}

/// Create a new blog post. Admin only.
pub async fn create_post(
    State(state): State<AppState>,
    Json(draft): Json<PostDraft>,
) -> Result<Json<Post>, ApiError> {
    draft.validate()?;
    let post = state.repo.create(draft).await?;
    Ok(Json(post))
}

/// Partially update an existing blog post. Admin only.
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<PostPatch>,
) -> Result<Json<Post>, ApiError> {
    patch.validate()?;
    let post = state.repo.update(&id, patch).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(post))
}

/// Delete a blog post. Admin only.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    if state.repo.delete(&id).await? {
        Ok(Json(serde_json::json!({"message": "Blog post deleted successfully"})))
    } else {
        Err(ApiError::NotFound)
    }
}
