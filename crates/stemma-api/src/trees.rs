//! Handlers for `/trees` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/trees` | Optional `?owner=<uuid>` |
//! | `POST` | `/trees` | Body: `{"name":"...","owner":"<uuid>"}` |
//! | `GET`  | `/trees/:id` | 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use stemma_core::{
  store::FamilyStore,
  tree::{NewTree, Tree, TreeId},
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub owner: Option<Uuid>,
}

/// `GET /trees[?owner=<uuid>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Tree>>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let trees = store
    .list_trees(params.owner)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(trees))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:  String,
  pub owner: Uuid,
}

/// `POST /trees` — body: `{"name":"...","owner":"<uuid>"}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("tree name is required".to_string()));
  }

  let tree = store
    .add_tree(NewTree { name: body.name, owner: body.owner })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok((StatusCode::CREATED, Json(tree)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /trees/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<TreeId>,
) -> Result<Json<Tree>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let tree = store
    .get_tree(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("tree {id} not found")))?;
  Ok(Json(tree))
}
