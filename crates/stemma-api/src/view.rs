//! Handler for the tree-reconstruction endpoint.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET` | `/trees/:id/tree` | [`BuiltTree`] for rendering; `root` is `null` when there is nothing to display |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use stemma_core::{
  builder::{BuiltTree, build},
  store::FamilyStore,
  tree::TreeId,
};

use crate::error::ApiError;

/// `GET /trees/:id/tree`
///
/// Reconstruction is re-run on every call — it is cheap and the result is
/// never cached, so the view always reflects the latest snapshot.
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  Path(tree_id): Path<TreeId>,
) -> Result<Json<BuiltTree>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_tree(tree_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("tree {tree_id} not found")))?;

  let members = store
    .list_members(tree_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(build(&members)))
}
