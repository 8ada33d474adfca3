//! Tree — a named container of members, created once by its owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned tree identifier.
pub type TreeId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
  pub tree_id:    TreeId,
  pub name:       String,
  /// The creating user. Opaque to the core; trees never change hands and
  /// are never deleted here.
  pub owner:      Uuid,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::FamilyStore::add_tree`].
/// `tree_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTree {
  pub name:  String,
  pub owner: Uuid,
}
