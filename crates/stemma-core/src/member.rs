//! Member — one person record belonging to exactly one tree.
//!
//! A member carries at most one parent link (single-parent model, not a
//! dual-parent pedigree) and a directed, advisory spouse link. Relation
//! fields are set at creation time; the attribute update path never touches
//! them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::tree::TreeId;

/// Store-assigned member identifier. Totally ordered — root tie-breaking
/// during reconstruction relies on the ordering.
pub type MemberId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
  pub member_id:  MemberId,
  pub tree_id:    TreeId,
  pub name:       String,
  pub dob:        Option<NaiveDate>,
  /// Opaque text; the core imposes no enumeration.
  pub gender:     Option<String>,
  /// Reference to an externally stored image. No binary data lives here.
  pub photo_url:  Option<String>,
  pub parent_id:  Option<MemberId>,
  /// Stored as given. Symmetry (A's spouse pointing back at A) is a
  /// convention the core neither enforces nor auto-synchronises.
  pub spouse_id:  Option<MemberId>,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::FamilyStore::add_member`].
/// `member_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone)]
pub struct NewMember {
  pub tree_id:   TreeId,
  pub name:      String,
  pub dob:       Option<NaiveDate>,
  pub gender:    Option<String>,
  pub photo_url: Option<String>,
  pub parent_id: Option<MemberId>,
  pub spouse_id: Option<MemberId>,
}

impl NewMember {
  /// Convenience constructor with every optional field unset.
  pub fn new(tree_id: TreeId, name: impl Into<String>) -> Self {
    Self {
      tree_id,
      name: name.into(),
      dob: None,
      gender: None,
      photo_url: None,
      parent_id: None,
      spouse_id: None,
    }
  }
}

/// The attribute-only edit path: `Some` sets a field, `None` leaves it
/// unchanged. Relation links are deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct MemberUpdate {
  pub name:      Option<String>,
  pub dob:       Option<NaiveDate>,
  pub gender:    Option<String>,
  pub photo_url: Option<String>,
}
