//! Error types for `stemma-core`.

use thiserror::Error;

use crate::{member::MemberId, relation::RelationKind, tree::TreeId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("member not found: {0}")]
  MemberNotFound(MemberId),

  #[error("tree not found: {0}")]
  TreeNotFound(TreeId),

  #[error("name must not be empty")]
  EmptyName,

  #[error("unknown relation kind: {0:?}")]
  UnknownRelation(String),

  #[error("relation {0:?} requires a selected member")]
  MissingRelationTarget(RelationKind),

  /// A parent link or relation target pointing outside the member's tree.
  #[error("member {member} belongs to tree {found}, expected tree {expected}")]
  CrossTreeReference {
    member:   MemberId,
    expected: TreeId,
    found:    TreeId,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
