//! The `FamilyStore` trait — abstraction over storage backends.
//!
//! The trait is implemented by storage backends (e.g.
//! `stemma-store-sqlite`). The API layer depends on this abstraction, not
//! on any concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::{collections::BTreeSet, future::Future};

use uuid::Uuid;

use crate::{
  member::{Member, MemberId, MemberUpdate, NewMember},
  tree::{NewTree, Tree, TreeId},
};

pub trait FamilyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Trees ─────────────────────────────────────────────────────────────

  /// Create and persist a new tree. The store assigns a fresh id and the
  /// creation timestamp; rejects an empty name.
  fn add_tree(
    &self,
    input: NewTree,
  ) -> impl Future<Output = Result<Tree, Self::Error>> + Send + '_;

  /// Retrieve a tree by id. Returns `None` if not found.
  fn get_tree(
    &self,
    id: TreeId,
  ) -> impl Future<Output = Result<Option<Tree>, Self::Error>> + Send + '_;

  /// List all trees, optionally restricted to one owner.
  fn list_trees(
    &self,
    owner: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Tree>, Self::Error>> + Send + '_;

  // ── Members ───────────────────────────────────────────────────────────

  /// Persist a new member with a fresh id.
  ///
  /// Rejects an empty name, an unknown tree, and a `parent_id` that does
  /// not reference a member of the same tree.
  fn add_member(
    &self,
    input: NewMember,
  ) -> impl Future<Output = Result<Member, Self::Error>> + Send + '_;

  /// Retrieve a member by id. Returns `None` if not found.
  fn get_member(
    &self,
    id: MemberId,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + '_;

  /// All members of a tree. Iteration order is stable for a single call
  /// (insertion order in the SQLite backend) — reconstruction relies on
  /// it for sibling ordering.
  fn list_members(
    &self,
    tree_id: TreeId,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  /// Update display attributes only. Relation links are not reachable
  /// through this path.
  fn update_member(
    &self,
    id: MemberId,
    update: MemberUpdate,
  ) -> impl Future<Output = Result<Member, Self::Error>> + Send + '_;

  /// Re-point a member's parent link.
  ///
  /// The one sanctioned relation write. It exists for root promotion
  /// ([`crate::relation::ParentLinkPolicy::PromoteAbove`]) and applies the
  /// same same-tree validation as [`Self::add_member`].
  fn set_parent(
    &self,
    id: MemberId,
    parent: Option<MemberId>,
  ) -> impl Future<Output = Result<Member, Self::Error>> + Send + '_;

  // ── Deletion ──────────────────────────────────────────────────────────

  /// Remove exactly the given members in one transaction — all or
  /// nothing. Returns the number of rows actually removed.
  fn remove_members(
    &self,
    ids: BTreeSet<MemberId>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Cascade-delete `id` together with its full descendant closure.
  ///
  /// The closure is computed with
  /// [`crate::relation::resolve_delete`] and applied inside a single
  /// transaction on the store side, so no orphaned descendant can survive
  /// a racing write. Returns the removed ids.
  fn remove_subtree(
    &self,
    id: MemberId,
  ) -> impl Future<Output = Result<BTreeSet<MemberId>, Self::Error>> + Send + '_;
}
