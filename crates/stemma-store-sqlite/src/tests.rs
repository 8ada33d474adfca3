//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use stemma_core::{
  builder::build,
  member::{MemberUpdate, NewMember},
  store::FamilyStore,
  tree::NewTree,
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn tree(s: &SqliteStore) -> stemma_core::tree::Tree {
  s.add_tree(NewTree { name: "Liddell".into(), owner: Uuid::new_v4() })
    .await
    .unwrap()
}

// ─── Trees ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_tree() {
  let s = store().await;
  let owner = Uuid::new_v4();

  let t = s
    .add_tree(NewTree { name: "Liddell".into(), owner })
    .await
    .unwrap();
  assert_eq!(t.name, "Liddell");
  assert_eq!(t.owner, owner);

  let fetched = s.get_tree(t.tree_id).await.unwrap().unwrap();
  assert_eq!(fetched.tree_id, t.tree_id);
  assert_eq!(fetched.name, "Liddell");
  assert_eq!(fetched.owner, owner);
}

#[tokio::test]
async fn get_tree_missing_returns_none() {
  let s = store().await;
  assert!(s.get_tree(999).await.unwrap().is_none());
}

#[tokio::test]
async fn add_tree_blank_name_rejected() {
  let s = store().await;
  let err = s
    .add_tree(NewTree { name: "   ".into(), owner: Uuid::new_v4() })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(stemma_core::Error::EmptyName)));
}

#[tokio::test]
async fn list_trees_filtered_by_owner() {
  let s = store().await;
  let alice = Uuid::new_v4();
  let bob = Uuid::new_v4();

  s.add_tree(NewTree { name: "A".into(), owner: alice }).await.unwrap();
  s.add_tree(NewTree { name: "B".into(), owner: bob }).await.unwrap();
  s.add_tree(NewTree { name: "C".into(), owner: alice }).await.unwrap();

  let all = s.list_trees(None).await.unwrap();
  assert_eq!(all.len(), 3);

  let hers = s.list_trees(Some(alice)).await.unwrap();
  assert_eq!(hers.len(), 2);
  assert!(hers.iter().all(|t| t.owner == alice));
}

// ─── Member creation ─────────────────────────────────────────────────────────

#[tokio::test]
async fn add_member_assigns_fresh_ordered_ids() {
  let s = store().await;
  let t = tree(&s).await;

  let first = s.add_member(NewMember::new(t.tree_id, "Alice")).await.unwrap();
  let second = s.add_member(NewMember::new(t.tree_id, "Lorina")).await.unwrap();

  assert!(second.member_id > first.member_id);
  assert_eq!(first.tree_id, t.tree_id);
}

#[tokio::test]
async fn add_member_empty_name_rejected() {
  let s = store().await;
  let t = tree(&s).await;

  let err = s.add_member(NewMember::new(t.tree_id, "  ")).await.unwrap_err();
  assert!(matches!(err, crate::Error::Core(stemma_core::Error::EmptyName)));

  assert!(s.list_members(t.tree_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_member_unknown_tree_rejected() {
  let s = store().await;
  let err = s.add_member(NewMember::new(42, "Alice")).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(stemma_core::Error::TreeNotFound(42))
  ));
}

#[tokio::test]
async fn add_member_missing_parent_rejected() {
  let s = store().await;
  let t = tree(&s).await;

  let mut input = NewMember::new(t.tree_id, "Alice");
  input.parent_id = Some(999);

  let err = s.add_member(input).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(stemma_core::Error::MemberNotFound(999))
  ));
}

#[tokio::test]
async fn add_member_cross_tree_parent_rejected() {
  let s = store().await;
  let t1 = tree(&s).await;
  let t2 = s
    .add_tree(NewTree { name: "Hargreaves".into(), owner: Uuid::new_v4() })
    .await
    .unwrap();

  let outsider = s.add_member(NewMember::new(t2.tree_id, "Reginald")).await.unwrap();

  let mut input = NewMember::new(t1.tree_id, "Alice");
  input.parent_id = Some(outsider.member_id);

  let err = s.add_member(input).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(stemma_core::Error::CrossTreeReference { .. })
  ));
}

#[tokio::test]
async fn add_member_roundtrips_attributes() {
  let s = store().await;
  let t = tree(&s).await;

  let mut input = NewMember::new(t.tree_id, "Alice");
  input.dob = Some(NaiveDate::from_ymd_opt(1852, 5, 4).unwrap());
  input.gender = Some("female".into());
  input.photo_url = Some("photos/alice.jpg".into());

  let created = s.add_member(input).await.unwrap();
  let fetched = s.get_member(created.member_id).await.unwrap().unwrap();

  assert_eq!(fetched, created);
  assert_eq!(fetched.dob, Some(NaiveDate::from_ymd_opt(1852, 5, 4).unwrap()));
  assert_eq!(fetched.gender.as_deref(), Some("female"));
  assert_eq!(fetched.photo_url.as_deref(), Some("photos/alice.jpg"));
}

#[tokio::test]
async fn spouse_link_stored_as_given() {
  // Directed, advisory: no back-link is written for the other side.
  let s = store().await;
  let t = tree(&s).await;

  let a = s.add_member(NewMember::new(t.tree_id, "Alice")).await.unwrap();
  let mut input = NewMember::new(t.tree_id, "Reginald");
  input.spouse_id = Some(a.member_id);
  let b = s.add_member(input).await.unwrap();

  let a = s.get_member(a.member_id).await.unwrap().unwrap();
  assert_eq!(a.spouse_id, None);
  let b = s.get_member(b.member_id).await.unwrap().unwrap();
  assert_eq!(b.spouse_id, Some(a.member_id));
}

// ─── Listing and reconstruction ──────────────────────────────────────────────

#[tokio::test]
async fn list_members_is_scoped_and_ordered() {
  let s = store().await;
  let t1 = tree(&s).await;
  let t2 = s
    .add_tree(NewTree { name: "Other".into(), owner: Uuid::new_v4() })
    .await
    .unwrap();

  let a = s.add_member(NewMember::new(t1.tree_id, "Alice")).await.unwrap();
  s.add_member(NewMember::new(t2.tree_id, "Stranger")).await.unwrap();
  let b = s.add_member(NewMember::new(t1.tree_id, "Lorina")).await.unwrap();

  let members = s.list_members(t1.tree_id).await.unwrap();
  let ids: Vec<_> = members.iter().map(|m| m.member_id).collect();
  assert_eq!(ids, vec![a.member_id, b.member_id]);
}

#[tokio::test]
async fn build_over_listed_members() {
  let s = store().await;
  let t = tree(&s).await;

  let root = s.add_member(NewMember::new(t.tree_id, "Henry")).await.unwrap();
  let mut child = NewMember::new(t.tree_id, "Alice");
  child.parent_id = Some(root.member_id);
  let child = s.add_member(child).await.unwrap();

  let members = s.list_members(t.tree_id).await.unwrap();
  let built = build(&members);

  let node = built.root.unwrap();
  assert_eq!(node.member.member_id, root.member_id);
  assert_eq!(node.children.len(), 1);
  assert_eq!(node.children[0].member.member_id, child.member_id);
}

// ─── Attribute updates ───────────────────────────────────────────────────────

#[tokio::test]
async fn update_member_sets_only_given_fields() {
  let s = store().await;
  let t = tree(&s).await;

  let mut input = NewMember::new(t.tree_id, "Alice");
  input.gender = Some("female".into());
  let created = s.add_member(input).await.unwrap();

  let updated = s
    .update_member(created.member_id, MemberUpdate {
      name: Some("Alice Hargreaves".into()),
      dob: Some(NaiveDate::from_ymd_opt(1852, 5, 4).unwrap()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.name, "Alice Hargreaves");
  assert_eq!(updated.dob, Some(NaiveDate::from_ymd_opt(1852, 5, 4).unwrap()));
  // Untouched fields survive.
  assert_eq!(updated.gender.as_deref(), Some("female"));
}

#[tokio::test]
async fn update_member_cannot_touch_relations() {
  let s = store().await;
  let t = tree(&s).await;

  let root = s.add_member(NewMember::new(t.tree_id, "Henry")).await.unwrap();
  let mut input = NewMember::new(t.tree_id, "Alice");
  input.parent_id = Some(root.member_id);
  let child = s.add_member(input).await.unwrap();

  let updated = s
    .update_member(child.member_id, MemberUpdate {
      name: Some("Alice Liddell".into()),
      ..Default::default()
    })
    .await
    .unwrap();

  assert_eq!(updated.parent_id, Some(root.member_id));
}

#[tokio::test]
async fn update_member_missing_errors() {
  let s = store().await;
  let err = s
    .update_member(999, MemberUpdate::default())
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(stemma_core::Error::MemberNotFound(999))
  ));
}

#[tokio::test]
async fn update_member_blank_name_rejected() {
  let s = store().await;
  let t = tree(&s).await;
  let created = s.add_member(NewMember::new(t.tree_id, "Alice")).await.unwrap();

  let err = s
    .update_member(created.member_id, MemberUpdate {
      name: Some("".into()),
      ..Default::default()
    })
    .await
    .unwrap_err();
  assert!(matches!(err, crate::Error::Core(stemma_core::Error::EmptyName)));
}

// ─── set_parent ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn set_parent_repoints_link() {
  let s = store().await;
  let t = tree(&s).await;

  let old_root = s.add_member(NewMember::new(t.tree_id, "Henry")).await.unwrap();
  let new_root = s.add_member(NewMember::new(t.tree_id, "James")).await.unwrap();

  let updated = s
    .set_parent(old_root.member_id, Some(new_root.member_id))
    .await
    .unwrap();
  assert_eq!(updated.parent_id, Some(new_root.member_id));

  let fetched = s.get_member(old_root.member_id).await.unwrap().unwrap();
  assert_eq!(fetched.parent_id, Some(new_root.member_id));
}

#[tokio::test]
async fn set_parent_cross_tree_rejected() {
  let s = store().await;
  let t1 = tree(&s).await;
  let t2 = s
    .add_tree(NewTree { name: "Other".into(), owner: Uuid::new_v4() })
    .await
    .unwrap();

  let a = s.add_member(NewMember::new(t1.tree_id, "Alice")).await.unwrap();
  let outsider = s.add_member(NewMember::new(t2.tree_id, "Stranger")).await.unwrap();

  let err = s
    .set_parent(a.member_id, Some(outsider.member_id))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(stemma_core::Error::CrossTreeReference { .. })
  ));

  // Nothing was applied.
  let a = s.get_member(a.member_id).await.unwrap().unwrap();
  assert_eq!(a.parent_id, None);
}

// ─── Deletion ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_members_deletes_exactly_listed() {
  let s = store().await;
  let t = tree(&s).await;

  let a = s.add_member(NewMember::new(t.tree_id, "A")).await.unwrap();
  let b = s.add_member(NewMember::new(t.tree_id, "B")).await.unwrap();
  let c = s.add_member(NewMember::new(t.tree_id, "C")).await.unwrap();

  let removed = s
    .remove_members(BTreeSet::from([a.member_id, c.member_id]))
    .await
    .unwrap();
  assert_eq!(removed, 2);

  let left = s.list_members(t.tree_id).await.unwrap();
  let ids: Vec<_> = left.iter().map(|m| m.member_id).collect();
  assert_eq!(ids, vec![b.member_id]);
}

#[tokio::test]
async fn remove_subtree_cascades_to_descendants() {
  let s = store().await;
  let t = tree(&s).await;

  let root = s.add_member(NewMember::new(t.tree_id, "Root")).await.unwrap();
  let mut m = NewMember::new(t.tree_id, "Child");
  m.parent_id = Some(root.member_id);
  let child = s.add_member(m).await.unwrap();
  let mut m = NewMember::new(t.tree_id, "Grandchild");
  m.parent_id = Some(child.member_id);
  let grandchild = s.add_member(m).await.unwrap();
  let other = s.add_member(NewMember::new(t.tree_id, "Second root")).await.unwrap();

  let doomed = s.remove_subtree(root.member_id).await.unwrap();
  assert_eq!(
    doomed,
    BTreeSet::from([root.member_id, child.member_id, grandchild.member_id])
  );

  let left = s.list_members(t.tree_id).await.unwrap();
  let ids: Vec<_> = left.iter().map(|m| m.member_id).collect();
  assert_eq!(ids, vec![other.member_id]);
}

#[tokio::test]
async fn remove_subtree_leaf_removes_only_itself() {
  let s = store().await;
  let t = tree(&s).await;

  let root = s.add_member(NewMember::new(t.tree_id, "Root")).await.unwrap();
  let mut m = NewMember::new(t.tree_id, "Child");
  m.parent_id = Some(root.member_id);
  let child = s.add_member(m).await.unwrap();

  let doomed = s.remove_subtree(child.member_id).await.unwrap();
  assert_eq!(doomed, BTreeSet::from([child.member_id]));

  let left = s.list_members(t.tree_id).await.unwrap();
  assert_eq!(left.len(), 1);
  assert_eq!(left[0].member_id, root.member_id);
}

#[tokio::test]
async fn remove_subtree_unknown_target_errors_and_removes_nothing() {
  let s = store().await;
  let t = tree(&s).await;
  s.add_member(NewMember::new(t.tree_id, "Alice")).await.unwrap();

  let err = s.remove_subtree(999).await.unwrap_err();
  assert!(err.is_not_found());

  assert_eq!(s.list_members(t.tree_id).await.unwrap().len(), 1);
}
