//! Tree reconstruction — flat member records to a rooted display hierarchy.
//!
//! The builder is total: malformed input (dangling parents, multiple root
//! candidates, parent cycles) degrades to a still-displayable result rather
//! than failing, and construction never loops. Callers re-run it on every
//! snapshot refresh; every build allocates fresh nodes and shares nothing
//! with previous builds.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::member::{Member, MemberId};

// ─── Derived types ───────────────────────────────────────────────────────────

/// One display node: a member plus its children in input order.
/// Rebuilt on every reconstruction; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
  pub member:   Member,
  pub children: Vec<TreeNode>,
}

/// The reconstruction result.
///
/// A member set may contain several root candidates; only the one with the
/// numerically smallest id is displayed. The losers are reported in
/// `unreachable_roots` so callers can surface them instead of silently
/// dropping whole subtrees.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuiltTree {
  /// `None` means there is nothing to display.
  pub root:              Option<TreeNode>,
  /// Root candidates that lost the tie-break, in input order.
  pub unreachable_roots: Vec<MemberId>,
}

impl BuiltTree {
  pub fn is_empty(&self) -> bool { self.root.is_none() }
}

// ─── Build ───────────────────────────────────────────────────────────────────

/// Build the display hierarchy for one tree's members.
///
/// - Child order is input iteration order, not sorted by any attribute.
/// - A `parent_id` that does not resolve within `members` (dangling, e.g.
///   cross-tree) makes its member a root candidate instead of attaching it.
/// - Members on a parent cycle are never root candidates and never
///   reachable from the root; they simply do not appear.
/// - Duplicate ids among the input are the caller's bug; attachment is
///   undefined for them.
///
/// For a fixed input sequence the output is exactly reproducible.
/// Re-ordering the input changes sibling order but not the chosen root.
pub fn build(members: &[Member]) -> BuiltTree {
  if members.is_empty() {
    return BuiltTree::default();
  }

  let known: HashSet<MemberId> = members.iter().map(|m| m.member_id).collect();

  let mut children: HashMap<MemberId, Vec<&Member>> = HashMap::new();
  let mut candidates: Vec<&Member> = Vec::new();

  for member in members {
    match member.parent_id {
      Some(parent) if known.contains(&parent) => {
        children.entry(parent).or_default().push(member);
      }
      // Null or unresolvable parent: a root candidate.
      _ => candidates.push(member),
    }
  }

  // No candidate is only possible when every member sits on a parent
  // cycle; there is no displayable tree then.
  let Some(root) = candidates.iter().copied().min_by_key(|m| m.member_id)
  else {
    return BuiltTree::default();
  };

  let unreachable_roots = candidates
    .iter()
    .filter(|m| m.member_id != root.member_id)
    .map(|m| m.member_id)
    .collect();

  BuiltTree {
    root: Some(assemble(root, &children)),
    unreachable_roots,
  }
}

/// Clone `member` and everything attached below it.
///
/// Each member appears in at most one child list (single-parent model) and
/// the chosen root is on no cycle, so the walk visits every node at most
/// once and terminates on any input.
fn assemble(
  member:   &Member,
  children: &HashMap<MemberId, Vec<&Member>>,
) -> TreeNode {
  let child_nodes = children
    .get(&member.member_id)
    .map(|list| list.iter().map(|c| assemble(c, children)).collect())
    .unwrap_or_default();

  TreeNode { member: member.clone(), children: child_nodes }
}
