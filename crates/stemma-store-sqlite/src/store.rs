//! [`SqliteStore`] — the SQLite implementation of [`FamilyStore`].

use std::{collections::BTreeSet, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use stemma_core::{
  member::{Member, MemberId, MemberUpdate, NewMember},
  relation::resolve_delete,
  store::FamilyStore,
  tree::{NewTree, Tree, TreeId},
};

use crate::{
  Error, Result,
  encode::{RawMember, RawTree, encode_date, encode_dt, encode_uuid},
  schema::SCHEMA,
};

const MEMBER_COLS: &str = "member_id, tree_id, name, dob, gender, photo_url, \
                           parent_id, spouse_id, created_at";

fn raw_member_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMember> {
  Ok(RawMember {
    member_id:  row.get(0)?,
    tree_id:    row.get(1)?,
    name:       row.get(2)?,
    dob:        row.get(3)?,
    gender:     row.get(4)?,
    photo_url:  row.get(5)?,
    parent_id:  row.get(6)?,
    spouse_id:  row.get(7)?,
    created_at: row.get(8)?,
  })
}

fn raw_tree_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTree> {
  Ok(RawTree {
    tree_id:    row.get(0)?,
    name:       row.get(1)?,
    owner:      row.get(2)?,
    created_at: row.get(3)?,
  })
}

/// Wrap a domain error for transport out of a `tokio_rusqlite` closure.
fn other<E>(e: E) -> tokio_rusqlite::Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  tokio_rusqlite::Error::Other(Box::new(e))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Stemma family-tree store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch a member and fail when its tree differs from `tree_id`.
  /// Shared validation for parent links.
  async fn check_same_tree(
    &self,
    id: MemberId,
    tree_id: TreeId,
  ) -> Result<Member> {
    let member = self
      .get_member(id)
      .await?
      .ok_or(stemma_core::Error::MemberNotFound(id))?;
    if member.tree_id != tree_id {
      return Err(
        stemma_core::Error::CrossTreeReference {
          member:   id,
          expected: tree_id,
          found:    member.tree_id,
        }
        .into(),
      );
    }
    Ok(member)
  }
}

// ─── FamilyStore impl ────────────────────────────────────────────────────────

impl FamilyStore for SqliteStore {
  type Error = Error;

  // ── Trees ─────────────────────────────────────────────────────────────────

  async fn add_tree(&self, input: NewTree) -> Result<Tree> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
      return Err(stemma_core::Error::EmptyName.into());
    }

    let created_at = Utc::now();
    let owner_str  = encode_uuid(input.owner);
    let at_str     = encode_dt(created_at);
    let insert_name = name.clone();

    let tree_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO trees (name, owner, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![insert_name, owner_str, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Tree { tree_id, name, owner: input.owner, created_at })
  }

  async fn get_tree(&self, id: TreeId) -> Result<Option<Tree>> {
    let raw: Option<RawTree> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT tree_id, name, owner, created_at FROM trees WHERE tree_id = ?1",
              rusqlite::params![id],
              raw_tree_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTree::into_tree).transpose()
  }

  async fn list_trees(&self, owner: Option<Uuid>) -> Result<Vec<Tree>> {
    let owner_str = owner.map(encode_uuid);

    let raws: Vec<RawTree> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(o) = owner_str {
          let mut stmt = conn.prepare(
            "SELECT tree_id, name, owner, created_at FROM trees
             WHERE owner = ?1 ORDER BY tree_id",
          )?;
          stmt
            .query_map(rusqlite::params![o], raw_tree_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT tree_id, name, owner, created_at FROM trees ORDER BY tree_id",
          )?;
          stmt
            .query_map([], raw_tree_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTree::into_tree).collect()
  }

  // ── Members ───────────────────────────────────────────────────────────────

  async fn add_member(&self, input: NewMember) -> Result<Member> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
      return Err(stemma_core::Error::EmptyName.into());
    }

    self
      .get_tree(input.tree_id)
      .await?
      .ok_or(stemma_core::Error::TreeNotFound(input.tree_id))?;

    // A parent link must land inside the member's own tree. The spouse
    // link is advisory and stored as given.
    if let Some(parent) = input.parent_id {
      self.check_same_tree(parent, input.tree_id).await?;
    }

    let created_at = Utc::now();
    let at_str     = encode_dt(created_at);
    let dob_str    = input.dob.map(encode_date);

    let tree_id     = input.tree_id;
    let insert_name = name.clone();
    let gender      = input.gender.clone();
    let photo_url   = input.photo_url.clone();
    let parent_id   = input.parent_id;
    let spouse_id   = input.spouse_id;

    let member_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO members (
             tree_id, name, dob, gender, photo_url,
             parent_id, spouse_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            tree_id,
            insert_name,
            dob_str,
            gender,
            photo_url,
            parent_id,
            spouse_id,
            at_str,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Member {
      member_id,
      tree_id: input.tree_id,
      name,
      dob: input.dob,
      gender: input.gender,
      photo_url: input.photo_url,
      parent_id: input.parent_id,
      spouse_id: input.spouse_id,
      created_at,
    })
  }

  async fn get_member(&self, id: MemberId) -> Result<Option<Member>> {
    let raw: Option<RawMember> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {MEMBER_COLS} FROM members WHERE member_id = ?1"),
              rusqlite::params![id],
              raw_member_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMember::into_member).transpose()
  }

  async fn list_members(&self, tree_id: TreeId) -> Result<Vec<Member>> {
    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MEMBER_COLS} FROM members WHERE tree_id = ?1 ORDER BY member_id",
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![tree_id], raw_member_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }

  async fn update_member(
    &self,
    id: MemberId,
    update: MemberUpdate,
  ) -> Result<Member> {
    if let Some(name) = &update.name
      && name.trim().is_empty()
    {
      return Err(stemma_core::Error::EmptyName.into());
    }

    let name      = update.name.map(|n| n.trim().to_string());
    let dob_str   = update.dob.map(encode_date);
    let gender    = update.gender;
    let photo_url = update.photo_url;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE members SET
             name      = COALESCE(?2, name),
             dob       = COALESCE(?3, dob),
             gender    = COALESCE(?4, gender),
             photo_url = COALESCE(?5, photo_url)
           WHERE member_id = ?1",
          rusqlite::params![id, name, dob_str, gender, photo_url],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(stemma_core::Error::MemberNotFound(id).into());
    }

    self
      .get_member(id)
      .await?
      .ok_or(Error::Core(stemma_core::Error::MemberNotFound(id)))
  }

  async fn set_parent(
    &self,
    id: MemberId,
    parent: Option<MemberId>,
  ) -> Result<Member> {
    let member = self
      .get_member(id)
      .await?
      .ok_or(stemma_core::Error::MemberNotFound(id))?;

    if let Some(parent_id) = parent {
      self.check_same_tree(parent_id, member.tree_id).await?;
    }

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE members SET parent_id = ?2 WHERE member_id = ?1",
          rusqlite::params![id, parent],
        )?;
        Ok(())
      })
      .await?;

    Ok(Member { parent_id: parent, ..member })
  }

  // ── Deletion ──────────────────────────────────────────────────────────────

  async fn remove_members(&self, ids: BTreeSet<MemberId>) -> Result<usize> {
    if ids.is_empty() {
      return Ok(0);
    }

    let ids: Vec<MemberId> = ids.into_iter().collect();
    let removed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut removed = 0usize;
        {
          let mut stmt = tx.prepare("DELETE FROM members WHERE member_id = ?1")?;
          for id in &ids {
            removed += stmt.execute(rusqlite::params![id])?;
          }
        }
        tx.commit()?;
        Ok(removed)
      })
      .await?;

    Ok(removed)
  }

  async fn remove_subtree(&self, id: MemberId) -> Result<BTreeSet<MemberId>> {
    // Snapshot, closure computation, and deletion all happen inside one
    // transaction so a racing insert cannot leave an orphaned descendant.
    let doomed: Option<BTreeSet<MemberId>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let tree_id: Option<TreeId> = tx
          .query_row(
            "SELECT tree_id FROM members WHERE member_id = ?1",
            rusqlite::params![id],
            |row| row.get(0),
          )
          .optional()?;
        let Some(tree_id) = tree_id else {
          return Ok(None);
        };

        let members = {
          let mut stmt = tx.prepare(&format!(
            "SELECT {MEMBER_COLS} FROM members WHERE tree_id = ?1 ORDER BY member_id",
          ))?;
          let raws = stmt
            .query_map(rusqlite::params![tree_id], raw_member_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          raws
            .into_iter()
            .map(RawMember::into_member)
            .collect::<Result<Vec<_>>>()
            .map_err(other)?
        };

        let doomed = resolve_delete(id, &members).map_err(other)?;

        {
          let mut stmt = tx.prepare("DELETE FROM members WHERE member_id = ?1")?;
          for doomed_id in &doomed {
            stmt.execute(rusqlite::params![doomed_id])?;
          }
        }

        tx.commit()?;
        Ok(Some(doomed))
      })
      .await?;

    doomed.ok_or(Error::Core(stemma_core::Error::MemberNotFound(id)))
  }
}
