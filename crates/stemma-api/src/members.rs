//! Handlers for `/members` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/trees/:id/members` | Flat member list of one tree |
//! | `POST`   | `/members` | Body: [`CreateBody`]; relation intent resolved server-side |
//! | `GET`    | `/members/:id` | 404 if not found |
//! | `PATCH`  | `/members/:id` | Attribute edit only; relations stay put |
//! | `DELETE` | `/members/:id` | Cascade delete; responds with the removed id set |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stemma_core::{
  member::{Member, MemberId, MemberUpdate, NewMember},
  relation::{
    AddPlan, ParentLinkPolicy, RelationKind, resolve_add,
    resolve_add_with_policy,
  },
  store::FamilyStore,
  tree::TreeId,
};

use crate::error::ApiError;

// ─── List per tree ────────────────────────────────────────────────────────────

/// `GET /trees/:id/members`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Path(tree_id): Path<TreeId>,
) -> Result<Json<Vec<Member>>, ApiError>
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
  Ok(Json(members))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /members`.
///
/// The parent link comes from exactly one of two places: an explicit
/// `parent_id`, or a relation intent (`relation` + `relative_id`) resolved
/// server-side. Giving both is an error.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub tree_id:       TreeId,
  pub name:          String,
  pub dob:           Option<NaiveDate>,
  pub gender:        Option<String>,
  pub photo_url:     Option<String>,
  pub spouse_id:     Option<MemberId>,
  pub parent_id:     Option<MemberId>,
  /// One of `root`, `child`, `sibling`, `parent`. Anything else is a 400.
  pub relation:      Option<String>,
  pub relative_id:   Option<MemberId>,
  /// Only consulted for `relation: "parent"`; defaults to the literal
  /// attach-below protocol.
  #[serde(default)]
  pub parent_policy: ParentLinkPolicy,
}

/// `POST /members` — returns 201 + the stored [`Member`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("member name is required".to_string()));
  }

  store
    .get_tree(body.tree_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("tree {} not found", body.tree_id)))?;

  let plan = match &body.relation {
    Some(kind_str) => {
      if body.parent_id.is_some() {
        return Err(ApiError::BadRequest(
          "give either relation or parent_id, not both".to_string(),
        ));
      }
      let kind: RelationKind = kind_str.parse()?;
      let relative = match body.relative_id {
        Some(rid) => Some(
          store
            .get_member(rid)
            .await
            .map_err(|e| ApiError::Store(Box::new(e)))?
            .ok_or_else(|| {
              ApiError::BadRequest(format!("relative {rid} not found"))
            })?,
        ),
        None => None,
      };
      resolve_add_with_policy(
        kind,
        relative.as_ref(),
        body.tree_id,
        body.parent_policy,
      )?
    }
    // An explicit parent link gets the same validation as "child of it".
    None => match body.parent_id {
      Some(pid) => {
        let parent = store
          .get_member(pid)
          .await
          .map_err(|e| ApiError::Store(Box::new(e)))?
          .ok_or_else(|| {
            ApiError::BadRequest(format!("parent {pid} not found"))
          })?;
        resolve_add(RelationKind::Child, Some(&parent), body.tree_id)?
      }
      None => AddPlan::Attach { parent_id: None },
    },
  };

  let base = NewMember {
    tree_id:   body.tree_id,
    name:      body.name,
    dob:       body.dob,
    gender:    body.gender,
    photo_url: body.photo_url,
    parent_id: None,
    spouse_id: body.spouse_id,
  };

  let member = match plan {
    AddPlan::Attach { parent_id } => store
      .add_member(NewMember { parent_id, ..base })
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?,
    AddPlan::Promote { reparent } => {
      let member = store
        .add_member(base)
        .await
        .map_err(|e| ApiError::Store(Box::new(e)))?;
      store
        .set_parent(reparent, Some(member.member_id))
        .await
        .map_err(|e| ApiError::Store(Box::new(e)))?;
      member
    }
  };

  Ok((StatusCode::CREATED, Json(member)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /members/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<MemberId>,
) -> Result<Json<Member>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let member = store
    .get_member(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("member {id} not found")))?;
  Ok(Json(member))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PATCH /members/:id`. Absent fields are left
/// unchanged; `parent_id` and `spouse_id` are not accepted here.
#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub name:      Option<String>,
  pub dob:       Option<NaiveDate>,
  pub gender:    Option<String>,
  pub photo_url: Option<String>,
}

/// `PATCH /members/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<MemberId>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Member>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if let Some(name) = &body.name
    && name.trim().is_empty()
  {
    return Err(ApiError::BadRequest("member name is required".to_string()));
  }

  store
    .get_member(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("member {id} not found")))?;

  let member = store
    .update_member(id, MemberUpdate {
      name:      body.name,
      dob:       body.dob,
      gender:    body.gender,
      photo_url: body.photo_url,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(member))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Removed {
  /// The target and every descendant, ascending by id.
  pub removed: Vec<MemberId>,
}

/// `DELETE /members/:id` — removes the member and its whole descendant
/// closure as one unit.
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<MemberId>,
) -> Result<Json<Removed>, ApiError>
where
  S: FamilyStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_member(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("member {id} not found")))?;

  let removed = store
    .remove_subtree(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(Removed { removed: removed.into_iter().collect() }))
}
