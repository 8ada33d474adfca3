//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, birth dates as bare ISO 8601
//! calendar dates, owner UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use stemma_core::{member::Member, tree::Tree};
use uuid::Uuid;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String {
  d.format("%Y-%m-%d").to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `trees` row.
pub struct RawTree {
  pub tree_id:    i64,
  pub name:       String,
  pub owner:      String,
  pub created_at: String,
}

impl RawTree {
  pub fn into_tree(self) -> Result<Tree> {
    Ok(Tree {
      tree_id:    self.tree_id,
      name:       self.name,
      owner:      decode_uuid(&self.owner)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `members` row.
pub struct RawMember {
  pub member_id:  i64,
  pub tree_id:    i64,
  pub name:       String,
  pub dob:        Option<String>,
  pub gender:     Option<String>,
  pub photo_url:  Option<String>,
  pub parent_id:  Option<i64>,
  pub spouse_id:  Option<i64>,
  pub created_at: String,
}

impl RawMember {
  pub fn into_member(self) -> Result<Member> {
    Ok(Member {
      member_id:  self.member_id,
      tree_id:    self.tree_id,
      name:       self.name,
      dob:        self.dob.as_deref().map(decode_date).transpose()?,
      gender:     self.gender,
      photo_url:  self.photo_url,
      parent_id:  self.parent_id,
      spouse_id:  self.spouse_id,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
