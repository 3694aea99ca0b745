//! Lead (website visitor) identity types.
//!
//! A Lead is created once at widget registration and only mutated afterwards
//! by operator edits to its tags and notes. Its `uid` doubles as the session id
//! for the lead's message timeline.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix for generated lead uids.
const UID_PREFIX: &str = "lead_";

/// Opaque, stable visitor identifier. Also the session id of the lead's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadUid(pub String);

impl LeadUid {
    /// Generate a fresh, globally unique uid (never reused).
    pub fn generate() -> Self {
        Self(format!("{UID_PREFIX}{}", Uuid::now_v7().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeadUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LeadUid {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LeadUid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A visitor identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub uid: LeadUid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    /// Segmentation labels. Set semantics; insertion order is irrelevant.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub notes: String,
}

impl Lead {
    /// Add a tag. Blank tags and duplicates are ignored.
    ///
    /// Returns `true` if the tag set changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        self.tags.insert(tag.to_string())
    }

    /// Remove a tag. Returns `true` if it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag.trim())
    }

    /// Case-insensitive substring match on name or email.
    /// A blank query matches every lead.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.name.to_lowercase().contains(&query)
            || self.email.to_lowercase().contains(&query)
    }
}

/// Leads matching `query`, in their original order.
pub fn filter_leads<'a>(leads: &'a [Lead], query: &str) -> Vec<&'a Lead> {
    leads.iter().filter(|lead| lead.matches_query(query)).collect()
}

/// The row written when a visitor registers through the widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLead {
    pub uid: LeadUid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl NewLead {
    /// Build a registration row from a visitor email.
    ///
    /// The email is trimmed and must contain an `@` with a non-empty local
    /// part; the display name is derived from that local part.
    pub fn from_email(email: &str) -> Result<Self, String> {
        let email = email.trim();
        let name = display_name_from_email(email)
            .ok_or_else(|| format!("invalid email address: '{email}'"))?;
        Ok(Self {
            uid: LeadUid::generate(),
            name,
            email: email.to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Derive a display name from the local part of an email address.
///
/// Returns `None` for anything that does not look like `local@domain`.
pub fn display_name_from_email(email: &str) -> Option<String> {
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }
    Some(local.to_string())
}

/// Operator edit to a lead profile. Absent fields are left untouched;
/// present fields overwrite (last writer wins).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl LeadPatch {
    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.notes.is_none()
    }

    /// Apply the patch to a lead in place.
    pub fn apply(&self, lead: &mut Lead) {
        if let Some(tags) = &self.tags {
            lead.tags = tags.clone();
        }
        if let Some(notes) = &self.notes {
            lead.notes = notes.clone();
        }
    }
}
