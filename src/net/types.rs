//! Shared wire DTOs for the client/backend boundary.
//!
//! DESIGN
//! ======
//! Field names follow the backend's camelCase JSON. Optional fields are
//! skipped when absent so partial payloads (profile update, registration)
//! serialize exactly what the user supplied.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Role label as the backend spells it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

/// The signed-in user as the client knows it.
///
/// `roles` is fixed at login by the role probe and is not re-derived while the
/// session lives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub roles: BTreeSet<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SessionUser {
    /// A freshly resolved user: always `USER`, plus `ADMIN` when the probe succeeded.
    #[must_use]
    pub fn resolved(user_name: &str, is_admin: bool) -> Self {
        let mut roles = BTreeSet::from([Role::User]);
        if is_admin {
            roles.insert(Role::Admin);
        }
        Self { user_name: user_name.to_owned(), email: None, roles, sentiment_analysis: None, id: None }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

/// Partial update merged into the in-memory [`SessionUser`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub sentiment_analysis: Option<bool>,
}

impl UserPatch {
    pub(crate) fn apply(self, user: &mut SessionUser) {
        if let Some(user_name) = self.user_name {
            user.user_name = user_name;
        }
        if let Some(email) = self.email {
            user.email = Some(email);
        }
        if let Some(flag) = self.sentiment_analysis {
            user.sentiment_analysis = Some(flag);
        }
    }
}

/// Backend user record, used for registration, profile updates, admin
/// provisioning, and the admin listing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment_analysis: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_entries: Option<Vec<JournalEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

impl User {
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.as_ref().is_some_and(|roles| roles.iter().any(|r| r == role))
    }
}

/// Fields the profile screen submits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub user_name: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Mood label attached to a journal entry by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Happy,
    Sad,
    Angry,
    Anxious,
}

pub const NO_SENTIMENT_COLOR: &str = "#9e9e9e";

impl Sentiment {
    pub const ALL: [Self; 4] = [Self::Happy, Self::Sad, Self::Angry, Self::Anxious];

    /// Lower-case label shown next to an entry.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Anxious => "anxious",
        }
    }

    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Happy => "#4caf50",
            Self::Sad => "#2196f3",
            Self::Angry => "#f44336",
            Self::Anxious => "#ff9800",
        }
    }

    /// Parse a user-typed mood, case-insensitive.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|s| s.label().eq_ignore_ascii_case(raw))
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Colour hint for an optional sentiment.
#[must_use]
pub fn sentiment_color(sentiment: Option<Sentiment>) -> &'static str {
    sentiment.map_or(NO_SENTIMENT_COLOR, Sentiment::color)
}

/// A journal entry. Owned by the backend; the client only holds copies.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

impl JournalEntry {
    /// Case-insensitive match of `term` against title or content. A blank
    /// term matches every entry.
    #[must_use]
    pub fn matches(&self, term: &str) -> bool {
        if term.trim().is_empty() {
            return true;
        }
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term) || self.content.to_lowercase().contains(&term)
    }
}
