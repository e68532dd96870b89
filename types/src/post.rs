//! Reported posts and their enumerated attributes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;
use crate::location::Location;
use crate::vote::VoteState;

/// Opaque identifier of a post, as assigned by the backend.
///
/// The backend hands out numeric ids; they are kept as text so the id can be
/// used directly as a key in the device store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for PostId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl FromStr for PostId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyPostId);
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// What kind of civic problem a post reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Infrastructure,
    Sanitation,
    PublicSafety,
    Utilities,
    Environment,
    #[default]
    #[serde(other)]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Infrastructure,
        Category::Sanitation,
        Category::PublicSafety,
        Category::Utilities,
        Category::Environment,
        Category::Other,
    ];

    /// Wire name, as the backend expects it in forms and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Infrastructure => "infrastructure",
            Self::Sanitation => "sanitation",
            Self::PublicSafety => "public_safety",
            Self::Utilities => "utilities",
            Self::Environment => "environment",
            Self::Other => "other",
        }
    }

    /// Lenient mapping used for backend payloads: anything unknown is `Other`.
    pub fn from_wire(s: &str) -> Self {
        s.parse().unwrap_or(Self::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| TypesError::UnknownCategory(s.to_string()))
    }
}

/// How pressing the reported problem is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Lenient mapping used for backend payloads: anything unknown is `Medium`.
    pub fn from_wire(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(TypesError::UnknownUrgency(s.to_string())),
        }
    }
}

/// A reported problem, as cached by a screen for the length of its session.
///
/// The backend owns posts; the client only holds read-mostly copies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub location: Location,
    pub urgency: Urgency,
    /// Number of votes the backend reported when the post was fetched.
    pub votes: u32,
    pub comments: u32,
    /// Creation time as sent by the backend (ISO-8601 text).
    pub created_at: Option<String>,
    pub image_url: Option<String>,
    pub status: Option<String>,
    /// Whether the backend says the current user voted, when it says anything.
    pub user_voted: Option<bool>,
}

impl Post {
    /// Calendar date of creation (`YYYY-MM-DD`), if the backend sent a timestamp.
    pub fn created_date(&self) -> Option<&str> {
        self.created_at
            .as_deref()
            .map(|ts| ts.split('T').next().unwrap_or(ts))
            .filter(|d| !d.is_empty())
    }

    /// Vote state to display before the local ledger has been consulted.
    pub fn vote_state(&self) -> VoteState {
        VoteState::new(self.votes, self.user_voted.unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post {
            id: PostId::from(7u64),
            title: "Pothole".into(),
            description: "Deep pothole on Main St".into(),
            category: Category::Infrastructure,
            location: Location::parse("Main St"),
            urgency: Urgency::High,
            votes: 3,
            comments: 1,
            created_at: Some("2025-03-14T09:26:53Z".into()),
            image_url: None,
            status: None,
            user_voted: None,
        }
    }

    #[test]
    fn post_id_from_number_is_text() {
        assert_eq!(PostId::from(42u64).as_str(), "42");
    }

    #[test]
    fn post_id_parse_trims_and_rejects_empty() {
        assert_eq!("  12 ".parse::<PostId>().unwrap(), PostId::from("12"));
        assert_eq!("   ".parse::<PostId>(), Err(TypesError::EmptyPostId));
    }

    #[test]
    fn category_parse_accepts_wire_and_human_forms() {
        assert_eq!("public_safety".parse::<Category>().unwrap(), Category::PublicSafety);
        assert_eq!("Public Safety".parse::<Category>().unwrap(), Category::PublicSafety);
        assert!("roads".parse::<Category>().is_err());
        assert_eq!(Category::from_wire("roads"), Category::Other);
    }

    #[test]
    fn category_deserializes_unknown_as_other() {
        let c: Category = serde_json::from_str("\"General\"").unwrap();
        assert_eq!(c, Category::Other);
        let c: Category = serde_json::from_str("\"sanitation\"").unwrap();
        assert_eq!(c, Category::Sanitation);
    }

    #[test]
    fn urgency_defaults_to_medium() {
        assert_eq!(Urgency::default(), Urgency::Medium);
        assert_eq!(Urgency::from_wire("urgent"), Urgency::Medium);
        assert_eq!(Urgency::from_wire("HIGH"), Urgency::High);
        assert!(Urgency::Low < Urgency::High);
    }

    #[test]
    fn created_date_strips_time() {
        let post = sample_post();
        assert_eq!(post.created_date(), Some("2025-03-14"));

        let mut undated = sample_post();
        undated.created_at = None;
        assert_eq!(undated.created_date(), None);
    }

    #[test]
    fn vote_state_defaults_to_not_voted() {
        let post = sample_post();
        assert_eq!(post.vote_state(), VoteState::new(3, false));
    }
}
