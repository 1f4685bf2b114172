//! Family videos ("family moments")

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::family::MemberSummary;

/// A short video a family member shared with the patient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyVideo {
    pub id: String,
    #[serde(default)]
    pub family_member_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub video_url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Sharing member, present when the row was fetched with a join
    #[serde(default, alias = "family_members", skip_serializing_if = "Option::is_none")]
    pub family_member: Option<MemberSummary>,
}
