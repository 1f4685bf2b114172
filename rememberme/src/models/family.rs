//! Family member model and the roster projection used for matching

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing state of a family member's cloned voice
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceCloneStatus {
    /// No voice sample processed yet
    #[default]
    Pending,
    /// The voice sample is being processed
    Processing,
    /// Narration can be generated in this voice
    Ready,
    /// Processing failed; a new sample is needed
    Failed,
}

impl std::fmt::Display for VoiceCloneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Processing => write!(f, "processing"),
            Self::Ready => write!(f, "ready"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Typed view over a free-text relationship string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    Daughter,
    Son,
    Wife,
    Husband,
    Granddaughter,
    Grandson,
    Mother,
    Father,
    Sister,
    Brother,
    Friend,
    Caregiver,
    /// Anything else, kept as entered
    Other(String),
}

impl RelationshipKind {
    /// Options offered when a family member registers
    pub const REGISTRATION_OPTIONS: &'static [&'static str] = &[
        "Daughter",
        "Son",
        "Wife",
        "Husband",
        "Granddaughter",
        "Grandson",
        "Sister",
        "Brother",
        "Friend",
        "Caregiver",
        "Other",
    ];

    /// Parse a relationship string, case-insensitively and ignoring surrounding whitespace
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "daughter" => Self::Daughter,
            "son" => Self::Son,
            "wife" => Self::Wife,
            "husband" => Self::Husband,
            "granddaughter" => Self::Granddaughter,
            "grandson" => Self::Grandson,
            "mother" => Self::Mother,
            "father" => Self::Father,
            "sister" => Self::Sister,
            "brother" => Self::Brother,
            "friend" => Self::Friend,
            "caregiver" => Self::Caregiver,
            _ => Self::Other(s.trim().to_string()),
        }
    }

    /// Display label, capitalized the way the registration form stores it
    pub fn label(&self) -> &str {
        match self {
            Self::Daughter => "Daughter",
            Self::Son => "Son",
            Self::Wife => "Wife",
            Self::Husband => "Husband",
            Self::Granddaughter => "Granddaughter",
            Self::Grandson => "Grandson",
            Self::Mother => "Mother",
            Self::Father => "Father",
            Self::Sister => "Sister",
            Self::Brother => "Brother",
            Self::Friend => "Friend",
            Self::Caregiver => "Caregiver",
            Self::Other(s) => s,
        }
    }
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A registered family member of a patient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FamilyMember {
    /// Unique identifier
    pub id: String,

    /// Auth user this member signs in as (absent for members added by staff)
    #[serde(default)]
    pub user_id: Option<String>,

    /// The patient this member belongs to
    #[serde(default)]
    pub patient_id: String,

    /// Display name
    pub name: String,

    /// Contact email
    #[serde(default)]
    pub email: Option<String>,

    /// Relationship to the patient, free text ("Daughter", "Caregiver", ...)
    pub relationship: String,

    /// Public URL of the profile photo
    #[serde(default)]
    pub profile_photo_url: Option<String>,

    /// Public URL of the uploaded voice sample
    #[serde(default)]
    pub voice_sample_url: Option<String>,

    /// Voice cloning state
    #[serde(default)]
    pub voice_clone_status: VoiceCloneStatus,

    /// Creation time
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl FamilyMember {
    /// Typed relationship
    pub fn relationship_kind(&self) -> RelationshipKind {
        RelationshipKind::from_str(&self.relationship)
    }

    /// Read-only roster projection
    pub fn roster_entry(&self) -> RosterEntry {
        RosterEntry::from(self)
    }

    /// Whether narration can be generated for this member's memories
    pub fn voice_ready(&self) -> bool {
        self.voice_sample_url.is_some() && self.voice_clone_status == VoiceCloneStatus::Ready
    }
}

/// Fields needed to create a family member record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewFamilyMember {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub patient_id: String,
    pub name: String,
    pub email: String,
    pub relationship: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
    pub voice_clone_status: VoiceCloneStatus,
}

/// The resolver's working view of a family member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
    pub relationship: String,
}

impl RosterEntry {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            relationship: relationship.into(),
        }
    }
}

impl From<&FamilyMember> for RosterEntry {
    fn from(member: &FamilyMember) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            relationship: member.relationship.clone(),
        }
    }
}

/// Member fields embedded in joined rows (recent memories, video feed)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberSummary {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
}
