//! Memory model: a titled story a family member shares with the patient

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::family::MemberSummary;

/// A photo attached to a memory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Photo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub memory_id: Option<String>,
    pub photo_url: String,
}

/// A stored memory with its ordered photos
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Memory {
    /// Unique identifier
    pub id: String,

    /// Family member who shared the memory
    #[serde(default)]
    pub family_member_id: String,

    pub title: String,

    /// Free text, also the source for voice narration
    pub content: String,

    /// Narration audio, filled in once the voice-cloning pipeline has run
    #[serde(default)]
    pub audio_url: Option<String>,

    /// Photos in upload order
    #[serde(default)]
    pub photos: Vec<Photo>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Memory {
    /// Whether narration audio is available
    pub fn has_audio(&self) -> bool {
        self.audio_url.as_deref().is_some_and(|url| !url.is_empty())
    }

    /// Content cut to `max_chars` characters, with an ellipsis when shortened
    pub fn preview(&self, max_chars: usize) -> String {
        if self.content.chars().count() <= max_chars {
            return self.content.clone();
        }
        let mut preview: String = self.content.chars().take(max_chars).collect();
        preview.push_str("...");
        preview
    }
}

/// Fields needed to create a memory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMemory {
    pub family_member_id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Editable fields of an existing memory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryUpdate {
    #[serde(skip_serializing)]
    pub id: String,
    pub title: String,
    pub content: String,
}

/// A memory joined with the member who shared it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentMemory {
    #[serde(flatten)]
    pub memory: Memory,
    #[serde(rename = "family_members")]
    pub family_member: MemberSummary,
}
