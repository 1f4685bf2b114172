//! Response payloads of the backend API
//!
//! The conversational and photo endpoints answer with one of several shapes;
//! each shape is a variant of a sum type, selected by the `type` or `match`
//! field.

use serde::{Deserialize, Serialize};

use crate::models::{FamilyMember, Memory};

/// Answer to a free-text question
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "RawQueryResponse")]
pub struct QueryResponse {
    /// Ready-to-show answer text
    pub answer: String,

    #[serde(flatten)]
    pub kind: QueryAnswer,
}

/// Structured payload of a [`QueryResponse`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryAnswer {
    /// The question was about one family member
    FamilyMember {
        family_member: FamilyMember,
        memories: Vec<Memory>,
        show_memories: bool,
    },
    /// How many family members there are
    Count {
        family_members: Vec<FamilyMember>,
        #[serde(skip_serializing_if = "Option::is_none")]
        count: Option<usize>,
    },
    /// Everyone in the family
    ListAll { family_members: Vec<FamilyMember> },
    /// Free conversation; only the answer text matters
    Conversation,
}

/// Wire shape before the `type` tag is checked against the payload
#[derive(Debug, Deserialize)]
struct RawQueryResponse {
    #[serde(default)]
    answer: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    family_member: Option<FamilyMember>,
    #[serde(default)]
    memories: Vec<Memory>,
    #[serde(default)]
    show_memories: bool,
    #[serde(default)]
    family_members: Vec<FamilyMember>,
    #[serde(default)]
    count: Option<usize>,
}

impl TryFrom<RawQueryResponse> for QueryResponse {
    type Error = String;

    fn try_from(raw: RawQueryResponse) -> Result<Self, Self::Error> {
        let kind = match raw.kind.as_deref() {
            Some("family_member") => QueryAnswer::FamilyMember {
                family_member: raw
                    .family_member
                    .ok_or("family_member answer without a family_member")?,
                memories: raw.memories,
                show_memories: raw.show_memories,
            },
            Some("count") => QueryAnswer::Count {
                family_members: raw.family_members,
                count: raw.count,
            },
            Some("list_all") => QueryAnswer::ListAll {
                family_members: raw.family_members,
            },
            _ => QueryAnswer::Conversation,
        };

        Ok(Self {
            answer: raw.answer,
            kind,
        })
    }
}

impl QueryResponse {
    /// The family member the answer is about, if any
    pub fn family_member(&self) -> Option<&FamilyMember> {
        match &self.kind {
            QueryAnswer::FamilyMember { family_member, .. } => Some(family_member),
            _ => None,
        }
    }

    /// Memories to show with the answer
    pub fn memories_to_show(&self) -> &[Memory] {
        match &self.kind {
            QueryAnswer::FamilyMember {
                memories,
                show_memories: true,
                ..
            } => memories,
            _ => &[],
        }
    }

    /// Family members listed by a count or list answer
    pub fn family_members(&self) -> &[FamilyMember] {
        match &self.kind {
            QueryAnswer::Count { family_members, .. } | QueryAnswer::ListAll { family_members } => {
                family_members
            }
            _ => &[],
        }
    }
}

/// How sure the recognizer is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    None,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
            Confidence::None => write!(f, "none"),
        }
    }
}

/// Result of identifying a person in a photo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum PhotoIdentification {
    /// A family member was recognized
    Found {
        #[serde(default)]
        answer: String,
        family_member: FamilyMember,
        #[serde(default)]
        memories: Vec<Memory>,
        #[serde(default)]
        confidence: Confidence,
    },
    /// Nobody recognized, or recognition failed on the server
    #[serde(alias = "error")]
    Unknown {
        #[serde(default)]
        answer: String,
        #[serde(default)]
        confidence: Option<Confidence>,
        #[serde(default)]
        reasoning: Option<String>,
    },
}

impl PhotoIdentification {
    pub fn answer(&self) -> &str {
        match self {
            PhotoIdentification::Found { answer, .. } | PhotoIdentification::Unknown { answer, .. } => {
                answer
            }
        }
    }

    pub fn family_member(&self) -> Option<&FamilyMember> {
        match self {
            PhotoIdentification::Found { family_member, .. } => Some(family_member),
            PhotoIdentification::Unknown { .. } => None,
        }
    }
}

/// `POST /register/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationResponse {
    pub family_member_id: String,
    #[serde(default)]
    pub message: String,
}

/// `POST /upload-voice/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoiceUploadResponse {
    #[serde(default)]
    pub message: String,
    pub voice_sample_url: String,
}

/// `POST /create-memory/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryCreated {
    pub memory_id: String,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// `POST /upload-video/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VideoUploaded {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member(id: &str, name: &str, relationship: &str) -> serde_json::Value {
        json!({"id": id, "name": name, "relationship": relationship, "patient_id": "p-1"})
    }

    #[test]
    fn test_family_member_answer() {
        let response: QueryResponse = serde_json::from_value(json!({
            "type": "family_member",
            "answer": "That's Alice, your daughter.",
            "family_member": member("fm-1", "Alice", "Daughter"),
            "memories": [{"id": "m-1", "title": "Beach", "content": "Sand"}],
            "show_memories": true
        }))
        .unwrap();

        assert_eq!(response.answer, "That's Alice, your daughter.");
        assert_eq!(response.family_member().map(|m| m.name.as_str()), Some("Alice"));
        assert_eq!(response.memories_to_show().len(), 1);
    }

    #[test]
    fn test_family_member_answer_defaults() {
        let response: QueryResponse = serde_json::from_value(json!({
            "type": "family_member",
            "answer": "That's Bob.",
            "family_member": member("fm-2", "Bob", "Son")
        }))
        .unwrap();

        match &response.kind {
            QueryAnswer::FamilyMember {
                memories,
                show_memories,
                ..
            } => {
                assert!(memories.is_empty());
                assert!(!show_memories);
            }
            other => panic!("unexpected answer: {:?}", other),
        }
        assert!(response.memories_to_show().is_empty());
    }

    #[test]
    fn test_family_member_answer_requires_member() {
        let result: Result<QueryResponse, _> = serde_json::from_value(json!({
            "type": "family_member",
            "answer": "Hmm"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_count_and_list_answers() {
        let count: QueryResponse = serde_json::from_value(json!({
            "type": "count",
            "answer": "You have 2 family members.",
            "count": 2,
            "family_members": [member("fm-1", "Alice", "Daughter"), member("fm-2", "Bob", "Son")]
        }))
        .unwrap();
        assert!(matches!(count.kind, QueryAnswer::Count { count: Some(2), .. }));
        assert_eq!(count.family_members().len(), 2);

        let list: QueryResponse = serde_json::from_value(json!({
            "type": "list_all",
            "answer": "Here is your family.",
            "family_members": [member("fm-1", "Alice", "Daughter")]
        }))
        .unwrap();
        assert!(matches!(list.kind, QueryAnswer::ListAll { .. }));
        assert_eq!(list.family_members()[0].name, "Alice");
    }

    #[test]
    fn test_conversation_and_unknown_types() {
        for body in [
            json!({"type": "conversation", "answer": "Hello!"}),
            json!({"type": "weather", "answer": "Sunny"}),
            json!({"answer": "No type at all"}),
        ] {
            let response: QueryResponse = serde_json::from_value(body).unwrap();
            assert_eq!(response.kind, QueryAnswer::Conversation);
            assert!(response.family_member().is_none());
        }
    }

    #[test]
    fn test_query_response_serializes_with_type_tag() {
        let response = QueryResponse {
            answer: "Hi".to_string(),
            kind: QueryAnswer::Conversation,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], "conversation");
        assert_eq!(value["answer"], "Hi");
    }

    #[test]
    fn test_photo_found() {
        let result: PhotoIdentification = serde_json::from_value(json!({
            "match": "found",
            "answer": "This looks like Alice!",
            "family_member": member("fm-1", "Alice", "Daughter"),
            "confidence": "high"
        }))
        .unwrap();

        assert_eq!(result.answer(), "This looks like Alice!");
        assert!(matches!(
            result,
            PhotoIdentification::Found {
                confidence: Confidence::High,
                ..
            }
        ));
    }

    #[test]
    fn test_photo_unknown_and_error() {
        let unknown: PhotoIdentification = serde_json::from_value(json!({
            "match": "unknown",
            "answer": "I don't recognize this person.",
            "confidence": "low",
            "reasoning": "Face partially hidden"
        }))
        .unwrap();
        assert!(unknown.family_member().is_none());

        let error: PhotoIdentification = serde_json::from_value(json!({
            "match": "error",
            "answer": "Something went wrong."
        }))
        .unwrap();
        assert!(matches!(error, PhotoIdentification::Unknown { confidence: None, .. }));
    }

    #[test]
    fn test_unrecognized_confidence_is_none() {
        let confidence: Confidence = serde_json::from_value(json!("certain")).unwrap();
        assert_eq!(confidence, Confidence::None);
    }
}
