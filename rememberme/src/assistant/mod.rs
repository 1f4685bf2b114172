//! The assistant: questions, photos and dashboards for one session
//!
//! Questions can be answered two ways. [`Assistant::ask_locally`] runs the
//! offline [`RelationshipResolver`] against the roster and loads the matched
//! member's profile and memories. [`Assistant::ask_backend`] sends the
//! question to the conversational backend instead.

pub mod chat;
pub mod registration;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::api::{
    BackendClient, MemoryCreated, MemoryUpload, MessageResponse, PhotoIdentification,
    QueryResponse, UploadFile, VideoUpload, VideoUploaded,
};
use crate::models::{
    FamilyMember, FamilyVideo, Memory, MemoryUpdate, Patient, PatientInfo, RecentMemory,
};
use crate::resolver::{QueryResult, RelationshipResolver};
use crate::session::Session;
use crate::speech::{DEFAULT_LANGUAGE, SpeechTranscriber};
use crate::store::DataStore;
use crate::validation;
use crate::{RememberMeError, Result};

pub use chat::{ChatContent, ChatLog, ChatMessage, InputSequencer, InputTicket, Speaker};
pub use registration::{FamilyRegistrationOutcome, PatientDetails, Registrar};

/// Memories shown on the patient dashboard
pub const RECENT_MEMORY_LIMIT: usize = 3;

/// Outcome of an offline question
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum LocalAnswer {
    /// The question named someone on the roster
    Found {
        member: FamilyMember,
        memories: Vec<Memory>,
    },
    NotFound { message: String },
}

impl LocalAnswer {
    pub fn not_found(utterance: &str) -> Self {
        Self::NotFound {
            message: format!(
                "I couldn't find anyone matching \"{}\" in your family.",
                utterance
            ),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// A roster entry with the number of memories it shared
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MemberOverview {
    pub member: FamilyMember,
    pub memory_count: usize,
}

/// Everything the patient's home screen shows
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientDashboard {
    pub patient: Option<Patient>,
    pub info: Option<PatientInfo>,
    pub family: Vec<MemberOverview>,
    pub recent_memories: Vec<RecentMemory>,
}

/// Everything a family member's home screen shows
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FamilyDashboard {
    pub member: FamilyMember,
    pub memories: Vec<Memory>,
}

impl FamilyDashboard {
    /// Whether new memories can be narrated yet
    pub fn voice_ready(&self) -> bool {
        self.member.voice_ready()
    }
}

/// Answers questions and manages memories on behalf of one [`Session`]
#[derive(Debug, Clone)]
pub struct Assistant {
    store: Arc<dyn DataStore>,
    backend: Option<BackendClient>,
    resolver: RelationshipResolver,
    session: Session,
    language: String,
}

impl Assistant {
    pub fn new(store: Arc<dyn DataStore>, session: Session) -> Self {
        Self {
            store,
            backend: None,
            resolver: RelationshipResolver::new(),
            session,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }

    pub fn with_backend(mut self, backend: BackendClient) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_resolver(mut self, resolver: RelationshipResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Language used for speech recognition
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    pub fn resolver(&self) -> &RelationshipResolver {
        &self.resolver
    }

    pub fn backend(&self) -> Result<&BackendClient> {
        self.backend.as_ref().ok_or_else(|| {
            RememberMeError::Configuration("No backend API is configured".to_string())
        })
    }

    /// The patient's family members in registration order
    pub async fn roster(&self) -> Result<Vec<FamilyMember>> {
        Ok(self
            .store
            .list_family_members(self.session.patient_id())
            .await?)
    }

    /// Answer a question from the roster, without the backend
    #[instrument(skip(self))]
    pub async fn ask_locally(&self, utterance: &str) -> Result<LocalAnswer> {
        let utterance = validation::validate_query(utterance)?;
        let roster = self.roster().await?;

        let id = match self.resolver.resolve(utterance, &roster) {
            QueryResult::Matched(member) => member.id.clone(),
            QueryResult::NoMatch => {
                debug!(roster_size = roster.len(), "No roster entry matched");
                return Ok(LocalAnswer::not_found(utterance));
            }
        };

        let (member, memories) = futures::try_join!(
            self.store.get_family_member(&id),
            self.store.list_memories(&id)
        )?;

        let member = member.ok_or_else(|| RememberMeError::NotFound {
            what: "Family member".to_string(),
            id: id.clone(),
        })?;

        info!(family_member = %member.name, memories = memories.len(), "Answered locally");
        Ok(LocalAnswer::Found { member, memories })
    }

    /// Ask the conversational backend
    #[instrument(skip(self))]
    pub async fn ask_backend(&self, utterance: &str) -> Result<QueryResponse> {
        let utterance = validation::validate_query(utterance)?;
        self.backend()?
            .query(self.session.patient_id(), utterance)
            .await
    }

    /// Ask the backend who is in a photo
    pub async fn identify_photo(&self, image: UploadFile) -> Result<PhotoIdentification> {
        self.backend()?
            .identify_photo(self.session.patient_id(), image)
            .await
    }

    /// Dictate one question
    pub async fn listen(&self, transcriber: &dyn SpeechTranscriber) -> Result<String> {
        if !transcriber.is_available() {
            return Err(RememberMeError::SpeechUnavailable);
        }
        let transcript = transcriber.transcribe(&self.language).await?;
        Ok(transcript.text)
    }

    /// Patient home screen data
    pub async fn patient_dashboard(&self) -> Result<PatientDashboard> {
        let patient_id = self.session.patient_id();
        let (patient, info, roster, counts, recent_memories) = futures::try_join!(
            self.store.get_patient(patient_id),
            self.store.get_patient_info(patient_id),
            self.store.list_family_members(patient_id),
            self.store.count_memories_by_member(patient_id),
            self.store.recent_memories(patient_id, RECENT_MEMORY_LIMIT)
        )?;

        let family = roster
            .into_iter()
            .map(|member| MemberOverview {
                memory_count: counts.get(&member.id).copied().unwrap_or(0),
                member,
            })
            .collect();

        Ok(PatientDashboard {
            patient,
            info,
            family,
            recent_memories,
        })
    }

    /// The signed-in family member's record
    pub async fn current_family_member(&self) -> Result<FamilyMember> {
        let id = self.session.family_member_id().ok_or_else(|| {
            RememberMeError::Authentication(
                "This action needs a family member account".to_string(),
            )
        })?;

        self.store
            .get_family_member(id)
            .await?
            .ok_or_else(|| RememberMeError::NotFound {
                what: "Family member record".to_string(),
                id: id.to_string(),
            })
    }

    /// Family member home screen data
    pub async fn family_dashboard(&self) -> Result<FamilyDashboard> {
        let member = self.current_family_member().await?;
        let memories = self.store.list_memories(&member.id).await?;
        Ok(FamilyDashboard { member, memories })
    }

    /// Create a memory narrated in the signed-in member's voice
    #[instrument(skip(self, content, photos), fields(photo_count = photos.len()))]
    pub async fn create_memory(
        &self,
        title: &str,
        content: &str,
        photos: Vec<UploadFile>,
    ) -> Result<MemoryCreated> {
        validation::validate_memory(title, content, photos.len())?;
        let member = self.current_family_member().await?;
        validation::validate_voice_ready(&member)?;

        let created = self
            .backend()?
            .create_memory(MemoryUpload {
                family_member_id: member.id,
                title: title.trim().to_string(),
                content: content.trim().to_string(),
                photos,
            })
            .await?;

        info!(memory_id = %created.memory_id, "Memory created");
        Ok(created)
    }

    /// A memory shared by the signed-in member
    async fn own_memory(&self, memory_id: &str) -> Result<Memory> {
        let member_id = self.session.family_member_id().ok_or_else(|| {
            RememberMeError::Authentication(
                "This action needs a family member account".to_string(),
            )
        })?;

        match self.store.get_memory(memory_id).await? {
            Some(memory) if memory.family_member_id == member_id => Ok(memory),
            _ => Err(RememberMeError::NotFound {
                what: "Memory".to_string(),
                id: memory_id.to_string(),
            }),
        }
    }

    /// Change the title and content of one of the member's memories
    pub async fn edit_memory(&self, memory_id: &str, title: &str, content: &str) -> Result<Memory> {
        validation::validate_memory(title, content, 0)?;
        let memory = self.own_memory(memory_id).await?;

        Ok(self
            .store
            .update_memory(MemoryUpdate {
                id: memory.id,
                title: title.trim().to_string(),
                content: content.trim().to_string(),
            })
            .await?)
    }

    pub async fn delete_memory(&self, memory_id: &str) -> Result<()> {
        let memory = self.own_memory(memory_id).await?;
        if !self.store.delete_memory(&memory.id).await? {
            return Err(RememberMeError::NotFound {
                what: "Memory".to_string(),
                id: memory.id,
            });
        }
        info!(memory_id, "Memory deleted");
        Ok(())
    }

    /// Upload a video on behalf of the signed-in member
    pub async fn upload_video(
        &self,
        title: &str,
        description: &str,
        video: UploadFile,
        thumbnail: Option<UploadFile>,
    ) -> Result<VideoUploaded> {
        validation::validate_video(title, Some(&video), thumbnail.as_ref())?;
        let member = self.current_family_member().await?;

        self.backend()?
            .upload_video(VideoUpload {
                family_member_id: member.id,
                title: title.trim().to_string(),
                description: description.trim().to_string(),
                video,
                thumbnail,
            })
            .await
    }

    /// The patient's family video feed, newest first
    pub async fn videos(&self) -> Result<Vec<FamilyVideo>> {
        Ok(self.store.list_videos(self.session.patient_id()).await?)
    }

    /// Remove a video and its files
    pub async fn delete_video(&self, video_id: &str) -> Result<MessageResponse> {
        self.backend()?.delete_video(video_id).await
    }
}
