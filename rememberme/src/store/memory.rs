//! In-memory data store
//!
//! Holds every table in process memory behind a single `RwLock`. Used for
//! tests, demos and offline use; it can be seeded from a JSON fixture.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::auth::{friendly_auth_message, session_for_user};
use super::errors::{StoreError, StoreResult};
use super::traits::{
    AuthClient, BaseStore, FamilyStore, FileStore, MemoryStore, PatientStore, VideoStore,
};
use crate::models::{
    FamilyMember, FamilyVideo, MemberSummary, Memory, MemoryUpdate, NewFamilyMember, NewMemory,
    Patient, PatientInfo, Photo, RecentMemory,
};
use crate::session::Session;

/// A sign-in account known to the in-memory auth service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixtureAccount {
    pub email: String,
    pub password: String,
    pub user_id: String,
}

/// Seed data for an [`InMemoryStore`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub patients: Vec<Patient>,
    pub patient_info: Vec<PatientInfo>,
    pub family_members: Vec<FamilyMember>,
    pub memories: Vec<Memory>,
    pub videos: Vec<FamilyVideo>,
    pub accounts: Vec<FixtureAccount>,
}

#[derive(Debug, Default)]
struct Tables {
    patients: HashMap<String, Patient>,
    patient_info: HashMap<String, PatientInfo>,
    /// Registration order
    family_members: Vec<FamilyMember>,
    /// Insertion order
    memories: Vec<Memory>,
    videos: Vec<FamilyVideo>,
    files: HashMap<(String, String), StoredFile>,
    accounts: HashMap<String, FixtureAccount>,
}

#[derive(Debug, Clone)]
struct StoredFile {
    bytes: Vec<u8>,
    content_type: String,
}

impl Tables {
    fn member(&self, id: &str) -> Option<&FamilyMember> {
        self.family_members.iter().find(|m| m.id == id)
    }

    fn summary(&self, family_member_id: &str) -> Option<MemberSummary> {
        self.member(family_member_id).map(|m| MemberSummary {
            id: Some(m.id.clone()),
            name: m.name.clone(),
            relationship: Some(m.relationship.clone()),
            profile_photo_url: m.profile_photo_url.clone(),
        })
    }

    fn belongs_to_patient(&self, family_member_id: &str, patient_id: &str) -> bool {
        self.member(family_member_id)
            .is_some_and(|m| m.patient_id == patient_id)
    }

    /// Memories matching `keep`, newest first; ties keep the latest insert first
    fn newest_memories(&self, keep: impl Fn(&Memory) -> bool) -> Vec<Memory> {
        let mut memories: Vec<Memory> = self
            .memories
            .iter()
            .rev()
            .filter(|m| keep(m))
            .cloned()
            .collect();
        memories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        memories
    }
}

/// Process-local implementation of every store trait
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the fixture's rows
    pub fn from_fixture(fixture: Fixture) -> Self {
        let tables = Tables {
            patients: fixture
                .patients
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
            patient_info: fixture
                .patient_info
                .into_iter()
                .map(|i| (i.patient_id.clone(), i))
                .collect(),
            family_members: fixture.family_members,
            memories: fixture.memories,
            videos: fixture.videos,
            files: HashMap::new(),
            accounts: fixture
                .accounts
                .into_iter()
                .map(|a| (a.email.to_lowercase(), a))
                .collect(),
        };

        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Load a JSON fixture file
    pub async fn load_fixture(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            StoreError::Configuration(format!("Cannot read fixture {}: {}", path.display(), e))
        })?;
        let fixture: Fixture = serde_json::from_str(&raw)?;

        tracing::debug!(
            path = %path.display(),
            family_members = fixture.family_members.len(),
            memories = fixture.memories.len(),
            "Loaded in-memory fixture"
        );
        Ok(Self::from_fixture(fixture))
    }

    /// Contents and content type of a stored file
    pub async fn file(&self, bucket: &str, path: &str) -> Option<(Vec<u8>, String)> {
        let tables = self.tables.read().await;
        tables
            .files
            .get(&(bucket.to_string(), path.to_string()))
            .map(|f| (f.bytes.clone(), f.content_type.clone()))
    }
}

#[async_trait]
impl BaseStore for InMemoryStore {
    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }

    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}

#[async_trait]
impl FamilyStore for InMemoryStore {
    async fn list_family_members(&self, patient_id: &str) -> StoreResult<Vec<FamilyMember>> {
        let tables = self.tables.read().await;
        Ok(tables
            .family_members
            .iter()
            .filter(|m| m.patient_id == patient_id)
            .cloned()
            .collect())
    }

    async fn get_family_member(&self, id: &str) -> StoreResult<Option<FamilyMember>> {
        Ok(self.tables.read().await.member(id).cloned())
    }

    async fn get_family_member_by_user(&self, user_id: &str) -> StoreResult<Option<FamilyMember>> {
        let tables = self.tables.read().await;
        Ok(tables
            .family_members
            .iter()
            .find(|m| m.user_id.as_deref() == Some(user_id))
            .cloned())
    }

    async fn create_family_member(&self, member: NewFamilyMember) -> StoreResult<FamilyMember> {
        let created = FamilyMember {
            id: Uuid::new_v4().to_string(),
            user_id: member.user_id,
            patient_id: member.patient_id,
            name: member.name,
            email: Some(member.email),
            relationship: member.relationship,
            profile_photo_url: member.profile_photo_url,
            voice_sample_url: None,
            voice_clone_status: member.voice_clone_status,
            created_at: Some(Utc::now()),
        };

        self.tables.write().await.family_members.push(created.clone());
        tracing::debug!(id = %created.id, "Created family member");
        Ok(created)
    }

    async fn update_family_member(&self, member: FamilyMember) -> StoreResult<FamilyMember> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .family_members
            .iter_mut()
            .find(|m| m.id == member.id)
            .ok_or_else(|| StoreError::NotFound(format!("family member {}", member.id)))?;
        *existing = member.clone();
        Ok(member)
    }

    async fn delete_family_member(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.family_members.len();
        tables.family_members.retain(|m| m.id != id);
        let removed = tables.family_members.len() != before;

        if removed {
            tables.memories.retain(|m| m.family_member_id != id);
            tables.videos.retain(|v| v.family_member_id != id);
        }
        Ok(removed)
    }

    async fn count_memories_by_member(&self, patient_id: &str) -> StoreResult<HashMap<String, usize>> {
        let tables = self.tables.read().await;
        let mut counts: HashMap<String, usize> = tables
            .family_members
            .iter()
            .filter(|m| m.patient_id == patient_id)
            .map(|m| (m.id.clone(), 0))
            .collect();

        for memory in &tables.memories {
            if let Some(count) = counts.get_mut(&memory.family_member_id) {
                *count += 1;
            }
        }
        Ok(counts)
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    async fn list_memories(&self, family_member_id: &str) -> StoreResult<Vec<Memory>> {
        let tables = self.tables.read().await;
        Ok(tables.newest_memories(|m| m.family_member_id == family_member_id))
    }

    async fn get_memory(&self, id: &str) -> StoreResult<Option<Memory>> {
        let tables = self.tables.read().await;
        Ok(tables.memories.iter().find(|m| m.id == id).cloned())
    }

    async fn create_memory(&self, memory: NewMemory) -> StoreResult<Memory> {
        let created = Memory {
            id: Uuid::new_v4().to_string(),
            family_member_id: memory.family_member_id,
            title: memory.title,
            content: memory.content,
            audio_url: memory.audio_url,
            photos: Vec::new(),
            created_at: Some(Utc::now()),
        };

        self.tables.write().await.memories.push(created.clone());
        Ok(created)
    }

    async fn update_memory(&self, update: MemoryUpdate) -> StoreResult<Memory> {
        let mut tables = self.tables.write().await;
        let memory = tables
            .memories
            .iter_mut()
            .find(|m| m.id == update.id)
            .ok_or_else(|| StoreError::NotFound(format!("memory {}", update.id)))?;
        memory.title = update.title;
        memory.content = update.content;
        Ok(memory.clone())
    }

    async fn delete_memory(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.memories.len();
        tables.memories.retain(|m| m.id != id);
        Ok(tables.memories.len() != before)
    }

    async fn add_memory_photo(&self, memory_id: &str, photo_url: &str) -> StoreResult<Photo> {
        let mut tables = self.tables.write().await;
        let memory = tables
            .memories
            .iter_mut()
            .find(|m| m.id == memory_id)
            .ok_or_else(|| StoreError::NotFound(format!("memory {}", memory_id)))?;

        let photo = Photo {
            id: Some(Uuid::new_v4().to_string()),
            memory_id: Some(memory_id.to_string()),
            photo_url: photo_url.to_string(),
        };
        memory.photos.push(photo.clone());
        Ok(photo)
    }

    async fn recent_memories(&self, patient_id: &str, limit: usize) -> StoreResult<Vec<RecentMemory>> {
        let tables = self.tables.read().await;
        Ok(tables
            .newest_memories(|m| tables.belongs_to_patient(&m.family_member_id, patient_id))
            .into_iter()
            .take(limit)
            .filter_map(|memory| {
                let family_member = tables.summary(&memory.family_member_id)?;
                Some(RecentMemory {
                    memory,
                    family_member,
                })
            })
            .collect())
    }
}

#[async_trait]
impl PatientStore for InMemoryStore {
    async fn get_patient(&self, id: &str) -> StoreResult<Option<Patient>> {
        Ok(self.tables.read().await.patients.get(id).cloned())
    }

    async fn create_patient(&self, patient: Patient) -> StoreResult<Patient> {
        let mut tables = self.tables.write().await;
        if tables.patients.contains_key(&patient.id) {
            return Err(StoreError::AlreadyExists(format!("patient {}", patient.id)));
        }
        tables.patients.insert(patient.id.clone(), patient.clone());
        Ok(patient)
    }

    async fn get_patient_info(&self, patient_id: &str) -> StoreResult<Option<PatientInfo>> {
        Ok(self.tables.read().await.patient_info.get(patient_id).cloned())
    }

    async fn save_patient_info(&self, info: PatientInfo) -> StoreResult<PatientInfo> {
        self.tables
            .write()
            .await
            .patient_info
            .insert(info.patient_id.clone(), info.clone());
        Ok(info)
    }
}

#[async_trait]
impl VideoStore for InMemoryStore {
    async fn list_videos(&self, patient_id: &str) -> StoreResult<Vec<FamilyVideo>> {
        let tables = self.tables.read().await;
        let mut videos: Vec<FamilyVideo> = tables
            .videos
            .iter()
            .rev()
            .filter(|v| tables.belongs_to_patient(&v.family_member_id, patient_id))
            .map(|v| {
                let mut video = v.clone();
                if video.family_member.is_none() {
                    video.family_member = tables.summary(&v.family_member_id);
                }
                video
            })
            .collect();
        videos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(videos)
    }

    async fn delete_video(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.videos.len();
        tables.videos.retain(|v| v.id != id);
        Ok(tables.videos.len() != before)
    }
}

#[async_trait]
impl FileStore for InMemoryStore {
    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<String> {
        self.tables.write().await.files.insert(
            (bucket.to_string(), path.to_string()),
            StoredFile {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.public_url(bucket, path))
    }

    async fn delete_file(&self, bucket: &str, path: &str) -> StoreResult<()> {
        self.tables
            .write()
            .await
            .files
            .remove(&(bucket.to_string(), path.to_string()));
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("mem://{}/{}", bucket, path)
    }
}

#[async_trait]
impl AuthClient for InMemoryStore {
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        let user_id = {
            let tables = self.tables.read().await;
            match tables.accounts.get(&email.trim().to_lowercase()) {
                Some(account) if account.password == password => account.user_id.clone(),
                _ => {
                    return Err(StoreError::Authentication(friendly_auth_message(
                        "Invalid login credentials",
                    )));
                }
            }
        };

        session_for_user(self, &user_id, email, None).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> StoreResult<String> {
        let key = email.trim().to_lowercase();
        let mut tables = self.tables.write().await;
        if tables.accounts.contains_key(&key) {
            return Err(StoreError::AlreadyExists("User already registered".to_string()));
        }

        let user_id = Uuid::new_v4().to_string();
        tables.accounts.insert(
            key,
            FixtureAccount {
                email: email.trim().to_string(),
                password: password.to_string(),
                user_id: user_id.clone(),
            },
        );
        Ok(user_id)
    }
}
