//! Data-access contract
//!
//! Record CRUD for patients, family members, memories and videos, plus file
//! upload to object storage. Implemented by [`super::RestStore`] and
//! [`super::InMemoryStore`].

use std::collections::HashMap;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::models::{
    FamilyMember, FamilyVideo, Memory, MemoryUpdate, NewFamilyMember, NewMemory, Patient,
    PatientInfo, Photo, RecentMemory,
};
use crate::session::Session;
use crate::store::errors::StoreError;

/// Base trait for all store implementations
#[async_trait]
pub trait BaseStore: Send + Sync + 'static + Debug {
    /// Check if the store is healthy and available
    async fn health_check(&self) -> std::result::Result<bool, StoreError>;

    /// Short description of the store for diagnostics
    fn describe(&self) -> String;
}

/// Family member records (the roster provider)
#[async_trait]
pub trait FamilyStore: BaseStore {
    /// All family members of a patient in registration order
    async fn list_family_members(
        &self,
        patient_id: &str,
    ) -> std::result::Result<Vec<FamilyMember>, StoreError>;

    async fn get_family_member(&self, id: &str)
    -> std::result::Result<Option<FamilyMember>, StoreError>;

    /// The family member record belonging to an auth user
    async fn get_family_member_by_user(
        &self,
        user_id: &str,
    ) -> std::result::Result<Option<FamilyMember>, StoreError>;

    async fn create_family_member(
        &self,
        member: NewFamilyMember,
    ) -> std::result::Result<FamilyMember, StoreError>;

    async fn update_family_member(
        &self,
        member: FamilyMember,
    ) -> std::result::Result<FamilyMember, StoreError>;

    async fn delete_family_member(&self, id: &str) -> std::result::Result<bool, StoreError>;

    /// Number of memories per family member id, for one patient
    async fn count_memories_by_member(
        &self,
        patient_id: &str,
    ) -> std::result::Result<HashMap<String, usize>, StoreError>;
}

/// Memory records (the memory provider)
#[async_trait]
pub trait MemoryStore: BaseStore {
    /// Memories shared by one family member, newest first, photos embedded
    async fn list_memories(
        &self,
        family_member_id: &str,
    ) -> std::result::Result<Vec<Memory>, StoreError>;

    async fn get_memory(&self, id: &str) -> std::result::Result<Option<Memory>, StoreError>;

    async fn create_memory(&self, memory: NewMemory) -> std::result::Result<Memory, StoreError>;

    /// Change title and content; photos and audio are kept
    async fn update_memory(&self, update: MemoryUpdate)
    -> std::result::Result<Memory, StoreError>;

    async fn delete_memory(&self, id: &str) -> std::result::Result<bool, StoreError>;

    /// Attach a photo; it goes after the memory's existing photos
    async fn add_memory_photo(
        &self,
        memory_id: &str,
        photo_url: &str,
    ) -> std::result::Result<Photo, StoreError>;

    /// Newest memories across all of a patient's family members
    async fn recent_memories(
        &self,
        patient_id: &str,
        limit: usize,
    ) -> std::result::Result<Vec<RecentMemory>, StoreError>;
}

/// Patient records
#[async_trait]
pub trait PatientStore: BaseStore {
    async fn get_patient(&self, id: &str) -> std::result::Result<Option<Patient>, StoreError>;

    async fn create_patient(&self, patient: Patient) -> std::result::Result<Patient, StoreError>;

    /// Home and care details; a patient without a row yields `None`
    async fn get_patient_info(
        &self,
        patient_id: &str,
    ) -> std::result::Result<Option<PatientInfo>, StoreError>;

    /// Insert or replace the patient's details
    async fn save_patient_info(
        &self,
        info: PatientInfo,
    ) -> std::result::Result<PatientInfo, StoreError>;
}

/// Family video records
#[async_trait]
pub trait VideoStore: BaseStore {
    /// Videos shared with a patient, newest first
    async fn list_videos(&self, patient_id: &str)
    -> std::result::Result<Vec<FamilyVideo>, StoreError>;

    async fn delete_video(&self, id: &str) -> std::result::Result<bool, StoreError>;
}

/// Object storage
#[async_trait]
pub trait FileStore: BaseStore {
    /// Upload (or overwrite) a file and return its public URL
    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> std::result::Result<String, StoreError>;

    async fn delete_file(&self, bucket: &str, path: &str) -> std::result::Result<(), StoreError>;

    /// Public URL a file at `path` is (or would be) served from
    fn public_url(&self, bucket: &str, path: &str) -> String;
}

/// Every data-access capability the application uses
pub trait DataStore: FamilyStore + MemoryStore + PatientStore + VideoStore + FileStore {}

impl<T> DataStore for T where T: FamilyStore + MemoryStore + PatientStore + VideoStore + FileStore {}

/// Credentials for the hosted auth service
#[async_trait]
pub trait AuthClient: Send + Sync + Debug {
    /// Sign in with email and password
    ///
    /// The returned session is a family member session when the user owns a
    /// family member record, otherwise a patient session.
    async fn sign_in(&self, email: &str, password: &str) -> std::result::Result<Session, StoreError>;

    /// Create an account and return the new user id
    async fn sign_up(&self, email: &str, password: &str) -> std::result::Result<String, StoreError>;
}
