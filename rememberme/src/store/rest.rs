//! REST data store
//!
//! Talks to a hosted data service exposing PostgREST (`/rest/v1`), object
//! storage (`/storage/v1`) and auth (`/auth/v1`). Every request carries the
//! public `apikey` header and a bearer token: the session's access token when
//! signed in, otherwise the anon key.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::auth::{friendly_auth_message, session_for_user};
use super::errors::{StoreError, StoreResult};
use super::traits::{
    AuthClient, BaseStore, FamilyStore, FileStore, MemoryStore, PatientStore, VideoStore,
};
use crate::config::DataConfig;
use crate::models::{
    FamilyMember, FamilyVideo, Memory, MemoryUpdate, NewFamilyMember, NewMemory, Patient,
    PatientInfo, Photo, RecentMemory, VoiceCloneStatus,
};
use crate::session::Session;

const FAMILY_MEMBERS: &str = "family_members";
const MEMORIES: &str = "memories";
const MEMORY_PHOTOS: &str = "memory_photos";
const PATIENTS: &str = "patients";
const PATIENT_INFO: &str = "patient_info";
const VIDEOS: &str = "family_videos";

/// Memories with their photos embedded
const MEMORY_SELECT: &str = "*,photos:memory_photos(*)";
/// Rows joined to the owning family member, filterable by patient
const MEMBER_JOIN_SELECT: &str =
    "*,family_members!inner(id,name,relationship,profile_photo_url,patient_id)";

/// PostgREST code for "no rows" when a single object is requested
const NO_ROWS: &str = "PGRST116";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Error body shapes of the data service
#[derive(Debug, Default, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ServiceError {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn message(&self) -> Option<String> {
        self.error_description
            .clone()
            .or_else(|| self.msg.clone())
            .or_else(|| self.message.clone())
            .or_else(|| self.error.clone())
    }

    fn is_no_rows(&self) -> bool {
        self.code.as_ref().and_then(|c| c.as_str()) == Some(NO_ROWS)
    }
}

fn error_for_status(status: StatusCode, body: &str) -> StoreError {
    let message = ServiceError::parse(body).message().unwrap_or_else(|| {
        if body.trim().is_empty() {
            status.to_string()
        } else {
            body.trim().to_string()
        }
    });

    match status {
        StatusCode::UNAUTHORIZED => StoreError::Authentication(friendly_auth_message(&message)),
        StatusCode::FORBIDDEN => StoreError::Authorization(message),
        StatusCode::NOT_FOUND => StoreError::NotFound(message),
        StatusCode::CONFLICT => StoreError::AlreadyExists(message),
        _ => StoreError::Query {
            status: status.as_u16(),
            message,
        },
    }
}

async fn check(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(error_for_status(status, &body))
}

/// Fields a family member may change about themselves
#[derive(Debug, Serialize)]
struct FamilyMemberPatch<'a> {
    name: &'a str,
    email: Option<&'a str>,
    relationship: &'a str,
    profile_photo_url: Option<&'a str>,
    voice_sample_url: Option<&'a str>,
    voice_clone_status: VoiceCloneStatus,
}

#[derive(Debug, Deserialize)]
struct MemoryCountRow {
    id: String,
    #[serde(default)]
    memories: Vec<CountCell>,
}

#[derive(Debug, Deserialize)]
struct CountCell {
    count: usize,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

/// Sign-up answers with the user itself or wraps it, depending on settings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Wrapped { user: AuthUser },
    Bare(AuthUser),
}

/// Data store backed by the hosted data service
#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl RestStore {
    /// Create a store from the `data` configuration section
    pub fn new(config: &DataConfig) -> StoreResult<Self> {
        let base_url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::Configuration("data.url is not set".to_string()))?;
        let anon_key = config
            .anon_key
            .as_deref()
            .ok_or_else(|| StoreError::Configuration("data.anon_key is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| StoreError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: None,
        })
    }

    /// Act as a signed-in user
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> StoreResult<Vec<T>> {
        let request = self.authorize(self.client.get(self.rest_url(table)).query(query));
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Exactly one row, or `None` when nothing matches
    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> StoreResult<Option<T>> {
        let request = self.authorize(
            self.client
                .get(self.rest_url(table))
                .query(query)
                .header("Accept", SINGLE_OBJECT),
        );
        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(Some(response.json().await?));
        }

        let body = response.text().await.unwrap_or_default();
        if ServiceError::parse(&body).is_no_rows() {
            return Ok(None);
        }
        Err(error_for_status(status, &body))
    }

    async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
        prefer: &str,
        body: &B,
    ) -> StoreResult<T> {
        let request = self.authorize(
            self.client
                .post(self.rest_url(table))
                .query(query)
                .header("Prefer", prefer)
                .header("Accept", SINGLE_OBJECT)
                .json(body),
        );
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }

    /// Patch the row with `id`; `None` when no row matched
    async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
        select: &str,
        body: &B,
    ) -> StoreResult<Option<T>> {
        let request = self.authorize(
            self.client
                .patch(self.rest_url(table))
                .query(&[("id", format!("eq.{}", id)), ("select", select.to_string())])
                .header("Prefer", "return=representation")
                .json(body),
        );
        let response = check(request.send().await?).await?;
        let mut rows: Vec<T> = response.json().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }

    /// Delete the row with `id`; whether a row was removed
    async fn delete_row(&self, table: &str, id: &str) -> StoreResult<bool> {
        let request = self.authorize(
            self.client
                .delete(self.rest_url(table))
                .query(&[("id", format!("eq.{}", id)), ("select", "id".to_string())])
                .header("Prefer", "return=representation"),
        );
        let response = check(request.send().await?).await?;
        let rows: Vec<serde_json::Value> = response.json().await?;
        Ok(!rows.is_empty())
    }

    fn eq(column: &'static str, value: &str) -> (&'static str, String) {
        (column, format!("eq.{}", value))
    }
}

#[async_trait]
impl BaseStore for RestStore {
    async fn health_check(&self) -> StoreResult<bool> {
        let request = self.authorize(self.client.get(format!("{}/rest/v1/", self.base_url)));
        let response = request.send().await?;
        Ok(response.status().is_success())
    }

    fn describe(&self) -> String {
        format!("rest store at {}", self.base_url)
    }
}

#[async_trait]
impl FamilyStore for RestStore {
    async fn list_family_members(&self, patient_id: &str) -> StoreResult<Vec<FamilyMember>> {
        self.select(
            FAMILY_MEMBERS,
            &[
                ("select", "*".to_string()),
                Self::eq("patient_id", patient_id),
                ("order", "created_at.asc".to_string()),
            ],
        )
        .await
    }

    async fn get_family_member(&self, id: &str) -> StoreResult<Option<FamilyMember>> {
        self.select_one(
            FAMILY_MEMBERS,
            &[("select", "*".to_string()), Self::eq("id", id)],
        )
        .await
    }

    async fn get_family_member_by_user(&self, user_id: &str) -> StoreResult<Option<FamilyMember>> {
        self.select_one(
            FAMILY_MEMBERS,
            &[("select", "*".to_string()), Self::eq("user_id", user_id)],
        )
        .await
    }

    async fn create_family_member(&self, member: NewFamilyMember) -> StoreResult<FamilyMember> {
        let created: FamilyMember = self
            .insert(FAMILY_MEMBERS, &[], "return=representation", &member)
            .await?;
        tracing::debug!(id = %created.id, "Created family member");
        Ok(created)
    }

    async fn update_family_member(&self, member: FamilyMember) -> StoreResult<FamilyMember> {
        let patch = FamilyMemberPatch {
            name: &member.name,
            email: member.email.as_deref(),
            relationship: &member.relationship,
            profile_photo_url: member.profile_photo_url.as_deref(),
            voice_sample_url: member.voice_sample_url.as_deref(),
            voice_clone_status: member.voice_clone_status,
        };
        self.patch(FAMILY_MEMBERS, &member.id, "*", &patch)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("family member {}", member.id)))
    }

    async fn delete_family_member(&self, id: &str) -> StoreResult<bool> {
        self.delete_row(FAMILY_MEMBERS, id).await
    }

    async fn count_memories_by_member(&self, patient_id: &str) -> StoreResult<HashMap<String, usize>> {
        let rows: Vec<MemoryCountRow> = self
            .select(
                FAMILY_MEMBERS,
                &[
                    ("select", "id,memories(count)".to_string()),
                    Self::eq("patient_id", patient_id),
                ],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.id, row.memories.iter().map(|c| c.count).sum()))
            .collect())
    }
}

#[async_trait]
impl MemoryStore for RestStore {
    async fn list_memories(&self, family_member_id: &str) -> StoreResult<Vec<Memory>> {
        self.select(
            MEMORIES,
            &[
                ("select", MEMORY_SELECT.to_string()),
                Self::eq("family_member_id", family_member_id),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn get_memory(&self, id: &str) -> StoreResult<Option<Memory>> {
        self.select_one(
            MEMORIES,
            &[("select", MEMORY_SELECT.to_string()), Self::eq("id", id)],
        )
        .await
    }

    async fn create_memory(&self, memory: NewMemory) -> StoreResult<Memory> {
        self.insert(MEMORIES, &[], "return=representation", &memory)
            .await
    }

    async fn update_memory(&self, update: MemoryUpdate) -> StoreResult<Memory> {
        self.patch(MEMORIES, &update.id, MEMORY_SELECT, &update)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("memory {}", update.id)))
    }

    async fn delete_memory(&self, id: &str) -> StoreResult<bool> {
        self.delete_row(MEMORIES, id).await
    }

    async fn add_memory_photo(&self, memory_id: &str, photo_url: &str) -> StoreResult<Photo> {
        let body = serde_json::json!({ "memory_id": memory_id, "photo_url": photo_url });
        self.insert(MEMORY_PHOTOS, &[], "return=representation", &body)
            .await
    }

    async fn recent_memories(&self, patient_id: &str, limit: usize) -> StoreResult<Vec<RecentMemory>> {
        self.select(
            MEMORIES,
            &[
                ("select", MEMBER_JOIN_SELECT.to_string()),
                Self::eq("family_members.patient_id", patient_id),
                ("order", "created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }
}

#[async_trait]
impl PatientStore for RestStore {
    async fn get_patient(&self, id: &str) -> StoreResult<Option<Patient>> {
        self.select_one(PATIENTS, &[("select", "*".to_string()), Self::eq("id", id)])
            .await
    }

    async fn create_patient(&self, patient: Patient) -> StoreResult<Patient> {
        self.insert(PATIENTS, &[], "return=representation", &patient)
            .await
    }

    async fn get_patient_info(&self, patient_id: &str) -> StoreResult<Option<PatientInfo>> {
        self.select_one(
            PATIENT_INFO,
            &[("select", "*".to_string()), Self::eq("patient_id", patient_id)],
        )
        .await
    }

    async fn save_patient_info(&self, info: PatientInfo) -> StoreResult<PatientInfo> {
        self.insert(
            PATIENT_INFO,
            &[("on_conflict", "patient_id".to_string())],
            "resolution=merge-duplicates,return=representation",
            &info,
        )
        .await
    }
}

#[async_trait]
impl VideoStore for RestStore {
    async fn list_videos(&self, patient_id: &str) -> StoreResult<Vec<FamilyVideo>> {
        self.select(
            VIDEOS,
            &[
                ("select", MEMBER_JOIN_SELECT.to_string()),
                Self::eq("family_members.patient_id", patient_id),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn delete_video(&self, id: &str) -> StoreResult<bool> {
        self.delete_row(VIDEOS, id).await
    }
}

#[async_trait]
impl FileStore for RestStore {
    async fn upload_file(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<String> {
        let request = self.authorize(
            self.client
                .post(self.object_url(bucket, path))
                .header("x-upsert", "true")
                .header("cache-control", "max-age=3600")
                .header("content-type", content_type)
                .body(bytes),
        );
        check(request.send().await?).await?;

        tracing::debug!(bucket, path, "Uploaded file");
        Ok(self.public_url(bucket, path))
    }

    async fn delete_file(&self, bucket: &str, path: &str) -> StoreResult<()> {
        let request = self.authorize(
            self.client
                .delete(format!("{}/storage/v1/object/{}", self.base_url, bucket))
                .json(&serde_json::json!({ "prefixes": [path] })),
        );
        check(request.send().await?).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, path
        )
    }
}

#[async_trait]
impl AuthClient for RestStore {
    async fn sign_in(&self, email: &str, password: &str) -> StoreResult<Session> {
        let request = self.authorize(
            self.client
                .post(self.auth_url("token"))
                .query(&[("grant_type", "password")])
                .json(&serde_json::json!({ "email": email, "password": password })),
        );
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = ServiceError::parse(&body)
                .message()
                .unwrap_or_else(|| status.to_string());
            return Err(StoreError::Authentication(friendly_auth_message(&message)));
        }

        let token: TokenResponse = response.json().await?;
        let email = token.user.email.as_deref().unwrap_or(email).to_string();
        let signed_in = self.clone().with_access_token(token.access_token.clone());

        tracing::debug!(user_id = %token.user.id, "Signed in");
        session_for_user(&signed_in, &token.user.id, &email, Some(token.access_token)).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> StoreResult<String> {
        let request = self.authorize(
            self.client
                .post(self.auth_url("signup"))
                .json(&serde_json::json!({ "email": email, "password": password })),
        );
        let response = check(request.send().await?).await?;

        Ok(match response.json::<SignUpResponse>().await? {
            SignUpResponse::Wrapped { user } | SignUpResponse::Bare(user) => user.id,
        })
    }
}
