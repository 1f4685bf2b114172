//! Request bodies for the backend API

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::{RememberMeError, Result};

/// A question for the conversational backend
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueryRequest {
    pub patient_id: String,
    pub query: String,
}

/// A file to send as a multipart part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file, guessing its content type from the extension
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| RememberMeError::Other(format!("Cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Ok(Self {
            content_type: content_type_for(&file_name).to_string(),
            file_name,
            bytes,
        })
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn into_part(self) -> Result<Part> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)
            .map_err(|e| RememberMeError::Other(format!("Invalid content type: {}", e)))
    }
}

/// Content type for a file name, by extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "wav" => "audio/wav",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Register a family member for a patient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyRegistration {
    pub user_id: Option<String>,
    pub patient_id: String,
    pub name: String,
    pub email: String,
    pub relationship: String,
    pub profile_photo_url: Option<String>,
}

impl FamilyRegistration {
    pub(crate) fn into_form(self) -> Form {
        let mut form = Form::new()
            .text("patient_id", self.patient_id)
            .text("name", self.name)
            .text("email", self.email)
            .text("relationship", self.relationship);
        if let Some(user_id) = self.user_id {
            form = form.text("user_id", user_id);
        }
        if let Some(url) = self.profile_photo_url {
            form = form.text("profile_photo_url", url);
        }
        form
    }
}

/// A new memory with its photos
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryUpload {
    pub family_member_id: String,
    pub title: String,
    pub content: String,
    pub photos: Vec<UploadFile>,
}

impl MemoryUpload {
    pub(crate) fn into_form(self) -> Result<Form> {
        let mut form = Form::new()
            .text("family_member_id", self.family_member_id)
            .text("title", self.title)
            .text("content", self.content);
        for photo in self.photos {
            form = form.part("photos", photo.into_part()?);
        }
        Ok(form)
    }
}

/// A family video with optional thumbnail
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUpload {
    pub family_member_id: String,
    pub title: String,
    pub description: String,
    pub video: UploadFile,
    pub thumbnail: Option<UploadFile>,
}

impl VideoUpload {
    pub(crate) fn into_form(self) -> Result<Form> {
        let mut form = Form::new()
            .text("family_member_id", self.family_member_id)
            .text("title", self.title)
            .text("description", self.description)
            .part("video", self.video.into_part()?);
        if let Some(thumbnail) = self.thumbnail {
            form = form.part("thumbnail", thumbnail.into_part()?);
        }
        Ok(form)
    }
}
