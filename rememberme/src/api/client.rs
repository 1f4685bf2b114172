//! HTTP client for the conversational and recognition backend

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use super::requests::{FamilyRegistration, MemoryUpload, QueryRequest, UploadFile, VideoUpload};
use super::responses::{
    MemoryCreated, MessageResponse, PhotoIdentification, QueryResponse, RegistrationResponse,
    VideoUploaded, VoiceUploadResponse,
};
use crate::config::{BackendConfig, RetryConfig};
use crate::models::{FamilyMember, FamilyVideo, Memory};
use crate::{RememberMeError, Result};

/// Retry policy for idempotent requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: config.initial_backoff,
            backoff_multiplier: config.backoff_multiplier,
            max_backoff: config.max_backoff,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt + 1`
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff_ms = self.initial_backoff.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32);
        let backoff = Duration::from_millis(backoff_ms as u64);
        backoff.min(self.max_backoff)
    }
}

/// Client for the RememberMe backend API
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl BackendClient {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(RememberMeError::Configuration(format!(
                "Backend URL must start with http:// or https://, got '{}'",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("rememberme/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                RememberMeError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from(&config.retry),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Ask the conversational backend a question about the patient's family
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn query(&self, patient_id: &str, query: &str) -> Result<QueryResponse> {
        let body = QueryRequest {
            patient_id: patient_id.to_string(),
            query: query.to_string(),
        };
        let request = self.client.post(self.endpoint("query/")).json(&body);
        self.send_json(request).await
    }

    /// Ask the backend who is in a photo
    #[instrument(skip(self, image), fields(file = %image.file_name, bytes = image.len()))]
    pub async fn identify_photo(
        &self,
        patient_id: &str,
        image: UploadFile,
    ) -> Result<PhotoIdentification> {
        let form = reqwest::multipart::Form::new()
            .text("patient_id", patient_id.to_string())
            .part("image", image.into_part()?);
        let request = self
            .client
            .post(self.endpoint("identify-photo/"))
            .multipart(form);
        self.send_json(request).await
    }

    pub async fn register_family_member(
        &self,
        registration: FamilyRegistration,
    ) -> Result<RegistrationResponse> {
        let request = self
            .client
            .post(self.endpoint("register/"))
            .multipart(registration.into_form());
        self.send_json(request).await
    }

    /// Attach an uploaded voice sample and start voice cloning
    pub async fn upload_voice(
        &self,
        family_member_id: &str,
        voice_sample_url: &str,
    ) -> Result<VoiceUploadResponse> {
        let form = reqwest::multipart::Form::new()
            .text("family_member_id", family_member_id.to_string())
            .text("voice_sample_url", voice_sample_url.to_string());
        let request = self
            .client
            .post(self.endpoint("upload-voice/"))
            .multipart(form);
        self.send_json(request).await
    }

    /// Create a memory; narration is generated by the backend
    pub async fn create_memory(&self, memory: MemoryUpload) -> Result<MemoryCreated> {
        let request = self
            .client
            .post(self.endpoint("create-memory/"))
            .multipart(memory.into_form()?);
        self.send_json(request).await
    }

    pub async fn upload_video(&self, video: VideoUpload) -> Result<VideoUploaded> {
        let request = self
            .client
            .post(self.endpoint("upload-video/"))
            .multipart(video.into_form()?);
        self.send_json(request).await
    }

    pub async fn delete_video(&self, video_id: &str) -> Result<MessageResponse> {
        let request = self
            .client
            .delete(self.endpoint(&format!("videos/delete/{}/", video_id)));
        self.send_json(request).await
    }

    pub async fn family_members(&self, patient_id: &str) -> Result<Vec<FamilyMember>> {
        self.get_json(&format!("family-members/{}/", patient_id))
            .await
    }

    pub async fn memories(&self, family_member_id: &str) -> Result<Vec<Memory>> {
        self.get_json(&format!("memories/{}/", family_member_id))
            .await
    }

    pub async fn videos(&self, patient_id: &str) -> Result<Vec<FamilyVideo>> {
        self.get_json(&format!("videos/{}/", patient_id)).await
    }

    /// Whether the backend answers at all
    pub async fn health(&self) -> bool {
        match self.client.get(self.endpoint("")).send().await {
            Ok(response) => !response.status().is_server_error(),
            Err(e) => {
                debug!("Backend health check failed: {}", e);
                false
            }
        }
    }

    /// GET with retries on transient failures
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        let mut attempt = 0;

        loop {
            match self.send_json(self.client.get(&url)).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let backoff = self.retry.backoff_duration(attempt);
                    warn!(
                        "Request to {} failed (attempt {}/{}), retrying in {:?}: {}",
                        url,
                        attempt + 1,
                        self.retry.max_retries + 1,
                        backoff,
                        e
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(transport_error)?;
        decode_response(response).await
    }
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if !status.is_success() {
        return Err(error_from_body(status, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        RememberMeError::Protocol(format!("Unexpected response from backend: {}", e))
    })
}

fn transport_error(err: reqwest::Error) -> RememberMeError {
    if err.is_timeout() {
        RememberMeError::Timeout(err.to_string())
    } else if err.is_decode() {
        RememberMeError::Protocol(err.to_string())
    } else {
        RememberMeError::Connection(err.to_string())
    }
}

/// Turn a non-success response body into an error
///
/// Bodies are `{"error": "..."}`, `{"detail": "..."}` or a map of field
/// errors as produced by form validation on the server.
pub(crate) fn error_from_body(status: StatusCode, body: &str) -> RememberMeError {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            return RememberMeError::Protocol(format!(
                "Backend returned {} with a non-JSON body",
                status
            ));
        }
    };

    let message = match &value {
        serde_json::Value::Object(map) => {
            if let Some(message) = map
                .get("error")
                .or_else(|| map.get("detail"))
                .and_then(|v| v.as_str())
            {
                message.to_string()
            } else {
                map.iter()
                    .map(|(field, errors)| format!("{}: {}", field, flatten_errors(errors)))
                    .collect::<Vec<_>>()
                    .join("; ")
            }
        }
        other => flatten_errors(other),
    };

    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        message
    };

    RememberMeError::Api {
        status: status.as_u16(),
        message,
    }
}

fn flatten_errors(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(flatten_errors)
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_duration() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_duration(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_duration(2), Duration::from_millis(400));
        // capped at max_backoff
        assert_eq!(policy.backoff_duration(10), Duration::from_secs(2));
    }

    #[test]
    fn test_policy_from_config() {
        let config = RetryConfig {
            max_retries: 5,
            initial_backoff: Duration::from_millis(50),
            backoff_multiplier: 3.0,
            max_backoff: Duration::from_millis(500),
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.backoff_duration(1), Duration::from_millis(150));
        assert_eq!(policy.backoff_duration(3), Duration::from_millis(500));
        assert_eq!(RetryPolicy::none().max_retries, 0);
    }

    #[test]
    fn test_new_rejects_bad_url() {
        let config = BackendConfig {
            base_url: "localhost:8000".to_string(),
            ..BackendConfig::default()
        };
        assert!(matches!(
            BackendClient::new(&config),
            Err(RememberMeError::Configuration(_))
        ));
    }

    #[test]
    fn test_endpoint_joining() {
        let config = BackendConfig {
            base_url: "http://backend.test/api/".to_string(),
            ..BackendConfig::default()
        };
        let client = BackendClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://backend.test/api");
        assert_eq!(client.endpoint("query/"), "http://backend.test/api/query/");
        assert_eq!(
            client.endpoint("/videos/p-1/"),
            "http://backend.test/api/videos/p-1/"
        );
    }

    #[test]
    fn test_error_body_with_error_field() {
        let err = error_from_body(
            StatusCode::BAD_REQUEST,
            r#"{"error": "Voice not uploaded yet"}"#,
        );
        match err {
            RememberMeError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Voice not uploaded yet");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_body_with_field_errors() {
        let err = error_from_body(
            StatusCode::BAD_REQUEST,
            r#"{"email": ["Enter a valid email address."]}"#,
        );
        assert_eq!(
            err.to_string(),
            "Request failed (400): email: Enter a valid email address."
        );
    }

    #[test]
    fn test_error_body_not_json() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>");
        assert!(matches!(err, RememberMeError::Protocol(_)));
    }

    #[test]
    fn test_error_classification() {
        let server = error_from_body(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error": "boom"}"#);
        assert!(server.is_retryable());

        let unauthorized = error_from_body(StatusCode::UNAUTHORIZED, r#"{"detail": "expired"}"#);
        assert!(!unauthorized.is_retryable());
        assert!(unauthorized.requires_login());
    }
}
