//! Backend API client
//!
//! The backend answers open questions about the family, recognizes people in
//! photos and runs the voice-cloning pipeline behind memory creation. The
//! offline [`crate::resolver`] covers the subset of questions that can be
//! answered from the roster alone.

mod client;
pub mod requests;
pub mod responses;

pub use client::{BackendClient, RetryPolicy};
pub use requests::{
    FamilyRegistration, MemoryUpload, QueryRequest, UploadFile, VideoUpload, content_type_for,
};
pub use responses::{
    Confidence, MemoryCreated, MessageResponse, PhotoIdentification, QueryAnswer, QueryResponse,
    RegistrationResponse, VideoUploaded, VoiceUploadResponse,
};
