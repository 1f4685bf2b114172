//! Data models for RememberMe
//!
//! Field names follow the column names of the managed database so rows decode
//! directly from the data service and the HTTP API.

pub mod family;
pub mod memory;
pub mod patient;
pub mod video;

pub use family::{
    FamilyMember, MemberSummary, NewFamilyMember, RelationshipKind, RosterEntry, VoiceCloneStatus,
};
pub use memory::{Memory, MemoryUpdate, NewMemory, Photo, RecentMemory};
pub use patient::{EmergencyContact, Patient, PatientInfo};
pub use video::FamilyVideo;
