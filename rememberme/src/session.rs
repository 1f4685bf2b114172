//! Explicit session context
//!
//! Who is signed in and which patient they act for. A [`Session`] is handed to
//! the store and the assistant instead of living in global state.

use serde::{Deserialize, Serialize};

/// The role of the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum SessionRole {
    /// The patient themselves
    Patient { patient_id: String },
    /// A family member acting for a patient
    FamilyMember {
        family_member_id: String,
        patient_id: String,
    },
}

/// An authenticated (or locally assumed) user session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Auth user id
    pub user_id: String,

    /// Email the user signed in with
    #[serde(default)]
    pub email: Option<String>,

    /// Bearer token for the data service, if signed in remotely
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,

    #[serde(flatten)]
    pub role: SessionRole,
}

impl Session {
    /// Session for a patient; the patient id doubles as the user id
    pub fn patient(patient_id: impl Into<String>) -> Self {
        let patient_id = patient_id.into();
        Self {
            user_id: patient_id.clone(),
            email: None,
            access_token: None,
            role: SessionRole::Patient { patient_id },
        }
    }

    /// Session for a family member of `patient_id`
    pub fn family_member(
        user_id: impl Into<String>,
        family_member_id: impl Into<String>,
        patient_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            access_token: None,
            role: SessionRole::FamilyMember {
                family_member_id: family_member_id.into(),
                patient_id: patient_id.into(),
            },
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// The patient this session acts for
    pub fn patient_id(&self) -> &str {
        match &self.role {
            SessionRole::Patient { patient_id } => patient_id,
            SessionRole::FamilyMember { patient_id, .. } => patient_id,
        }
    }

    /// The signed-in family member, if the session belongs to one
    pub fn family_member_id(&self) -> Option<&str> {
        match &self.role {
            SessionRole::Patient { .. } => None,
            SessionRole::FamilyMember {
                family_member_id, ..
            } => Some(family_member_id),
        }
    }

    pub fn is_patient(&self) -> bool {
        matches!(self.role, SessionRole::Patient { .. })
    }
}
