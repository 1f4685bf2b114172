//! Account creation and sign-in
//!
//! Registration spans three services: the auth service creates the user, the
//! data store holds files and patient records, and the backend creates the
//! family member and starts voice cloning.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::{BackendClient, FamilyRegistration, UploadFile};
use crate::config::BucketConfig;
use crate::models::{EmergencyContact, Patient, PatientInfo};
use crate::session::Session;
use crate::store::{AuthClient, DataStore};
use crate::validation::{self, FamilyRegistrationForm, PatientRegistrationForm};
use crate::{RememberMeError, Result};

/// Optional patient details collected after the account fields
#[derive(Debug, Clone, Default)]
pub struct PatientDetails {
    pub home_address: Option<String>,
    pub home_photo: Option<UploadFile>,
    pub emergency_contacts: Vec<EmergencyContact>,
    pub doctor_name: Option<String>,
    pub doctor_phone: Option<String>,
}

/// What a completed family registration produced
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FamilyRegistrationOutcome {
    pub user_id: String,
    pub family_member_id: String,
    pub profile_photo_url: Option<String>,
    pub voice_sample_url: String,
}

/// Signs users in and registers new patients and family members
#[derive(Debug, Clone)]
pub struct Registrar {
    auth: Arc<dyn AuthClient>,
    store: Arc<dyn DataStore>,
    backend: Option<BackendClient>,
    buckets: BucketConfig,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Registrar {
    pub fn new(auth: Arc<dyn AuthClient>, store: Arc<dyn DataStore>) -> Self {
        Self {
            auth,
            store,
            backend: None,
            buckets: BucketConfig::default(),
        }
    }

    pub fn with_backend(mut self, backend: BackendClient) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_buckets(mut self, buckets: BucketConfig) -> Self {
        self.buckets = buckets;
        self
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        validation::validate_login(email, password)?;
        let session = self.auth.sign_in(email.trim(), password).await?;
        info!(user_id = %session.user_id, patient = session.is_patient(), "Signed in");
        Ok(session)
    }

    /// Register a family member of `patient_id` and upload their voice sample
    pub async fn register_family_member(
        &self,
        patient_id: &str,
        form: &FamilyRegistrationForm,
        voice_sample: UploadFile,
        profile_photo: Option<UploadFile>,
    ) -> Result<FamilyRegistrationOutcome> {
        form.validate_account()?;
        validation::validate_voice_sample(Some(&voice_sample.file_name))?;
        let backend = self.backend.as_ref().ok_or_else(|| {
            RememberMeError::Configuration("No backend API is configured".to_string())
        })?;

        let user_id = self.auth.sign_up(form.email.trim(), &form.password).await?;
        let stamp = Utc::now().timestamp_millis();

        let profile_photo_url = match profile_photo {
            Some(photo) => {
                let path = format!("{}-{}-{}", user_id, stamp, photo.file_name);
                Some(
                    self.store
                        .upload_file(&self.buckets.profiles, &path, photo.bytes, &photo.content_type)
                        .await?,
                )
            }
            None => None,
        };

        let registered = backend
            .register_family_member(FamilyRegistration {
                user_id: Some(user_id.clone()),
                patient_id: patient_id.to_string(),
                name: form.name.trim().to_string(),
                email: form.email.trim().to_string(),
                relationship: form.relationship.clone(),
                profile_photo_url: profile_photo_url.clone(),
            })
            .await?;

        let voice_path = format!("{}-{}.wav", user_id, stamp);
        let voice_sample_url = self
            .store
            .upload_file(
                &self.buckets.voice_samples,
                &voice_path,
                voice_sample.bytes,
                &voice_sample.content_type,
            )
            .await?;

        backend
            .upload_voice(&registered.family_member_id, &voice_sample_url)
            .await?;

        info!(
            family_member_id = %registered.family_member_id,
            "Family member registered"
        );

        Ok(FamilyRegistrationOutcome {
            user_id,
            family_member_id: registered.family_member_id,
            profile_photo_url,
            voice_sample_url,
        })
    }

    /// Register a patient; the patient id is the new user id
    pub async fn register_patient(
        &self,
        form: &PatientRegistrationForm,
        details: PatientDetails,
    ) -> Result<Patient> {
        form.validate()?;

        let user_id = self.auth.sign_up(form.email.trim(), &form.password).await?;
        let patient = self
            .store
            .create_patient(Patient {
                id: user_id.clone(),
                name: form.name.trim().to_string(),
                date_of_birth: form.date_of_birth,
            })
            .await?;

        // a failed home photo upload does not fail the registration
        let home_photo_url = match details.home_photo {
            Some(photo) => {
                let path = format!("{}/home-photo-{}", user_id, Utc::now().timestamp_millis());
                match self
                    .store
                    .upload_file(&self.buckets.patient, &path, photo.bytes, &photo.content_type)
                    .await
                {
                    Ok(url) => Some(url),
                    Err(e) => {
                        warn!("Home photo upload failed: {}", e);
                        None
                    }
                }
            }
            None => None,
        };

        let mut info = PatientInfo {
            patient_id: patient.id.clone(),
            home_address: non_empty(details.home_address),
            home_photo_url,
            emergency_contacts: details.emergency_contacts,
            doctor_name: non_empty(details.doctor_name),
            doctor_phone: non_empty(details.doctor_phone),
        };
        info.emergency_contacts = info.reachable_contacts().cloned().collect();
        self.store.save_patient_info(info).await?;

        info!(patient_id = %patient.id, "Patient registered");
        Ok(patient)
    }
}
