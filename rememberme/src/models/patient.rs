//! Patient records

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A patient; the id equals the patient's auth user id
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

/// Someone to call in an emergency
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EmergencyContact {
    pub name: String,
    #[serde(default)]
    pub relationship: String,
    pub phone: String,
}

/// Home and care details shown on the patient dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PatientInfo {
    pub patient_id: String,
    #[serde(default)]
    pub home_address: Option<String>,
    #[serde(default)]
    pub home_photo_url: Option<String>,
    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub doctor_phone: Option<String>,
}

impl PatientInfo {
    /// Contacts with both a name and a phone number
    pub fn reachable_contacts(&self) -> impl Iterator<Item = &EmergencyContact> {
        self.emergency_contacts
            .iter()
            .filter(|c| !c.name.trim().is_empty() && !c.phone.trim().is_empty())
    }
}
