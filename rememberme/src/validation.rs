//! Input checks that run before any network call
//!
//! Messages are shown to the user as-is.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use crate::api::UploadFile;
use crate::models::FamilyMember;
use crate::{RememberMeError, Result};

/// Shortest accepted password
pub const MIN_PASSWORD_LEN: usize = 6;

/// Photos allowed on one memory
pub const MAX_MEMORY_PHOTOS: usize = 5;

/// Largest accepted video upload
pub const MAX_VIDEO_BYTES: usize = 100 * 1024 * 1024;

lazy_static! {
    static ref EMAIL_REGEX: Option<Regex> = Regex::new(r"\S+@\S+\.\S+").ok();
}

/// A form field that failed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,
    #[error("Email is required")]
    EmailRequired,
    #[error("Invalid email format")]
    InvalidEmailFormat,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Relationship is required")]
    RelationshipRequired,
    #[error("Please upload a voice sample")]
    VoiceSampleRequired,
    #[error("Only WAV format is supported")]
    VoiceSampleNotWav,

    #[error("Please enter your name")]
    PatientNameRequired,
    #[error("Please enter a valid email")]
    InvalidEmail,
    #[error("Please enter your date of birth")]
    DateOfBirthRequired,

    #[error("Please enter both email and password")]
    CredentialsRequired,

    #[error("Title and content are required")]
    MemoryFieldsRequired,
    #[error("Maximum 5 photos allowed")]
    TooManyPhotos,

    #[error("Title and video are required")]
    VideoFieldsRequired,
    #[error("Please select a valid video file.")]
    InvalidVideoType,
    #[error("Video file is too large. Maximum size is 100MB.")]
    VideoTooLarge,
    #[error("Please select a valid image file for thumbnail.")]
    InvalidThumbnailType,

    #[error("Voice not uploaded yet")]
    VoiceNotUploaded,
    #[error("Voice processing not complete")]
    VoiceNotReady,
}

/// Trimmed question text, or [`RememberMeError::EmptyQuery`]
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(RememberMeError::EmptyQuery)
    } else {
        Ok(trimmed)
    }
}

fn is_valid_email(email: &str) -> bool {
    match EMAIL_REGEX.as_ref() {
        Some(re) => re.is_match(email),
        None => email.contains('@'),
    }
}

/// Sign-up form for a family member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyRegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub relationship: String,
    /// File name of the chosen voice sample
    pub voice_sample: Option<String>,
}

impl FamilyRegistrationForm {
    /// Account fields, checked in the order the form shows them
    pub fn validate_account(&self) -> std::result::Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::NameRequired);
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::EmailRequired);
        }
        if !is_valid_email(&self.email) {
            return Err(ValidationError::InvalidEmailFormat);
        }
        check_passwords(&self.password, &self.confirm_password)?;
        if self.relationship.trim().is_empty() {
            return Err(ValidationError::RelationshipRequired);
        }
        Ok(())
    }

    pub fn validate_voice_sample(&self) -> std::result::Result<(), ValidationError> {
        validate_voice_sample(self.voice_sample.as_deref())
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        self.validate_account()?;
        self.validate_voice_sample()
    }
}

/// Voice samples must be WAV files
pub fn validate_voice_sample(file_name: Option<&str>) -> std::result::Result<(), ValidationError> {
    match file_name {
        None => Err(ValidationError::VoiceSampleRequired),
        Some(name) if !name.ends_with(".wav") => Err(ValidationError::VoiceSampleNotWav),
        Some(_) => Ok(()),
    }
}

/// Sign-up form for a patient
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientRegistrationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl PatientRegistrationForm {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::PatientNameRequired);
        }
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(ValidationError::InvalidEmail);
        }
        check_passwords(&self.password, &self.confirm_password)?;
        if self.date_of_birth.is_none() {
            return Err(ValidationError::DateOfBirthRequired);
        }
        Ok(())
    }
}

fn check_passwords(password: &str, confirm: &str) -> std::result::Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> std::result::Result<(), ValidationError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::CredentialsRequired);
    }
    Ok(())
}

pub fn validate_memory(
    title: &str,
    content: &str,
    photo_count: usize,
) -> std::result::Result<(), ValidationError> {
    if title.trim().is_empty() || content.trim().is_empty() {
        return Err(ValidationError::MemoryFieldsRequired);
    }
    if photo_count > MAX_MEMORY_PHOTOS {
        return Err(ValidationError::TooManyPhotos);
    }
    Ok(())
}

pub fn validate_video(
    title: &str,
    video: Option<&UploadFile>,
    thumbnail: Option<&UploadFile>,
) -> std::result::Result<(), ValidationError> {
    let video = match video {
        Some(video) if !title.trim().is_empty() => video,
        _ => return Err(ValidationError::VideoFieldsRequired),
    };
    if !video.content_type.starts_with("video/") {
        return Err(ValidationError::InvalidVideoType);
    }
    if video.len() > MAX_VIDEO_BYTES {
        return Err(ValidationError::VideoTooLarge);
    }
    if let Some(thumbnail) = thumbnail
        && !thumbnail.content_type.starts_with("image/")
    {
        return Err(ValidationError::InvalidThumbnailType);
    }
    Ok(())
}

/// Memories are narrated in the member's cloned voice, which must be ready
pub fn validate_voice_ready(member: &FamilyMember) -> std::result::Result<(), ValidationError> {
    if member.voice_sample_url.as_deref().is_none_or(str::is_empty) {
        return Err(ValidationError::VoiceNotUploaded);
    }
    if !member.voice_ready() {
        return Err(ValidationError::VoiceNotReady);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VoiceCloneStatus;

    fn family_form() -> FamilyRegistrationForm {
        FamilyRegistrationForm {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            relationship: "Daughter".to_string(),
            voice_sample: Some("alice.wav".to_string()),
        }
    }

    #[test]
    fn test_validate_query() {
        assert_eq!(validate_query("  Who is Bob? ").unwrap(), "Who is Bob?");
        assert!(matches!(validate_query(" \t\n"), Err(RememberMeError::EmptyQuery)));
    }

    #[test]
    fn test_family_registration() {
        assert_eq!(family_form().validate(), Ok(()));

        let mut form = family_form();
        form.name = "  ".to_string();
        assert_eq!(form.validate(), Err(ValidationError::NameRequired));

        let mut form = family_form();
        form.email = "alice@example".to_string();
        assert_eq!(form.validate(), Err(ValidationError::InvalidEmailFormat));

        let mut form = family_form();
        form.password = "abc".to_string();
        assert_eq!(form.validate(), Err(ValidationError::PasswordTooShort));

        let mut form = family_form();
        form.confirm_password = "secret2".to_string();
        assert_eq!(form.validate(), Err(ValidationError::PasswordMismatch));

        let mut form = family_form();
        form.relationship.clear();
        assert_eq!(form.validate(), Err(ValidationError::RelationshipRequired));
    }

    #[test]
    fn test_voice_sample() {
        let mut form = family_form();
        form.voice_sample = None;
        assert_eq!(form.validate(), Err(ValidationError::VoiceSampleRequired));

        form.voice_sample = Some("alice.mp3".to_string());
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "Only WAV format is supported");
    }

    #[test]
    fn test_patient_registration() {
        let form = PatientRegistrationForm {
            name: "Margaret".to_string(),
            email: "margaret@example.com".to_string(),
            password: "secret1".to_string(),
            confirm_password: "secret1".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1940, 3, 14),
        };
        assert_eq!(form.validate(), Ok(()));

        let missing_dob = PatientRegistrationForm {
            date_of_birth: None,
            ..form.clone()
        };
        assert_eq!(missing_dob.validate(), Err(ValidationError::DateOfBirthRequired));

        let bad_email = PatientRegistrationForm {
            email: "margaret".to_string(),
            ..form
        };
        assert_eq!(bad_email.validate(), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn test_login() {
        assert_eq!(validate_login("a@b.co", "pw"), Ok(()));
        assert_eq!(
            validate_login("", "pw"),
            Err(ValidationError::CredentialsRequired)
        );
    }

    #[test]
    fn test_memory_form() {
        assert_eq!(validate_memory("Beach", "Sunny day", 5), Ok(()));
        assert_eq!(
            validate_memory("Beach", "  ", 0),
            Err(ValidationError::MemoryFieldsRequired)
        );
        assert_eq!(
            validate_memory("Beach", "Sunny day", 6),
            Err(ValidationError::TooManyPhotos)
        );
    }

    #[test]
    fn test_video_form() {
        let video = UploadFile::new("party.mp4", "video/mp4", vec![0; 16]);
        let thumb = UploadFile::new("party.png", "image/png", vec![0; 4]);
        let text = UploadFile::new("notes.txt", "text/plain", vec![0; 4]);

        assert_eq!(validate_video("Party", Some(&video), Some(&thumb)), Ok(()));
        assert_eq!(
            validate_video("", Some(&video), None),
            Err(ValidationError::VideoFieldsRequired)
        );
        assert_eq!(
            validate_video("Party", None, None),
            Err(ValidationError::VideoFieldsRequired)
        );
        assert_eq!(
            validate_video("Party", Some(&text), None),
            Err(ValidationError::InvalidVideoType)
        );
        assert_eq!(
            validate_video("Party", Some(&video), Some(&text)),
            Err(ValidationError::InvalidThumbnailType)
        );

        let huge = UploadFile::new("huge.mp4", "video/mp4", vec![0; MAX_VIDEO_BYTES + 1]);
        assert_eq!(
            validate_video("Party", Some(&huge), None).unwrap_err().to_string(),
            "Video file is too large. Maximum size is 100MB."
        );
    }

    #[test]
    fn test_voice_ready() {
        let mut member: FamilyMember = serde_json::from_value(serde_json::json!({
            "id": "fm-1", "name": "Alice", "relationship": "Daughter"
        }))
        .unwrap();
        assert_eq!(validate_voice_ready(&member), Err(ValidationError::VoiceNotUploaded));

        member.voice_sample_url = Some("https://cdn.test/voice.wav".to_string());
        member.voice_clone_status = VoiceCloneStatus::Processing;
        assert_eq!(validate_voice_ready(&member), Err(ValidationError::VoiceNotReady));

        member.voice_clone_status = VoiceCloneStatus::Ready;
        assert_eq!(validate_voice_ready(&member), Ok(()));
    }

    #[test]
    fn test_validation_error_converts() {
        let err: RememberMeError = ValidationError::TooManyPhotos.into();
        assert_eq!(err.to_string(), "Maximum 5 photos allowed");
    }
}
