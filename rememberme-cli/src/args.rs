//! Command argument structures
//!
//! This module contains all CLI argument structs organized by command category.

use std::path::PathBuf;

use clap::Args;

// Question arguments
#[derive(Args)]
pub struct AskArgs {
    /// The question, e.g. "Who is my daughter?"
    pub question: Vec<String>,

    /// Answer from the family roster only, without the conversational backend
    #[arg(long, short)]
    pub local: bool,

    /// Dictate the question: treat this text as what was said
    #[arg(long, conflicts_with = "question")]
    pub say: Option<String>,
}

#[derive(Args)]
pub struct ChatArgs {
    /// Answer from the family roster only, without the conversational backend
    #[arg(long, short)]
    pub local: bool,
}

#[derive(Args)]
pub struct IdentifyArgs {
    /// Photo of the person to recognize
    pub image: PathBuf,
}

#[derive(Args)]
pub struct LoginArgs {
    /// Account email
    #[arg(long, short)]
    pub email: String,

    /// Account password (read from stdin when omitted)
    #[arg(long, short)]
    pub password: Option<String>,
}

// Family member command arguments
#[derive(Args)]
pub struct ShowFamilyMemberArgs {
    /// Family member ID, ID prefix or name
    pub member: String,
}

#[derive(Args)]
pub struct RegisterFamilyMemberArgs {
    /// Full name
    #[arg(long, short)]
    pub name: String,

    /// Email used to sign in
    #[arg(long, short)]
    pub email: String,

    /// Password (at least 6 characters)
    #[arg(long, short)]
    pub password: String,

    /// Password confirmation (defaults to --password)
    #[arg(long)]
    pub confirm_password: Option<String>,

    /// Relationship to the patient (Daughter, Son, Wife, Husband, Granddaughter, ...)
    #[arg(long, short)]
    pub relationship: String,

    /// Voice sample in WAV format
    #[arg(long)]
    pub voice: PathBuf,

    /// Profile photo
    #[arg(long)]
    pub photo: Option<PathBuf>,
}

#[derive(Args)]
pub struct UploadVoiceArgs {
    /// Family member ID, ID prefix or name
    pub member: String,

    /// Voice sample in WAV format
    #[arg(long)]
    pub voice: PathBuf,
}

#[derive(Args)]
pub struct UpdateFamilyMemberArgs {
    /// Family member ID, ID prefix or name
    pub member: String,

    /// New display name
    #[arg(long, short)]
    pub name: Option<String>,

    /// New relationship
    #[arg(long, short)]
    pub relationship: Option<String>,

    /// New profile photo
    #[arg(long)]
    pub photo: Option<PathBuf>,
}

#[derive(Args)]
pub struct DeleteFamilyMemberArgs {
    /// Family member ID, ID prefix or name
    pub member: String,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

// Memory command arguments
#[derive(Args)]
pub struct ListMemoriesArgs {
    /// Family member whose memories to list (defaults to the signed-in member)
    #[arg(long, short)]
    pub member: Option<String>,
}

#[derive(Args)]
pub struct GetMemoryArgs {
    /// Memory ID or ID prefix
    pub id: String,
}

#[derive(Args)]
pub struct AddMemoryArgs {
    /// Memory title
    #[arg(long, short)]
    pub title: String,

    /// The story, narrated in your cloned voice
    #[arg(long, short)]
    pub content: String,

    /// Photos to attach (up to 5)
    #[arg(long = "photo", short = 'p')]
    pub photos: Vec<PathBuf>,
}

#[derive(Args)]
pub struct EditMemoryArgs {
    /// Memory ID or ID prefix
    pub id: String,

    /// New title (keeps the current one when omitted)
    #[arg(long, short)]
    pub title: Option<String>,

    /// New content (keeps the current one when omitted)
    #[arg(long, short)]
    pub content: Option<String>,
}

#[derive(Args)]
pub struct DeleteMemoryArgs {
    /// Memory ID or ID prefix
    pub id: String,
}

#[derive(Args)]
pub struct RecentMemoriesArgs {
    /// Maximum number of memories
    #[arg(short, long, default_value_t = rememberme::assistant::RECENT_MEMORY_LIMIT)]
    pub limit: usize,
}

// Video command arguments
#[derive(Args)]
pub struct UploadVideoArgs {
    /// Video title
    #[arg(long, short)]
    pub title: String,

    /// Short description
    #[arg(long, short, default_value = "")]
    pub description: String,

    /// Video file (up to 100MB)
    #[arg(long)]
    pub video: PathBuf,

    /// Thumbnail image
    #[arg(long)]
    pub thumbnail: Option<PathBuf>,
}

#[derive(Args)]
pub struct DeleteVideoArgs {
    /// Video ID
    pub id: String,
}

// Patient command arguments
#[derive(Args)]
pub struct RegisterPatientArgs {
    /// Full name
    #[arg(long, short)]
    pub name: String,

    /// Email used to sign in
    #[arg(long, short)]
    pub email: String,

    /// Password (at least 6 characters)
    #[arg(long, short)]
    pub password: String,

    /// Password confirmation (defaults to --password)
    #[arg(long)]
    pub confirm_password: Option<String>,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long)]
    pub date_of_birth: Option<String>,

    /// Home address
    #[arg(long)]
    pub address: Option<String>,

    /// Photo of the home
    #[arg(long)]
    pub home_photo: Option<PathBuf>,

    /// Emergency contact as "Name:Relationship:Phone" (repeatable)
    #[arg(long = "contact")]
    pub contacts: Vec<String>,

    /// Doctor's name
    #[arg(long)]
    pub doctor: Option<String>,

    /// Doctor's phone number
    #[arg(long)]
    pub doctor_phone: Option<String>,
}

// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Show secrets such as the anon key instead of masking them
    #[arg(long)]
    pub show_secrets: bool,
}

// Completions command arguments
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
