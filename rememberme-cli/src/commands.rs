//! Command enum definitions
//!
//! This module contains all CLI command enums that define the command structure.

use crate::args::*;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Display version information
    Version,

    /// Check the data service and the backend API
    Diagnose,

    /// Ask who someone is
    #[command(
        alias = "who",
        long_about = r#"
Ask a question about the family. By default the question goes to the
conversational backend, which can also answer counts ("How many grandchildren
do I have?") and small talk. With --local the answer comes from the family
roster alone: relationship words ("daughter", "grandchild", "mom") are matched
first, then names.

When no question is given, one line is read from stdin as dictation.

EXAMPLES:
  rememberme --patient p-1 ask "Who is my daughter?"
  rememberme --patient p-1 ask --local "Tell me about Bob"
  rememberme --patient p-1 ask --say "who is my grandson"
  echo "who is my son" | rememberme --patient p-1 ask --local
"#
    )]
    Ask(AskArgs),

    /// Talk with the assistant, one question per line
    #[command(long_about = r#"
Start a conversation with the assistant. Each line you type is a question.

COMMANDS INSIDE THE CHAT:
  /photo <path>   Ask who is in a photo
  /history        Show the conversation so far
  /clear          Start over
  /quit           Leave the chat
"#)]
    Chat(ChatArgs),

    /// Recognize a family member in a photo
    Identify(IdentifyArgs),

    /// Sign in and print the session to use with later commands
    Login(LoginArgs),

    /// Family member commands
    #[command(subcommand)]
    Family(FamilyCommands),

    /// Memory commands
    #[command(subcommand)]
    Memory(MemoryCommands),

    /// Family video commands
    #[command(subcommand)]
    Video(VideoCommands),

    /// Patient commands
    #[command(subcommand)]
    Patient(PatientCommands),

    /// Show the home screen for the current session
    Dashboard,

    /// Show the effective configuration
    Config(ConfigArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Subcommand)]
pub enum FamilyCommands {
    /// List the patient's family members
    #[command(alias = "ls")]
    List,

    /// Show a family member and their memories
    #[command(alias = "get")]
    Show(ShowFamilyMemberArgs),

    /// Register a new family member for the patient
    #[command(long_about = r#"
Create an account for a family member, register them with the backend and
upload their voice sample. Memories they share are narrated in a clone of this
voice once processing completes.

EXAMPLES:
  rememberme --patient p-1 family register \
    --name Alice --email alice@example.com --password secret1 \
    --relationship Daughter --voice alice.wav --photo alice.jpg
"#)]
    Register(RegisterFamilyMemberArgs),

    /// Upload a new voice sample for a family member
    UploadVoice(UploadVoiceArgs),

    /// Change a family member's name, relationship or photo
    Update(UpdateFamilyMemberArgs),

    /// Remove a family member and their memories
    #[command(alias = "rm")]
    Delete(DeleteFamilyMemberArgs),
}

#[derive(Subcommand)]
pub enum MemoryCommands {
    /// List a family member's memories
    #[command(alias = "ls")]
    List(ListMemoriesArgs),

    /// Show a memory
    #[command(alias = "get")]
    Show(GetMemoryArgs),

    /// Share a new memory, narrated in your voice
    #[command(
        alias = "share",
        long_about = r#"
Share a memory with the patient. The backend narrates the content in your
cloned voice, so your voice sample must have finished processing first.

EXAMPLES:
  rememberme --family-member fm-1 memory add \
    --title "Beach day" --content "We built a sandcastle." --photo beach.jpg
"#
    )]
    Add(AddMemoryArgs),

    /// Edit one of your memories
    Edit(EditMemoryArgs),

    /// Delete one of your memories
    #[command(alias = "rm")]
    Delete(DeleteMemoryArgs),

    /// Most recent memories across the family
    Recent(RecentMemoriesArgs),
}

#[derive(Subcommand)]
pub enum VideoCommands {
    /// List the patient's family videos, newest first
    #[command(alias = "ls")]
    List,

    /// Upload a video message
    Upload(UploadVideoArgs),

    /// Delete a video
    #[command(alias = "rm")]
    Delete(DeleteVideoArgs),
}

#[derive(Subcommand)]
pub enum PatientCommands {
    /// Create a patient account with home and medical details
    Register(RegisterPatientArgs),

    /// Show the patient's details
    Show,
}
