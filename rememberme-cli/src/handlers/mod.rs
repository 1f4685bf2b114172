//! Command handlers for the RememberMe CLI

pub mod ask;
pub mod family;
pub mod memory;
pub mod patient;
pub mod system;
pub mod video;

pub use ask::{handle_ask_command, handle_chat_command, handle_identify_command, run_chat};
pub use family::handle_family_command;
pub use memory::handle_memory_command;
pub use patient::{handle_dashboard_command, handle_patient_command};
pub use system::{handle_config_command, handle_diagnose_command, handle_login_command};
pub use video::handle_video_command;
