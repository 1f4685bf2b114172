use std::time::Duration;

use chrono::{DateTime, Utc};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use rememberme::RememberMeError;
use rememberme::api::{Confidence, PhotoIdentification, QueryAnswer, QueryResponse};
use rememberme::assistant::{
    ChatMessage, FamilyDashboard, LocalAnswer, MemberOverview, PatientDashboard, Speaker,
};
use rememberme::models::{
    FamilyMember, FamilyVideo, Memory, Patient, PatientInfo, RecentMemory, VoiceCloneStatus,
};
use serde::Serialize;
use serde_json::json;

pub struct CliColors;

impl CliColors {
    pub fn success() -> Color {
        Color::TrueColor {
            r: 34,
            g: 197,
            b: 94,
        }
    }

    pub fn error() -> Color {
        Color::TrueColor {
            r: 239,
            g: 68,
            b: 68,
        }
    }

    pub fn warning() -> Color {
        Color::TrueColor {
            r: 245,
            g: 158,
            b: 11,
        }
    }

    pub fn info() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }

    pub fn relationship() -> Color {
        Color::TrueColor {
            r: 168,
            g: 85,
            b: 247,
        }
    }

    pub fn memory() -> Color {
        Color::TrueColor {
            r: 34,
            g: 197,
            b: 94,
        }
    }

    pub fn muted() -> Color {
        Color::TrueColor {
            r: 148,
            g: 163,
            b: 184,
        }
    }

    pub fn primary() -> Color {
        Color::White
    }

    pub fn accent() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn output_error(error_msg: &str, output_format: &str) {
    if output_format == "json" {
        let error_response = json!({
            "error": true,
            "message": error_msg,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        print_json(&error_response);
    } else {
        eprintln!("{}", format_error(error_msg));
    }
}

/// Stable error code for tooling
pub fn error_code(error: &RememberMeError) -> &'static str {
    match error {
        RememberMeError::Storage(_) => "STORAGE_ERROR",
        RememberMeError::Api { .. } => "API_ERROR",
        RememberMeError::Connection(_) => "CONNECTION_ERROR",
        RememberMeError::Timeout(_) => "TIMEOUT_ERROR",
        RememberMeError::Protocol(_) => "PROTOCOL_ERROR",
        RememberMeError::Authentication(_) => "AUTHENTICATION_ERROR",
        RememberMeError::Validation(_) => "VALIDATION_ERROR",
        RememberMeError::EmptyQuery => "EMPTY_QUERY",
        RememberMeError::NotFound { .. } => "NOT_FOUND",
        RememberMeError::SpeechUnavailable => "SPEECH_UNAVAILABLE",
        RememberMeError::Speech(_) => "SPEECH_ERROR",
        RememberMeError::Configuration(_) => "CONFIGURATION_ERROR",
        RememberMeError::Logging(_) => "LOGGING_ERROR",
        RememberMeError::Other(_) => "OTHER_ERROR",
    }
}

/// Output a RememberMeError in structured JSON format
pub fn output_error_json(error: &RememberMeError, output_format: &str) {
    if output_format == "json" {
        let mut error_response = json!({
            "error": true,
            "code": error_code(error),
            "message": error.to_string(),
            "retryable": error.is_retryable(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        match error {
            RememberMeError::Api { status, .. } => {
                error_response["details"] = json!({ "status": status });
            }
            RememberMeError::NotFound { what, id } => {
                error_response["details"] = json!({ "what": what, "id": id });
            }
            _ if error.requires_login() => {
                error_response["details"] = json!({
                    "hint": "Run 'rememberme login --email <email>' and pass the printed session flags"
                });
            }
            _ => {}
        }

        eprintln!(
            "{}",
            serde_json::to_string_pretty(&error_response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        eprintln!("{}", format_error(&error.to_string()));
        if error.requires_login() {
            eprintln!(
                "{}",
                format_info("Sign in with 'rememberme login --email <email>'")
            );
        } else if error.is_retryable() {
            eprintln!("{}", format_info("This may be temporary; please try again"));
        }
    }
}

pub fn format_success(msg: &str) -> String {
    format!(
        "{} {}",
        "✓".color(CliColors::success()).bold(),
        msg.color(CliColors::success())
    )
}

pub fn format_error(msg: &str) -> String {
    format!(
        "{} {}",
        "✗".color(CliColors::error()).bold(),
        msg.color(CliColors::error())
    )
}

pub fn format_warning(msg: &str) -> String {
    format!(
        "{} {}",
        "⚠".color(CliColors::warning()).bold(),
        msg.color(CliColors::warning())
    )
}

pub fn format_info(msg: &str) -> String {
    format!(
        "{} {}",
        "ℹ".color(CliColors::info()).bold(),
        msg.color(CliColors::info())
    )
}

pub fn format_voice_status(status: &VoiceCloneStatus) -> ColoredString {
    match status {
        VoiceCloneStatus::Ready => "ready".color(CliColors::success()),
        VoiceCloneStatus::Processing => "processing".color(CliColors::warning()),
        VoiceCloneStatus::Pending => "pending".color(CliColors::muted()),
        VoiceCloneStatus::Failed => "failed".color(CliColors::error()).bold(),
    }
}

pub fn format_confidence(confidence: &Confidence) -> ColoredString {
    match confidence {
        Confidence::High => "high".color(CliColors::success()).bold(),
        Confidence::Medium => "medium".color(CliColors::warning()),
        Confidence::Low => "low".color(CliColors::warning()).dimmed(),
        Confidence::None => "none".color(CliColors::muted()),
    }
}

fn format_date(at: Option<&DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Spinner shown while waiting on the network, only on an interactive table output
pub fn spinner(message: &str, output_format: &str) -> Option<ProgressBar> {
    if output_format == "json" || !std::io::stderr().is_terminal() {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

pub fn finish_spinner(pb: Option<ProgressBar>) {
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
}

pub fn print_family_member(member: &FamilyMember) {
    println!(
        "{} {}",
        member.name.color(CliColors::primary()).bold(),
        format!("({})", member.relationship).color(CliColors::relationship())
    );
    println!(
        "  {}: {}",
        "ID".color(CliColors::muted()),
        member.id.color(CliColors::accent())
    );
    if let Some(email) = &member.email {
        println!("  {}: {}", "Email".color(CliColors::muted()), email);
    }
    println!(
        "  {}: {}",
        "Voice".color(CliColors::muted()),
        format_voice_status(&member.voice_clone_status)
    );
    if let Some(photo) = &member.profile_photo_url {
        println!(
            "  {}: {}",
            "Photo".color(CliColors::muted()),
            photo.color(CliColors::muted())
        );
    }
    println!(
        "  {}: {}",
        "Joined".color(CliColors::muted()),
        format_date(member.created_at.as_ref())
    );
}

pub fn print_family_list(family: &[MemberOverview]) {
    if family.is_empty() {
        println!("{}", format_info("No family members registered yet."));
        return;
    }

    println!(
        "{}",
        format!(
            "{:<38} {:<20} {:<15} {:<11} {}",
            "ID", "NAME", "RELATIONSHIP", "VOICE", "MEMORIES"
        )
        .color(CliColors::muted())
        .bold()
    );
    for overview in family {
        let member = &overview.member;
        println!(
            "{:<38} {:<20} {:<15} {:<11} {}",
            member.id.color(CliColors::accent()),
            member.name.color(CliColors::primary()),
            member.relationship.color(CliColors::relationship()),
            format_voice_status(&member.voice_clone_status),
            overview.memory_count
        );
    }
}

pub fn print_memory(memory: &Memory) {
    println!(
        "{} {}",
        "●".color(CliColors::memory()),
        memory.title.color(CliColors::primary()).bold()
    );
    println!("  {}", memory.content);
    println!(
        "  {}: {}  {}: {}",
        "ID".color(CliColors::muted()),
        memory.id.color(CliColors::accent()),
        "Shared".color(CliColors::muted()),
        format_date(memory.created_at.as_ref())
    );
    match &memory.audio_url {
        Some(url) if memory.has_audio() => println!(
            "  {}: {}",
            "Narration".color(CliColors::muted()),
            url.color(CliColors::muted())
        ),
        _ => println!(
            "  {}: {}",
            "Narration".color(CliColors::muted()),
            "not ready".color(CliColors::warning())
        ),
    }
    for photo in &memory.photos {
        println!(
            "  {}: {}",
            "Photo".color(CliColors::muted()),
            photo.photo_url.color(CliColors::muted())
        );
    }
}

pub fn print_memory_list(memories: &[Memory]) {
    if memories.is_empty() {
        println!("{}", format_info("No memories shared yet."));
        return;
    }

    for (i, memory) in memories.iter().enumerate() {
        println!(
            "{}. {} {} {}",
            (i + 1).to_string().color(CliColors::muted()),
            memory.title.color(CliColors::primary()).bold(),
            format!("[{}]", memory.id).color(CliColors::accent()),
            format!(
                "{} photo(s){}",
                memory.photos.len(),
                if memory.has_audio() { ", narrated" } else { "" }
            )
            .color(CliColors::muted())
        );
        println!("   {}", memory.preview(80).color(CliColors::muted()));
    }
}

pub fn print_recent_memories(recent: &[RecentMemory]) {
    if recent.is_empty() {
        println!("{}", format_info("No memories shared yet."));
        return;
    }

    for entry in recent {
        let from = match &entry.family_member.relationship {
            Some(relationship) => format!("{} ({})", entry.family_member.name, relationship),
            None => entry.family_member.name.clone(),
        };
        println!(
            "{} {} {} {}",
            "●".color(CliColors::memory()),
            entry.memory.title.color(CliColors::primary()).bold(),
            "from".color(CliColors::muted()),
            from.color(CliColors::relationship())
        );
        println!("  {}", entry.memory.preview(80).color(CliColors::muted()));
    }
}

pub fn print_video_list(videos: &[FamilyVideo]) {
    if videos.is_empty() {
        println!("{}", format_info("No videos yet."));
        return;
    }

    for video in videos {
        let from = video
            .family_member
            .as_ref()
            .map(|m| m.name.clone())
            .unwrap_or_else(|| video.family_member_id.clone());
        println!(
            "{} {} {} {} {}",
            "▶".color(CliColors::info()),
            video.title.color(CliColors::primary()).bold(),
            format!("[{}]", video.id).color(CliColors::accent()),
            "from".color(CliColors::muted()),
            from.color(CliColors::relationship())
        );
        if let Some(description) = video.description.as_deref().filter(|d| !d.is_empty()) {
            println!("  {}", description);
        }
        println!(
            "  {} {}",
            video.video_url.color(CliColors::muted()),
            format_date(video.created_at.as_ref()).color(CliColors::muted())
        );
    }
}

fn print_memories_section(memories: &[Memory]) {
    if memories.is_empty() {
        return;
    }
    println!();
    println!("{}", "Memories".color(CliColors::muted()).bold());
    print_memory_list(memories);
}

pub fn print_local_answer(answer: &LocalAnswer) {
    match answer {
        LocalAnswer::Found { member, memories } => {
            println!(
                "{}",
                format!("That's {}, your {}.", member.name, member.relationship.to_lowercase())
                    .color(CliColors::primary())
                    .bold()
            );
            println!();
            print_family_member(member);
            print_memories_section(memories);
        }
        LocalAnswer::NotFound { message } => println!("{}", format_warning(message)),
    }
}

pub fn print_query_response(response: &QueryResponse) {
    println!("{}", response.answer.color(CliColors::primary()).bold());

    match &response.kind {
        QueryAnswer::FamilyMember { family_member, .. } => {
            println!();
            print_family_member(family_member);
            print_memories_section(response.memories_to_show());
        }
        QueryAnswer::Count { family_members, .. } | QueryAnswer::ListAll { family_members } => {
            for member in family_members {
                println!(
                    "  {} {} {}",
                    "•".color(CliColors::muted()),
                    member.name.color(CliColors::primary()),
                    format!("({})", member.relationship).color(CliColors::relationship())
                );
            }
        }
        QueryAnswer::Conversation => {}
    }
}

pub fn print_identification(result: &PhotoIdentification) {
    match result {
        PhotoIdentification::Found {
            answer,
            family_member,
            memories,
            confidence,
        } => {
            println!("{}", answer.color(CliColors::primary()).bold());
            println!(
                "  {}: {}",
                "Confidence".color(CliColors::muted()),
                format_confidence(confidence)
            );
            println!();
            print_family_member(family_member);
            print_memories_section(memories);
        }
        PhotoIdentification::Unknown {
            answer, reasoning, ..
        } => {
            println!("{}", format_warning(answer));
            if let Some(reasoning) = reasoning {
                println!("  {}", reasoning.color(CliColors::muted()));
            }
        }
    }
}

pub fn print_chat_message(message: &ChatMessage) {
    match message.speaker {
        Speaker::User => println!(
            "{} {}",
            "you:".color(CliColors::muted()).bold(),
            message.text()
        ),
        Speaker::Assistant if message.is_error() => println!("{}", format_error(message.text())),
        Speaker::Assistant => println!(
            "{} {}",
            "assistant:".color(CliColors::accent()).bold(),
            message.text()
        ),
    }
}

pub fn print_patient(patient: Option<&Patient>, info: Option<&PatientInfo>) {
    match patient {
        Some(patient) => {
            println!("{}", patient.name.color(CliColors::primary()).bold());
            println!(
                "  {}: {}",
                "ID".color(CliColors::muted()),
                patient.id.color(CliColors::accent())
            );
            if let Some(dob) = patient.date_of_birth {
                println!("  {}: {}", "Born".color(CliColors::muted()), dob);
            }
        }
        None => println!("{}", format_warning("Patient profile not found")),
    }

    let Some(info) = info else {
        return;
    };
    if let Some(address) = &info.home_address {
        println!("  {}: {}", "Home".color(CliColors::muted()), address);
    }
    if let Some(doctor) = &info.doctor_name {
        let phone = info.doctor_phone.as_deref().unwrap_or("-");
        println!(
            "  {}: {} ({})",
            "Doctor".color(CliColors::muted()),
            doctor,
            phone
        );
    }
    for contact in info.reachable_contacts() {
        println!(
            "  {}: {} {} {}",
            "Emergency".color(CliColors::muted()),
            contact.name,
            format!("({})", contact.relationship).color(CliColors::relationship()),
            contact.phone.color(CliColors::accent())
        );
    }
}

pub fn print_patient_dashboard(dashboard: &PatientDashboard) {
    print_patient(dashboard.patient.as_ref(), dashboard.info.as_ref());
    println!();
    println!("{}", "Your family".color(CliColors::muted()).bold());
    print_family_list(&dashboard.family);
    println!();
    println!("{}", "Recent memories".color(CliColors::muted()).bold());
    print_recent_memories(&dashboard.recent_memories);
}

pub fn print_family_dashboard(dashboard: &FamilyDashboard) {
    print_family_member(&dashboard.member);
    if !dashboard.voice_ready() {
        println!();
        println!(
            "{}",
            format_warning("Your voice is not ready yet; new memories can be shared once it is")
        );
    }
    println!();
    println!("{}", "Your memories".color(CliColors::muted()).bold());
    print_memory_list(&dashboard.memories);
}
