use std::io::BufRead;

use chrono::NaiveDate;
use rememberme::RememberMeError;
use rememberme::models::{EmergencyContact, FamilyMember, Memory};

use crate::context::RememberMeCliContext;

pub fn parse_date(date_str: &str) -> rememberme::Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|_| {
        RememberMeError::Other(format!(
            "Invalid date '{}': expected YYYY-MM-DD",
            date_str
        ))
    })
}

/// Parse "Name:Relationship:Phone"; the relationship may be left empty
pub fn parse_contact(contact_str: &str) -> rememberme::Result<EmergencyContact> {
    let parts: Vec<&str> = contact_str.split(':').map(str::trim).collect();
    match parts.as_slice() {
        [name, relationship, phone] => Ok(EmergencyContact {
            name: name.to_string(),
            relationship: relationship.to_string(),
            phone: phone.to_string(),
        }),
        [name, phone] => Ok(EmergencyContact {
            name: name.to_string(),
            relationship: String::new(),
            phone: phone.to_string(),
        }),
        _ => Err(RememberMeError::Other(format!(
            "Invalid contact '{}': expected Name:Relationship:Phone",
            contact_str
        ))),
    }
}

/// Hide all but the first few characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

/// Read one non-empty line from stdin
pub fn read_stdin_line() -> rememberme::Result<Option<String>> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| RememberMeError::Other(format!("Failed to read stdin: {}", e)))?;
    let line = line.trim();
    Ok((!line.is_empty()).then(|| line.to_string()))
}

fn ambiguous<T>(
    what: &str,
    key: &str,
    matches: &[T],
    describe: impl Fn(&T) -> String,
) -> RememberMeError {
    let suggestions: Vec<String> = matches
        .iter()
        .take(5)
        .map(|m| format!("  - {}", describe(m)))
        .collect();
    RememberMeError::Other(format!(
        "Ambiguous {} '{}': {} matches found.\nSuggestions:\n{}",
        what,
        key,
        matches.len(),
        suggestions.join("\n")
    ))
}

/// Find a roster entry by exact ID, ID prefix or case-insensitive name
pub fn find_family_member<'r>(
    roster: &'r [FamilyMember],
    key: &str,
) -> rememberme::Result<&'r FamilyMember> {
    if let Some(member) = roster.iter().find(|m| m.id == key) {
        return Ok(member);
    }

    let by_prefix: Vec<&FamilyMember> = roster.iter().filter(|m| m.id.starts_with(key)).collect();
    let matches: Vec<&FamilyMember> = if by_prefix.is_empty() {
        roster
            .iter()
            .filter(|m| m.name.eq_ignore_ascii_case(key.trim()))
            .collect()
    } else {
        by_prefix
    };

    match matches.as_slice() {
        [] => Err(RememberMeError::NotFound {
            what: "Family member".to_string(),
            id: key.to_string(),
        }),
        [member] => Ok(*member),
        _ => Err(ambiguous("family member", key, &matches, |m| {
            format!("{} ({}, {})", m.id, m.name, m.relationship)
        })),
    }
}

/// Resolve a family member of the current patient
pub async fn resolve_family_member(
    ctx: &RememberMeCliContext,
    key: &str,
) -> rememberme::Result<FamilyMember> {
    let roster = ctx.assistant()?.roster().await?;
    find_family_member(&roster, key).cloned()
}

/// Find a memory by exact ID or ID prefix
pub fn find_memory<'m>(memories: &'m [Memory], key: &str) -> rememberme::Result<&'m Memory> {
    if let Some(memory) = memories.iter().find(|m| m.id == key) {
        return Ok(memory);
    }

    let matches: Vec<&Memory> = memories.iter().filter(|m| m.id.starts_with(key)).collect();
    match matches.as_slice() {
        [] => Err(RememberMeError::NotFound {
            what: "Memory".to_string(),
            id: key.to_string(),
        }),
        [memory] => Ok(*memory),
        _ => Err(ambiguous("memory ID prefix", key, &matches, |m| {
            format!("{} ({})", m.id, m.preview(50))
        })),
    }
}

/// Resolve a memory ID visible to the current session
///
/// Family members see their own memories; patients see the whole family's.
pub async fn resolve_memory_id(ctx: &RememberMeCliContext, key: &str) -> rememberme::Result<String> {
    if ctx.store.get_memory(key).await?.is_some() {
        return Ok(key.to_string());
    }

    let assistant = ctx.assistant()?;
    let owners: Vec<String> = match assistant.session().family_member_id() {
        Some(id) => vec![id.to_string()],
        None => assistant.roster().await?.into_iter().map(|m| m.id).collect(),
    };

    let mut memories = Vec::new();
    for owner in &owners {
        memories.extend(ctx.store.list_memories(owner).await?);
    }

    find_memory(&memories, key).map(|m| m.id.clone())
}
