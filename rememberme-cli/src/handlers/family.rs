//! Family member command handlers

use std::io::Write;

use chrono::Utc;
use colored::Colorize;
use is_terminal::IsTerminal;
use rememberme::RememberMeError;
use rememberme::api::UploadFile;
use rememberme::assistant::MemberOverview;
use rememberme::validation::{self, FamilyRegistrationForm, ValidationError};
use serde_json::json;

use crate::commands::FamilyCommands;
use crate::context::RememberMeCliContext;
use crate::output::*;
use crate::utils::{read_stdin_line, resolve_family_member};

fn file_name(path: &std::path::Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn confirm(prompt: &str) -> rememberme::Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout()
        .flush()
        .map_err(|e| RememberMeError::Other(e.to_string()))?;
    Ok(read_stdin_line()?.is_some_and(|answer| answer.eq_ignore_ascii_case("y")))
}

pub async fn handle_family_command(
    cmd: FamilyCommands,
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<()> {
    match cmd {
        FamilyCommands::List => {
            let assistant = ctx.assistant()?;
            let roster = assistant.roster().await?;
            let counts = ctx
                .store
                .count_memories_by_member(assistant.session().patient_id())
                .await?;

            let family: Vec<MemberOverview> = roster
                .into_iter()
                .map(|member| MemberOverview {
                    memory_count: counts.get(&member.id).copied().unwrap_or(0),
                    member,
                })
                .collect();

            if output_format == "json" {
                print_json(&family);
            } else {
                print_family_list(&family);
            }
        }

        FamilyCommands::Show(args) => {
            let member = resolve_family_member(ctx, &args.member).await?;
            let memories = ctx.store.list_memories(&member.id).await?;

            if output_format == "json" {
                print_json(&json!({ "member": member, "memories": memories }));
            } else {
                print_family_member(&member);
                println!();
                print_memory_list(&memories);
            }
        }

        FamilyCommands::Register(args) => {
            let patient_id = ctx.patient_id()?.to_string();
            let form = FamilyRegistrationForm {
                name: args.name,
                email: args.email,
                confirm_password: args
                    .confirm_password
                    .unwrap_or_else(|| args.password.clone()),
                password: args.password,
                relationship: args.relationship,
                voice_sample: file_name(&args.voice),
            };
            form.validate()?;

            let voice = UploadFile::from_path(&args.voice).await?;
            let photo = match &args.photo {
                Some(path) => Some(UploadFile::from_path(path).await?),
                None => None,
            };

            let pb = spinner("Registering and uploading the voice sample...", output_format);
            let result = ctx
                .registrar()
                .register_family_member(&patient_id, &form, voice, photo)
                .await;
            finish_spinner(pb);
            let outcome = result?;

            if output_format == "json" {
                print_json(&json!({
                    "user_id": outcome.user_id,
                    "family_member_id": outcome.family_member_id,
                    "profile_photo_url": outcome.profile_photo_url,
                    "voice_sample_url": outcome.voice_sample_url,
                }));
            } else {
                println!(
                    "{}",
                    format_success(&format!(
                        "Registered {} with ID: {}",
                        form.name.trim(),
                        outcome.family_member_id.color(CliColors::accent()).bold()
                    ))
                );
                println!(
                    "{}",
                    format_info("The voice sample is being processed; memories can be shared once it is ready")
                );
            }
        }

        FamilyCommands::UploadVoice(args) => {
            let member = resolve_family_member(ctx, &args.member).await?;
            validation::validate_voice_sample(file_name(&args.voice).as_deref())?;
            let voice = UploadFile::from_path(&args.voice).await?;

            let owner = member.user_id.as_deref().unwrap_or(&member.id);
            let path = format!("{}-{}.wav", owner, Utc::now().timestamp_millis());

            let pb = spinner("Uploading the voice sample...", output_format);
            let result: rememberme::Result<_> = async move {
                let url = ctx
                    .store
                    .upload_file(
                        &ctx.config.data.buckets.voice_samples,
                        &path,
                        voice.bytes,
                        &voice.content_type,
                    )
                    .await?;
                ctx.backend.upload_voice(&member.id, &url).await
            }
            .await;
            finish_spinner(pb);
            let uploaded = result?;

            if output_format == "json" {
                print_json(&uploaded);
            } else {
                println!("{}", format_success(&uploaded.message));
            }
        }

        FamilyCommands::Update(args) => {
            let mut member = resolve_family_member(ctx, &args.member).await?;
            if args.name.is_none() && args.relationship.is_none() && args.photo.is_none() {
                return Err(RememberMeError::Other(
                    "Nothing to update. Pass --name, --relationship or --photo".to_string(),
                ));
            }

            if let Some(name) = args.name {
                if name.trim().is_empty() {
                    return Err(ValidationError::NameRequired.into());
                }
                member.name = name.trim().to_string();
            }
            if let Some(relationship) = args.relationship {
                if relationship.trim().is_empty() {
                    return Err(ValidationError::RelationshipRequired.into());
                }
                member.relationship = relationship.trim().to_string();
            }
            if let Some(path) = &args.photo {
                let photo = UploadFile::from_path(path).await?;
                let owner = member.user_id.as_deref().unwrap_or(&member.id);
                let object = format!(
                    "{}-{}-{}",
                    owner,
                    Utc::now().timestamp_millis(),
                    photo.file_name
                );
                member.profile_photo_url = Some(
                    ctx.store
                        .upload_file(
                            &ctx.config.data.buckets.profiles,
                            &object,
                            photo.bytes,
                            &photo.content_type,
                        )
                        .await?,
                );
            }

            let updated = ctx.store.update_family_member(member).await?;
            if output_format == "json" {
                print_json(&updated);
            } else {
                println!("{}", format_success("Family member updated"));
                print_family_member(&updated);
            }
        }

        FamilyCommands::Delete(args) => {
            let member = resolve_family_member(ctx, &args.member).await?;

            if !args.yes
                && output_format != "json"
                && std::io::stdin().is_terminal()
                && !confirm(&format!(
                    "Remove {} and all the memories they shared?",
                    member.name
                ))?
            {
                println!("{}", format_info("Cancelled"));
                return Ok(());
            }

            let deleted = ctx.store.delete_family_member(&member.id).await?;
            if output_format == "json" {
                print_json(&json!({ "deleted": deleted, "family_member_id": member.id }));
            } else if deleted {
                println!(
                    "{}",
                    format_success(&format!("Removed {}", member.name))
                );
            } else {
                println!(
                    "{}",
                    format_warning(&format!("{} was already removed", member.name))
                );
            }
        }
    }

    Ok(())
}
