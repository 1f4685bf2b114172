//! Memory command handlers

use colored::Colorize;
use rememberme::RememberMeError;
use rememberme::api::UploadFile;
use serde_json::json;

use crate::commands::MemoryCommands;
use crate::context::RememberMeCliContext;
use crate::output::*;
use crate::utils::*;

pub async fn handle_memory_command(
    cmd: MemoryCommands,
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<()> {
    match cmd {
        MemoryCommands::List(args) => {
            let member_id = match &args.member {
                Some(key) => resolve_family_member(ctx, key).await?.id,
                None => ctx
                    .assistant()?
                    .session()
                    .family_member_id()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        RememberMeError::Other(
                            "Pass --member to choose whose memories to list".to_string(),
                        )
                    })?,
            };

            let memories = ctx.store.list_memories(&member_id).await?;
            if output_format == "json" {
                print_json(&memories);
            } else {
                print_memory_list(&memories);
            }
        }

        MemoryCommands::Show(args) => {
            let id = resolve_memory_id(ctx, &args.id).await?;
            let memory = ctx
                .store
                .get_memory(&id)
                .await?
                .ok_or_else(|| RememberMeError::NotFound {
                    what: "Memory".to_string(),
                    id: id.clone(),
                })?;

            if output_format == "json" {
                print_json(&memory);
            } else {
                print_memory(&memory);
            }
        }

        MemoryCommands::Add(args) => {
            let assistant = ctx.assistant()?;
            let mut photos = Vec::with_capacity(args.photos.len());
            for path in &args.photos {
                photos.push(UploadFile::from_path(path).await?);
            }

            let pb = spinner("Sharing the memory and generating narration...", output_format);
            let result = assistant
                .create_memory(&args.title, &args.content, photos)
                .await;
            finish_spinner(pb);
            let created = result?;

            if output_format == "json" {
                print_json(&created);
            } else {
                println!(
                    "{}",
                    format_success(&format!(
                        "Memory created with ID: {}",
                        created.memory_id.color(CliColors::accent()).bold()
                    ))
                );
                if !created.message.is_empty() {
                    println!("{}", format_info(&created.message));
                }
            }
        }

        MemoryCommands::Edit(args) => {
            if args.title.is_none() && args.content.is_none() {
                return Err(RememberMeError::Other(
                    "Nothing to update. Pass --title or --content".to_string(),
                ));
            }

            let id = resolve_memory_id(ctx, &args.id).await?;
            let current = ctx
                .store
                .get_memory(&id)
                .await?
                .ok_or_else(|| RememberMeError::NotFound {
                    what: "Memory".to_string(),
                    id: id.clone(),
                })?;

            let title = args.title.unwrap_or(current.title);
            let content = args.content.unwrap_or(current.content);
            let updated = ctx.assistant()?.edit_memory(&id, &title, &content).await?;

            if output_format == "json" {
                print_json(&updated);
            } else {
                println!("{}", format_success("Memory updated"));
                print_memory(&updated);
            }
        }

        MemoryCommands::Delete(args) => {
            let id = resolve_memory_id(ctx, &args.id).await?;
            ctx.assistant()?.delete_memory(&id).await?;

            if output_format == "json" {
                print_json(&json!({ "deleted": true, "memory_id": id }));
            } else {
                println!(
                    "{}",
                    format_success(&format!("Memory {} deleted", id.color(CliColors::accent())))
                );
            }
        }

        MemoryCommands::Recent(args) => {
            let recent = ctx
                .store
                .recent_memories(ctx.patient_id()?, args.limit)
                .await?;

            if output_format == "json" {
                print_json(&recent);
            } else {
                print_recent_memories(&recent);
            }
        }
    }

    Ok(())
}
