//! Family video command handlers

use colored::Colorize;
use rememberme::api::UploadFile;

use crate::commands::VideoCommands;
use crate::context::RememberMeCliContext;
use crate::output::*;

pub async fn handle_video_command(
    cmd: VideoCommands,
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<()> {
    let assistant = ctx.assistant()?;

    match cmd {
        VideoCommands::List => {
            let videos = assistant.videos().await?;
            if output_format == "json" {
                print_json(&videos);
            } else {
                print_video_list(&videos);
            }
        }

        VideoCommands::Upload(args) => {
            let video = UploadFile::from_path(&args.video).await?;
            let thumbnail = match &args.thumbnail {
                Some(path) => Some(UploadFile::from_path(path).await?),
                None => None,
            };

            let pb = spinner("Uploading the video...", output_format);
            let result = assistant
                .upload_video(&args.title, &args.description, video, thumbnail)
                .await;
            finish_spinner(pb);
            let uploaded = result?;

            if output_format == "json" {
                print_json(&uploaded);
            } else {
                match &uploaded.video_id {
                    Some(id) => println!(
                        "{}",
                        format_success(&format!(
                            "Video uploaded with ID: {}",
                            id.color(CliColors::accent()).bold()
                        ))
                    ),
                    None => println!("{}", format_success(&uploaded.message)),
                }
            }
        }

        VideoCommands::Delete(args) => {
            let deleted = assistant.delete_video(&args.id).await?;
            if output_format == "json" {
                print_json(&deleted);
            } else {
                println!("{}", format_success(&deleted.message));
            }
        }
    }

    Ok(())
}
