//! Question, chat and photo handlers

use colored::Colorize;
use rememberme::RememberMeError;
use rememberme::api::UploadFile;
use rememberme::assistant::{Assistant, ChatLog, LocalAnswer};
use rememberme::speech::{ScriptedTranscriber, SpeechTranscriber, UnavailableTranscriber};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::args::{AskArgs, ChatArgs, IdentifyArgs};
use crate::context::RememberMeCliContext;
use crate::output::*;
use crate::utils::read_stdin_line;

/// Turn dictated text into a question through the speech capability
async fn dictate(
    ctx: &RememberMeCliContext,
    assistant: &Assistant,
    utterance: String,
) -> rememberme::Result<String> {
    let transcriber: Box<dyn SpeechTranscriber> = if ctx.config.speech.enabled {
        Box::new(ScriptedTranscriber::new([utterance]))
    } else {
        Box::new(UnavailableTranscriber)
    };
    assistant.listen(transcriber.as_ref()).await
}

pub async fn handle_ask_command(
    args: AskArgs,
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<()> {
    let assistant = ctx.assistant()?;

    let question = match args.say {
        Some(said) => dictate(ctx, assistant, said).await?,
        None if !args.question.is_empty() => args.question.join(" "),
        None => {
            let line = read_stdin_line()?.ok_or(RememberMeError::EmptyQuery)?;
            dictate(ctx, assistant, line).await?
        }
    };
    tracing::debug!(question = %question, local = args.local, "Asking");

    if args.local {
        let answer = assistant.ask_locally(&question).await?;
        if output_format == "json" {
            print_json(&answer);
        } else {
            print_local_answer(&answer);
        }
        return Ok(());
    }

    let pb = spinner("Thinking...", output_format);
    let result = assistant.ask_backend(&question).await;
    finish_spinner(pb);
    let response = result?;

    if output_format == "json" {
        print_json(&response);
    } else {
        print_query_response(&response);
    }
    Ok(())
}

pub async fn handle_identify_command(
    args: IdentifyArgs,
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<()> {
    let assistant = ctx.assistant()?;
    let image = UploadFile::from_path(&args.image).await?;

    let pb = spinner("Looking at the photo...", output_format);
    let result = assistant.identify_photo(image).await;
    finish_spinner(pb);
    let identification = result?;

    if output_format == "json" {
        print_json(&identification);
    } else {
        print_identification(&identification);
    }
    Ok(())
}

fn local_reply(answer: LocalAnswer) -> String {
    match answer {
        LocalAnswer::Found { member, memories } => format!(
            "That's {}, your {}. They have shared {} memories with you.",
            member.name,
            member.relationship.to_lowercase(),
            memories.len()
        ),
        LocalAnswer::NotFound { message } => message,
    }
}

/// Run a chat over `reader`, one question per line, until EOF or `/quit`
pub async fn run_chat<R>(
    reader: R,
    args: &ChatArgs,
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<ChatLog>
where
    R: AsyncBufRead + Unpin,
{
    let assistant = ctx.assistant()?;
    let interactive = output_format != "json";
    let mut log = ChatLog::new();
    let mut lines = reader.lines();

    if interactive {
        println!(
            "{}",
            format_info("Ask me about your family. Type /photo <path> to show me a photo, /quit to leave.")
        );
    }

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| RememberMeError::Other(format!("Failed to read input: {}", e)))?
    {
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                log.clear();
                if interactive {
                    println!("{}", format_info("Conversation cleared"));
                }
                continue;
            }
            "/history" => {
                if interactive {
                    log.messages().iter().for_each(print_chat_message);
                }
                continue;
            }
            _ => {}
        }

        if let Some(path) = line.strip_prefix("/photo ") {
            let image = match UploadFile::from_path(path.trim()).await {
                Ok(image) => image,
                Err(e) => {
                    if interactive {
                        println!("{}", format_error(&e.to_string()));
                    }
                    continue;
                }
            };
            log.push_user_photo(image.file_name.clone());

            let pb = spinner("Looking at the photo...", output_format);
            let result = assistant.identify_photo(image).await;
            finish_spinner(pb);
            log.push_identification(result);
        } else {
            log.push_user_text(line);

            if args.local {
                match assistant.ask_locally(line).await {
                    Ok(answer) => log.push_assistant_text(local_reply(answer)),
                    Err(e) => log.push_answer(Err(e)),
                };
            } else {
                let pb = spinner("Thinking...", output_format);
                let result = assistant.ask_backend(line).await;
                finish_spinner(pb);
                log.push_answer(result);
            }
        }

        if interactive && let Some(reply) = log.last() {
            print_chat_message(reply);
        }
    }

    if interactive {
        println!(
            "{}",
            format!("{} messages. Goodbye!", log.len()).color(CliColors::muted())
        );
    } else {
        print_json(&log);
    }
    Ok(log)
}

pub async fn handle_chat_command(
    args: ChatArgs,
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<()> {
    let reader = BufReader::new(tokio::io::stdin());
    run_chat(reader, &args, ctx, output_format).await?;
    Ok(())
}
