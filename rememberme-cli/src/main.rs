use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use rememberme::config::ConfigLoader;
use rememberme::logging;
use tracing::Level;

use rememberme_cli::commands::Commands;
use rememberme_cli::context::{RememberMeCliContext, SessionOptions};
use rememberme_cli::handlers::*;
use rememberme_cli::output::{output_error_json, print_json};

#[derive(Parser)]
#[command(name = "rememberme")]
#[command(about = "RememberMe caregiving assistant CLI", long_about = None)]
#[command(version = rememberme::VERSION)]
struct Cli {
    /// Configuration file (toml, yaml or json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Act as this patient (or set REMEMBERME_PATIENT)
    #[arg(long, global = true)]
    patient: Option<String>,

    /// Act as this family member (or set REMEMBERME_FAMILY_MEMBER)
    #[arg(long, global = true)]
    family_member: Option<String>,

    /// Access token from 'rememberme login' (or set REMEMBERME_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Output format (table, json) - use json for tool integration
    #[arg(long, short, default_value = "table", global = true)]
    output: String,

    /// Machine-readable mode: JSON output and no logs except errors
    #[arg(long, global = true)]
    machine: bool,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

async fn run(cli: Cli, output_format: &str, log_level: Level) -> rememberme::Result<()> {
    let config = ConfigLoader::load(cli.config.as_deref())?;

    let mut logging_config = config.logging.clone();
    logging_config.level = logging::level_to_log_level(log_level);
    let _log_guard = logging::init(&logging_config)?;

    let options = SessionOptions {
        patient: cli.patient,
        family_member: cli.family_member,
        token: cli.token,
    }
    .with_env_fallback();
    let ctx = RememberMeCliContext::new(config, options).await?;

    match cli.command {
        Commands::Version | Commands::Completions(_) => Ok(()),
        Commands::Diagnose => handle_diagnose_command(&ctx, output_format).await,
        Commands::Ask(args) => handle_ask_command(args, &ctx, output_format).await,
        Commands::Chat(args) => handle_chat_command(args, &ctx, output_format).await,
        Commands::Identify(args) => handle_identify_command(args, &ctx, output_format).await,
        Commands::Login(args) => handle_login_command(args, &ctx, output_format).await,
        Commands::Family(cmd) => handle_family_command(cmd, &ctx, output_format).await,
        Commands::Memory(cmd) => handle_memory_command(cmd, &ctx, output_format).await,
        Commands::Video(cmd) => handle_video_command(cmd, &ctx, output_format).await,
        Commands::Patient(cmd) => handle_patient_command(cmd, &ctx, output_format).await,
        Commands::Dashboard => handle_dashboard_command(&ctx, output_format).await,
        Commands::Config(args) => handle_config_command(args, &ctx, output_format).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Output format priority: machine flag > env var > cli arg
    let output_format = if cli.machine {
        "json".to_string()
    } else if let Ok(env_output) = std::env::var("REMEMBERME_OUTPUT") {
        env_output
    } else {
        cli.output.clone()
    };

    let is_quiet = cli.quiet
        || std::env::var("REMEMBERME_QUIET")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

    // Machine mode implies quiet so JSON output stays clean
    let log_level = if is_quiet || cli.machine {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    match &cli.command {
        Commands::Version => {
            if output_format == "json" {
                print_json(&serde_json::json!({ "version": rememberme::VERSION }));
            } else {
                println!("RememberMe CLI v{}", rememberme::VERSION);
            }
            return;
        }
        Commands::Completions(args) => {
            clap_complete::generate(
                args.shell,
                &mut Cli::command(),
                "rememberme",
                &mut std::io::stdout(),
            );
            return;
        }
        _ => {}
    }

    if let Err(e) = run(cli, &output_format, log_level).await {
        output_error_json(&e, &output_format);
        std::process::exit(1);
    }
}
