//! Sign-in, diagnostics and configuration handlers

use colored::Colorize;
use rememberme::RememberMeError;
use rememberme::session::SessionRole;
use serde_json::json;

use crate::args::{ConfigArgs, LoginArgs};
use crate::context::RememberMeCliContext;
use crate::output::*;
use crate::utils::{mask_secret, read_stdin_line};

pub async fn handle_login_command(
    args: LoginArgs,
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => read_stdin_line()?.unwrap_or_default(),
    };

    let session = ctx.registrar().sign_in(&args.email, &password).await?;

    if output_format == "json" {
        print_json(&json!({
            "session": session,
            "access_token": session.access_token,
        }));
        return Ok(());
    }

    println!(
        "{}",
        format_success(&format!(
            "Signed in as {}",
            session.email.as_deref().unwrap_or(&args.email)
        ))
    );
    println!();
    println!(
        "{}",
        "Use this session in later commands:".color(CliColors::muted())
    );
    match &session.role {
        SessionRole::Patient { patient_id } => {
            println!("  export REMEMBERME_PATIENT={}", patient_id);
        }
        SessionRole::FamilyMember {
            family_member_id, ..
        } => {
            println!("  export REMEMBERME_FAMILY_MEMBER={}", family_member_id);
        }
    }
    if let Some(token) = &session.access_token {
        println!("  export REMEMBERME_TOKEN={}", token);
    }
    Ok(())
}

pub async fn handle_diagnose_command(
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<()> {
    tracing::info!("Running diagnostic checks...");

    let store_health = ctx.store.health_check().await;
    let backend_reachable = ctx.backend.health().await;

    if output_format == "json" {
        let (healthy, error) = match &store_health {
            Ok(healthy) => (*healthy, None),
            Err(e) => (false, Some(e.to_string())),
        };
        print_json(&json!({
            "version": rememberme::VERSION,
            "data": {
                "backend": ctx.config.data.backend,
                "store": ctx.store.describe(),
                "healthy": healthy,
                "error": error,
            },
            "backend": {
                "url": ctx.backend.base_url(),
                "reachable": backend_reachable,
            },
            "session": ctx.session(),
        }));
        return Ok(());
    }

    match store_health {
        Ok(true) => println!(
            "{}",
            format_success(&format!("Data store: Healthy ({})", ctx.store.describe()))
        ),
        Ok(false) => println!(
            "{}",
            format_error(&format!("Data store: Unhealthy ({})", ctx.store.describe()))
        ),
        Err(e) => println!("{}", format_error(&format!("Data store: Error - {}", e))),
    }

    if backend_reachable {
        println!(
            "{}",
            format_success(&format!("Backend API: Reachable ({})", ctx.backend.base_url()))
        );
    } else {
        println!(
            "{}",
            format_warning(&format!(
                "Backend API: Unreachable ({}); use 'ask --local' for offline answers",
                ctx.backend.base_url()
            ))
        );
    }

    if ctx.config.speech.enabled {
        println!(
            "{}",
            format_success(&format!("Dictation: Enabled ({})", ctx.config.speech.language))
        );
    } else {
        println!("{}", format_info("Dictation: Disabled"));
    }

    match ctx.session() {
        Some(session) if session.is_patient() => println!(
            "{}",
            format_info(&format!("Session: patient {}", session.patient_id()))
        ),
        Some(session) => println!(
            "{}",
            format_info(&format!(
                "Session: family member {} of patient {}",
                session.family_member_id().unwrap_or("-"),
                session.patient_id()
            ))
        ),
        None => println!("{}", format_info("Session: none selected")),
    }
    Ok(())
}

pub async fn handle_config_command(
    args: ConfigArgs,
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<()> {
    let mut config = ctx.config.clone();
    if !args.show_secrets
        && let Some(key) = config.data.anon_key.as_mut()
    {
        *key = mask_secret(key);
    }

    let value = serde_json::to_value(&config)
        .map_err(|e| RememberMeError::Other(format!("Failed to serialize configuration: {}", e)))?;

    if output_format != "json" {
        println!("{}", "Effective configuration".color(CliColors::muted()).bold());
    }
    print_json(&value);
    Ok(())
}
