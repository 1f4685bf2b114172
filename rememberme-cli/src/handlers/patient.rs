//! Patient and dashboard handlers

use colored::Colorize;
use rememberme::api::UploadFile;
use rememberme::assistant::PatientDetails;
use rememberme::validation::PatientRegistrationForm;
use serde_json::json;

use crate::commands::PatientCommands;
use crate::context::RememberMeCliContext;
use crate::output::*;
use crate::utils::{parse_contact, parse_date};

pub async fn handle_patient_command(
    cmd: PatientCommands,
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<()> {
    match cmd {
        PatientCommands::Register(args) => {
            let form = PatientRegistrationForm {
                name: args.name,
                email: args.email,
                confirm_password: args
                    .confirm_password
                    .unwrap_or_else(|| args.password.clone()),
                password: args.password,
                date_of_birth: args.date_of_birth.as_deref().map(parse_date).transpose()?,
            };
            form.validate()?;

            let emergency_contacts = args
                .contacts
                .iter()
                .map(|c| parse_contact(c))
                .collect::<rememberme::Result<Vec<_>>>()?;
            let home_photo = match &args.home_photo {
                Some(path) => Some(UploadFile::from_path(path).await?),
                None => None,
            };

            let details = PatientDetails {
                home_address: args.address,
                home_photo,
                emergency_contacts,
                doctor_name: args.doctor,
                doctor_phone: args.doctor_phone,
            };

            let pb = spinner("Creating the patient account...", output_format);
            let result = ctx.registrar().register_patient(&form, details).await;
            finish_spinner(pb);
            let patient = result?;

            if output_format == "json" {
                print_json(&patient);
            } else {
                println!(
                    "{}",
                    format_success(&format!(
                        "Registered {} with patient ID: {}",
                        patient.name,
                        patient.id.color(CliColors::accent()).bold()
                    ))
                );
                println!("  export REMEMBERME_PATIENT={}", patient.id);
            }
        }

        PatientCommands::Show => {
            let patient_id = ctx.patient_id()?;
            let (patient, info) = tokio::try_join!(
                ctx.store.get_patient(patient_id),
                ctx.store.get_patient_info(patient_id)
            )?;

            if output_format == "json" {
                print_json(&json!({ "patient": patient, "info": info }));
            } else {
                print_patient(patient.as_ref(), info.as_ref());
            }
        }
    }

    Ok(())
}

pub async fn handle_dashboard_command(
    ctx: &RememberMeCliContext,
    output_format: &str,
) -> rememberme::Result<()> {
    let assistant = ctx.assistant()?;

    if assistant.session().is_patient() {
        let dashboard = assistant.patient_dashboard().await?;
        if output_format == "json" {
            print_json(&dashboard);
        } else {
            print_patient_dashboard(&dashboard);
        }
    } else {
        let dashboard = assistant.family_dashboard().await?;
        if output_format == "json" {
            print_json(&json!({
                "member": dashboard.member,
                "memories": dashboard.memories,
                "voice_ready": dashboard.voice_ready(),
            }));
        } else {
            print_family_dashboard(&dashboard);
        }
    }

    Ok(())
}
