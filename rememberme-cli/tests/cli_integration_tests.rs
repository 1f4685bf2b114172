//! Integration tests for the RememberMe CLI
//!
//! Each test opens a context over an in-memory store seeded from a copy of
//! the library's family fixture, then drives the command handlers directly.
//! The backend points at a closed port, so anything that needs it fails the
//! way an offline install would.

use std::path::PathBuf;

use rememberme::RememberMeError;
use rememberme::assistant::ChatContent;
use rememberme::assistant::chat::QUERY_ERROR_MESSAGE;
use rememberme::config::ConfigBuilder;
use rememberme_cli::args::*;
use rememberme_cli::commands::{FamilyCommands, MemoryCommands, PatientCommands};
use rememberme_cli::handlers::*;
use rememberme_cli::{RememberMeCliContext, SessionOptions, error_code};
use tempfile::TempDir;

fn fixture_source() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../rememberme/tests/fixtures/family.json")
}

async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    format!("http://127.0.0.1:{}/api", port)
}

/// Helper to create an isolated test CLI context
async fn create_test_context(options: SessionOptions) -> (RememberMeCliContext, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let fixture = temp_dir.path().join("family.json");
    std::fs::copy(fixture_source(), &fixture).expect("Failed to copy fixture");

    let config = ConfigBuilder::testing()
        .with_fixture(&fixture)
        .with_backend_url(closed_port_url().await)
        .build()
        .expect("Failed to build config");

    let ctx = RememberMeCliContext::new(config, options)
        .await
        .expect("Failed to create context");
    (ctx, temp_dir)
}

fn as_patient() -> SessionOptions {
    SessionOptions {
        patient: Some("p-margaret".to_string()),
        ..SessionOptions::default()
    }
}

fn as_member(id: &str) -> SessionOptions {
    SessionOptions {
        family_member: Some(id.to_string()),
        ..SessionOptions::default()
    }
}

#[tokio::test]
async fn test_patient_session() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    let session = ctx.session().expect("Session should be selected");
    assert!(session.is_patient());
    assert_eq!(ctx.patient_id().unwrap(), "p-margaret");
}

#[tokio::test]
async fn test_family_member_session_uses_their_patient() {
    let (ctx, _dir) = create_test_context(SessionOptions {
        patient: Some("p-someone-else".to_string()),
        family_member: Some("fm-alice".to_string()),
        token: Some("token-123".to_string()),
    })
    .await;

    let session = ctx.session().expect("Session should be selected");
    assert!(!session.is_patient());
    assert_eq!(session.family_member_id(), Some("fm-alice"));
    assert_eq!(session.patient_id(), "p-margaret");
    assert_eq!(session.user_id, "u-alice");
    assert_eq!(session.email.as_deref(), Some("alice@example.com"));
    assert_eq!(session.access_token.as_deref(), Some("token-123"));
}

#[tokio::test]
async fn test_member_without_account_falls_back_to_member_id() {
    let (ctx, _dir) = create_test_context(as_member("fm-evelyn")).await;

    let session = ctx.session().expect("Session should be selected");
    assert_eq!(session.user_id, "fm-evelyn");
    assert!(session.email.is_none());
}

#[tokio::test]
async fn test_unknown_family_member_session() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let fixture = temp_dir.path().join("family.json");
    std::fs::copy(fixture_source(), &fixture).expect("Failed to copy fixture");
    let config = ConfigBuilder::testing()
        .with_fixture(&fixture)
        .build()
        .expect("Failed to build config");

    let result = RememberMeCliContext::new(config, as_member("fm-nobody")).await;
    match result {
        Err(RememberMeError::NotFound { what, id }) => {
            assert_eq!(what, "Family member");
            assert_eq!(id, "fm-nobody");
        }
        Err(e) => panic!("Unexpected error: {}", e),
        Ok(_) => panic!("Unknown family member should not open a session"),
    }
}

#[tokio::test]
async fn test_commands_without_session_ask_for_login() {
    let (ctx, _dir) = create_test_context(SessionOptions::default()).await;

    assert!(ctx.session().is_none());
    let err = handle_dashboard_command(&ctx, "json").await.unwrap_err();
    assert!(err.requires_login());
    assert_eq!(error_code(&err), "AUTHENTICATION_ERROR");
}

#[tokio::test]
async fn test_ask_locally() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    let args = AskArgs {
        question: vec!["Who".into(), "is".into(), "my".into(), "daughter?".into()],
        local: true,
        say: None,
    };
    handle_ask_command(args, &ctx, "json").await.unwrap();

    let answer = ctx
        .assistant()
        .unwrap()
        .ask_locally("who is my son")
        .await
        .unwrap();
    assert!(answer.is_found());
}

#[tokio::test]
async fn test_ask_with_dictation_disabled() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    let args = AskArgs {
        question: Vec::new(),
        local: true,
        say: Some("who is my daughter".to_string()),
    };
    let err = handle_ask_command(args, &ctx, "json").await.unwrap_err();
    assert!(matches!(err, RememberMeError::SpeechUnavailable));
}

#[tokio::test]
async fn test_ask_backend_offline() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    let args = AskArgs {
        question: vec!["who is my daughter".into()],
        local: false,
        say: None,
    };
    let err = handle_ask_command(args, &ctx, "json").await.unwrap_err();
    assert!(matches!(
        err,
        RememberMeError::Connection(_) | RememberMeError::Timeout(_)
    ));
}

#[tokio::test]
async fn test_local_chat() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    let input = &b"who is my daughter\n\nis my nephew here\n/quit\nwho is my son\n"[..];
    let log = run_chat(input, &ChatArgs { local: true }, &ctx, "json")
        .await
        .unwrap();

    let texts: Vec<&str> = log.messages().iter().map(|m| m.text()).collect();
    assert_eq!(log.len(), 4);
    assert_eq!(texts[0], "who is my daughter");
    assert!(texts[1].starts_with("That's Alice, your daughter."));
    assert_eq!(texts[2], "is my nephew here");
    assert!(!texts[3].starts_with("That's"));
}

#[tokio::test]
async fn test_chat_clear_and_offline_backend() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    let input = &b"who is my son\n/clear\nwho is my daughter\n"[..];
    let log = run_chat(input, &ChatArgs { local: false }, &ctx, "json")
        .await
        .unwrap();

    assert_eq!(log.len(), 2);
    let reply = log.last().unwrap();
    assert!(reply.is_error());
    assert_eq!(
        reply.content,
        ChatContent::Error {
            text: QUERY_ERROR_MESSAGE.to_string()
        }
    );
}

#[tokio::test]
async fn test_chat_missing_photo_is_skipped() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    let input = &b"/photo /definitely/not/here.jpg\n/history\n"[..];
    let log = run_chat(input, &ChatArgs { local: true }, &ctx, "json")
        .await
        .unwrap();
    assert!(log.is_empty());
}

#[tokio::test]
async fn test_family_list_and_show() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    handle_family_command(FamilyCommands::List, &ctx, "json")
        .await
        .unwrap();
    handle_family_command(
        FamilyCommands::Show(ShowFamilyMemberArgs {
            member: "evelyn".to_string(),
        }),
        &ctx,
        "json",
    )
    .await
    .unwrap();

    let err = handle_family_command(
        FamilyCommands::Show(ShowFamilyMemberArgs {
            member: "fm-zz".to_string(),
        }),
        &ctx,
        "json",
    )
    .await
    .unwrap_err();
    assert_eq!(error_code(&err), "NOT_FOUND");
}

#[tokio::test]
async fn test_family_update() {
    let (ctx, dir) = create_test_context(as_patient()).await;
    let photo = dir.path().join("bob.jpg");
    std::fs::write(&photo, b"jpeg bytes").unwrap();

    handle_family_command(
        FamilyCommands::Update(UpdateFamilyMemberArgs {
            member: "fm-bob".to_string(),
            name: Some("  Robert ".to_string()),
            relationship: None,
            photo: Some(photo),
        }),
        &ctx,
        "json",
    )
    .await
    .unwrap();

    let bob = ctx.store.get_family_member("fm-bob").await.unwrap().unwrap();
    assert_eq!(bob.name, "Robert");
    assert_eq!(bob.relationship, "Son");
    assert!(bob.profile_photo_url.is_some());
}

#[tokio::test]
async fn test_family_update_requires_a_change() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    let nothing = handle_family_command(
        FamilyCommands::Update(UpdateFamilyMemberArgs {
            member: "fm-bob".to_string(),
            name: None,
            relationship: None,
            photo: None,
        }),
        &ctx,
        "json",
    )
    .await;
    assert!(nothing.is_err());

    let blank = handle_family_command(
        FamilyCommands::Update(UpdateFamilyMemberArgs {
            member: "fm-bob".to_string(),
            name: None,
            relationship: Some("   ".to_string()),
            photo: None,
        }),
        &ctx,
        "json",
    )
    .await
    .unwrap_err();
    assert!(matches!(blank, RememberMeError::Validation(_)));
}

#[tokio::test]
async fn test_family_delete_removes_their_memories() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    handle_family_command(
        FamilyCommands::Delete(DeleteFamilyMemberArgs {
            member: "Alice".to_string(),
            yes: true,
        }),
        &ctx,
        "json",
    )
    .await
    .unwrap();

    assert!(ctx.store.get_family_member("fm-alice").await.unwrap().is_none());
    assert!(ctx.store.get_memory("m-beach").await.unwrap().is_none());
    assert_eq!(ctx.assistant().unwrap().roster().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_recent_memories() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    handle_memory_command(
        MemoryCommands::Recent(RecentMemoriesArgs { limit: 2 }),
        &ctx,
        "json",
    )
    .await
    .unwrap();

    let recent = ctx.store.recent_memories("p-margaret", 2).await.unwrap();
    assert_eq!(recent.len(), 2);
}

#[tokio::test]
async fn test_memory_edit_by_prefix() {
    let (ctx, _dir) = create_test_context(as_member("fm-alice")).await;

    handle_memory_command(
        MemoryCommands::Edit(EditMemoryArgs {
            id: "m-gar".to_string(),
            title: Some("Grandma's roses".to_string()),
            content: None,
        }),
        &ctx,
        "json",
    )
    .await
    .unwrap();

    let memory = ctx.store.get_memory("m-garden").await.unwrap().unwrap();
    assert_eq!(memory.title, "Grandma's roses");
    assert_eq!(
        memory.content,
        "Every summer you grew the reddest roses on the street."
    );
}

#[tokio::test]
async fn test_memory_prefix_is_scoped_to_the_member() {
    let (ctx, _dir) = create_test_context(as_member("fm-alice")).await;

    // m-fishing belongs to Bob
    let err = handle_memory_command(
        MemoryCommands::Delete(DeleteMemoryArgs {
            id: "m-fish".to_string(),
        }),
        &ctx,
        "json",
    )
    .await
    .unwrap_err();
    assert_eq!(error_code(&err), "NOT_FOUND");
    assert!(ctx.store.get_memory("m-fishing").await.unwrap().is_some());
}

#[tokio::test]
async fn test_memory_delete() {
    let (ctx, _dir) = create_test_context(as_member("fm-alice")).await;

    handle_memory_command(
        MemoryCommands::Delete(DeleteMemoryArgs {
            id: "m-beach".to_string(),
        }),
        &ctx,
        "json",
    )
    .await
    .unwrap();

    let remaining = ctx.store.list_memories("fm-alice").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "m-garden");
}

#[tokio::test]
async fn test_memory_list_needs_a_member() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    let err = handle_memory_command(
        MemoryCommands::List(ListMemoriesArgs { member: None }),
        &ctx,
        "json",
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("--member"));

    handle_memory_command(
        MemoryCommands::List(ListMemoriesArgs {
            member: Some("bob".to_string()),
        }),
        &ctx,
        "json",
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_register_patient_then_login() {
    let (ctx, _dir) = create_test_context(SessionOptions::default()).await;

    handle_patient_command(
        PatientCommands::Register(RegisterPatientArgs {
            name: "Harold Finch".to_string(),
            email: "harold@example.com".to_string(),
            password: "machine".to_string(),
            confirm_password: None,
            date_of_birth: Some("1950-06-01".to_string()),
            address: Some("1 Library Lane".to_string()),
            home_photo: None,
            contacts: vec!["John:Friend:555-0199".to_string()],
            doctor: None,
            doctor_phone: None,
        }),
        &ctx,
        "json",
    )
    .await
    .unwrap();

    handle_login_command(
        LoginArgs {
            email: "harold@example.com".to_string(),
            password: Some("machine".to_string()),
        },
        &ctx,
        "json",
    )
    .await
    .unwrap();

    let session = ctx
        .registrar()
        .sign_in("harold@example.com", "machine")
        .await
        .unwrap();
    assert!(session.is_patient());

    let patient = ctx
        .store
        .get_patient(session.patient_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(patient.name, "Harold Finch");
    let info = ctx
        .store
        .get_patient_info(session.patient_id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.emergency_contacts.len(), 1);
}

#[tokio::test]
async fn test_register_patient_rejects_mismatched_passwords() {
    let (ctx, _dir) = create_test_context(SessionOptions::default()).await;

    let err = handle_patient_command(
        PatientCommands::Register(RegisterPatientArgs {
            name: "Harold Finch".to_string(),
            email: "harold@example.com".to_string(),
            password: "machine".to_string(),
            confirm_password: Some("machina".to_string()),
            date_of_birth: None,
            address: None,
            home_photo: None,
            contacts: Vec::new(),
            doctor: None,
            doctor_phone: None,
        }),
        &ctx,
        "json",
    )
    .await
    .unwrap_err();
    assert_eq!(error_code(&err), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let (ctx, _dir) = create_test_context(SessionOptions::default()).await;

    let err = handle_login_command(
        LoginArgs {
            email: "alice@example.com".to_string(),
            password: Some("wrong-password".to_string()),
        },
        &ctx,
        "json",
    )
    .await
    .unwrap_err();
    assert!(err.requires_login());
}

#[tokio::test]
async fn test_patient_show_and_dashboards() {
    let (patient_ctx, _dir) = create_test_context(as_patient()).await;
    handle_patient_command(PatientCommands::Show, &patient_ctx, "json")
        .await
        .unwrap();
    handle_dashboard_command(&patient_ctx, "json").await.unwrap();
    handle_dashboard_command(&patient_ctx, "table").await.unwrap();

    let (member_ctx, _dir) = create_test_context(as_member("fm-bob")).await;
    handle_dashboard_command(&member_ctx, "json").await.unwrap();
    let dashboard = member_ctx
        .assistant()
        .unwrap()
        .family_dashboard()
        .await
        .unwrap();
    assert!(!dashboard.voice_ready());
    assert_eq!(dashboard.memories.len(), 1);
}

#[tokio::test]
async fn test_config_and_diagnose() {
    let (ctx, _dir) = create_test_context(as_patient()).await;

    handle_config_command(ConfigArgs { show_secrets: false }, &ctx, "json")
        .await
        .unwrap();
    handle_diagnose_command(&ctx, "json").await.unwrap();
    handle_diagnose_command(&ctx, "table").await.unwrap();
}
