//! End-to-end flows over the in-memory store seeded from a fixture

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use mockall::mock;
use serde_json::{Value, json};

use rememberme::api::UploadFile;
use rememberme::config::{BackendConfig, ConfigBuilder, KeywordRule, ResolverConfig};
use rememberme::prelude::*;
use rememberme::store::{FileStore, InMemoryStore};
use rememberme::validation::FamilyRegistrationForm;

mock! {
    Transcriber {}

    #[async_trait]
    impl SpeechTranscriber for Transcriber {
        fn is_available(&self) -> bool;
        async fn transcribe(&self, language: &str) -> rememberme::Result<Transcript>;
    }
}

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("family.json")
}

async fn fixture_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::load_fixture(fixture_path()).await.unwrap())
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn backend(base_url: String) -> BackendClient {
    BackendClient::new(&BackendConfig {
        base_url,
        ..BackendConfig::default()
    })
    .unwrap()
}

#[derive(Clone, Default)]
struct Received(Arc<Mutex<Vec<HashMap<String, String>>>>);

async fn read_form(mut multipart: Multipart) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    let mut photos = 0;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "photos" {
            photos += 1;
            continue;
        }
        let value = field.text().await.unwrap();
        fields.insert(name, value);
    }
    fields.insert("photo_count".to_string(), photos.to_string());
    fields
}

#[tokio::test]
async fn test_init_from_fixture_config() {
    let config = ConfigBuilder::testing()
        .with_fixture(fixture_path())
        .build()
        .unwrap();
    let assistant = rememberme::init(config, Session::patient("p-margaret"))
        .await
        .unwrap();

    let roster = assistant.roster().await.unwrap();
    let names: Vec<&str> = roster.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Evelyn"]);
}

#[tokio::test]
async fn test_patient_questions() {
    let assistant = Assistant::new(fixture_store().await, Session::patient("p-margaret"));

    match assistant.ask_locally("Who is my daughter?").await.unwrap() {
        LocalAnswer::Found { member, memories } => {
            assert_eq!(member.name, "Alice");
            let titles: Vec<&str> = memories.iter().map(|m| m.title.as_str()).collect();
            assert_eq!(titles, vec!["The rose garden", "Beach day"]);
        }
        other => panic!("expected Alice, got {:?}", other),
    }

    // "grandchild" reaches the granddaughter category before any name
    let answer = assistant.ask_locally("Where is my grandchild?").await.unwrap();
    assert!(matches!(answer, LocalAnswer::Found { ref member, .. } if member.name == "Evelyn"));

    let answer = assistant.ask_locally("Tell me about BOB").await.unwrap();
    assert!(matches!(answer, LocalAnswer::Found { ref member, .. } if member.name == "Bob"));

    let answer = assistant.ask_locally("Is my husband coming?").await.unwrap();
    assert!(!answer.is_found());
}

#[tokio::test]
async fn test_extra_keywords_from_config() {
    let resolver = RelationshipResolver::from_config(&ResolverConfig {
        extra_keywords: vec![KeywordRule {
            category: "daughter".to_string(),
            keywords: vec!["little girl".to_string()],
        }],
    });
    let assistant =
        Assistant::new(fixture_store().await, Session::patient("p-margaret")).with_resolver(resolver);

    let answer = assistant.ask_locally("Where is my little girl?").await.unwrap();
    assert!(matches!(answer, LocalAnswer::Found { ref member, .. } if member.name == "Alice"));
}

#[tokio::test]
async fn test_dashboards() {
    let store = fixture_store().await;

    let patient = Assistant::new(store.clone(), Session::patient("p-margaret"));
    let dashboard = patient.patient_dashboard().await.unwrap();
    assert_eq!(dashboard.patient.unwrap().name, "Margaret Hale");
    assert_eq!(dashboard.info.unwrap().doctor_name.as_deref(), Some("Dr. Okafor"));
    let counts: Vec<usize> = dashboard.family.iter().map(|o| o.memory_count).collect();
    assert_eq!(counts, vec![2, 1, 1]);
    let recent: Vec<&str> = dashboard
        .recent_memories
        .iter()
        .map(|r| r.memory.title.as_str())
        .collect();
    assert_eq!(recent, vec!["Piano recital", "The rose garden", "First fish"]);

    let alice = Assistant::new(store, Session::family_member("u-alice", "fm-alice", "p-margaret"));
    let dashboard = alice.family_dashboard().await.unwrap();
    assert!(dashboard.voice_ready());
    assert_eq!(dashboard.memories.len(), 2);

    let videos = alice.videos().await.unwrap();
    assert_eq!(videos[0].family_member.as_ref().unwrap().name, "Alice");
}

#[tokio::test]
async fn test_sign_in_from_fixture_accounts() {
    let store = fixture_store().await;
    let registrar = Registrar::new(store.clone(), store);

    let session = registrar.sign_in("Alice@Example.com", "sandcastle").await.unwrap();
    assert_eq!(session.family_member_id(), Some("fm-alice"));
    assert_eq!(session.patient_id(), "p-margaret");

    let session = registrar.sign_in("margaret@example.com", "roses1941").await.unwrap();
    assert!(session.is_patient());

    let err = registrar.sign_in("alice@example.com", "wrong").await.unwrap_err();
    assert!(err.requires_login());
}

#[tokio::test]
async fn test_dictated_question_uses_session_language() {
    let mut transcriber = MockTranscriber::new();
    transcriber.expect_is_available().return_const(true);
    transcriber
        .expect_transcribe()
        .withf(|language| language.eq("en-GB"))
        .times(1)
        .returning(|_| Ok(Transcript::new("who is my son")));

    let assistant = Assistant::new(fixture_store().await, Session::patient("p-margaret"))
        .with_language("en-GB");

    let sequencer = InputSequencer::new();
    let ticket = sequencer.begin();
    let heard = assistant.listen(&transcriber).await.unwrap();
    let question = sequencer.accept(ticket, heard).unwrap();

    let answer = assistant.ask_locally(&question).await.unwrap();
    assert!(matches!(answer, LocalAnswer::Found { ref member, .. } if member.name == "Bob"));
}

#[tokio::test]
async fn test_stale_dictation_is_dropped() {
    let mut transcriber = MockTranscriber::new();
    transcriber.expect_is_available().return_const(true);
    transcriber
        .expect_transcribe()
        .returning(|_| Ok(Transcript::new("who is my daughter")));

    let assistant = Assistant::new(fixture_store().await, Session::patient("p-margaret"));
    let sequencer = InputSequencer::new();

    let voice = sequencer.begin();
    let typed = sequencer.begin();
    let heard = assistant.listen(&transcriber).await.unwrap();

    assert!(sequencer.accept(voice, heard).is_none());
    assert!(sequencer.is_current(typed));
}

#[tokio::test]
async fn test_speech_unavailable() {
    let mut transcriber = MockTranscriber::new();
    transcriber.expect_is_available().return_const(false);
    transcriber.expect_transcribe().never();

    let assistant = Assistant::new(fixture_store().await, Session::patient("p-margaret"));
    assert!(matches!(
        assistant.listen(&transcriber).await,
        Err(RememberMeError::SpeechUnavailable)
    ));
}

#[tokio::test]
async fn test_create_memory_posts_to_backend() {
    async fn create(State(received): State<Received>, multipart: Multipart) -> Json<Value> {
        let fields = read_form(multipart).await;
        received.0.lock().unwrap().push(fields);
        Json(json!({
            "memory_id": "m-new",
            "audio_url": "https://cdn.test/m-new.mp3",
            "message": "Memory created successfully"
        }))
    }

    let received = Received::default();
    let app = Router::new()
        .route("/api/create-memory/", post(create))
        .with_state(received.clone());
    let base = serve(app).await;

    let store = fixture_store().await;
    let alice = Assistant::new(store.clone(), Session::family_member("u-alice", "fm-alice", "p-margaret"))
        .with_backend(backend(base.clone()));

    let photos = vec![
        UploadFile::new("one.jpg", "image/jpeg", vec![1, 2, 3]),
        UploadFile::new("two.png", "image/png", vec![4, 5, 6]),
    ];
    let created = alice
        .create_memory("  Picnic ", "Sandwiches by the lake", photos)
        .await
        .unwrap();
    assert_eq!(created.memory_id, "m-new");

    let forms = received.0.lock().unwrap().clone();
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0]["family_member_id"], "fm-alice");
    assert_eq!(forms[0]["title"], "Picnic");
    assert_eq!(forms[0]["photo_count"], "2");

    // Bob's voice is still processing; nothing is sent
    let bob = Assistant::new(store, Session::family_member("u-bob", "fm-bob", "p-margaret"))
        .with_backend(backend(base));
    let err = bob
        .create_memory("Fishing", "At the lake", Vec::new())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Voice processing not complete");
    assert_eq!(received.0.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_family_registration_flow() {
    async fn register(State(received): State<Received>, multipart: Multipart) -> Json<Value> {
        let fields = read_form(multipart).await;
        received.0.lock().unwrap().push(fields);
        Json(json!({"family_member_id": "fm-new", "message": "Family member registered"}))
    }
    async fn upload_voice(State(received): State<Received>, multipart: Multipart) -> Json<Value> {
        let fields = read_form(multipart).await;
        let url = fields.get("voice_sample_url").cloned().unwrap_or_default();
        received.0.lock().unwrap().push(fields);
        Json(json!({"message": "Voice processing started", "voice_sample_url": url}))
    }

    let received = Received::default();
    let app = Router::new()
        .route("/api/register/", post(register))
        .route("/api/upload-voice/", post(upload_voice))
        .with_state(received.clone());
    let base = serve(app).await;

    let store = fixture_store().await;
    let registrar = Registrar::new(store.clone(), store.clone()).with_backend(backend(base));

    let form = FamilyRegistrationForm {
        name: " Carol ".to_string(),
        email: "carol@example.com".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
        relationship: "Sister".to_string(),
        voice_sample: None,
    };
    let outcome = registrar
        .register_family_member(
            "p-margaret",
            &form,
            UploadFile::new("carol.wav", "audio/wav", vec![7; 64]),
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.family_member_id, "fm-new");
    assert!(outcome.voice_sample_url.starts_with("mem://voice-samples/"));
    assert!(outcome.voice_sample_url.ends_with(".wav"));
    assert!(outcome.profile_photo_url.is_none());

    let forms = received.0.lock().unwrap().clone();
    assert_eq!(forms[0]["name"], "Carol");
    assert_eq!(forms[0]["patient_id"], "p-margaret");
    assert_eq!(forms[0]["user_id"], outcome.user_id);
    assert_eq!(forms[1]["family_member_id"], "fm-new");
    assert_eq!(forms[1]["voice_sample_url"], outcome.voice_sample_url);

    let path = outcome
        .voice_sample_url
        .trim_start_matches("mem://voice-samples/")
        .to_string();
    let (bytes, content_type) = store.file("voice-samples", &path).await.unwrap();
    assert_eq!(bytes.len(), 64);
    assert_eq!(content_type, "audio/wav");
    assert_eq!(store.public_url("voice-samples", &path), outcome.voice_sample_url);
}
