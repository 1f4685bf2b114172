use std::sync::Arc;

use rememberme::api::BackendClient;
use rememberme::assistant::Registrar;
use rememberme::config::{DataBackend, RememberMeConfig};
use rememberme::prelude::*;
use rememberme::resolver::RelationshipResolver;
use rememberme::store::{self, AuthClient, DataStore};

/// Session-related flags, each falling back to a `REMEMBERME_*` variable
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub patient: Option<String>,
    pub family_member: Option<String>,
    pub token: Option<String>,
}

fn env_or(value: Option<String>, var: &str) -> Option<String> {
    value
        .or_else(|| std::env::var(var).ok())
        .filter(|v| !v.trim().is_empty())
}

impl SessionOptions {
    /// Fill unset flags from `REMEMBERME_PATIENT`, `REMEMBERME_FAMILY_MEMBER`
    /// and `REMEMBERME_TOKEN`
    pub fn with_env_fallback(self) -> Self {
        Self {
            patient: env_or(self.patient, "REMEMBERME_PATIENT"),
            family_member: env_or(self.family_member, "REMEMBERME_FAMILY_MEMBER"),
            token: env_or(self.token, "REMEMBERME_TOKEN"),
        }
    }
}

pub struct RememberMeCliContext {
    pub config: RememberMeConfig,
    pub store: Arc<dyn DataStore>,
    pub auth: Arc<dyn AuthClient>,
    pub backend: BackendClient,
    assistant: Option<Assistant>,
}

impl RememberMeCliContext {
    /// Open the configured data store and select the session from `options`
    pub async fn new(config: RememberMeConfig, options: SessionOptions) -> rememberme::Result<Self> {
        // the store only needs the access token up front
        let mut probe = Session::patient(options.patient.clone().unwrap_or_default());
        if let Some(token) = &options.token {
            probe = probe.with_access_token(token.clone());
        }

        let (store, auth): (Arc<dyn DataStore>, Arc<dyn AuthClient>) = match config.data.backend {
            DataBackend::Memory => {
                let memory = Arc::new(match &config.data.fixture {
                    Some(path) => InMemoryStore::load_fixture(path).await?,
                    None => InMemoryStore::new(),
                });
                let store: Arc<dyn DataStore> = memory.clone();
                let auth: Arc<dyn AuthClient> = memory;
                (store, auth)
            }
            DataBackend::Rest => (
                store::create_data_store(&config.data, &probe).await?,
                store::create_auth_client(&config.data).await?,
            ),
        };

        let backend = BackendClient::new(&config.backend)?;
        let session = resolve_session(&store, &options).await?;

        let assistant = session.map(|session| {
            Assistant::new(store.clone(), session)
                .with_backend(backend.clone())
                .with_resolver(RelationshipResolver::from_config(&config.resolver))
                .with_language(config.speech.language.clone())
        });

        Ok(Self {
            config,
            store,
            auth,
            backend,
            assistant,
        })
    }

    /// The assistant for the selected patient or family member
    pub fn assistant(&self) -> rememberme::Result<&Assistant> {
        self.assistant.as_ref().ok_or_else(|| {
            RememberMeError::Authentication(
                "No session selected. Pass --patient <id> or --family-member <id>, or run 'rememberme login' first"
                    .to_string(),
            )
        })
    }

    pub fn session(&self) -> Option<&Session> {
        self.assistant.as_ref().map(Assistant::session)
    }

    /// The patient the current session acts for
    pub fn patient_id(&self) -> rememberme::Result<&str> {
        Ok(self.assistant()?.session().patient_id())
    }

    pub fn registrar(&self) -> Registrar {
        Registrar::new(self.auth.clone(), self.store.clone())
            .with_backend(self.backend.clone())
            .with_buckets(self.config.data.buckets.clone())
    }
}

async fn resolve_session(
    store: &Arc<dyn DataStore>,
    options: &SessionOptions,
) -> rememberme::Result<Option<Session>> {
    let session = match (&options.family_member, &options.patient) {
        (Some(family_member_id), patient) => {
            let member = store
                .get_family_member(family_member_id)
                .await?
                .ok_or_else(|| RememberMeError::NotFound {
                    what: "Family member".to_string(),
                    id: family_member_id.clone(),
                })?;

            if let Some(patient_id) = patient
                && *patient_id != member.patient_id
            {
                tracing::warn!(
                    requested = %patient_id,
                    actual = %member.patient_id,
                    "Ignoring --patient; the family member belongs to another patient"
                );
            }

            let user_id = member.user_id.clone().unwrap_or_else(|| member.id.clone());
            let mut session = Session::family_member(user_id, member.id, member.patient_id);
            if let Some(email) = member.email {
                session = session.with_email(email);
            }
            session
        }
        (None, Some(patient_id)) => Session::patient(patient_id.clone()),
        (None, None) => return Ok(None),
    };

    Ok(Some(match &options.token {
        Some(token) => session.with_access_token(token.clone()),
        None => session,
    }))
}
