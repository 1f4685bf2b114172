//! # RememberMe
//!
//! Client library for the RememberMe caregiving assistant, which helps
//! memory-impaired patients recognize family members and recall the memories
//! they have shared.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rememberme::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ConfigBuilder::testing().build()?;
//!     let assistant = rememberme::init(config, Session::patient("patient-1")).await?;
//!
//!     match assistant.ask_locally("Who is my daughter?").await? {
//!         LocalAnswer::Found { member, memories } => {
//!             println!("That's {} ({} memories)", member.name, memories.len());
//!         }
//!         LocalAnswer::NotFound { message } => println!("{message}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **Resolver**: deterministic, offline matcher from a question to a roster entry
//! - **Store**: data-access traits with a REST and an in-memory implementation
//! - **API**: client for the conversational and photo-recognition backend
//! - **Assistant**: ties the above together for one [`session::Session`]

pub mod api;
pub mod assistant;
pub mod config;
pub mod logging;
pub mod models;
pub mod resolver;
pub mod session;
pub mod speech;
pub mod store;
pub mod validation;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::{init, init_with_defaults};

    pub use crate::config::{ConfigBuilder, DataBackend, LogLevel, RememberMeConfig};

    pub use crate::models::{
        FamilyMember, FamilyVideo, Memory, Patient, PatientInfo, Photo, RelationshipKind,
        RosterEntry, VoiceCloneStatus,
    };

    pub use crate::resolver::{QueryResult, RelationshipResolver, RosterView};

    pub use crate::session::{Session, SessionRole};

    pub use crate::store::{DataStore, InMemoryStore, RestStore, StoreError};

    pub use crate::api::{BackendClient, PhotoIdentification, QueryAnswer, QueryResponse};

    pub use crate::assistant::{Assistant, ChatLog, InputSequencer, LocalAnswer, Registrar};

    pub use crate::speech::{SpeechTranscriber, Transcript};

    pub use crate::validation::ValidationError;

    pub use crate::{RememberMeError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for RememberMe operations with recovery suggestions
#[derive(Debug, thiserror::Error)]
pub enum RememberMeError {
    /// Error reported by the data store
    #[error("Storage error: {0}")]
    Storage(String),

    /// The backend answered with a non-success status
    #[error("Request failed ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network errors
    #[error("Connection error: {0}. Check your network connection and server availability")]
    Connection(String),

    #[error("Timeout error: {0}. Try again in a moment or increase the configured timeout")]
    Timeout(String),

    /// The backend answered with something we could not decode
    #[error("Protocol error: {0}. Ensure client and server versions are compatible")]
    Protocol(String),

    /// Sign-in failed or the session is no longer valid
    #[error("Authentication error: {0}. Please sign in again")]
    Authentication(String),

    /// Input rejected before any network call
    #[error("{0}")]
    Validation(#[from] validation::ValidationError),

    /// Question was empty or whitespace
    #[error("Please type or say a question, for example 'Who is my daughter?'")]
    EmptyQuery,

    /// A record that should exist does not
    #[error("{what} not found: {id}")]
    NotFound { what: String, id: String },

    /// No speech recognition on this platform
    #[error(
        "Speech recognition is not available here. Type your question instead, or pass --say with the words to use"
    )]
    SpeechUnavailable,

    /// Speech recognition started but failed
    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

impl RememberMeError {
    /// Whether retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout(_) => true,
            Self::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Whether the user should be sent back to the login screen
    pub fn requires_login(&self) -> bool {
        match self {
            Self::Authentication(_) => true,
            Self::Api { status, .. } => *status == 401,
            _ => false,
        }
    }
}

impl From<crate::config::ConfigError> for RememberMeError {
    fn from(err: crate::config::ConfigError) -> Self {
        RememberMeError::Configuration(err.to_string())
    }
}

/// Result type for RememberMe operations
pub type Result<T> = std::result::Result<T, RememberMeError>;

/// Build an assistant for `session` from the default configuration
pub async fn init_with_defaults(session: session::Session) -> Result<assistant::Assistant> {
    let config = config::ConfigBuilder::defaults().build()?;
    init(config, session).await
}

/// Build an assistant for `session` from `config`
///
/// Creates the configured data store, the backend client and a resolver with
/// any extra keywords from `resolver.extra_keywords`. Logging is left to the
/// caller, see [`logging::init`].
pub async fn init(
    config: config::RememberMeConfig,
    session: session::Session,
) -> Result<assistant::Assistant> {
    let store = store::create_data_store(&config.data, &session).await?;
    let backend = api::BackendClient::new(&config.backend)?;
    let resolver = resolver::RelationshipResolver::from_config(&config.resolver);

    tracing::debug!(
        patient_id = session.patient_id(),
        backend = %config.data.backend,
        "RememberMe initialized"
    );

    Ok(assistant::Assistant::new(store, session)
        .with_backend(backend)
        .with_resolver(resolver))
}
