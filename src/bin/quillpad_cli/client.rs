#![deny(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use quillpad::application::posts::PostViewError;
use quillpad::application::repos::ApiError;
use quillpad::application::session::{SessionError, SessionManager};
use quillpad::config::{self, LoadError, Settings};
use quillpad::domain::session::AuthSession;
use quillpad::infra::error::InfraError;
use quillpad::infra::http::ApiClient;
use quillpad::infra::storage::FileSessionStorage;
use thiserror::Error;

use crate::args::Cli;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Telemetry(#[from] InfraError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Posts(#[from] PostViewError),
    #[error("password is required (use --password-file or QUILLPAD_PASSWORD)")]
    MissingPassword,
    #[error("failed to read input file {path}: {source}")]
    InputFile {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to render output: {0}")]
    Output(String),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Everything a handler needs: settings, the backend and the session.
pub struct Ctx {
    pub settings: Settings,
    pub api: Arc<ApiClient>,
    pub session: SessionManager,
}

impl Ctx {
    pub fn new(settings: Settings) -> Result<Self, CliError> {
        let api = Arc::new(ApiClient::new(
            settings.api.base_url.as_str(),
            settings.api.timeout,
        )?);
        let storage = Arc::new(FileSessionStorage::new(settings.session.path.clone()));
        let session = SessionManager::init(api.clone(), storage);
        Ok(Self {
            settings,
            api,
            session,
        })
    }

    pub fn auth(&self) -> Option<AuthSession> {
        self.session.current()
    }
}

pub fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    Ok(config::load(&cli.config)?)
}
