//! Library side of the `mpo` binary: configuration lookup and the document
//! operations behind each subcommand.

pub mod report;

use std::path::{Path, PathBuf};

use mpo_common::config::{ConfigError, ConfigLoader};
use mpo_common::consts::DEFAULT_CONFIG_FILE;
use mpo_common::editor::EditorConfig;
use mpo_editor::{EditError, ExportRequest, PersistError, ProfileId, Session};
use thiserror::Error;
use tracing::{debug, info};

pub use report::{DocumentSummary, MotorSummary};

/// Failure of a CLI operation.
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Document read/write failed.
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// Edit rejected.
    #[error(transparent)]
    Edit(#[from] EditError),

    /// No motor with the requested name.
    #[error("No motor named '{0}'")]
    UnknownMotor(String),
}

/// Result alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Load `path`, or `./mpo.toml` when present, or the built-in defaults.
pub fn load_config(path: Option<&Path>) -> CliResult<EditorConfig> {
    let config = match path {
        Some(p) => EditorConfig::load(p)?,
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            if local.is_file() {
                EditorConfig::load(&local)?
            } else {
                EditorConfig::default()
            }
        }
    };
    config.validate()?;
    Ok(config)
}

/// Open `input` in a fresh session.
pub fn open(config: &EditorConfig, input: &Path) -> CliResult<Session> {
    let mut session = Session::new(config.clone());
    session.load(input)?;
    Ok(session)
}

/// Motors addressed by `name`, or all motors.
fn targets(session: &Session, name: Option<&str>) -> CliResult<Vec<ProfileId>> {
    match name {
        Some(n) => session
            .document()
            .profile_by_name(n)
            .map(|id| vec![id])
            .ok_or_else(|| CliError::UnknownMotor(n.to_string())),
        None => Ok(session.document().ids()),
    }
}

/// Run the repair sweep and return how many motors changed.
pub fn repair(session: &mut Session, motor: Option<&str>) -> CliResult<usize> {
    let mut changed = 0;
    for id in targets(session, motor)? {
        if session.repair(id)? {
            changed += 1;
        }
    }
    info!("Repaired {changed} motors");
    Ok(changed)
}

/// Export parameters: configuration first, then explicit overrides.
pub fn export_request(
    session: &Session,
    rate: Option<f64>,
    end: Option<f64>,
    id: Option<&str>,
) -> ExportRequest {
    let mut request = ExportRequest::from_config(&session.config().export, session.document());
    request.id = id.unwrap_or(session.document_id()).to_string();
    if let Some(rate) = rate {
        request.sample_rate_hz = rate;
    }
    if let Some(end) = end {
        request.end_time_ms = end;
    }
    debug!("Export request: {request:?}");
    request
}

// ─── Tests ──────────────────────────────────────────────────────────
