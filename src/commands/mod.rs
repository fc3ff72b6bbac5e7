//! CLI command implementations
//!
//! Each subcommand is a thin synchronous flow over the gateway, parser and
//! synthesizer; process-level failures abort the current command and surface
//! the captured error text verbatim.

pub mod build;
pub mod clear_cache;
pub mod configure;
pub mod ctest;
pub mod diagnose;
pub mod run;

use thiserror::Error;

use crate::cmake::CapabilitiesError;
use crate::codemodel::AggregatedError;
use crate::fileapi::FileApiError;
use crate::generators::UnsupportedGeneratorError;
use crate::process::{PidFile, ProcessError};
use crate::project_data::ProjectDataError;
use crate::settings::SettingsError;

/// Top-level failure of one CLI command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    FileApi(#[from] FileApiError),

    #[error(transparent)]
    Codemodel(#[from] AggregatedError),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Capabilities(#[from] CapabilitiesError),

    #[error(transparent)]
    Generator(#[from] UnsupportedGeneratorError),

    #[error(transparent)]
    ProjectData(#[from] ProjectDataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "cmake {version} has no File API support; version 3.15 or newer is required"
    )]
    FileApiUnsupported { version: String },

    #[error("reply index does not record the generator name; configure a generator")]
    GeneratorUnknown,

    #[error("no configuration named {0}; run configure first")]
    UnknownConfiguration(String),

    #[error("no target named {target} in configuration {config}")]
    UnknownTarget { target: String, config: String },

    #[error("target {0} has no unambiguous runnable artifact")]
    NoRunnableArtifact(String),

    #[error("debug runs are not supported on this platform")]
    DebugUnsupported,
}

/// Shared `--kill` handling: terminate the invocation recorded for the build
/// folder instead of starting a new one.
pub(crate) fn kill_in_flight(pidfile: &PidFile) -> Result<(), CommandError> {
    if pidfile.kill_recorded()? {
        println!("Terminated running invocation.");
    } else {
        println!("No running invocation to terminate.");
    }
    Ok(())
}
