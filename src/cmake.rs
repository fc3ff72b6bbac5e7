//! Probing the cmake binary (`cmake -E capabilities`).

use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use crate::process::{CancelToken, Invocation, ProcessError, check_output};

#[derive(Debug, Error)]
pub enum CapabilitiesError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("malformed capabilities output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cmake reported an error loading capabilities")]
    Reported,
}

/// Parsed `cmake -E capabilities` output.
#[derive(Debug)]
pub struct Capabilities {
    raw: Value,
}

impl Capabilities {
    /// Ask the given cmake binary what it can do.
    pub fn probe(cmake_binary: &str, cwd: &Path) -> Result<Self, CapabilitiesError> {
        let invocation = Invocation::new(
            vec![
                cmake_binary.to_string(),
                "-E".to_string(),
                "capabilities".to_string(),
            ],
            cwd,
        );
        let output = check_output(&invocation, &CancelToken::new(), None)?;
        Self::from_json(serde_json::from_str(&output)?)
    }

    pub fn from_json(raw: Value) -> Result<Self, CapabilitiesError> {
        if raw.get("error").is_some() {
            return Err(CapabilitiesError::Reported);
        }
        Ok(Self { raw })
    }

    /// The File API exists from CMake 3.15 on.
    pub fn supports_file_api(&self) -> bool {
        self.raw.get("fileApi").is_some()
    }

    pub fn version_string(&self) -> Option<&str> {
        self.raw["version"]["string"].as_str()
    }
}
