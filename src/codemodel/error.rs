use std::fmt;
use thiserror::Error;

use crate::fileapi::FileApiError;

/// Failure while handling a single File API response.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to load {json_file}: {source}")]
    Load {
        json_file: String,
        #[source]
        source: FileApiError,
    },

    #[error("malformed {kind} document: {reason}")]
    Malformed { kind: &'static str, reason: String },
}

/// All per-response failures from one parse pass.
///
/// A malformed response must not abort the whole configure cycle silently:
/// every failure is collected and surfaced together, and no partial model is
/// handed out.
#[derive(Debug)]
pub struct AggregatedError {
    pub errors: Vec<ResponseError>,
}

impl std::error::Error for AggregatedError {}

impl fmt::Display for AggregatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error parsing {} response(s): ", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}
