//! Persisted project descriptor
//!
//! The synthesized build systems land in a JSON project descriptor that may
//! also hold entries the user wrote by hand. The merge only ever replaces
//! entries carrying our marker; everything else is preserved verbatim.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::codemodel::{ActionKind, BuildAction};

/// Marker identifying build-system entries generated by this tool.
pub const BUILD_SYSTEM_MARKER: &str = "cmake_build";

const RUN_TARGET: &str = "cmake_run";
const CTEST_TARGET: &str = "ctest_run";

#[derive(Debug, Error)]
pub enum ProjectDataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed project file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// One build-system entry as persisted in the project descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildSystem {
    pub name: String,
    pub config: String,
    /// Always [`BUILD_SYSTEM_MARKER`] for entries we own.
    pub target: String,
    pub cancel: CancelSpec,
    pub working_dir: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelSpec {
    pub kill: bool,
}

/// One selectable variant under a build system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub debug: bool,
}

fn is_false(value: &bool) -> bool {
    !value
}

impl Variant {
    pub fn from_action(action: &BuildAction) -> Self {
        match action.kind {
            ActionKind::Build => Self {
                name: action.display_name.clone(),
                build_target: action.build_target.clone(),
                target: None,
                artifact: None,
                debug: false,
            },
            ActionKind::Run | ActionKind::DebugRun => Self {
                name: action.display_name.clone(),
                build_target: action.build_target.clone(),
                target: Some(RUN_TARGET.to_string()),
                artifact: action.artifact.clone(),
                debug: action.kind == ActionKind::DebugRun,
            },
            ActionKind::Ctest => Self {
                name: action.display_name.clone(),
                build_target: None,
                target: Some(CTEST_TARGET.to_string()),
                artifact: None,
                debug: false,
            },
        }
    }
}

/// Assemble the persisted entry for one configuration's actions.
pub fn build_system_entry(
    config: &str,
    working_dir: &str,
    env: &BTreeMap<String, String>,
    generator: Option<&str>,
    actions: &[BuildAction],
) -> BuildSystem {
    BuildSystem {
        name: config.to_string(),
        config: config.to_string(),
        target: BUILD_SYSTEM_MARKER.to_string(),
        cancel: CancelSpec { kill: true },
        working_dir: working_dir.to_string(),
        env: env.clone(),
        generator: generator.map(str::to_string),
        variants: actions.iter().map(Variant::from_action).collect(),
    }
}

/// Merge generated entries into the descriptor at `path`.
///
/// Entries whose `target` is not ours are kept verbatim, as is every other
/// key in the descriptor; our previous entries are dropped and the new ones
/// appended. A missing descriptor file starts empty.
pub fn merge_into_project_file(
    path: &Path,
    generated: &[BuildSystem],
) -> Result<(), ProjectDataError> {
    let mut root: Map<String, Value> = if path.is_file() {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| ProjectDataError::Parse {
            path: path.display().to_string(),
            source,
        })?
    } else {
        Map::new()
    };

    let mut entries: Vec<Value> = root
        .get("build_systems")
        .and_then(Value::as_array)
        .map(|existing| {
            existing
                .iter()
                .filter(|entry| {
                    entry.get("target").and_then(Value::as_str) != Some(BUILD_SYSTEM_MARKER)
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    for entry in generated {
        let value = serde_json::to_value(entry).map_err(|source| ProjectDataError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        entries.push(value);
    }
    root.insert("build_systems".to_string(), Value::Array(entries));

    let mut rendered = serde_json::to_string_pretty(&Value::Object(root)).map_err(|source| {
        ProjectDataError::Parse {
            path: path.display().to_string(),
            source,
        }
    })?;
    rendered.push('\n');
    fs::write(path, rendered)?;
    debug!(path = %path.display(), count = generated.len(), "project data written");
    Ok(())
}
