//! Per-project settings
//!
//! Loaded from `.cmake-builder.json` at the project root. Every field has a
//! default matching plain `cmake` usage, so the file is optional; a project
//! is only required to have a CMakeLists.txt.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no CMakeLists.txt in {path}")]
    NotACMakeProject { path: String },

    #[error("malformed settings file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Build folder, resolved against the project root unless absolute.
    pub build_folder: PathBuf,
    pub cmake_binary: String,
    pub ctest_binary: String,
    /// Generator passed to configure via `-G`; when unset, cmake picks and
    /// the reply index records the choice.
    pub generator: Option<String>,
    /// Generator platform passed via `-A` (Visual Studio family).
    pub generator_platform: Option<String>,
    /// Generator toolset entries rendered as `-Tkey=value,...`.
    pub generator_toolset: BTreeMap<String, String>,
    /// Cache overrides rendered as `-D KEY=VALUE`; booleans become ON/OFF.
    pub command_line_overrides: BTreeMap<String, Value>,
    /// Extra environment for every invoked process.
    pub env: BTreeMap<String, String>,
    pub silence_developer_warnings: bool,
    pub always_clear_cache_before_configure: bool,
    /// Extra arguments appended to every ctest invocation.
    pub ctest_command_line_args: String,
    /// Project descriptor file the generated build systems are merged into.
    pub project_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            build_folder: PathBuf::from("build"),
            cmake_binary: "cmake".to_string(),
            ctest_binary: "ctest".to_string(),
            generator: None,
            generator_platform: None,
            generator_toolset: BTreeMap::new(),
            command_line_overrides: BTreeMap::new(),
            env: BTreeMap::new(),
            silence_developer_warnings: false,
            always_clear_cache_before_configure: false,
            ctest_command_line_args: String::new(),
            project_file: PathBuf::from(".cmake-project.json"),
        }
    }
}

/// Settings plus the resolved project root.
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub settings: Settings,
}

impl Project {
    pub const SETTINGS_FILE: &'static str = ".cmake-builder.json";

    /// Load settings for a project root containing a CMakeLists.txt.
    pub fn load(root: &Path) -> Result<Self, SettingsError> {
        if !root.join("CMakeLists.txt").is_file() {
            return Err(SettingsError::NotACMakeProject {
                path: root.display().to_string(),
            });
        }
        let path = root.join(Self::SETTINGS_FILE);
        let settings = if path.is_file() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.display().to_string(),
                source,
            })?
        } else {
            Settings::default()
        };
        Ok(Self {
            root: root.to_path_buf(),
            settings,
        })
    }

    pub fn build_folder(&self) -> PathBuf {
        self.resolve(&self.settings.build_folder)
    }

    pub fn project_file(&self) -> PathBuf {
        self.resolve(&self.settings.project_file)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    /// Assemble the configure command line.
    pub fn configure_command(&self) -> Vec<String> {
        let settings = &self.settings;
        let mut cmd = vec![
            settings.cmake_binary.clone(),
            ".".to_string(),
            "-B".to_string(),
            self.build_folder().display().to_string(),
        ];
        if let Some(generator) = &settings.generator {
            cmd.push("-G".to_string());
            cmd.push(generator.clone());
        }
        if let Some(platform) = &settings.generator_platform {
            cmd.push("-A".to_string());
            cmd.push(platform.clone());
        }
        if !settings.generator_toolset.is_empty() {
            let items: Vec<String> = settings
                .generator_toolset
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            cmd.push(format!("-T{}", items.join(",")));
        }
        for (key, value) in &settings.command_line_overrides {
            let rendered = match value {
                Value::Bool(true) => "ON".to_string(),
                Value::Bool(false) => "OFF".to_string(),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            cmd.push("-D".to_string());
            cmd.push(format!("{key}={rendered}"));
        }
        if settings.silence_developer_warnings {
            cmd.push("-Wno-dev".to_string());
        }
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn cmake_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("CMakeLists.txt"), "project(x)\n").unwrap();
        dir
    }

    #[test]
    fn missing_cmakelists_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Project::load(dir.path()),
            Err(SettingsError::NotACMakeProject { .. })
        ));
    }

    #[test]
    fn defaults_apply_without_a_settings_file() {
        let dir = cmake_project();
        let project = Project::load(dir.path()).unwrap();
        assert_eq!(project.build_folder(), dir.path().join("build"));
        assert_eq!(project.settings.cmake_binary, "cmake");
        assert_eq!(
            project.configure_command(),
            vec![
                "cmake".to_string(),
                ".".to_string(),
                "-B".to_string(),
                dir.path().join("build").display().to_string(),
            ]
        );
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let dir = cmake_project();
        fs::write(
            dir.path().join(Project::SETTINGS_FILE),
            json!({
                "build_folder": "out",
                "generator": "Ninja",
                "silence_developer_warnings": true
            })
            .to_string(),
        )
        .unwrap();
        let project = Project::load(dir.path()).unwrap();
        assert_eq!(project.build_folder(), dir.path().join("out"));
        let cmd = project.configure_command();
        assert!(cmd.contains(&"-G".to_string()));
        assert!(cmd.contains(&"Ninja".to_string()));
        assert_eq!(cmd.last().unwrap(), "-Wno-dev");
    }

    #[test]
    fn malformed_settings_file_is_a_parse_error() {
        let dir = cmake_project();
        fs::write(dir.path().join(Project::SETTINGS_FILE), "{nope").unwrap();
        assert!(matches!(
            Project::load(dir.path()),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn overrides_render_booleans_as_cache_constants() {
        let dir = cmake_project();
        fs::write(
            dir.path().join(Project::SETTINGS_FILE),
            json!({
                "command_line_overrides": {
                    "BUILD_SHARED_LIBS": true,
                    "CMAKE_BUILD_TYPE": "Debug",
                    "FANCY_LEVEL": 3,
                    "WITH_TESTS": false
                }
            })
            .to_string(),
        )
        .unwrap();
        let project = Project::load(dir.path()).unwrap();
        let cmd = project.configure_command().join(" ");
        assert!(cmd.contains("-D BUILD_SHARED_LIBS=ON"));
        assert!(cmd.contains("-D CMAKE_BUILD_TYPE=Debug"));
        assert!(cmd.contains("-D FANCY_LEVEL=3"));
        assert!(cmd.contains("-D WITH_TESTS=OFF"));
    }

    #[test]
    fn toolset_entries_join_into_one_flag() {
        let dir = cmake_project();
        fs::write(
            dir.path().join(Project::SETTINGS_FILE),
            json!({
                "generator_platform": "x64",
                "generator_toolset": {"host": "x64", "version": "14.29"}
            })
            .to_string(),
        )
        .unwrap();
        let project = Project::load(dir.path()).unwrap();
        let cmd = project.configure_command();
        assert!(cmd.contains(&"-A".to_string()));
        assert!(cmd.contains(&"x64".to_string()));
        assert!(cmd.contains(&"-Thost=x64,version=14.29".to_string()));
    }
}
