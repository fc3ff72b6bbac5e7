use std::path::Path;

use crate::cmake::Capabilities;
use crate::commands::CommandError;
use crate::settings::Project;

/// One diagnosis row: a check with either its current value or a suggestion.
struct Check {
    name: &'static str,
    value: Option<String>,
    suggestion: &'static str,
}

impl Check {
    fn ok(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name,
            value: Some(value.into()),
            suggestion: "",
        }
    }

    fn fail(name: &'static str, suggestion: &'static str) -> Self {
        Self {
            name,
            value: None,
            suggestion,
        }
    }

    fn render(&self) -> String {
        match &self.value {
            Some(value) => format!("[ok] {}: {}", self.name, value),
            None => format!("[!!] {}: {}", self.name, self.suggestion),
        }
    }
}

/// Check the cmake installation and project settings, and say what to fix.
pub fn diagnose(root: &Path) -> Result<(), CommandError> {
    let cmake_binary = Project::load(root)
        .map(|project| project.settings.cmake_binary)
        .unwrap_or_else(|_| "cmake".to_string());

    let mut checks = vec![Check::ok("cmake binary", &cmake_binary)];
    match Capabilities::probe(&cmake_binary, root) {
        Ok(capabilities) => {
            checks.push(Check::ok(
                "cmake version",
                capabilities.version_string().unwrap_or("unknown"),
            ));
            if capabilities.supports_file_api() {
                checks.push(Check::ok("File API", "supported"));
            } else {
                checks.push(Check::fail("File API", "install cmake 3.15 or newer"));
            }
            checks.extend(settings_checks(root));
        }
        Err(_) => {
            checks.push(Check::fail(
                "cmake present",
                "install cmake and put it on PATH",
            ));
        }
    }

    for check in &checks {
        println!("{}", check.render());
    }
    Ok(())
}

fn settings_checks(root: &Path) -> Vec<Check> {
    match Project::load(root) {
        Ok(project) => vec![
            Check::ok("CMakeLists.txt", "present"),
            Check::ok("build folder", project.build_folder().display().to_string()),
            Check::ok(
                "generator",
                project
                    .settings
                    .generator
                    .as_deref()
                    .unwrap_or("(cmake default)"),
            ),
            Check::ok("configure command", project.configure_command().join(" ")),
        ],
        Err(_) => vec![Check::fail(
            "CMakeLists.txt",
            "create a CMakeLists.txt at the project root",
        )],
    }
}
