use regex::Regex;
use tracing::{info, warn};

use crate::cmake::Capabilities;
use crate::codemodel::{parse, synthesize};
use crate::commands::CommandError;
use crate::fileapi::FileApi;
use crate::generators::configure_diagnostic_pattern;
use crate::platform::HostPlatform;
use crate::process::{CancelToken, Invocation, PidFile, check_output};
use crate::project_data::{build_system_entry, merge_into_project_file};
use crate::settings::Project;

/// Configure the project and regenerate build systems from the reply tree.
///
/// The query is staged before cmake runs; once cmake exits cleanly the reply
/// index is located, the codemodel translated, and the synthesized build
/// systems merged into the project descriptor.
pub fn configure(
    project: &Project,
    platform: HostPlatform,
    kill: bool,
) -> Result<(), CommandError> {
    let build_dir = project.build_folder();
    let pidfile = PidFile::for_build_dir(&build_dir);
    if kill {
        return super::kill_in_flight(&pidfile);
    }

    let capabilities = Capabilities::probe(&project.settings.cmake_binary, &project.root)?;
    if !capabilities.supports_file_api() {
        return Err(CommandError::FileApiUnsupported {
            version: capabilities
                .version_string()
                .unwrap_or("unknown")
                .to_string(),
        });
    }

    if project.settings.always_clear_cache_before_configure {
        super::clear_cache::clear_cache(project, true)?;
    }

    let file_api = FileApi::new(&build_dir);
    file_api.ensure_query_written()?;

    info!("generating build system");
    let invocation = Invocation::new(project.configure_command(), &project.root)
        .with_env(project.settings.env.clone());
    let stdout = check_output(&invocation, &CancelToken::new(), Some(&pidfile))?;
    print!("{stdout}");
    report_cmake_diagnostics(&stdout);

    translate(project, &file_api, platform)
}

fn report_cmake_diagnostics(output: &str) {
    // Fixed table entry, compilation cannot fail.
    let pattern = Regex::new(configure_diagnostic_pattern()).expect("fixed diagnostic pattern");
    for line in output.lines() {
        if let Some(captures) = pattern.captures(line) {
            warn!(file = &captures[1], line = &captures[2], "cmake diagnostic");
        }
    }
}

fn translate(
    project: &Project,
    file_api: &FileApi,
    platform: HostPlatform,
) -> Result<(), CommandError> {
    info!("translating file api response");
    let index = file_api.load_index()?;
    let model = parse(&index, file_api)?;

    let working_dir = project.build_folder().display().to_string();
    let generator = project
        .settings
        .generator
        .as_deref()
        .or(model.generator.as_deref());

    let mut entries = Vec::new();
    for configuration in &model.configurations {
        let actions = synthesize(configuration, platform);
        entries.push(build_system_entry(
            &configuration.name,
            &working_dir,
            &project.settings.env,
            generator,
            &actions,
        ));
    }
    merge_into_project_file(&project.project_file(), &entries)?;
    println!(
        "Generated {} build system(s) in {}",
        entries.len(),
        project.project_file().display()
    );
    Ok(())
}
