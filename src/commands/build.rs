use regex::Regex;
use tracing::{debug, warn};

use crate::codemodel::generator_name;
use crate::commands::CommandError;
use crate::fileapi::FileApi;
use crate::generators::{GeneratorFamily, parse_diagnostic};
use crate::platform::HostPlatform;
use crate::process::{CancelToken, Invocation, PidFile, ProcessError, run};
use crate::settings::Project;

/// Build one target of one configuration.
pub fn build(
    project: &Project,
    target: &str,
    config: &str,
    platform: HostPlatform,
    kill: bool,
) -> Result<(), CommandError> {
    let build_dir = project.build_folder();
    let pidfile = PidFile::for_build_dir(&build_dir);
    if kill {
        return super::kill_in_flight(&pidfile);
    }

    let file_api = FileApi::new(&build_dir);
    let family = resolve_generator(project, &file_api)?;
    let pattern = family.diagnostic_regex(platform);
    debug!(
        syntax = family.syntax(platform),
        addressing = ?family.addressing(platform),
        "diagnostic format for build output"
    );

    let argv = vec![
        project.settings.cmake_binary.clone(),
        "--build".to_string(),
        ".".to_string(),
        "--config".to_string(),
        config.to_string(),
        "--target".to_string(),
        target.to_string(),
    ];
    let invocation = Invocation::new(argv, &build_dir).with_env(project.settings.env.clone());
    let output = run(&invocation, &CancelToken::new(), Some(&pidfile))?;
    print!("{}", output.stdout);
    eprint!("{}", output.stderr);
    report_diagnostics(&pattern, &output.stdout);
    report_diagnostics(&pattern, &output.stderr);

    if !output.success() {
        return Err(CommandError::Process(ProcessError::Failed {
            command: invocation.display(),
            stderr: output.stderr,
        }));
    }
    Ok(())
}

/// Generator for diagnostics: the configured one, or whatever the reply
/// index says cmake actually used.
fn resolve_generator(
    project: &Project,
    file_api: &FileApi,
) -> Result<GeneratorFamily, CommandError> {
    let name = match &project.settings.generator {
        Some(name) => name.clone(),
        None => {
            let index = file_api.load_index()?;
            generator_name(&index).ok_or(CommandError::GeneratorUnknown)?
        }
    };
    Ok(GeneratorFamily::from_name(&name)?)
}

fn report_diagnostics(pattern: &Regex, output: &str) {
    for line in output.lines() {
        if let Some(diagnostic) = parse_diagnostic(pattern, line) {
            match diagnostic.column {
                Some(column) => warn!(
                    file = %diagnostic.file,
                    line = diagnostic.line,
                    column,
                    "{}",
                    diagnostic.message
                ),
                None => warn!(
                    file = %diagnostic.file,
                    line = diagnostic.line,
                    "{}",
                    diagnostic.message
                ),
            }
        }
    }
}
