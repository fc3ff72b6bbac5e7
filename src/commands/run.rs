use tracing::info;

use crate::codemodel::{ActionKind, parse, synthesize};
use crate::commands::CommandError;
use crate::fileapi::FileApi;
use crate::platform::HostPlatform;
use crate::process::{Invocation, ProcessError, run_interactive};
use crate::session::RunSession;
use crate::settings::Project;

/// Build an executable target and run its canonical artifact.
///
/// `--debug` wraps the artifact in the platform's debugger front-end.
/// Arguments come from the explicit flag or fall back to what the session
/// last confirmed.
pub fn run_target(
    project: &Project,
    session: &mut RunSession,
    target: &str,
    config: &str,
    debug: bool,
    args: Option<&str>,
    platform: HostPlatform,
) -> Result<(), CommandError> {
    let args = match args {
        Some(args) => {
            session.confirm(args);
            args.to_string()
        }
        None => session.initial_args().to_string(),
    };
    let debugger = if debug {
        Some(
            platform
                .debugger_prefix()
                .ok_or(CommandError::DebugUnsupported)?,
        )
    } else {
        None
    };

    let build_dir = project.build_folder();
    let file_api = FileApi::new(&build_dir);
    let index = file_api.load_index()?;
    let model = parse(&index, &file_api)?;
    let configuration = model
        .configurations
        .iter()
        .find(|c| c.name == config)
        .ok_or_else(|| CommandError::UnknownConfiguration(config.to_string()))?;
    if !configuration.targets.iter().any(|t| t.name == target) {
        return Err(CommandError::UnknownTarget {
            target: target.to_string(),
            config: config.to_string(),
        });
    }
    let actions = synthesize(configuration, platform);
    let artifact = actions
        .iter()
        .find(|a| a.kind == ActionKind::Run && a.build_target.as_deref() == Some(target))
        .and_then(|a| a.artifact.clone())
        .ok_or_else(|| CommandError::NoRunnableArtifact(target.to_string()))?;

    super::build::build(project, target, config, platform, false)?;

    let mut argv: Vec<String> = Vec::new();
    if let Some(prefix) = debugger {
        argv.extend(prefix.iter().map(|s| s.to_string()));
    }
    argv.push(build_dir.join(&artifact).display().to_string());
    argv.extend(args.split_whitespace().map(str::to_string));

    info!(target, artifact = %artifact, "running");
    let invocation = Invocation::new(argv, &build_dir).with_env(project.settings.env.clone());
    let status = run_interactive(&invocation)?;
    if !status.success() {
        return Err(CommandError::Process(ProcessError::Failed {
            command: invocation.display(),
            stderr: format!("exited with {status}"),
        }));
    }
    Ok(())
}
