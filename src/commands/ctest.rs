use crate::commands::CommandError;
use crate::process::{Invocation, ProcessError, run_interactive};
use crate::settings::Project;

/// Run the test suite for one configuration.
pub fn test(project: &Project, config: &str) -> Result<(), CommandError> {
    let build_dir = project.build_folder();
    let mut argv = vec![
        project.settings.ctest_binary.clone(),
        "-C".to_string(),
        config.to_string(),
    ];
    argv.extend(
        project
            .settings
            .ctest_command_line_args
            .split_whitespace()
            .map(str::to_string),
    );

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
