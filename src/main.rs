mod cmake;
mod codemodel;
mod commands;
mod fileapi;
mod generators;
mod logging;
mod platform;
mod process;
mod project_data;
mod session;
mod settings;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use commands::CommandError;
use logging::{LogConfig, init_logging};
use platform::HostPlatform;
use session::RunSession;
use settings::Project;

/// CMake build-system integration driven by the File API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Project root containing CMakeLists.txt (defaults to current directory)
    #[arg(long, value_name = "DIR", global = true)]
    root: Option<PathBuf>,

    /// Log level (overrides RUST_LOG env var)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Log file path (overrides CMAKE_BUILDER_LOG_FILE env var)
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Configure the project and regenerate build systems from the reply tree
    Configure {
        /// Terminate a running invocation instead of starting a new one
        #[arg(long)]
        kill: bool,
    },
    /// Build one target
    Build {
        target: String,
        #[arg(long)]
        config: String,
        /// Terminate a running invocation instead of starting a new one
        #[arg(long)]
        kill: bool,
    },
    /// Build an executable target and run its artifact
    Run {
        target: String,
        #[arg(long)]
        config: String,
        /// Run under the platform's debugger front-end
        #[arg(long)]
        debug: bool,
        /// Command-line arguments for the artifact
        #[arg(long, value_name = "ARGS")]
        args: Option<String>,
    },
    /// Run the test suite for a configuration
    Test {
        #[arg(long)]
        config: String,
    },
    /// Remove CMake-generated files from the build folder
    ClearCache {
        /// Skip the confirmation prompt
        #[arg(long)]
        no_confirm: bool,
    },
    /// Check the cmake installation and project settings
    Diagnose,
}

fn main() {
    let args = Args::parse();

    let log_config =
        LogConfig::from_env().with_overrides(args.log_level.clone(), args.log_file.clone());
    if let Err(e) = init_logging(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let root = args.root.clone().unwrap_or_else(|| {
        std::env::current_dir().unwrap_or_else(|e| {
            eprintln!("Failed to get current directory: {e}");
            std::process::exit(1);
        })
    });

    if let Err(e) = dispatch(&args.command, &root) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn dispatch(command: &Command, root: &Path) -> Result<(), CommandError> {
    let platform = HostPlatform::current();
    let mut session = RunSession::new();

    match command {
        Command::Diagnose => commands::diagnose::diagnose(root),
        Command::Configure { kill } => {
            let project = Project::load(root)?;
            commands::configure::configure(&project, platform, *kill)
        }
        Command::Build {
            target,
            config,
            kill,
        } => {
            let project = Project::load(root)?;
            commands::build::build(&project, target, config, platform, *kill)
        }
        Command::Run {
            target,
            config,
            debug,
            args,
        } => {
            let project = Project::load(root)?;
            commands::run::run_target(
                &project,
                &mut session,
                target,
                config,
                *debug,
                args.as_deref(),
                platform,
            )
        }
        Command::Test { config } => {
            let project = Project::load(root)?;
            commands::ctest::test(&project, config)
        }
        Command::ClearCache { no_confirm } => {
            let project = Project::load(root)?;
            commands::clear_cache::clear_cache(&project, *no_confirm)
        }
    }
}
