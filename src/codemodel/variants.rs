use thiserror::Error;
use tracing::warn;

use crate::codemodel::model::{Configuration, Target};
use crate::platform::HostPlatform;

/// What a synthesized action does when invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Build,
    Run,
    DebugRun,
    Ctest,
}

/// One invocable unit surfaced to the user.
///
/// Actions are owned by the configuration they were synthesized for and are
/// regenerated wholesale on every configure cycle; nothing merges at this
/// level.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildAction {
    pub display_name: String,
    pub build_target: Option<String>,
    pub kind: ActionKind,
    pub artifact: Option<String>,
    pub config: String,
}

/// An EXECUTABLE target without exactly one canonical artifact.
///
/// Non-fatal: run and debug variants are skipped for the target and the
/// ambiguity is logged.
#[derive(Debug, Error)]
#[error("target {target}: {count} artifact(s) match nameOnDisk {name_on_disk:?}")]
pub struct AmbiguousArtifact {
    pub target: String,
    pub name_on_disk: String,
    pub count: usize,
}

/// Turn one configuration into its ordered action list.
///
/// Order is fixed: for each target in declared order a build action, then for
/// runnable executables a run action and (when the platform has a debugger
/// front-end) a debug action, and a single ctest action at the end.
pub fn synthesize(configuration: &Configuration, platform: HostPlatform) -> Vec<BuildAction> {
    let mut actions = Vec::new();
    for target in &configuration.targets {
        actions.push(BuildAction {
            display_name: target.name.clone(),
            build_target: Some(target.name.clone()),
            kind: ActionKind::Build,
            artifact: None,
            config: configuration.name.clone(),
        });
        if target.kind.is_executable() {
            synthesize_run_actions(&mut actions, configuration, target, platform);
        }
    }
    actions.push(BuildAction {
        display_name: "ctest".to_string(),
        build_target: None,
        kind: ActionKind::Ctest,
        artifact: None,
        config: configuration.name.clone(),
    });
    actions
}

fn synthesize_run_actions(
    actions: &mut Vec<BuildAction>,
    configuration: &Configuration,
    target: &Target,
    platform: HostPlatform,
) {
    let Some(name_on_disk) = target.name_on_disk.as_deref() else {
        warn!(target = %target.name, "executable without nameOnDisk, skipping run variants");
        return;
    };
    let matches: Vec<&String> = target
        .artifacts
        .iter()
        .filter(|path| is_canonical_artifact(path, name_on_disk))
        .collect();
    if matches.len() != 1 {
        warn!(
            error = %AmbiguousArtifact {
                target: target.name.clone(),
                name_on_disk: name_on_disk.to_string(),
                count: matches.len(),
            },
            "skipping run variants"
        );
        return;
    }
    let artifact = matches[0].clone();
    actions.push(BuildAction {
        display_name: format!("Run: {}", target.name),
        build_target: Some(target.name.clone()),
        kind: ActionKind::Run,
        artifact: Some(artifact.clone()),
        config: configuration.name.clone(),
    });
    if let Some(debugger) = platform.debugger_name() {
        actions.push(BuildAction {
            display_name: format!("Run under {debugger}: {}", target.name),
            build_target: Some(target.name.clone()),
            kind: ActionKind::DebugRun,
            artifact: Some(artifact),
            config: configuration.name.clone(),
        });
    }
}

/// Whether `path` names the target's primary binary.
///
/// The file name must equal `name_on_disk`, and the name must not recur
/// earlier in the path: a recurring name means the file sits inside a bundle
/// directory derived from the binary, like `app.dSYM/app` on macOS, which is
/// a debug-symbol copy rather than the output itself.
fn is_canonical_artifact(path: &str, name_on_disk: &str) -> bool {
    let Some(prefix) = path.strip_suffix(name_on_disk) else {
        return false;
    };
    (prefix.is_empty() || prefix.ends_with('/')) && !prefix.contains(name_on_disk)
}
