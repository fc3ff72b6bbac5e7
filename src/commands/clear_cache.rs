use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::commands::CommandError;
use crate::settings::Project;

// Everything under CMakeFiles goes anyway; these live next to it.
const TRY_TO_REMOVE: &[&str] = &["CMakeCache.txt", "cmake_install.cmake"];

/// Remove CMake-generated files from the build folder.
///
/// Prints the removal list and asks first unless confirmation is suppressed.
/// Individual removal failures are logged and skipped, not fatal.
pub fn clear_cache(project: &Project, no_confirm: bool) -> Result<(), CommandError> {
    let build_dir = project.build_folder();
    let (files, dirs) = collect_removals(&build_dir);
    if files.is_empty() && dirs.is_empty() {
        println!("Nothing to clear in {}", build_dir.display());
        return Ok(());
    }
    if !no_confirm && !confirm(&files, &dirs)? {
        println!("Aborted.");
        return Ok(());
    }
    remove(&files, &dirs);
    println!("Cleared CMake cache files.");
    Ok(())
}

fn collect_removals(build_dir: &Path) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    let cmakefiles = build_dir.join("CMakeFiles");
    if cmakefiles.is_dir() {
        // contents_first so every directory comes after what it contains
        for entry in WalkDir::new(&cmakefiles)
            .contents_first(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            } else {
                files.push(entry.into_path());
            }
        }
    }
    for name in TRY_TO_REMOVE {
        let path = build_dir.join(name);
        if path.exists() {
            files.push(path);
        }
    }
    (files, dirs)
}

fn confirm(files: &[PathBuf], dirs: &[PathBuf]) -> Result<bool, CommandError> {
    println!("Files to remove:");
    for path in files.iter().chain(dirs.iter()) {
        println!("  {}", path.display());
    }
    print!("Proceed? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn remove(files: &[PathBuf], dirs: &[PathBuf]) {
    for file in files {
        if let Err(e) = fs::remove_file(file) {
            warn!(path = %file.display(), "cannot remove: {e}");
        }
    }
    for dir in dirs {
        if let Err(e) = fs::remove_dir(dir) {
            warn!(path = %dir.display(), "cannot remove: {e}");
        }
    }
}
