use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Set to pin the hash when building outside a git checkout (source tarballs).
const HASH_OVERRIDE: &str = "WSLPASTE_BUILD_HASH";

fn main() {
    println!("cargo:rerun-if-env-changed={HASH_OVERRIDE}");
    let pinned = env::var(HASH_OVERRIDE).ok().filter(|s| !s.trim().is_empty());

    let hash = pinned.map(|s| s.trim().to_string()).unwrap_or_else(git_hash);
    println!("cargo:rustc-env=WSLPASTE_GIT_HASH={hash}");

    if let Some(git_dir) = git_dir() {
        rerun_if_exists(&git_dir.join("HEAD"));
        rerun_if_exists(&git_dir.join("refs"));
        // `git gc` moves refs here, which changes nothing under refs/.
        rerun_if_exists(&git_dir.join("packed-refs"));
    }
}

fn git_hash() -> String {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".into())
}

fn git_dir() -> Option<PathBuf> {
    if let Some(from_env) = env::var_os("GIT_DIR") {
        return Some(PathBuf::from(from_env));
    }

    let dot_git = PathBuf::from(".git");
    if dot_git.is_dir() {
        return Some(dot_git);
    }

    // Worktrees and submodules point at the real git dir from a `.git` file.
    let contents = fs::read_to_string(&dot_git).ok()?;
    let rest = contents.strip_prefix("gitdir:")?;
    let resolved = PathBuf::from(rest.trim());
    if resolved.is_relative() {
        Some(dot_git.parent().unwrap_or(Path::new(".")).join(resolved))
    } else {
        Some(resolved)
    }
}

fn rerun_if_exists(path: &Path) {
    if path.exists() {
        if let Some(display) = path.to_str() {
            println!("cargo:rerun-if-changed={display}");
        }
    }
}
