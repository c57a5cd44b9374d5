use std::process::Command;

/// First line of `git <args>`, if git ran and printed something.
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    stdout
        .lines()
        .next()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}

fn main() {
    let commit = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".into());
    let branch = git(&["branch", "--show-current"]).unwrap_or_else(|| "detached".into());

    println!("cargo:rustc-env=PYTHONUP_GIT_COMMIT={}", commit);
    println!("cargo:rustc-env=PYTHONUP_GIT_BRANCH={}", branch);

    // Only tagged checkouts report a bare release version
    if let Some(tag) = git(&["tag", "--points-at", "HEAD"]) {
        println!("cargo:rustc-env=PYTHONUP_GIT_TAG={}", tag);
    }

    for watched in [".git/HEAD", ".git/refs/"] {
        println!("cargo:rerun-if-changed={}", watched);
    }
}
