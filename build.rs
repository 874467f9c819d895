use std::process::Command;

const TAG_OVERRIDE_ENV: &str = "FRUIT_PRICE_RELEASE_TAG";

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed={TAG_OVERRIDE_ENV}");

    // Release pipelines build from tarballs without .git, so they pass the tag in.
    let tag = std::env::var(TAG_OVERRIDE_ENV)
        .ok()
        .filter(|tag| !tag.trim().is_empty())
        .or_else(latest_git_tag);

    if let Some(tag) = tag {
        println!("cargo:rustc-env=GIT_TAG={}", tag.trim());
    }
}

fn latest_git_tag() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--abbrev=0"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let tag = String::from_utf8(output.stdout).ok()?;
    let tag = tag.trim();
    (!tag.is_empty()).then(|| tag.to_string())
}
