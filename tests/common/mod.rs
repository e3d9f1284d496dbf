#![allow(dead_code)]

use assert_cmd::Command;
use std::path::Path;

const TMPDIR: &str = "../playground";

pub fn redirect_temp_dir() {
    unsafe {
        std::env::set_var("TMPDIR", TMPDIR);
    }

    // Ensure the TMPDIR exists
    if !Path::new(TMPDIR).exists() {
        std::fs::create_dir_all(TMPDIR).expect("Failed to create TMPDIR");
    }
}

/// A `nit` command rooted in the given directory
pub fn nit_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nit").expect("nit binary not built");
    cmd.current_dir(dir);
    cmd
}

/// A `nit` command with an author signature in its environment, as
/// `commit` requires
pub fn nit_cmd_with_author(dir: &Path, name: &str, email: &str) -> Command {
    let mut cmd = nit_cmd(dir);
    cmd.env("GIT_AUTHOR_NAME", name).env("GIT_AUTHOR_EMAIL", email);
    cmd
}

/// Initialize a fresh repository in the given directory
pub fn init_repository(dir: &Path) {
    nit_cmd(dir).arg("init").assert().success();
}
