use assert_fs::prelude::PathChild;
use predicates::prelude::predicate;

mod common;

#[test]
fn new_repository_initiated_with_git_directory() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    let dir_absolute_path = dir.path().canonicalize()?.display().to_string();

    let mut sut = common::nit_cmd(dir.path());
    sut.arg("init").arg(dir.path());

    sut.assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^Initialized empty Git repository in .+\n$",
        )?)
        .stdout(predicate::str::contains(dir_absolute_path));

    assert!(dir.child(".git/objects").path().is_dir());

    Ok(())
}

#[test]
fn fresh_head_points_at_default_branch() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    let head = std::fs::read_to_string(dir.child(".git/HEAD").path())?;
    assert_eq!(head.trim(), "ref: refs/heads/master");

    Ok(())
}

#[test]
fn second_init_reports_reinitialization_and_keeps_head() -> Result<(), Box<dyn std::error::Error>>
{
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    let head_before = std::fs::read_to_string(dir.child(".git/HEAD").path())?;

    let mut sut = common::nit_cmd(dir.path());
    sut.arg("init");
    sut.assert()
        .success()
        .stdout(predicate::str::contains("Reinitialized existing Git repository"));

    let head_after = std::fs::read_to_string(dir.child(".git/HEAD").path())?;
    assert_eq!(head_before, head_after);

    Ok(())
}
