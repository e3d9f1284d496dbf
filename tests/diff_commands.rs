use assert_fs::prelude::{FileWriteStr, PathChild};
use predicates::prelude::*;

mod common;

fn stage_and_commit(dir: &assert_fs::TempDir, message: &str) {
    common::nit_cmd(dir.path()).arg("add").arg(".").assert().success();
    common::nit_cmd_with_author(dir.path(), "Tester", "tester@example.com")
        .arg("commit")
        .arg("-m")
        .arg(message)
        .assert()
        .success();
}

#[test]
fn unstaged_edits_show_up_as_patches() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("poem.txt").write_str("roses are red\nviolets are blue\n")?;
    common::nit_cmd(dir.path()).arg("add").arg("poem.txt").assert().success();

    dir.child("poem.txt").write_str("roses are red\nviolets are violet\n")?;

    let mut sut = common::nit_cmd(dir.path());
    sut.env("NO_COLOR", "1").arg("diff");

    sut.assert()
        .success()
        .stdout(predicate::str::contains("diff --git a/poem.txt b/poem.txt"))
        .stdout(predicate::str::contains("--- a/poem.txt"))
        .stdout(predicate::str::contains("+++ b/poem.txt"))
        .stdout(predicate::str::contains("-violets are blue"))
        .stdout(predicate::str::contains("+violets are violet"))
        .stdout(predicate::str::contains(" roses are red"));

    Ok(())
}

#[test]
fn clean_working_tree_diffs_to_nothing() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("poem.txt").write_str("roses are red\n")?;
    common::nit_cmd(dir.path()).arg("add").arg("poem.txt").assert().success();

    let mut sut = common::nit_cmd(dir.path());
    sut.env("NO_COLOR", "1").arg("diff");

    sut.assert().success().stdout(predicate::str::is_empty());

    Ok(())
}

#[test]
fn cached_diff_compares_head_against_the_index() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("a.txt").write_str("alpha\n")?;
    stage_and_commit(&dir, "first");

    dir.child("b.txt").write_str("beta\n")?;
    common::nit_cmd(dir.path()).arg("add").arg("b.txt").assert().success();

    let mut sut = common::nit_cmd(dir.path());
    sut.env("NO_COLOR", "1").arg("diff").arg("--cached");

    sut.assert()
        .success()
        .stdout(predicate::str::contains("diff --git a/b.txt b/b.txt"))
        .stdout(predicate::str::contains("new file mode 100644"))
        .stdout(predicate::str::contains("--- /dev/null"))
        .stdout(predicate::str::contains("+beta"))
        // the committed, untouched file stays out of the patch
        .stdout(predicate::str::contains("a.txt").not());

    Ok(())
}

#[test]
fn deleted_file_diffs_against_dev_null() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("gone.txt").write_str("ephemeral\n")?;
    common::nit_cmd(dir.path()).arg("add").arg("gone.txt").assert().success();

    std::fs::remove_file(dir.child("gone.txt").path())?;

    let mut sut = common::nit_cmd(dir.path());
    sut.env("NO_COLOR", "1").arg("diff");

    sut.assert()
        .success()
        .stdout(predicate::str::contains("deleted file mode 100644"))
        .stdout(predicate::str::contains("+++ /dev/null"))
        .stdout(predicate::str::contains("-ephemeral"));

    Ok(())
}

#[test]
fn stat_mode_prints_aligned_rows_and_a_summary() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("short").write_str("a\nb\nc\n")?;
    dir.child("much_longer_name").write_str("x\n")?;
    common::nit_cmd(dir.path()).arg("add").arg(".").assert().success();

    dir.child("short").write_str("a\nB\nc\nd\n")?;
    dir.child("much_longer_name").write_str("y\n")?;

    let mut sut = common::nit_cmd(dir.path());
    sut.env("NO_COLOR", "1").arg("diff").arg("--stat");

    sut.assert()
        .success()
        .stdout(predicate::str::contains(" much_longer_name | 2 +-"))
        .stdout(predicate::str::contains(" short            | 3 ++-"))
        .stdout(predicate::str::contains(
            " 2 files changed, 3 insertions(+), 2 deletions(-)",
        ));

    Ok(())
}

#[test]
fn untracked_files_never_appear_in_the_diff() -> Result<(), Box<dyn std::error::Error>> {
    common::redirect_temp_dir();
    let dir = assert_fs::TempDir::new()?;
    common::init_repository(dir.path());

    dir.child("tracked.txt").write_str("tracked\n")?;
    common::nit_cmd(dir.path()).arg("add").arg("tracked.txt").assert().success();

    dir.child("stray.txt").write_str("stray\n")?;

    let mut sut = common::nit_cmd(dir.path());
    sut.env("NO_COLOR", "1").arg("diff");

    sut.assert().success().stdout(predicate::str::contains("stray").not());

    Ok(())
}
