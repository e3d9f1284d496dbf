use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;
use std::io::Write;

impl Repository {
    pub fn init(&self) -> anyhow::Result<()> {
        let reinit = self.paths().git_dir().exists();

        fs::create_dir_all(self.paths().objects_dir())
            .context("Failed to create .git/objects directory")?;

        if !reinit {
            self.refs()
                .init_head()
                .context("Failed to create initial HEAD reference")?;
        }

        let verb = if reinit { "Reinitialized existing" } else { "Initialized empty" };
        writeln!(
            self.writer(),
            "{verb} Git repository in {}",
            self.paths().git_dir().display()
        )?;

        Ok(())
    }
}
