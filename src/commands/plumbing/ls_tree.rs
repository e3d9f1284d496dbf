use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use std::io::Write;

impl Repository {
    pub fn ls_tree(&self, sha: &str) -> anyhow::Result<()> {
        let oid = if sha == "HEAD" {
            self.refs()
                .read_head()?
                .context("HEAD does not point at a commit yet")?
        } else {
            ObjectId::try_parse(sha.to_string())?
        };

        let tree = self.database().load_tree_ish(&oid)?;
        for entry in tree.entries() {
            writeln!(
                self.writer(),
                "{:0>6} {} {}\t{}",
                entry.mode().as_str(),
                entry.object_type(),
                entry.oid(),
                entry.name()
            )?;
        }

        Ok(())
    }
}
