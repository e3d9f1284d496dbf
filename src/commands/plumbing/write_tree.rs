use crate::areas::repository::Repository;
use crate::artifacts::tree_builder::SegmentTree;
use std::io::Write;

impl Repository {
    pub fn write_tree(&self) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        let segment_tree = SegmentTree::build(index.entries())?;
        let root_oid = segment_tree.materialize(&|tree| {
            self.database().store(tree)?;
            Ok(())
        })?;

        writeln!(self.writer(), "{root_oid}")?;

        Ok(())
    }
}
