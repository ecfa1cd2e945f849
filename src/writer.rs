//! Materializing a document tree on disk.
//!
//! Each node's file is written into its own folder before its children's
//! folders are created and filled. Nothing reads another node's file, so
//! the order is a convention only. Question files are referenced in place
//! and never copied.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{Role, StructuralNode};
use crate::render::render;

/// Files produced by a write, in the order they were written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub files: Vec<PathBuf>,
}

impl WriteSummary {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Write `node` and its whole subtree below `output_dir`.
///
/// Directories are created as needed and existing ones are reused. On
/// error, files already written stay on disk.
pub fn write_tree(node: &StructuralNode, output_dir: &Path) -> Result<WriteSummary> {
    if node.role == Role::Root && !node.questions.is_empty() {
        warn!(
            count = node.questions.len(),
            "questions at the top of the bank are not part of any chapter and are left out"
        );
    }

    let mut summary = WriteSummary::default();
    write_node(node, output_dir, &mut summary)?;
    Ok(summary)
}

fn write_node(node: &StructuralNode, output_dir: &Path, summary: &mut WriteSummary) -> Result<()> {
    let path = output_dir.join(node.file_name());
    debug!(path = %path.display(), "writing node");
    fs::write(&path, render(node, output_dir)).map_err(|e| Error::fs(&path, e))?;
    summary.files.push(path);

    for child in &node.children {
        let child_dir = output_dir.join(child.folder_name());
        fs::create_dir_all(&child_dir).map_err(|e| Error::fs(&child_dir, e))?;
        write_node(child, &child_dir, summary)?;
    }
    Ok(())
}

/// The files [`write_tree`] would produce, without touching the filesystem.
pub fn plan_outputs(node: &StructuralNode, output_dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    plan_node(node, output_dir, &mut files);
    files
}

fn plan_node(node: &StructuralNode, output_dir: &Path, files: &mut Vec<PathBuf>) {
    files.push(output_dir.join(node.file_name()));
    for child in &node.children {
        plan_node(child, &output_dir.join(child.folder_name()), files);
    }
}
