//! Building the document tree from a question bank directory.
//!
//! Each directory becomes one structural node whose role is fixed by its
//! depth. Question files attach to the node of the directory holding them;
//! subdirectories below the deepest mapped level are skipped.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::model::{LevelMap, StructuralNode};
use crate::resource::{self, CATEGORY_DESCRIPTOR, RESOURCE_EXTENSION};
use crate::source::{SourceEntry, SourceTree};

/// Order in which directory entries are visited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EntryOrder {
    /// Whatever order the source lists them in.
    #[default]
    Listing,
    /// Byte-wise by name, for output that does not depend on the platform.
    Sorted,
}

/// Configuration for tree building.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub level_map: LevelMap,
    /// File name of the per-directory category descriptor.
    pub descriptor_name: String,
    /// Extension (without dot) of question files.
    pub resource_extension: String,
    pub entry_order: EntryOrder,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            level_map: LevelMap::default(),
            descriptor_name: CATEGORY_DESCRIPTOR.to_string(),
            resource_extension: RESOURCE_EXTENSION.to_string(),
            entry_order: EntryOrder::default(),
        }
    }
}

impl BuildConfig {
    pub fn with_level_map(mut self, level_map: LevelMap) -> Self {
        self.level_map = level_map;
        self
    }

    pub fn with_entry_order(mut self, entry_order: EntryOrder) -> Self {
        self.entry_order = entry_order;
        self
    }

    pub fn with_descriptor_name(mut self, name: impl Into<String>) -> Self {
        self.descriptor_name = name.into();
        self
    }

    pub fn with_resource_extension(mut self, extension: impl Into<String>) -> Self {
        self.resource_extension = extension.into();
        self
    }
}

/// Walks a [`SourceTree`] and assembles a [`StructuralNode`] tree.
#[derive(Debug)]
pub struct TreeBuilder<S> {
    source: S,
    config: BuildConfig,
}

impl<S: SourceTree> TreeBuilder<S> {
    /// Create a builder with the default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, BuildConfig::default())
    }

    pub fn with_config(source: S, config: BuildConfig) -> Self {
        Self { source, config }
    }

    /// Build the whole tree rooted at `dir`.
    ///
    /// `title` is used for the root unless `dir` carries a category
    /// descriptor.
    pub fn build(&self, dir: &Path, title: &str) -> Result<StructuralNode> {
        self.build_at(dir, title, 0)
    }

    /// Build the node for `dir` at `depth`, recursing into subdirectories
    /// while deeper levels are mapped.
    ///
    /// `provisional_title` is used when `dir` has no category descriptor; a
    /// descriptor that exists but cannot be parsed fails the build.
    pub fn build_at(&self, dir: &Path, provisional_title: &str, depth: usize) -> Result<StructuralNode> {
        let mut entries = self.source.list(dir)?;
        if self.config.entry_order == EntryOrder::Sorted {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }

        let descriptor = &self.config.descriptor_name;
        let title = if entries.iter().any(|e| !e.is_dir() && &e.name == descriptor) {
            let path = dir.join(descriptor);
            let bytes = self.source.read(&path)?;
            resource::parse_category_title(&bytes, &path)?
        } else {
            provisional_title.to_string()
        };

        let level_map = &self.config.level_map;
        let role = level_map.role_at(depth).ok_or_else(|| {
            Error::Config(format!(
                "depth {depth} is deeper than the level map allows ({})",
                level_map.max_depth()
            ))
        })?;
        let mut node = StructuralNode::new(role, title, "");
        if node.slug.is_empty() {
            return Err(Error::EmptySlug {
                path: dir.to_path_buf(),
                title: node.title,
            });
        }
        debug!(dir = %dir.display(), ?role, title = %node.title, "building node");

        for entry in &entries {
            let path = dir.join(&entry.name);
            if entry.is_dir() {
                if depth < level_map.max_depth() {
                    let child = self.build_at(&path, &entry.name, depth + 1)?;
                    node.add_child(child);
                } else {
                    debug!(dir = %path.display(), "skipping directory below deepest level");
                }
            } else if self.is_resource(entry) {
                node.add_question(resource::load_question(&self.source, &path)?);
            } else {
                trace!(file = %path.display(), "ignoring file");
            }
        }

        warn_on_slug_collisions(&node);
        Ok(node)
    }

    /// Files named `<stem>.<resource_extension>`, matched case-sensitively,
    /// other than the descriptor.
    fn is_resource(&self, entry: &SourceEntry) -> bool {
        let extension = &self.config.resource_extension;
        entry.name != self.config.descriptor_name
            && entry
                .name
                .strip_suffix(extension.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
    }
}

/// Siblings sharing a slug would overwrite each other's output.
fn warn_on_slug_collisions(node: &StructuralNode) {
    let mut seen = HashSet::new();
    for child in &node.children {
        if !seen.insert(child.slug.as_str()) {
            warn!(
                parent = %node.title,
                slug = %child.slug,
                "sibling nodes share a slug; their output paths collide"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use crate::source::MemorySource;

    fn question(name: &str) -> String {
        format!("<quiz><question type=\"stack\"><name><text>{name}</text></name></question></quiz>")
    }

    fn category(path: &str) -> String {
        format!(
            "<quiz><question type=\"category\"><category><text>{path}</text></category></question></quiz>"
        )
    }

    #[test]
    fn test_questions_keep_listing_order() {
        let mut source = MemorySource::new();
        source
            .add_file("bank/q2.xml", question("Two"))
            .add_file("bank/q1.xml", question("One"));

        let root = TreeBuilder::new(source).build(Path::new("bank"), "Book").unwrap();
        let titles: Vec<_> = root.questions.iter().map(|q| q.title_markup.as_str()).collect();
        assert_eq!(titles, ["<title>Two</title>", "<title>One</title>"]);
    }

    #[test]
    fn test_sorted_entry_order() {
        let mut source = MemorySource::new();
        source
            .add_file("bank/q2.xml", question("Two"))
            .add_file("bank/q1.xml", question("One"));

        let config = BuildConfig::default().with_entry_order(EntryOrder::Sorted);
        let root = TreeBuilder::with_config(source, config)
            .build(Path::new("bank"), "Book")
            .unwrap();
        assert_eq!(root.questions[0].title_markup, "<title>One</title>");
    }

    #[test]
    fn test_descriptor_overrides_directory_name() {
        let mut source = MemorySource::new();
        source.add_file("bank/Unit 7/gitsync_category.xml", category("A/B/Sales"));

        let root = TreeBuilder::new(source).build(Path::new("bank"), "Book").unwrap();
        assert_eq!(root.children[0].title, "Sales");
        assert_eq!(root.children[0].slug, "sales");
        assert!(root.children[0].questions.is_empty());
    }

    #[test]
    fn test_descriptor_overrides_root_title() {
        let mut source = MemorySource::new();
        source.add_file("bank/gitsync_category.xml", category("$course$/top"));

        let root = TreeBuilder::new(source).build(Path::new("bank"), "Book").unwrap();
        assert_eq!(root.title, "top");
    }

    #[test]
    fn test_missing_descriptor_falls_back_to_directory_name() {
        let mut source = MemorySource::new();
        source.add_dir("bank/Revenue Trends");

        let root = TreeBuilder::new(source).build(Path::new("bank"), "Book").unwrap();
        assert_eq!(root.title, "Book");
        assert_eq!(root.children[0].title, "Revenue Trends");
        assert_eq!(root.children[0].slug, "revenue-trends");
    }

    #[test]
    fn test_malformed_descriptor_is_fatal() {
        let mut source = MemorySource::new();
        source
            .add_file("bank/Unit/gitsync_category.xml", "<quiz><question/></quiz>")
            .add_file("bank/Unit/q.xml", question("Q"));

        let err = TreeBuilder::new(source).build(Path::new("bank"), "Book");
        assert!(matches!(err, Err(Error::ResourceParse { .. })));
    }

    #[test]
    fn test_malformed_question_is_fatal() {
        let mut source = MemorySource::new();
        source.add_file("bank/q.xml", "<not-a-quiz/>");

        let err = TreeBuilder::new(source).build(Path::new("bank"), "Book");
        assert!(matches!(err, Err(Error::ResourceParse { .. })));
    }

    #[test]
    fn test_roles_follow_depth() {
        let mut source = MemorySource::new();
        source.add_file("bank/a/b/c/q.xml", question("Deep"));

        let root = TreeBuilder::new(source).build(Path::new("bank"), "Book").unwrap();
        let chapter = &root.children[0];
        let section = &chapter.children[0];
        let subsection = &section.children[0];
        assert_eq!(root.role, Role::Root);
        assert_eq!(chapter.role, Role::Chapter);
        assert_eq!(section.role, Role::Section);
        assert_eq!(subsection.role, Role::Subsection);
        assert_eq!(subsection.questions.len(), 1);
    }

    #[test]
    fn test_directories_below_subsection_are_ignored() {
        let mut source = MemorySource::new();
        source
            .add_file("bank/a/b/c/q.xml", question("Kept"))
            .add_file("bank/a/b/c/d/q.xml", question("Dropped"));

        let root = TreeBuilder::new(source).build(Path::new("bank"), "Book").unwrap();
        let subsection = &root.children[0].children[0].children[0];
        assert!(subsection.children.is_empty());
        assert_eq!(subsection.questions.len(), 1);
        assert_eq!(root.depth(), 4);
        assert_eq!(root.question_count(), 1);
    }

    #[test]
    fn test_custom_level_map_limits_depth() {
        let mut source = MemorySource::new();
        source.add_file("bank/a/b/q.xml", question("Q"));

        let level_map = LevelMap::new(vec![Role::Root, Role::Chapter]).unwrap();
        let config = BuildConfig::default().with_level_map(level_map);
        let root = TreeBuilder::with_config(source, config)
            .build(Path::new("bank"), "Book")
            .unwrap();
        assert_eq!(root.depth(), 2);
        assert!(root.children[0].children.is_empty());
    }

    #[test]
    fn test_unrecognized_files_are_skipped() {
        let mut source = MemorySource::new();
        source
            .add_file("bank/notes.txt", "hello")
            .add_file("bank/image.png", vec![0x89, 0x50])
            .add_file("bank/xml", "not a resource")
            .add_file("bank/q.xml", question("Q"));

        let root = TreeBuilder::new(source).build(Path::new("bank"), "Book").unwrap();
        assert_eq!(root.questions.len(), 1);
    }

    #[test]
    fn test_descriptor_is_not_a_question() {
        let mut source = MemorySource::new();
        source.add_file("bank/gitsync_category.xml", category("top/Book"));

        let root = TreeBuilder::new(source).build(Path::new("bank"), "Ignored").unwrap();
        assert!(root.questions.is_empty());
        assert_eq!(root.title, "Book");
    }

    #[test]
    fn test_unmapped_depth_is_config_error() {
        let mut source = MemorySource::new();
        source.add_dir("bank");

        let err = TreeBuilder::new(source).build_at(Path::new("bank"), "Deep", 4);
        assert!(matches!(err, Err(Error::Config(_))));
    }

    #[test]
    fn test_non_ascii_directory_names_are_transliterated() {
        let mut source = MemorySource::new();
        source
            .add_file("bank/统计/q.xml", question("Q"))
            .add_dir("bank/Über");

        let root = TreeBuilder::new(source).build(Path::new("bank"), "Book").unwrap();
        assert_eq!(root.children[0].title, "统计");
        assert_eq!(root.children[0].slug, "tong-ji");
        assert_eq!(root.children[0].identifier(), "ch-tong-ji");
        assert_eq!(root.children[0].rel_path(), "tong-ji/tong-ji.ptx");
        assert_eq!(root.children[1].slug, "uber");
    }

    #[test]
    fn test_non_ascii_descriptor_title_is_transliterated() {
        let mut source = MemorySource::new();
        source.add_file("bank/u1/gitsync_category.xml", category("top/数学"));

        let root = TreeBuilder::new(source).build(Path::new("bank"), "Book").unwrap();
        assert_eq!(root.children[0].title, "数学");
        assert!(!root.children[0].slug.is_empty());
        assert!(!root.children[0].rel_path().starts_with('/'));
    }

    #[test]
    fn test_directory_without_slug_is_rejected() {
        let mut source = MemorySource::new();
        source.add_file("bank/!!!/q.xml", question("Q"));

        let err = TreeBuilder::new(source).build(Path::new("bank"), "Book");
        match err {
            Err(Error::EmptySlug { path, title }) => {
                assert_eq!(path, Path::new("bank/!!!"));
                assert_eq!(title, "!!!");
            }
            other => panic!("expected EmptySlug, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_descriptor_name() {
        let mut source = MemorySource::new();
        source
            .add_file("bank/Unit/category.xml", category("top/Sales"))
            .add_file("bank/Unit/gitsync_category.xml", question("Now a question"));

        let config = BuildConfig::default().with_descriptor_name("category.xml");
        let root = TreeBuilder::with_config(source, config)
            .build(Path::new("bank"), "Book")
            .unwrap();
        let unit = &root.children[0];
        assert_eq!(unit.title, "Sales");
        assert_eq!(unit.questions.len(), 1);
        assert_eq!(unit.questions[0].title_markup, "<title>Now a question</title>");
    }

    #[test]
    fn test_custom_resource_extension() {
        let mut source = MemorySource::new();
        source
            .add_file("bank/a.stack", question("Kept"))
            .add_file("bank/b.xml", question("Not a resource"))
            .add_file("bank/c.STACK", question("Wrong case"))
            .add_file("bank/stack", question("No stem"))
            .add_file("bank/dstack", question("No dot"));

        let config = BuildConfig::default().with_resource_extension("stack");
        let root = TreeBuilder::with_config(source, config)
            .build(Path::new("bank"), "Book")
            .unwrap();
        let titles: Vec<_> = root.questions.iter().map(|q| q.title_markup.as_str()).collect();
        assert_eq!(titles, ["<title>Kept</title>"]);
    }

    #[test]
    fn test_multi_part_resource_extension() {
        let mut source = MemorySource::new();
        source
            .add_file("bank/a.q.xml", question("Kept"))
            .add_file("bank/b.xml", question("Plain"));

        let config = BuildConfig::default().with_resource_extension("q.xml");
        let root = TreeBuilder::with_config(source, config)
            .build(Path::new("bank"), "Book")
            .unwrap();
        assert_eq!(root.questions.len(), 1);
        assert_eq!(root.questions[0].source_path, Path::new("bank/a.q.xml"));
    }

    #[test]
    fn test_missing_root_is_filesystem_error() {
        let err = TreeBuilder::new(MemorySource::new()).build(Path::new("bank"), "Book");
        assert!(matches!(err, Err(Error::Filesystem { .. })));
    }
}
