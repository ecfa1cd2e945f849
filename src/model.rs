//! Document tree: structural nodes, question leaves and node roles.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::slug::slugify;

/// File name of the root document.
pub const ROOT_FILE_NAME: &str = "main.ptx";

/// Extension of every generated file.
pub const OUTPUT_EXTENSION: &str = "ptx";

/// Deepest level the document format supports (Root + three).
pub const MAX_LEVELS: usize = 4;

/// Structural role of a node, fixed by its depth in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "snake_case"))]
pub enum Role {
    Root,
    Chapter,
    Section,
    Subsection,
}

impl Role {
    /// PreTeXt element the node renders as.
    pub fn element_name(self) -> &'static str {
        match self {
            Role::Root => "book",
            Role::Chapter => "chapter",
            Role::Section => "section",
            Role::Subsection => "subsection",
        }
    }

    /// Prefix prepended to the slug to form the `xml:id`.
    pub fn id_prefix(self) -> &'static str {
        match self {
            Role::Root => "",
            Role::Chapter => "ch-",
            Role::Section => "sec-",
            Role::Subsection => "subsec-",
        }
    }
}

/// The identifier embedded in a node's rendered form.
pub fn identifier_for(role: Role, slug: &str) -> String {
    format!("{}{}", role.id_prefix(), slug)
}

/// Mapping from tree depth to node role.
///
/// Depth 0 is always [`Role::Root`]; the length of the map bounds how deep
/// the builder descends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelMap {
    roles: Vec<Role>,
}

impl LevelMap {
    /// Build a map from the role of each depth, starting at depth 0.
    pub fn new(roles: Vec<Role>) -> Result<Self> {
        match roles.first() {
            None => return Err(Error::Config("level map is empty".to_string())),
            Some(Role::Root) => {}
            Some(other) => {
                return Err(Error::Config(format!(
                    "level map must start with the root, found {other:?}"
                )));
            }
        }
        if roles[1..].contains(&Role::Root) {
            return Err(Error::Config(
                "the root role may only appear at depth 0".to_string(),
            ));
        }
        if roles.len() > MAX_LEVELS {
            return Err(Error::Config(format!(
                "level map has {} levels, at most {MAX_LEVELS} are supported",
                roles.len()
            )));
        }
        Ok(Self { roles })
    }

    /// Role of nodes built at `depth`, if that depth is mapped.
    pub fn role_at(&self, depth: usize) -> Option<Role> {
        self.roles.get(depth).copied()
    }

    /// Deepest depth that still produces a node.
    pub fn max_depth(&self) -> usize {
        self.roles.len() - 1
    }
}

impl Default for LevelMap {
    fn default() -> Self {
        Self {
            roles: vec![Role::Root, Role::Chapter, Role::Section, Role::Subsection],
        }
    }
}

/// A question resource referenced (never copied) by the node that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct QuestionNode {
    /// Location of the backing resource file.
    pub source_path: PathBuf,
    /// Slug of the path text; becomes the STACK label.
    pub identifier: String,
    /// `<title>` element carrying the question's name markup.
    pub title_markup: String,
}

/// A book, chapter, section or subsection.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct StructuralNode {
    pub role: Role,
    pub title: String,
    pub slug: String,
    pub introduction: String,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Vec::is_empty"))]
    pub children: Vec<StructuralNode>,
    #[cfg_attr(feature = "cli", serde(skip_serializing_if = "Vec::is_empty"))]
    pub questions: Vec<QuestionNode>,
}

impl StructuralNode {
    pub fn new(role: Role, title: impl Into<String>, introduction: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            role,
            slug: slugify(&title),
            title,
            introduction: introduction.into(),
            children: Vec::new(),
            questions: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: StructuralNode) {
        self.children.push(child);
    }

    pub fn add_question(&mut self, question: QuestionNode) {
        self.questions.push(question);
    }

    /// The `xml:id` of this node.
    pub fn identifier(&self) -> String {
        identifier_for(self.role, &self.slug)
    }

    /// Folder holding this node's file, relative to the parent's folder.
    pub fn folder_name(&self) -> &str {
        match self.role {
            Role::Root => ".",
            _ => &self.slug,
        }
    }

    /// Name of the file this node is written to.
    pub fn file_name(&self) -> String {
        match self.role {
            Role::Root => ROOT_FILE_NAME.to_string(),
            _ => format!("{}.{OUTPUT_EXTENSION}", self.slug),
        }
    }

    /// `folder/file`, relative to the parent's output folder.
    pub fn rel_path(&self) -> String {
        format!("{}/{}", self.folder_name(), self.file_name())
    }

    /// Number of levels in this subtree (a lone node has depth 1).
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Self::depth).max().unwrap_or(0)
    }

    /// Number of structural nodes in this subtree, this one included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Number of questions in this subtree.
    pub fn question_count(&self) -> usize {
        self.questions.len() + self.children.iter().map(Self::question_count).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_prefixes() {
        assert_eq!(identifier_for(Role::Root, "gold"), "gold");
        assert_eq!(identifier_for(Role::Chapter, "unit1"), "ch-unit1");
        assert_eq!(identifier_for(Role::Section, "mean"), "sec-mean");
        assert_eq!(identifier_for(Role::Subsection, "mode"), "subsec-mode");
    }

    #[test]
    fn test_node_naming() {
        let chapter = StructuralNode::new(Role::Chapter, "Revenue Trends", "");
        assert_eq!(chapter.slug, "revenue-trends");
        assert_eq!(chapter.identifier(), "ch-revenue-trends");
        assert_eq!(chapter.folder_name(), "revenue-trends");
        assert_eq!(chapter.file_name(), "revenue-trends.ptx");
        assert_eq!(chapter.rel_path(), "revenue-trends/revenue-trends.ptx");
    }

    #[test]
    fn test_root_naming() {
        let root = StructuralNode::new(Role::Root, "Stats Gold", "");
        assert_eq!(root.identifier(), "stats-gold");
        assert_eq!(root.folder_name(), ".");
        assert_eq!(root.file_name(), "main.ptx");
    }

    #[test]
    fn test_depth_and_counts() {
        let mut root = StructuralNode::new(Role::Root, "Book", "");
        let mut chapter = StructuralNode::new(Role::Chapter, "One", "");
        chapter.add_child(StructuralNode::new(Role::Section, "A", ""));
        chapter.add_question(QuestionNode {
            source_path: PathBuf::from("q.xml"),
            identifier: "q-xml".to_string(),
            title_markup: "<title>Q</title>".to_string(),
        });
        root.add_child(chapter);
        root.add_child(StructuralNode::new(Role::Chapter, "Two", ""));

        assert_eq!(root.depth(), 3);
        assert_eq!(root.node_count(), 4);
        assert_eq!(root.question_count(), 1);
    }

    #[test]
    fn test_level_map_default() {
        let map = LevelMap::default();
        assert_eq!(map.max_depth(), 3);
        assert_eq!(map.role_at(0), Some(Role::Root));
        assert_eq!(map.role_at(3), Some(Role::Subsection));
        assert_eq!(map.role_at(4), None);
    }

    #[test]
    fn test_level_map_validation() {
        assert!(LevelMap::new(vec![Role::Root, Role::Section]).is_ok());
        assert!(matches!(LevelMap::new(vec![]), Err(Error::Config(_))));
        assert!(matches!(
            LevelMap::new(vec![Role::Chapter]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            LevelMap::new(vec![Role::Root, Role::Root]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            LevelMap::new(vec![
                Role::Root,
                Role::Chapter,
                Role::Section,
                Role::Subsection,
                Role::Subsection
            ]),
            Err(Error::Config(_))
        ));
    }
}
