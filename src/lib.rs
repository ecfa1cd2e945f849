//! # stackbook
//!
//! Assemble a STACK question bank into a PreTeXt book.
//!
//! A question bank is a directory tree of Moodle quiz XML files. Each
//! directory becomes a book division chosen by its depth (the bank root is
//! the book, then chapters, sections and subsections), titled by its
//! `gitsync_category.xml` descriptor or, failing that, by its own name. Each
//! question file becomes an exercise in the division that contains it.
//!
//! The output mirrors the bank: `main.ptx` at the top, and one
//! `<slug>/<slug>.ptx` per division, tied together with `xi:include`.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use stackbook::{DiskSource, TreeBuilder, write_tree};
//!
//! let book = TreeBuilder::new(DiskSource).build(Path::new("source/stack"), "Stats Gold")?;
//! write_tree(&book, Path::new("source"))?;
//! # Ok::<(), stackbook::Error>(())
//! ```
//!
//! ## Building in memory
//!
//! ```
//! use std::path::Path;
//! use stackbook::{MemorySource, Role, TreeBuilder};
//!
//! let mut bank = MemorySource::new();
//! bank.add_file(
//!     "bank/Unit 1/q1.xml",
//!     "<quiz><question><name><text>Q1</text></name></question></quiz>",
//! );
//!
//! let book = TreeBuilder::new(bank).build(Path::new("bank"), "Gold")?;
//! assert_eq!(book.children[0].role, Role::Chapter);
//! assert_eq!(book.children[0].slug, "unit-1");
//! # Ok::<(), stackbook::Error>(())
//! ```

pub mod builder;
pub mod error;
pub mod model;
pub mod render;
pub mod resource;
pub mod slug;
pub mod source;
pub(crate) mod util;
pub mod writer;

pub use builder::{BuildConfig, EntryOrder, TreeBuilder};
pub use error::{Error, Result};
pub use model::{LevelMap, QuestionNode, Role, StructuralNode, identifier_for};
pub use render::render;
pub use resource::{extract_title, load_question, parse_category_title};
pub use slug::slugify;
pub use source::{DiskSource, EntryKind, MemorySource, SourceEntry, SourceTree};
pub use writer::{WriteSummary, plan_outputs, write_tree};
