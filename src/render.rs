//! Rendering structural nodes as PreTeXt source.
//!
//! Every reference a node emits is relative to the folder the node's own
//! file is written to, so rendering takes that folder as an argument and
//! recomputes question paths on every call.

use std::fmt::Write as _;
use std::path::Path;

use crate::model::{QuestionNode, Role, StructuralNode};
use crate::util::{escape_xml, relative_path};

const XINCLUDE_NS: &str = "http://www.w3.org/2001/XInclude";

/// Externally maintained files the root document includes.
pub const DOCINFO_FILE: &str = "docinfo.ptx";
pub const FRONTMATTER_FILE: &str = "frontmatter.ptx";
pub const BACKMATTER_FILE: &str = "backmatter.ptx";

/// Render `node` as it will be written into `output_dir`.
pub fn render(node: &StructuralNode, output_dir: &Path) -> String {
    match node.role {
        Role::Root => render_root(node),
        _ => render_division(node, output_dir),
    }
}

/// The `xi:include` pointing at a child's file.
pub fn child_include(child: &StructuralNode) -> String {
    include(&child.rel_path())
}

/// The exercise block for one question, referenced from `output_dir`.
pub fn render_question(question: &QuestionNode, output_dir: &Path) -> String {
    let href = relative_path(output_dir, &question.source_path);
    format!(
        r#"<exercise>
{title}
<stack label="{label}" xmlns:xi="{XINCLUDE_NS}">
{include}
</stack>
</exercise>"#,
        title = question.title_markup,
        label = escape_xml(&question.identifier),
        include = include(&href),
    )
}

fn render_root(node: &StructuralNode) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\n");
    writeln!(out, r#"<pretext xml:lang="en-US" xmlns:xi="{XINCLUDE_NS}">"#).unwrap();
    out.push_str("<!-- Document-wide metadata -->\n");
    writeln!(out, "{}", include(&format!("./{DOCINFO_FILE}"))).unwrap();
    out.push('\n');
    writeln!(out, r#"<book xml:id="{}">"#, escape_xml(&node.identifier())).unwrap();
    writeln!(out, "<title>{}</title>", escape_xml(&node.title)).unwrap();
    out.push('\n');
    writeln!(out, "{}", include(&format!("./{FRONTMATTER_FILE}"))).unwrap();
    out.push('\n');
    for child in &node.children {
        writeln!(out, "{}", child_include(child)).unwrap();
    }
    out.push('\n');
    writeln!(out, "{}", include(&format!("./{BACKMATTER_FILE}"))).unwrap();
    out.push_str("</book>\n");
    out.push_str("</pretext>\n");
    out
}

fn render_division(node: &StructuralNode, output_dir: &Path) -> String {
    let element = node.role.element_name();
    let mut out = String::new();

    writeln!(
        out,
        r#"<{element} xml:id="{}" xmlns:xi="{XINCLUDE_NS}">"#,
        escape_xml(&node.identifier())
    )
    .unwrap();
    writeln!(out, "<title>{}</title>", escape_xml(&node.title)).unwrap();

    out.push_str("<introduction>\n");
    if !node.introduction.is_empty() {
        writeln!(out, "{}", node.introduction).unwrap();
    }
    for question in &node.questions {
        writeln!(out, "{}", render_question(question, output_dir)).unwrap();
    }
    out.push_str("</introduction>\n");

    for child in &node.children {
        writeln!(out, "{}", child_include(child)).unwrap();
    }
    writeln!(out, "</{element}>").unwrap();
    out
}

fn include(href: &str) -> String {
    format!(r#"<xi:include href="{}" />"#, escape_xml(href))
}
