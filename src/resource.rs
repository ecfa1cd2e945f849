//! Reading metadata out of question bank XML files.
//!
//! Two kinds of file are understood, both in Moodle quiz XML:
//!
//! - the category descriptor (`gitsync_category.xml`), whose
//!   `/quiz/question/category/text` holds a slash-delimited category path;
//! - question files, whose `/quiz/question/name/text` holds the title.

use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};
use crate::model::QuestionNode;
use crate::slug::slugify;
use crate::source::SourceTree;
use crate::util::decode_text;

/// File name of the per-directory category descriptor.
pub const CATEGORY_DESCRIPTOR: &str = "gitsync_category.xml";

/// Extension of question resource files.
pub const RESOURCE_EXTENSION: &str = "xml";

const CATEGORY_TEXT_PATH: &[&[u8]] = &[b"quiz", b"question", b"category", b"text"];
const NAME_TEXT_PATH: &[&[u8]] = &[b"quiz", b"question", b"name", b"text"];

/// Extract a node title from a category descriptor.
///
/// The category path is split on `/` and its last segment, trimmed, is the
/// title: `$course$/top/Stats/Sales` gives `Sales`. A last segment that
/// slugifies to nothing (`top/` or `top/???`) is an error.
pub fn parse_category_title(bytes: &[u8], path: &Path) -> Result<String> {
    let content = decode_text(bytes);
    let element = find_element(&content, CATEGORY_TEXT_PATH, path)?;

    let category = element.text.ok_or_else(|| {
        Error::parse(path, "missing /quiz/question/category/text element")
    })?;

    let title = category.rsplit('/').next().unwrap_or_default().trim();
    if slugify(title).is_empty() {
        return Err(Error::parse(
            path,
            format!("category path {category:?} has no usable last segment"),
        ));
    }
    Ok(title.to_string())
}

/// Extract the title markup of a question file.
///
/// The inner markup of `/quiz/question/name/text` is kept verbatim
/// (entities and CDATA untouched) and relabelled as a `<title>` element.
pub fn extract_title(bytes: &[u8], path: &Path) -> Result<String> {
    let content = decode_text(bytes);
    let element = find_element(&content, NAME_TEXT_PATH, path)?;

    let inner = element
        .markup
        .ok_or_else(|| Error::parse(path, "missing /quiz/question/name/text element"))?;
    Ok(format!("<title>{}</title>", inner.trim()))
}

/// Read a question file from `source` and wrap it as a [`QuestionNode`].
///
/// The identifier is derived from the path text only, so it is stable for a
/// given path no matter what the file contains.
pub fn load_question<S: SourceTree + ?Sized>(source: &S, path: &Path) -> Result<QuestionNode> {
    let bytes = source.read(path)?;
    let title_markup = extract_title(&bytes, path)?;

    Ok(QuestionNode {
        source_path: path.to_path_buf(),
        identifier: slugify(&path.to_string_lossy()),
        title_markup,
    })
}

/// The first element found at a fixed path.
#[derive(Debug, Default)]
struct FoundElement {
    /// Raw inner markup, exactly as it appears in the source.
    markup: Option<String>,
    /// Unescaped character data.
    text: Option<String>,
}

/// Scan the whole document, capturing the first element whose ancestry
/// matches `target` (local names, namespace prefixes ignored).
///
/// The document is always read to the end so that malformed XML is
/// reported even when the element appears before the damage.
fn find_element(content: &str, target: &[&[u8]], path: &Path) -> Result<FoundElement> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut found = FoundElement::default();
    // (depth of the captured element, byte offset where its content starts)
    let mut capture: Option<(usize, usize)> = None;
    let mut text = String::new();

    loop {
        let before = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| Error::parse(path, format!("malformed XML: {e}")))?;

        match event {
            Event::Start(e) => {
                stack.push(local_name(e.name().as_ref()).to_vec());
                if capture.is_none() && found.markup.is_none() && matches_path(&stack, target) {
                    capture = Some((stack.len(), reader.buffer_position() as usize));
                    text.clear();
                }
            }
            Event::Empty(e) => {
                stack.push(local_name(e.name().as_ref()).to_vec());
                if capture.is_none() && found.markup.is_none() && matches_path(&stack, target) {
                    found.markup = Some(String::new());
                    found.text = Some(String::new());
                }
                stack.pop();
            }
            Event::End(_) => {
                if let Some((depth, start)) = capture
                    && depth == stack.len()
                {
                    found.markup = Some(content[start..before].to_string());
                    found.text = Some(std::mem::take(&mut text));
                    capture = None;
                }
                stack.pop();
            }
            Event::Text(e) if capture.is_some() => {
                let raw = String::from_utf8_lossy(e.as_ref());
                let unescaped = quick_xml::escape::unescape(&raw)
                    .map_err(|e| Error::parse(path, format!("bad escape: {e}")))?;
                text.push_str(&unescaped);
            }
            Event::CData(e) if capture.is_some() => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Event::GeneralRef(e) if capture.is_some() => {
                let entity = String::from_utf8_lossy(e.as_ref());
                let resolved = resolve_entity(&entity)
                    .ok_or_else(|| Error::parse(path, format!("unknown entity &{entity};")))?;
                text.push_str(&resolved);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(Error::parse(path, "malformed XML: unclosed elements at end of file"));
    }

    Ok(found)
}

fn matches_path(stack: &[Vec<u8>], target: &[&[u8]]) -> bool {
    stack.len() == target.len() && stack.iter().zip(target).all(|(a, b)| a.as_slice() == *b)
}

fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(pos) => &name[pos + 1..],
        None => name,
    }
}

fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    let code = if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        entity.strip_prefix('#')?.parse::<u32>().ok()?
    };
    char::from_u32(code).map(|c| c.to_string())
}
