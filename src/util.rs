//! Text decoding and path helpers shared by the reader and the renderer.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

/// Decode bytes to a string, handling various encodings.
///
/// This function:
/// 1. First tries UTF-8 (handles BOM automatically via encoding_rs)
/// 2. If malformed, tries the encoding named in the `<?xml encoding="..."?>` declaration
/// 3. Falls back to Windows-1252 (common in files exported from older Moodle installs)
///
/// Uses `Cow<str>` to avoid allocation when the input is valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = extract_xml_encoding(bytes)
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Extract the encoding declared in an XML prolog.
///
/// Only the first 100 bytes are inspected. Returns `None` when there is no
/// declaration or it carries no `encoding` pseudo-attribute.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(100);
    let prefix = &bytes[..check_len];

    let xml_start = prefix.windows(5).position(|w| w == b"<?xml")?;
    let after_xml = &prefix[xml_start..];

    let enc_pos = after_xml
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &after_xml[enc_pos + 9..];

    let quote = *after_enc.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = after_enc[1..].iter().position(|&b| b == quote)? + 1;
    std::str::from_utf8(&after_enc[1..value_end]).ok()
}

/// Escape text for use in XML character data or attribute values.
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }
    result
}

/// Compute the path of `target` relative to the directory `from_dir`.
///
/// Both paths are made absolute against the current directory and then
/// compared lexically; the filesystem is never consulted, so neither path
/// has to exist yet. The result always uses `/` separators because it ends
/// up inside an `xi:include` href.
pub fn relative_path(from_dir: &Path, target: &Path) -> String {
    let from = normalize(from_dir);
    let to = normalize(target);

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".to_string());
    }
    for component in &to[common..] {
        parts.push(component.clone());
    }

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Absolute, lexically normalized path components (`.` and `..` resolved).
fn normalize(path: &Path) -> Vec<String> {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| PathBuf::from(path));

    let mut components: Vec<String> = Vec::new();
    for component in absolute.components() {
        match component {
            Component::Prefix(p) => components.push(p.as_os_str().to_string_lossy().into_owned()),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                components.pop();
            }
            Component::Normal(name) => components.push(name.to_string_lossy().into_owned()),
        }
    }
    components
}
