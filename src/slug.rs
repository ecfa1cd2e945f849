//! Slug generation for node identifiers and output paths.
//!
//! A slug has to work both as an `xml:id` fragment and as a single
//! filesystem path segment, so the output alphabet is `[a-z0-9-]`.

/// Generate a slug from text.
///
/// Non-ASCII text is transliterated to ASCII first (`Café` reads as
/// `Cafe`, `统计` as `Tong Ji`). ASCII letters are then lowercased, every
/// run of other characters (quotes included) becomes a single hyphen, and
/// hyphens are trimmed from both ends.
///
/// Text with nothing alphanumeric in it gives an empty slug; callers that
/// need a path segment must reject that.
///
/// # Examples
///
/// ```
/// use stackbook::slugify;
///
/// assert_eq!(slugify("Revenue Trends"), "revenue-trends");
/// assert_eq!(slugify("Don't Panic!"), "don-t-panic");
/// assert_eq!(slugify("Über Café"), "uber-cafe");
/// assert_eq!(slugify("source/stack/Unit1/q1.xml"), "source-stack-unit1-q1-xml");
/// ```
pub fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_separator = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    slug
}
