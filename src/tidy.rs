//! Cleanup of raw man page output.
//!
//! PolyglotMan output differs between versions: 3.0.9 uppercases some tags
//! and quotes attributes with `"`, 3.2 uses `'`. The patterns below accept
//! both.

use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing table of contents; may contain nested lists for subsections, so
/// the match runs to the last `</ul>`.
static TABLE_OF_CONTENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?si)<hr><p>.*</ul>").expect("Invalid table of contents regex"));

static SECTION_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?si)<a name=['"]sect\d+['"] href=['"]#toc\d+['"]>(.*?)</a>"#)
        .expect("Invalid section anchor regex")
});

static TABLE_OF_CONTENTS_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a href=['"]#toc['"]>Table of Contents</a><p>"#)
        .expect("Invalid table of contents link regex")
});

/// Strip the formatter's table of contents and the links pointing into it.
pub fn tidy_formatter_html(html: &str) -> String {
    let html = TABLE_OF_CONTENTS.replace_all(html, "");
    let html = SECTION_ANCHOR.replace_all(&html, "${1}");
    TABLE_OF_CONTENTS_LINK.replace_all(&html, "").into_owned()
}

/// Remove backspace overstrikes the way `col -b` does: each backspace erases
/// the character before it, so only the last character written at a column
/// survives.
pub fn strip_overstrike(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '\u{8}' {
            out.pop();
        } else {
            out.push(c);
        }
    }
    out
}
