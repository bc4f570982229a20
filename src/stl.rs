//! SGI STL reference pages from the `stl-manual` package.
//!
//! The package ships one HTML page per component plus `stl_index.html`, a
//! table linking every term to its page. [`StlIndex::build`] scans that table
//! once; [`StlIndex::page`] then loads and touches up individual pages, which
//! are simple enough to display as they are.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::error::{Error, Result};

static INDEX_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#".*<A href="(.+\.html)">([a-z0-9_]+)(&lt;.*&gt;)?</A></TD>.*"#)
        .expect("Invalid STL index entry regex")
});

static HEAD_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<head>").expect("Invalid head tag regex"));

/// A table cell holding nothing but a `<tt>` line.
static TT_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\n<tt>(.*?)</tt>\n</td>").expect("Invalid teletype cell regex")
});

/// `std::string` and `std::wstring` are typedefs documented on this page.
const BASIC_STRING: &str = "basic_string";
const BASIC_STRING_ALIASES: [&str; 2] = ["string", "wstring"];

/// How building the index went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexStatus {
    /// The documentation root doesn't exist; the package isn't installed.
    Missing { root: PathBuf },
    /// The root exists but the index page couldn't be read.
    Unreadable { path: PathBuf, reason: String },
    Loaded { terms: usize },
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { root } => write!(
                f,
                "STL documentation not installed ({} missing). install package \"stl-manual\".",
                root.display()
            ),
            Self::Unreadable { path, reason } => {
                write!(f, "cannot read STL index {}: {reason}", path.display())
            }
            Self::Loaded { terms } => write!(f, "Learned of {terms} STL terms."),
        }
    }
}

/// Read-only mapping from STL term to the page documenting it.
#[derive(Debug, Clone)]
pub struct StlIndex {
    root: PathBuf,
    terms: BTreeMap<String, PathBuf>,
    status: IndexStatus,
}

impl StlIndex {
    /// Scan `root/index_file`. Never fails: a missing install or unreadable
    /// index yields an empty index whose [`status`](Self::status) says why.
    pub fn build(root: impl Into<PathBuf>, index_file: &str) -> Self {
        let root = root.into();
        if !root.is_dir() {
            let status = IndexStatus::Missing { root: root.clone() };
            warn!("{status}");
            return Self::empty(root, status);
        }

        let index_path = root.join(index_file);
        let text = match fs::read(&index_path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(error) => {
                let status = IndexStatus::Unreadable {
                    path: index_path,
                    reason: error.to_string(),
                };
                warn!("{status}");
                return Self::empty(root, status);
            }
        };

        let terms = parse_index(&root, &text);
        let status = IndexStatus::Loaded { terms: terms.len() };
        info!("{status}");
        Self {
            root,
            terms,
            status,
        }
    }

    fn empty(root: PathBuf, status: IndexStatus) -> Self {
        Self {
            root,
            terms: BTreeMap::new(),
            status,
        }
    }

    pub fn status(&self) -> &IndexStatus {
        &self.status
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Known terms in sorted order.
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    /// Page documenting `term`. Case-sensitive; a leading `std::` is ignored.
    pub fn lookup(&self, term: &str) -> Option<&Path> {
        let term = term.strip_prefix("std::").unwrap_or(term);
        self.terms.get(term).map(PathBuf::as_path)
    }

    /// The page for `term`, ready to display, or `None` for an unknown term.
    pub fn page(&self, term: &str) -> Result<Option<String>> {
        let Some(path) = self.lookup(term) else {
            return Ok(None);
        };
        let bytes = fs::read(path).map_err(|source| Error::io(path, source))?;
        let html = String::from_utf8_lossy(&bytes);
        Ok(Some(rewrite_page(&html, &self.base_href())))
    }

    /// `file://` URL of the documentation root, always ending in `/`.
    pub fn base_href(&self) -> String {
        let root = self.root.to_string_lossy();
        if root.ends_with('/') {
            format!("file://{root}")
        } else {
            format!("file://{root}/")
        }
    }
}

fn parse_index(root: &Path, text: &str) -> BTreeMap<String, PathBuf> {
    let mut terms = BTreeMap::new();
    for line in text.lines() {
        let Some(caps) = INDEX_ENTRY.captures(line) else {
            continue;
        };
        let path = root.join(&caps[1]);
        let term = &caps[2];
        if term == BASIC_STRING {
            for alias in BASIC_STRING_ALIASES {
                terms.insert(alias.to_string(), path.clone());
            }
        }
        terms.insert(term.to_string(), path);
    }
    terms
}

/// Point relative links at the documentation root and show code-only table
/// cells as preformatted blocks.
pub fn rewrite_page(html: &str, base_href: &str) -> String {
    let base = format!("<base href=\"{base_href}\">");
    let html = match HEAD_TAG.find(html) {
        Some(head) => format!("{}{base}{}", &html[..head.end()], &html[head.end()..]),
        None => format!("{base}{html}"),
    };
    TT_CELL
        .replace_all(&html, "\n<pre>${1}</pre></td>\n")
        .into_owned()
}
