//! Routing search text and link clicks to the right kind of page.
//!
//! | input                 | search box          | link click              |
//! |-----------------------|---------------------|-------------------------|
//! | `man:<page>(<sect>)`  | man page            | man page                |
//! | `stl:<term>`          | STL page            | relative link           |
//! | `file://<path>`       | man page search     | local file, shown as-is |
//! | `http://`, `https://` | man page search     | fetched and streamed    |
//! | anything else         | man page, `2:3`     | relative to current URL |

use std::io::Write;

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::invoker::{SystemInvoker, ToolInvoker};
use crate::loader::{read_local, Fetcher, HttpFetcher};
use crate::man::ManPages;
use crate::navigation::{Navigation, StatusHint};
use crate::stl::StlIndex;
use crate::viewport::Viewport;

/// Greedy page, so `man:a(b)(3)` is page `a(b)` in section `3`.
static MAN_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^man:(.+)\((.+)\)$").expect("Invalid man URL regex"));

static STL_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^stl:((?:std::)?[A-Za-z0-9_]+)$").expect("Invalid STL URL regex")
});

/// What an input string refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Man { page: String, section: String },
    /// Term with any `std::` prefix already removed.
    Stl { term: String },
    File { path: String },
    Web { url: String },
    /// A `man:` or `stl:` URL that doesn't parse.
    Malformed { input: String },
}

/// What displaying a target did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A whole document was handed to the viewport.
    Shown,
    Streamed { url: String, bytes: u64 },
    /// Malformed input; the viewport is untouched.
    Ignored,
    /// Unknown STL term; the viewport is untouched.
    NotFound { term: String },
}

/// Classify text typed into the search box. Text without a scheme is looked
/// up as a man page in `default_sections`.
pub fn classify_search(text: &str, default_sections: &str) -> Target {
    let text = text.trim();
    if text.starts_with("man:") {
        parse_man_url(text)
    } else if text.starts_with("stl:") {
        parse_stl_url(text)
    } else {
        Target::Man {
            page: text.to_string(),
            section: default_sections.to_string(),
        }
    }
}

/// Classify a clicked link. Anything that isn't `man:`, `file://` or
/// `http(s)://` is relative to the current page.
pub fn classify_link(link: &str, navigation: &Navigation) -> Target {
    if link.starts_with("man:") {
        parse_man_url(link)
    } else if let Some(path) = link.strip_prefix("file://") {
        Target::File {
            path: path.to_string(),
        }
    } else if link.starts_with("http://") || link.starts_with("https://") {
        Target::Web {
            url: link.to_string(),
        }
    } else {
        Target::Web {
            url: navigation.resolve(link),
        }
    }
}

fn parse_man_url(url: &str) -> Target {
    match MAN_URL.captures(url) {
        Some(caps) => Target::Man {
            page: caps[1].to_string(),
            section: caps[2].to_string(),
        },
        None => Target::Malformed {
            input: url.to_string(),
        },
    }
}

fn parse_stl_url(url: &str) -> Target {
    match STL_URL.captures(url) {
        Some(caps) => {
            let term = &caps[1];
            Target::Stl {
                term: term.strip_prefix("std::").unwrap_or(term).to_string(),
            }
        }
        None => Target::Malformed {
            input: url.to_string(),
        },
    }
}

/// The viewer: owns the tools, the lazily built STL index and navigation.
pub struct Browser<I, F> {
    config: Config,
    man: ManPages<I>,
    fetcher: F,
    stl: OnceCell<StlIndex>,
    navigation: Navigation,
    status: StatusHint,
}

impl Browser<SystemInvoker, HttpFetcher> {
    /// A browser that runs real processes and talks to the network.
    pub fn system(config: Config) -> Self {
        Self::new(config, SystemInvoker, HttpFetcher::new())
    }
}

impl<I: ToolInvoker, F: Fetcher> Browser<I, F> {
    pub fn new(config: Config, invoker: I, fetcher: F) -> Self {
        let man = ManPages::new(invoker, &config);
        Self {
            config,
            man,
            fetcher,
            stl: OnceCell::new(),
            navigation: Navigation::new(),
            status: StatusHint::new(),
        }
    }

    /// Use an index built elsewhere instead of building one on first use.
    #[must_use]
    pub fn with_stl_index(self, index: StlIndex) -> Self {
        Self {
            stl: OnceCell::with_value(index),
            ..self
        }
    }

    #[must_use]
    pub fn with_navigation(mut self, navigation: Navigation) -> Self {
        self.navigation = navigation;
        self
    }

    pub fn man_pages(&self) -> &ManPages<I> {
        &self.man
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// The STL index, scanned from disk the first time it's needed.
    pub fn stl_index(&self) -> &StlIndex {
        self.stl
            .get_or_init(|| StlIndex::build(&self.config.stl_root, &self.config.stl_index))
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn status_hint(&mut self) -> &mut StatusHint {
        &mut self.status
    }

    /// Handle text entered in the search box.
    pub fn search<W: Write>(&mut self, text: &str, viewport: &mut Viewport<W>) -> Result<Outcome> {
        let target = classify_search(text, &self.config.default_sections);
        self.open(target, viewport)
    }

    /// Handle a click on `link` in the displayed page.
    pub fn follow<W: Write>(&mut self, link: &str, viewport: &mut Viewport<W>) -> Result<Outcome> {
        let target = classify_link(link, &self.navigation);
        self.open(target, viewport)
    }

    /// Display `target`. Navigation only moves when a fetch succeeds.
    pub fn open<W: Write>(&mut self, target: Target, viewport: &mut Viewport<W>) -> Result<Outcome> {
        debug!(?target, "open");
        match target {
            Target::Man { page, section } => {
                let html = self.man.show(&section, &page)?;
                viewport.show_html(&html)?;
                Ok(Outcome::Shown)
            }
            Target::Stl { term } => match self.stl_index().page(&term)? {
                Some(html) => {
                    viewport.show_html(&html)?;
                    Ok(Outcome::Shown)
                }
                None => {
                    info!(term, "unknown STL term");
                    Ok(Outcome::NotFound { term })
                }
            },
            Target::File { path } => {
                let html = read_local(&path)?;
                viewport.show_html(&html)?;
                Ok(Outcome::Shown)
            }
            Target::Web { url } => {
                let bytes = self.fetcher.fetch(&url, &mut viewport.stream())?;
                self.navigation.advance(url.clone());
                Ok(Outcome::Streamed { url, bytes })
            }
            Target::Malformed { input } => {
                debug!(input, "ignoring malformed URL");
                Ok(Outcome::Ignored)
            }
        }
    }
}
