//! Where documentation and tools live.

use std::path::{Path, PathBuf};

/// Root of the `stl-manual` package's HTML pages.
pub const DEFAULT_STL_ROOT: &str = "/usr/share/doc/stl-manual/html/";

/// Index page inside [`DEFAULT_STL_ROOT`] that lists every term.
pub const DEFAULT_STL_INDEX: &str = "stl_index.html";

/// PolyglotMan, which turns troff into HTML with cross-reference links.
pub const DEFAULT_FORMATTER: &str = "/usr/bin/rman";

pub const DEFAULT_MAN_PROGRAM: &str = "man";

/// Sections searched, in priority order, when no section is given.
pub const DEFAULT_SECTIONS: &str = "2:3";

#[derive(Debug, Clone)]
pub struct Config {
    pub stl_root: PathBuf,
    pub stl_index: String,
    /// `None` disables the formatter and forces the plain `man` fallback.
    pub formatter: Option<PathBuf>,
    pub man_program: String,
    pub default_sections: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stl_root: PathBuf::from(DEFAULT_STL_ROOT),
            stl_index: DEFAULT_STL_INDEX.to_string(),
            formatter: Some(PathBuf::from(DEFAULT_FORMATTER)),
            man_program: DEFAULT_MAN_PROGRAM.to_string(),
            default_sections: DEFAULT_SECTIONS.to_string(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_stl_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.stl_root = root.into();
        self
    }

    #[must_use]
    pub fn with_stl_index(mut self, index: impl Into<String>) -> Self {
        self.stl_index = index.into();
        self
    }

    #[must_use]
    pub fn with_formatter(mut self, formatter: Option<PathBuf>) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub fn with_man_program(mut self, program: impl Into<String>) -> Self {
        self.man_program = program.into();
        self
    }

    #[must_use]
    pub fn with_default_sections(mut self, sections: impl Into<String>) -> Self {
        self.default_sections = sections.into();
        self
    }

    /// The formatter path, if one is configured and present on disk.
    ///
    /// Presence is the only check; the program is never run to test it.
    pub fn available_formatter(&self) -> Option<&Path> {
        self.formatter.as_deref().filter(|path| path.is_file())
    }
}
