//! Man page retrieval.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use htmlentity::entity::{encode, CharacterSet, EncodeType, ICodedDataTrait};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::invoker::{CommandLine, ToolInvoker};
use crate::tidy::{strip_overstrike, tidy_formatter_html};

/// Cross-reference template handed to the formatter; links come back as
/// `man:page(section)`.
pub const CROSS_REFERENCE_TEMPLATE: &str = "man:%s(%s)";

/// Fetches man pages as HTML through a [`ToolInvoker`].
pub struct ManPages<I> {
    invoker: I,
    man_program: String,
    formatter: Option<PathBuf>,
}

impl<I: ToolInvoker> ManPages<I> {
    pub fn new(invoker: I, config: &Config) -> Self {
        Self {
            invoker,
            man_program: config.man_program.clone(),
            formatter: config.available_formatter().map(Path::to_path_buf),
        }
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    pub fn uses_formatter(&self) -> bool {
        self.formatter.is_some()
    }

    /// HTML for `page` in `section`, a single section or a colon-joined
    /// priority list such as `"2:3"`.
    ///
    /// The page's existence is not checked: whatever the tools print, even
    /// nothing, is what gets shown.
    pub fn show(&self, section: &str, page: &str) -> Result<String> {
        match &self.formatter {
            Some(formatter) => self.formatted(formatter, section, page),
            None => self.plain(section, page),
        }
    }

    fn formatted(&self, formatter: &Path, section: &str, page: &str) -> Result<String> {
        let Some(source) = self.locate(section, page)? else {
            info!(page, section, "no man page file");
            return Ok(String::new());
        };
        let troff = read_page_source(&source)?;

        let command = CommandLine::new(formatter.to_string_lossy())
            .arg("-f")
            .arg("HTML")
            .arg("-r")
            .arg(CROSS_REFERENCE_TEMPLATE)
            .arg("-S")
            .stdin(troff);
        let html = self.run(&command)?;
        Ok(tidy_formatter_html(&html))
    }

    fn plain(&self, section: &str, page: &str) -> Result<String> {
        let command = CommandLine::new(&self.man_program)
            .arg("-S")
            .arg(section)
            .arg("--")
            .arg(page);
        let text = strip_overstrike(&self.run(&command)?);
        Ok(format!("<pre>{}</pre>", escape_html(&text)))
    }

    /// Ask `man -w` where the page lives; the first line wins.
    fn locate(&self, section: &str, page: &str) -> Result<Option<PathBuf>> {
        let command = CommandLine::new(&self.man_program)
            .arg("-S")
            .arg(section)
            .arg("-w")
            .arg("--")
            .arg(page);
        let output = self.run(&command)?;
        let first = output.lines().next().unwrap_or("").trim();
        debug!(page, section, path = first, "located");
        Ok((!first.is_empty()).then(|| PathBuf::from(first)))
    }

    /// Stdout of `command`; a failing exit is logged and its output kept.
    fn run(&self, command: &CommandLine) -> Result<String> {
        let captured = self.invoker.capture(command)?;
        if !captured.success {
            debug!(program = %command.program, args = ?command.args, "exited with failure");
        }
        Ok(captured.text())
    }
}

/// Raw troff for a page file, inflating `.gz` pages.
fn read_page_source(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).map_err(|source| Error::io(path, source))?;
    if !path.to_string_lossy().ends_with(".gz") {
        return Ok(bytes);
    }
    let mut troff = Vec::with_capacity(bytes.len() * 4);
    GzDecoder::new(bytes.as_slice())
        .read_to_end(&mut troff)
        .map_err(|source| Error::Decompress {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(troff)
}

fn escape_html(text: &str) -> String {
    let encoded = encode(text.as_bytes(), &EncodeType::Named, &CharacterSet::Html).to_string();
    encoded.unwrap_or_else(|_| {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    })
}
