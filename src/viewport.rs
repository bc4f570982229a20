//! The HTML sink pages are displayed in.

use std::io::{self, Write};

use htmlentity::entity::{decode, ICodedDataTrait};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;

pub const APP_NAME: &str = "GMan";

static TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title>(.*?)</title>").expect("Invalid title regex"));

/// How much of a streamed document is searched for its `<title>`.
const HEAD_LIMIT: usize = 16 * 1024;

/// Writes HTML documents into `W` and tracks the window title.
pub struct Viewport<W> {
    sink: W,
    title: Option<String>,
}

impl<W: Write> Viewport<W> {
    pub fn new(sink: W) -> Self {
        Self { sink, title: None }
    }

    /// Replace the displayed document with `html`.
    pub fn show_html(&mut self, html: &str) -> Result<()> {
        self.title = page_title(html);
        self.sink.write_all(html.as_bytes())?;
        self.sink.flush()?;
        Ok(())
    }

    /// Start a document that arrives in pieces. The title is picked up from
    /// the first [`HEAD_LIMIT`] bytes as they are written.
    pub fn stream(&mut self) -> Stream<'_, W> {
        self.title = None;
        Stream {
            viewport: self,
            head: Vec::new(),
        }
    }

    /// `"<title> - GMan"`, or just `"GMan"` when the page has no title.
    pub fn window_title(&self) -> String {
        match &self.title {
            Some(title) => format!("{title} - {APP_NAME}"),
            None => APP_NAME.to_string(),
        }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Writer handed out by [`Viewport::stream`].
pub struct Stream<'a, W> {
    viewport: &'a mut Viewport<W>,
    head: Vec<u8>,
}

impl<W: Write> Stream<'_, W> {
    fn sniff_title(&mut self, chunk: &[u8]) {
        if self.viewport.title.is_some() || self.head.len() >= HEAD_LIMIT {
            return;
        }
        let take = chunk.len().min(HEAD_LIMIT - self.head.len());
        self.head.extend_from_slice(&chunk[..take]);
        self.viewport.title = page_title(&String::from_utf8_lossy(&self.head));
    }
}

impl<W: Write> Write for Stream<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.viewport.sink.write(buf)?;
        self.sniff_title(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.viewport.sink.flush()
    }
}

/// Text of the first `<title>` element, entities decoded.
pub fn page_title(html: &str) -> Option<String> {
    let raw = TITLE.captures(html)?.get(1)?.as_str();
    let raw = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if raw.is_empty() {
        return None;
    }
    let decoded = decode(raw.as_bytes()).to_string();
    Some(decoded.unwrap_or(raw))
}
