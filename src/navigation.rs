//! Where we are and what the pointer is over.

/// The last URL fetched successfully, used as the prefix for relative links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigation {
    current: Option<String>,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(url: impl Into<String>) -> Self {
        Self {
            current: Some(url.into()),
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Resolve a relative link by plain concatenation onto the current URL.
    ///
    /// No path normalisation happens: `../` segments are kept verbatim and
    /// the current URL is used whole, file name included.
    pub fn resolve(&self, link: &str) -> String {
        format!("{}{link}", self.current.as_deref().unwrap_or(""))
    }

    pub fn advance(&mut self, url: impl Into<String>) {
        self.current = Some(url.into());
    }
}

/// The single hovered-link hint shown in the status area.
///
/// Hovering replaces whatever hint was showing; leaving a link clears it.
#[derive(Debug, Clone, Default)]
pub struct StatusHint {
    shown: Option<(u32, String)>,
    next_id: u32,
}

impl StatusHint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer entered `Some(url)` or left a link (`None`). Returns the id
    /// of the newly shown hint.
    pub fn hover(&mut self, url: Option<&str>) -> Option<u32> {
        self.shown = None;
        let url = url?;
        self.next_id += 1;
        self.shown = Some((self.next_id, url.to_string()));
        Some(self.next_id)
    }

    pub fn shown(&self) -> Option<&str> {
        self.shown.as_ref().map(|(_, url)| url.as_str())
    }

    pub fn shown_id(&self) -> Option<u32> {
        self.shown.as_ref().map(|(id, _)| *id)
    }
}
