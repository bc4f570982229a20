//! Documentation viewer for programmers.
//!
//! Turns search text and links into HTML: man pages (through PolyglotMan when
//! installed, plain `man` otherwise), SGI STL reference pages, local files and
//! web pages.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod invoker;
pub mod loader;
pub mod logging;
pub mod man;
pub mod navigation;
pub mod stl;
pub mod tidy;
pub mod viewport;

pub use config::Config;
pub use dispatch::{classify_link, classify_search, Browser, Outcome, Target};
pub use error::{Error, Result};
pub use invoker::{Captured, CommandLine, SystemInvoker, ToolInvoker};
pub use loader::{Fetcher, HttpFetcher};
pub use navigation::{Navigation, StatusHint};
pub use stl::{IndexStatus, StlIndex};
pub use viewport::Viewport;
