//! Error type shared by the library.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while retrieving or displaying documentation.
///
/// Lookups that simply find nothing (an unknown STL term, a malformed
/// `man:` URL) are not errors; they are reported through
/// [`Outcome`](crate::Outcome).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An external program could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// A local file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A compressed man page could not be inflated.
    #[error("cannot decompress {}: {source}", path.display())]
    Decompress {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The HTTP request itself failed (connection, status, TLS).
    #[error("fetch of {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// Reading the response body or writing to the viewport failed.
    #[error("stream error: {0}")]
    Write(#[from] io::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
