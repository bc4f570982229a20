//! Local file and network loaders.

use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// Response bodies are copied to the viewport in chunks of this size.
pub const CHUNK_SIZE: usize = 8192;

/// Full text of a local file.
pub fn read_local(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| Error::io(path, source))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub trait Fetcher {
    /// GET `url` and stream its body into `sink`, returning the byte count.
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64>;
}

/// Blocking HTTP client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        let response = self.agent.get(url).call().map_err(|source| Error::Fetch {
            url: url.to_string(),
            source: Box::new(source),
        })?;
        debug!(url, status = response.status(), "response");
        copy_chunked(&mut response.into_reader(), sink)
    }
}

/// Copy `reader` to `sink` as the bytes arrive, without buffering the whole body.
pub fn copy_chunked(reader: &mut dyn Read, sink: &mut dyn Write) -> Result<u64> {
    let mut buffer = [0u8; CHUNK_SIZE];
    let mut total = 0u64;
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        sink.write_all(&buffer[..bytes_read])?;
        total += bytes_read as u64;
    }
    sink.flush()?;
    Ok(total)
}
