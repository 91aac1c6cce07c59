//! Error taxonomy for the sync and analysis pipelines.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every variant is fatal to the run that raised it.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote API or an asset URL could not be reached.
    #[error("failed to fetch {url}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// A catalog page body was not the expected JSON shape.
    #[error("failed to decode catalog page from {url}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem failure on the asset store or a report destination.
    #[error("store I/O failed on {}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode report")]
    Encode(#[source] serde_json::Error),

    #[error("mapping formatter `{command}` failed: {detail}")]
    Format { command: String, detail: String },
}

impl Error {
    pub(crate) fn store(path: &Path, source: io::Error) -> Self {
        Self::Store {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }
}
