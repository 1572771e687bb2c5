//! JSON input files for routes and packet batches.

use crate::error::RouterError;
use crate::routing::{ForwardingTable, Route};
use crate::scheduler::Packet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors loading an input file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Router(#[from] RouterError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Route file: `{ "routes": [ { "prefix": "...", "link": "..." } ] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutesFile {
    pub routes: Vec<Route>,
}

impl RoutesFile {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }

    /// Build a forwarding table from the loaded routes.
    pub fn build_table(&self) -> Result<ForwardingTable> {
        Ok(ForwardingTable::build(self.routes.iter().cloned())?)
    }
}

/// Packet file: `{ "packets": [ ... ] }`, listed in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketsFile {
    pub packets: Vec<Packet>,
}

impl PacketsFile {
    pub fn load(path: &Path) -> Result<Self> {
        read_json(path)
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}
