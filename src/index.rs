// src/index.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Indexes whose membership is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexId {
    Sp500,
    Nasdaq100,
}

impl IndexId {
    pub const ALL: [IndexId; 2] = [IndexId::Sp500, IndexId::Nasdaq100];

    /// Human-readable name used in messages.
    pub fn display_name(self) -> &'static str {
        match self {
            IndexId::Sp500 => "S&P 500",
            IndexId::Nasdaq100 => "Nasdaq-100",
        }
    }

    /// Field name in the persisted snapshot.
    pub fn key(self) -> &'static str {
        match self {
            IndexId::Sp500 => "sp500",
            IndexId::Nasdaq100 => "nasdaq100",
        }
    }
}

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
