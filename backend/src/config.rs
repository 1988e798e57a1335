//! Runtime configuration.
//!
//! Values come from the environment (a `.env` file is honored) and can be
//! overridden by CLI flags.

use std::env;
use std::path::PathBuf;

use crate::parser::DEFAULT_MARKER;

/// e-Stat file name of the cheese supply/demand table.
pub const DEFAULT_CSV_PATH: &str = "FEH_00500509_260126101555.csv";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum upload size (in bytes).
///
/// 10 MB is far above any e-Stat table export.
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Rows shown in the data preview.
pub const PREVIEW_ROWS: usize = 30;

pub const ENV_CSV_PATH: &str = "CHEESE_CSV_PATH";
pub const ENV_MARKER: &str = "CHEESE_HEADER_MARKER";
pub const ENV_PORT: &str = "CHEESE_PORT";

/// Resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// CSV loaded at startup.
    pub csv_path: PathBuf,
    /// Header-row and label-column marker.
    pub marker: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
            marker: DEFAULT_MARKER.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Settings {
    /// Read settings from the environment, loading `.env` first.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup. Unparseable ports fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            csv_path: lookup(ENV_CSV_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.csv_path),
            marker: lookup(ENV_MARKER)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.marker),
            port: lookup(ENV_PORT)
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    pub fn with_csv_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(p) = path {
            self.csv_path = p;
        }
        self
    }

    pub fn with_marker(mut self, marker: Option<String>) -> Self {
        if let Some(m) = marker {
            self.marker = m;
        }
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(p) = port {
            self.port = p;
        }
        self
    }
}
