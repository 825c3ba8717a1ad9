//! User configuration loaded from `config.toml`.
//!
//! ```toml
//! docsets = ["C++", "Rust"]
//! default_docset = "Rust"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Docsets the user wants available.
    pub docsets: Vec<String>,
    /// Docset used when a command does not name one.
    pub default_docset: Option<String>,
}

impl Config {
    /// Locate the config file, in order of priority:
    /// 1. An explicit path (from --config)
    /// 2. The DOCS_VIEWER_CONFIG environment variable
    /// 3. The XDG config directory (~/.config/docs-viewer/config.toml)
    pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Ok(val) = std::env::var("DOCS_VIEWER_CONFIG") {
            return Ok(PathBuf::from(val));
        }
        xdg::BaseDirectories::with_prefix("docs-viewer")
            .get_config_home()
            .map(|dir| dir.join("config.toml"))
            .ok_or_else(|| {
                Error::Config(
                    "could not determine XDG config home directory".into(),
                )
            })
    }

    /// Load the config at `path`. A missing file yields the default config.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Pick the docset to use: the explicit one, then `default_docset`,
    /// then the first configured docset.
    pub fn pick_docset(&self, explicit: Option<&str>) -> Result<String> {
        explicit
            .or(self.default_docset.as_deref())
            .or(self.docsets.first().map(String::as_str))
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Config(
                    "no docset given and none configured in config.toml"
                        .into(),
                )
            })
    }
}
