use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// File name of the SQLite symbol index inside a docset's resources.
pub const INDEX_FILE: &str = "docSet.dsidx";

/// Directory holding the HTML pages inside a docset's resources.
pub const DOCUMENTS_DIR: &str = "Documents";

#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    /// Resolve the data directory from, in order of priority:
    /// 1. An explicit path (from --data-dir)
    /// 2. The DOCS_VIEWER_DATA_DIR environment variable
    /// 3. The XDG data directory (~/.local/share/docs-viewer/)
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var("DOCS_VIEWER_DATA_DIR") {
            PathBuf::from(val)
        } else {
            xdg::BaseDirectories::with_prefix("docs-viewer")
                .get_data_home()
                .ok_or_else(|| {
                    Error::Config(
                        "could not determine XDG data home directory".into(),
                    )
                })?
        };

        std::fs::create_dir_all(&root)
            .map_err(|_| Error::DataDir(root.clone()))?;

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn docsets_dir(&self) -> PathBuf {
        self.root.join("docsets")
    }

    /// The `Contents/Resources` directory of an extracted docset.
    pub fn docset_resources(&self, name: &str) -> PathBuf {
        self.docsets_dir()
            .join(name)
            .join(format!("{name}.docset"))
            .join("Contents")
            .join("Resources")
    }

    /// Names of docsets whose resources directory exists on disk, sorted.
    pub fn installed_docsets(&self) -> Result<Vec<String>> {
        let dir = self.docsets_dir();
        if !dir.is_dir() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if self.docset_resources(&name).is_dir() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}
