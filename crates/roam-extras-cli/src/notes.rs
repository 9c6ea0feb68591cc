//! A directory of markdown files viewed as a page graph: each file is a
//! page titled by its file stem, and its path relative to the notes root
//! serves as the uid.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use roam_extras_host::{Graph, HostError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotesError {
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct NotesGraph {
    root: PathBuf,
    pages: HashMap<String, String>,
}

impl NotesGraph {
    pub fn scan(root: &Path) -> Result<Self, NotesError> {
        if !root.is_dir() {
            return Err(NotesError::InvalidNotesDir(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut files = Vec::new();
        scan_directory_recursive(root, &mut files)?;
        files.sort();

        let mut pages = HashMap::new();
        for file in files {
            let (Some(stem), Ok(relative)) = (file.file_stem(), file.strip_prefix(root)) else {
                continue;
            };
            let title = stem.to_string_lossy().into_owned();
            let uid = relative.to_string_lossy().into_owned();
            if let Some(previous) = pages.insert(title.clone(), uid) {
                log::warn!("Two pages titled {title:?}, ignoring {previous}");
            }
        }
        log::debug!("Found {} pages under {}", pages.len(), root.display());

        Ok(Self {
            root: root.to_path_buf(),
            pages,
        })
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn path_of(&self, uid: &str) -> PathBuf {
        self.root.join(uid)
    }
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), NotesError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "md"
        {
            files.push(path);
        }
    }
    Ok(())
}

#[async_trait]
impl Graph for NotesGraph {
    async fn page_uid_by_title(&self, title: &str) -> Result<Option<String>, HostError> {
        Ok(self.pages.get(title).cloned())
    }

    /// The whole file stands in for the block's markdown.
    fn block_string(&self, uid: &str) -> Result<Option<String>, HostError> {
        let path = self.path_of(uid);
        if !path.is_file() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| HostError::Query(format!("{}: {e}", path.display())))
    }
}
