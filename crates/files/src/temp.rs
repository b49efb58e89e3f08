use crate::{FileError, TempFactory};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

const DEFAULT_ATTEMPTS: usize = 8;

fn random_name() -> String {
    Uuid::new_v4().simple().to_string()
}

impl TempFactory {
    /// Factory allocating directories under `root`, which must be an absolute path
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_attempts: DEFAULT_ATTEMPTS,
            next_name: random_name,
        }
    }

    /// Replaces the random directory-name source
    pub fn with_name_source(mut self, next_name: fn() -> String) -> Self {
        self.next_name = next_name;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates a fresh, empty directory under the temp root.
    ///
    /// `create_dir` fails on an existing name, so a collision re-rolls the name
    /// instead of sharing a directory; the number of re-rolls is bounded.
    pub async fn make_temp_directory(&self) -> Result<PathBuf, FileError> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            FileError::TempDirectory(format!("{}: {}", self.root.display(), e))
        })?;

        for _ in 0..self.max_attempts {
            let directory = self.root.join((self.next_name)());

            match fs::create_dir(&directory).await {
                Ok(()) => {
                    tracing::debug!("Created temp directory {}", directory.display());
                    return Ok(directory);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!("Temp directory {} taken, re-rolling", directory.display());
                }
                Err(e) => {
                    return Err(FileError::TempDirectory(format!("{}: {}", directory.display(), e)));
                }
            }
        }

        Err(FileError::TempDirectory(format!(
            "no free name under {} after {} attempts",
            self.root.display(),
            self.max_attempts
        )))
    }
}
