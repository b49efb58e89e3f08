use crate::{FileCollection, FileError, FileHandle};
use bytes::Bytes;
use diskfile_models::ROOT_DISK;
use futures::StreamExt;
use std::collections::HashSet;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Messages from the async reader to the blocking zip writer
enum ArchiveChunk {
    Entry(String),
    Data(Bytes),
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: FileHandle) {
        self.files.push(file);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileHandle> {
        self.files.iter()
    }

    pub fn into_inner(self) -> Vec<FileHandle> {
        self.files
    }

    /// Moves every file to the default disk, in order
    pub async fn store(&mut self) -> Result<&mut Self, FileError> {
        for file in &mut self.files {
            file.store(None).await?;
        }
        Ok(self)
    }

    /// Moves every file to the cloud disk, in order
    pub async fn upload(&mut self) -> Result<&mut Self, FileError> {
        for file in &mut self.files {
            file.upload().await?;
        }
        Ok(self)
    }

    pub async fn delete(&self) -> Result<(), FileError> {
        for file in &self.files {
            file.delete().await?;
        }
        Ok(())
    }

    /// True when every file exists; an empty collection is vacuously true
    pub async fn exists(&self) -> Result<bool, FileError> {
        for file in &self.files {
            if !file.exists().await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Zips all files into a temp file named `name` (`.zip` appended if missing).
    ///
    /// Entries are named by display name; repeated names get a ` (n)` suffix.
    /// Contents are streamed file by file, never held in memory as a whole.
    pub async fn archive(&self, name: &str) -> Result<FileHandle, FileError> {
        let name = if name.to_lowercase().ends_with(".zip") {
            name.to_string()
        } else {
            format!("{}.zip", name)
        };

        let files = self
            .files
            .first()
            .map(|file| file.manager().clone())
            .ok_or_else(|| FileError::Archive("nothing to archive".to_string()))?;

        let directory = files.temp_factory().make_temp_directory().await?;
        let target = directory.join(diskfile_utils::basename(&diskfile_utils::normalize(&name)));

        let (sender, receiver) = mpsc::channel::<ArchiveChunk>(8);
        let writer_target = target.clone();
        let writer = tokio::task::spawn_blocking(move || write_archive(writer_target, receiver));

        let fed = self.feed(sender).await;
        let written = writer
            .await
            .map_err(|e| FileError::Archive(e.to_string()))?;

        // A writer failure surfaces in the feeder as a closed channel, so it wins
        let outcome = match (fed, written) {
            (_, Err(e)) | (Err(e), Ok(_)) => Err(e),
            (Ok(()), Ok(entries)) => Ok(entries),
        };
        let entries = match outcome {
            Ok(entries) => entries,
            Err(e) => {
                let _ = tokio::fs::remove_dir_all(&directory).await;
                return Err(e);
            }
        };

        tracing::info!("Archived {} files into {}", entries, target.display());

        let mut archive = files.load(&target.to_string_lossy(), ROOT_DISK);
        archive.name = name;
        archive.ensure_exists().await?;
        Ok(archive)
    }

    async fn feed(&self, sender: mpsc::Sender<ArchiveChunk>) -> Result<(), FileError> {
        let closed = || FileError::Archive("archive writer stopped".to_string());
        let mut names = HashSet::new();

        for file in &self.files {
            let mut stream = file.stream().await?;
            let entry = unique_entry(&mut names, file.display_name());

            sender.send(ArchiveChunk::Entry(entry)).await.map_err(|_| closed())?;
            while let Some(chunk) = stream.next().await {
                sender.send(ArchiveChunk::Data(chunk?)).await.map_err(|_| closed())?;
            }
        }

        Ok(())
    }
}

fn write_archive(target: PathBuf, mut receiver: mpsc::Receiver<ArchiveChunk>) -> Result<usize, FileError> {
    let archive_error = |e: zip::result::ZipError| FileError::Archive(e.to_string());

    let file = std::fs::File::create(&target)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut entries = 0;

    while let Some(chunk) = receiver.blocking_recv() {
        match chunk {
            ArchiveChunk::Entry(name) => {
                zip.start_file(name, options).map_err(archive_error)?;
                entries += 1;
            }
            ArchiveChunk::Data(data) => zip.write_all(&data)?,
        }
    }

    zip.finish().map_err(archive_error)?;
    Ok(entries)
}

/// `name`, or `name (n).ext` for the n-th repeat
fn unique_entry(names: &mut HashSet<String>, name: &str) -> String {
    let name = if name.is_empty() { "_" } else { name };
    if names.insert(name.to_string()) {
        return name.to_string();
    }

    let stem = diskfile_utils::filename(name);
    let extension = diskfile_utils::extension(name);

    (1..)
        .map(|n| {
            if extension.is_empty() {
                format!("{} ({})", stem, n)
            } else {
                format!("{} ({}).{}", stem, n, extension)
            }
        })
        .find(|candidate| names.insert(candidate.clone()))
        .unwrap_or_else(|| name.to_string())
}

impl From<Vec<FileHandle>> for FileCollection {
    fn from(files: Vec<FileHandle>) -> Self {
        Self { files }
    }
}

impl FromIterator<FileHandle> for FileCollection {
    fn from_iter<I: IntoIterator<Item = FileHandle>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FileCollection {
    type Item = FileHandle;
    type IntoIter = std::vec::IntoIter<FileHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileCollection {
    type Item = &'a FileHandle;
    type IntoIter = std::slice::Iter<'a, FileHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
