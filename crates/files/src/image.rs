use crate::{FileError, FileHandle};
use std::path::Path;
use std::sync::Arc;

/// Operations the image adapter knows about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOp {
    /// Scale to fit inside the box, keeping the aspect ratio
    Resize { width: u32, height: u32 },
    Crop { x: u32, y: u32, width: u32, height: u32 },
    /// Scale to cover the box, then crop the overflow
    FitCrop { width: u32, height: u32 },
    /// Re-encode in the format of the given extension
    Convert(String),
}

/// Applies image operations to a local file.
///
/// Runs on a blocking thread; implementations may do CPU-heavy work.
pub trait ImageEditor: Send + Sync + 'static {
    fn apply(&self, path: &Path, ops: &[ImageOp]) -> anyhow::Result<()>;
}

/// Pending edits on a convertible file
pub struct Image {
    file: FileHandle,
    editor: Arc<dyn ImageEditor>,
    ops: Vec<ImageOp>,
}

impl FileHandle {
    /// Image adapter for this file, when it is a convertible image
    pub fn image(&self, editor: Arc<dyn ImageEditor>) -> Option<Image> {
        self.convertible().then(|| Image {
            file: self.clone(),
            editor,
            ops: Vec::new(),
        })
    }
}

impl Image {
    pub fn file(&self) -> &FileHandle {
        &self.file
    }

    pub fn ops(&self) -> &[ImageOp] {
        &self.ops
    }

    pub fn resize(mut self, width: u32, height: u32) -> Self {
        self.ops.push(ImageOp::Resize { width, height });
        self
    }

    pub fn crop(mut self, x: u32, y: u32, width: u32, height: u32) -> Self {
        self.ops.push(ImageOp::Crop { x, y, width, height });
        self
    }

    pub fn fit_crop(mut self, width: u32, height: u32) -> Self {
        self.ops.push(ImageOp::FitCrop { width, height });
        self
    }

    pub fn convert(mut self, extension: &str) -> Self {
        self.ops.push(ImageOp::Convert(extension.to_lowercase()));
        self
    }

    /// Applies the edits in place.
    ///
    /// A conversion renames the file to the new extension afterwards.
    pub async fn save(self) -> Result<FileHandle, FileError> {
        let Image { mut file, editor, ops } = self;
        let target_extension = ops.iter().rev().find_map(|op| match op {
            ImageOp::Convert(extension) => Some(extension.clone()),
            _ => None,
        });

        tracing::debug!("Applying {} image ops to {}", ops.len(), file.location());
        file.transform(move |path| editor.apply(path, &ops)).await?;

        if let Some(extension) = target_extension.filter(|ext| *ext != file.extension()) {
            let name = format!("{}.{}", diskfile_utils::filename(file.name()), extension);
            file.rename(&name).await?;
        }

        Ok(file)
    }

    /// Applies the edits to a copy at `path` on `disk`, leaving the original as is
    pub async fn save_as(self, path: &str, disk: Option<&str>) -> Result<FileHandle, FileError> {
        let copy = self.file.copy_to(path, disk).await?;
        Image { file: copy, ..self }.save().await
    }
}
