use crate::{ContentSource, FileError, FileManager};
use diskfile_filesystem::FileSystem;
use diskfile_models::ROOT_DISK;
use diskfile_storage::ByteStream;
use futures::TryStreamExt;
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, CONTENT_TYPE};
use std::path::PathBuf;

/// Name used when a source offers nothing better
const FALLBACK_NAME: &str = "_";

impl ContentSource {
    /// http(s) strings become [`ContentSource::RemoteUrl`], anything else without
    /// a scheme a [`ContentSource::LocalPath`]
    pub fn parse(value: &str) -> Result<Self, FileError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(FileError::InvalidSource("empty source".to_string()));
        }

        if diskfile_utils::is_url(value) {
            return Ok(ContentSource::RemoteUrl(value.to_string()));
        }

        if let Some((scheme, _)) = value.split_once("://") {
            return Err(FileError::InvalidSource(format!("unsupported scheme '{}'", scheme)));
        }

        Ok(ContentSource::LocalPath(PathBuf::from(value)))
    }

    /// Opens the source as a stream plus the name it suggests for the file
    pub(crate) async fn open(self, files: &FileManager) -> Result<(ByteStream, String), FileError> {
        match self {
            ContentSource::LocalPath(path) => {
                let absolute = FileSystem::get_absolute_path_string(&path.to_string_lossy())
                    .map_err(|e| FileError::InvalidSource(format!("{}: {}", path.display(), e)))?;
                let file = files.load(&absolute, ROOT_DISK);
                let name = file.name().to_string();
                Ok((file.stream().await?, name))
            }
            ContentSource::RemoteUrl(url) => open_remote(files, &url).await,
            ContentSource::ByteStream { stream, name } => {
                let name = name
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| FALLBACK_NAME.to_string());
                Ok((stream, name))
            }
            ContentSource::ExistingFile(file) => {
                let name = file.display_name().to_string();
                Ok((file.stream().await?, name))
            }
        }
    }
}

async fn open_remote(files: &FileManager, url: &str) -> Result<(ByteStream, String), FileError> {
    let remote_error = |message: String| FileError::Remote {
        url: url.to_string(),
        message,
    };

    tracing::info!("Fetching {}", url);

    let response = files
        .client()
        .get(url)
        .send()
        .await
        .map_err(|e| remote_error(e.to_string()))?
        .error_for_status()
        .map_err(|e| remote_error(e.to_string()))?;

    let name = remote_name(url, response.headers());
    let stream: ByteStream = Box::pin(response.bytes_stream().map_err(std::io::Error::other));

    Ok((stream, name))
}

/// Name for a downloaded file: the `Content-Disposition` filename, else the URL's
/// file stem with an extension matching `Content-Type`, else the URL's last segment
pub(crate) fn remote_name(url: &str, headers: &HeaderMap) -> String {
    let url_name = reqwest::Url::parse(url)
        .ok()
        .and_then(|url| url.path_segments()?.last().map(str::to_string))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_NAME.to_string());

    let disposition_name = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(disposition_filename);

    if let Some(name) = disposition_name {
        return name;
    }

    let mime_extension = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .and_then(|mime| mime_guess::get_mime_extensions_str(mime.trim()))
        .and_then(|extensions| extensions.first());

    match mime_extension {
        Some(extension) if url_name != FALLBACK_NAME => {
            format!("{}.{}", diskfile_utils::filename(&url_name), extension)
        }
        Some(extension) => format!("file.{}", extension),
        None => url_name,
    }
}

fn disposition_filename(value: &str) -> Option<String> {
    let start = value.find("filename=\"")? + "filename=\"".len();
    let end = value[start..].find('"')? + start;
    let name = diskfile_utils::basename(&value[start..end]);
    Some(name.to_string()).filter(|name| !name.is_empty())
}
