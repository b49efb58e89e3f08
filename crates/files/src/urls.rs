use crate::{FileError, FileHandle};
use chrono::{Duration, Utc};
use diskfile_models::RouteKind;
use diskfile_storage::StorageError;

impl FileHandle {
    /// A URL that serves this file.
    ///
    /// Prefers the backend's own URL: a temporary one when `expiration` is
    /// given, the public one otherwise. Backends without URLs (or returning
    /// something that is not http(s)) fall back to a signed stream URL, so this
    /// always yields a usable link. Other backend failures propagate.
    pub async fn url(&self, expiration: Option<Duration>) -> Result<String, FileError> {
        let backend = self.backend()?;

        let native = match expiration {
            Some(expiration) => backend.temporary_url(self.path(), Utc::now() + expiration).await,
            None => backend.public_url(self.path()).await,
        };

        match native {
            Ok(url) if diskfile_utils::is_url(&url) => return Ok(url),
            Ok(url) => tracing::debug!("Ignoring non-http url '{}' for {}", url, self.location),
            Err(StorageError::Unsupported(reason)) => {
                tracing::debug!("No native url for {} ({}), signing one", self.location, reason)
            }
            Err(e) => return Err(e.into()),
        }

        Ok(self.stream_url(expiration, None))
    }

    /// Signed URL serving the file inline
    pub fn stream_url(&self, expiration: Option<Duration>, name: Option<&str>) -> String {
        self.signed_url(RouteKind::Stream, expiration, name)
    }

    /// Signed URL serving the file as an attachment
    pub fn download_url(&self, expiration: Option<Duration>, name: Option<&str>) -> String {
        self.signed_url(RouteKind::Download, expiration, name)
    }

    fn signed_url(&self, kind: RouteKind, expiration: Option<Duration>, name: Option<&str>) -> String {
        let expires_at = expiration
            .or(self.files.default_expiration())
            .map(|expiration| Utc::now() + expiration);

        self.files
            .signer()
            .sign(kind, &self.location, name.unwrap_or(&self.name), expires_at)
    }
}
