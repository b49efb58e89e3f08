use crate::{FileError, FileHandle};
use diskfile_storage::ByteStream;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

/// Everything an HTTP layer needs to stream a file back.
///
/// Headers are computed before the body is opened, so a missing file fails
/// here rather than mid-response.
pub struct Delivery {
    pub content_type: String,
    pub content_length: u64,
    pub content_disposition: String,
    /// Caller-supplied headers, sent after the standard ones
    pub headers: Vec<(String, String)>,
    pub body: ByteStream,
}

impl Delivery {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl FileHandle {
    /// Streaming delivery of this file, inline or as an attachment named
    /// `filename` (the display name when `None`)
    pub async fn delivery(&self, filename: Option<&str>, as_download: bool) -> Result<Delivery, FileError> {
        let content_length = self.size().await?;
        let body = self.stream().await?;
        let filename = filename.unwrap_or(self.display_name());

        Ok(Delivery {
            content_type: self.mime(),
            content_length,
            content_disposition: content_disposition(filename, as_download),
            headers: Vec::new(),
            body,
        })
    }
}

/// `inline; filename="..."` or `attachment; filename="..."`.
///
/// Non-ASCII names get an ASCII fallback plus an RFC 5987 `filename*`.
pub(crate) fn content_disposition(filename: &str, as_download: bool) -> String {
    let disposition = if as_download { "attachment" } else { "inline" };

    let fallback: String = filename
        .chars()
        .map(|ch| match ch {
            '"' | '\\' => '_',
            ch if ch.is_ascii() && !ch.is_ascii_control() => ch,
            _ => '_',
        })
        .collect();

    if filename.is_ascii() && fallback == filename {
        format!("{}; filename=\"{}\"", disposition, fallback)
    } else {
        format!(
            "{}; filename=\"{}\"; filename*=UTF-8''{}",
            disposition,
            fallback,
            utf8_percent_encode(filename, NON_ALPHANUMERIC)
        )
    }
}
