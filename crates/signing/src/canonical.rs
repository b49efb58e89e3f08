//! Canonical encoding shared by signing and validation.

use crate::{SignedRequest, SigningError};
use diskfile_models::{PathRef, RouteKind};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use url::form_urlencoded;
use url::Url;

/// Characters escaped inside a single URL path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub(crate) const PARAM_NAME: &str = "name";
pub(crate) const PARAM_EXPIRES: &str = "expires";
pub(crate) const PARAM_SIGNATURE: &str = "signature";

/// Message covered by the signature.
///
/// Pairs are sorted by key and form-urlencoded; the path goes through the same
/// normalization as `PathRef` so `a//b` and `a/b` sign identically.
pub(crate) fn message(request: &SignedRequest) -> String {
    let path = PathRef::new(request.disk.as_str(), &request.path);
    let expires = request.expires.map(|ts| ts.to_string()).unwrap_or_default();

    form_urlencoded::Serializer::new(String::new())
        .append_pair("disk", &request.disk)
        .append_pair(PARAM_EXPIRES, &expires)
        .append_pair(PARAM_NAME, &request.name)
        .append_pair("path", path.path())
        .append_pair("route", request.kind.as_str())
        .finish()
}

pub(crate) fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Percent-encodes each segment of `path`, dropping the root-disk leading slash
pub(crate) fn encode_path(path: &str) -> String {
    path.trim_start_matches('/')
        .split('/')
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Query string carried by a signed URL
pub(crate) fn query(name: &str, expires: Option<i64>, signature: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    serializer.append_pair(PARAM_NAME, name);
    if let Some(expires) = expires {
        serializer.append_pair(PARAM_EXPIRES, &expires.to_string());
    }
    serializer.append_pair(PARAM_SIGNATURE, signature);
    serializer.finish()
}

impl SignedRequest {
    /// Builds a request from already-decoded route parameters and the raw query string.
    ///
    /// Repeated or malformed signed parameters are rejected rather than guessed at.
    pub fn from_query(
        kind: RouteKind,
        disk: impl Into<String>,
        path: impl Into<String>,
        query: &str,
    ) -> Result<Self, SigningError> {
        let mut name = None;
        let mut expires = None;
        let mut signature = None;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                PARAM_NAME => &mut name,
                PARAM_EXPIRES => &mut expires,
                PARAM_SIGNATURE => &mut signature,
                _ => continue,
            };
            if slot.replace(value.into_owned()).is_some() {
                return Err(SigningError::Invalid(format!("repeated '{}' parameter", key)));
            }
        }

        let expires = expires
            .map(|value| {
                value
                    .parse::<i64>()
                    .map_err(|_| SigningError::Invalid(format!("malformed expiration '{}'", value)))
            })
            .transpose()?;

        Ok(Self {
            kind,
            disk: disk.into(),
            path: path.into(),
            name: name.unwrap_or_default(),
            expires,
            signature,
        })
    }

    /// Parses a full signed URL as produced by `UrlSigner::sign`.
    ///
    /// The route is located by its `/file/{stream|download}/{disk}/` prefix, so
    /// base URLs mounted under a sub-path parse too.
    pub fn parse(signed_url: &str) -> Result<Self, SigningError> {
        let url = Url::parse(signed_url)
            .map_err(|e| SigningError::Invalid(format!("malformed url: {}", e)))?;

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.collect())
            .unwrap_or_default();

        let start = segments
            .windows(2)
            .position(|pair| pair[0] == "file" && RouteKind::parse(pair[1]).is_some())
            .ok_or_else(|| SigningError::Invalid("not a file route".to_string()))?;

        let (kind, disk, rest) = match &segments[start + 1..] {
            [kind, disk, rest @ ..] if !rest.is_empty() => (*kind, *disk, rest),
            _ => return Err(SigningError::Invalid("missing disk or path".to_string())),
        };

        let decode = |segment: &str| -> Result<String, SigningError> {
            percent_decode_str(segment)
                .decode_utf8()
                .map(|decoded| decoded.into_owned())
                .map_err(|_| SigningError::Invalid("path is not valid UTF-8".to_string()))
        };

        let path = rest
            .iter()
            .map(|segment| decode(*segment))
            .collect::<Result<Vec<_>, _>>()?
            .join("/");

        let kind = RouteKind::parse(kind)
            .ok_or_else(|| SigningError::Invalid(format!("unknown route '{}'", kind)))?;

        Self::from_query(kind, decode(disk)?, path, url.query().unwrap_or_default())
    }
}
