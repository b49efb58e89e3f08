use diskfile_models::RouteKind;
use hmac::Hmac;
use sha2::Sha256;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Issues and checks signed `/file/stream` and `/file/download` URLs.
///
/// Stateless: a signer is a keyed MAC plus the public base URL, and can be
/// shared freely between request handlers.
#[derive(Clone)]
pub struct UrlSigner {
    pub(crate) mac: HmacSha256,
    pub(crate) base_url: String,
}

/// The signed fields of an incoming stream/download request.
///
/// `path` is kept as received; it is normalized the same way on both sides
/// before the signature is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub kind: RouteKind,
    pub disk: String,
    pub path: String,
    pub name: String,
    /// Unix timestamp (seconds) after which the URL is rejected
    pub expires: Option<i64>,
    pub signature: Option<String>,
}
