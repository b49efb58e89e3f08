use crate::canonical::{encode_path, encode_segment, message, query};
use crate::models::HmacSha256;
use crate::{SignedRequest, SigningError, UrlSigner};
use chrono::{DateTime, Utc};
use diskfile_models::{PathRef, RouteKind};
use hmac::Mac;
use subtle::ConstantTimeEq;

impl UrlSigner {
    pub fn new(secret: impl AsRef<[u8]>, base_url: impl Into<String>) -> Result<Self, SigningError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(SigningError::Invalid("signing secret is empty".to_string()));
        }

        let mac = HmacSha256::new_from_slice(secret)
            .map_err(|e| SigningError::Invalid(format!("unusable signing secret: {}", e)))?;

        Ok(Self {
            mac,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Signed URL for `location` on the given route
    pub fn sign(
        &self,
        kind: RouteKind,
        location: &PathRef,
        name: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> String {
        let request = SignedRequest {
            kind,
            disk: location.disk().to_string(),
            path: location.path().to_string(),
            name: name.to_string(),
            expires: expires_at.map(|at| at.timestamp()),
            signature: None,
        };
        let signature = self.signature(&request);

        tracing::debug!("Signed {} url for {} (expires: {:?})", kind, location, request.expires);

        format!(
            "{}/file/{}/{}/{}?{}",
            self.base_url,
            kind,
            encode_segment(location.disk()),
            encode_path(location.path()),
            query(name, request.expires, &signature)
        )
    }

    /// Checks the signature first, then the expiration against `now`.
    ///
    /// A URL signed to expire at `T` is still accepted at `T`.
    pub fn verify(&self, request: &SignedRequest, now: DateTime<Utc>) -> Result<(), SigningError> {
        let provided = request
            .signature
            .as_deref()
            .ok_or_else(|| SigningError::Invalid("missing signature".to_string()))?;

        let expected = self.signature(request);
        if !bool::from(expected.as_bytes().ct_eq(provided.as_bytes())) {
            return Err(SigningError::Invalid("signature mismatch".to_string()));
        }

        match request.expires {
            Some(expires) if now.timestamp() > expires => Err(SigningError::Expired(expires)),
            _ => Ok(()),
        }
    }

    /// `verify` against the current time
    pub fn validate(&self, request: &SignedRequest) -> Result<(), SigningError> {
        self.verify(request, Utc::now())
    }

    fn signature(&self, request: &SignedRequest) -> String {
        let mut mac = self.mac.clone();
        mac.update(message(request).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const EXPIRES: i64 = 1_900_000_000;

    fn signer() -> UrlSigner {
        UrlSigner::new("test-secret", "https://files.test/").unwrap()
    }

    fn signed(expires: Option<i64>) -> SignedRequest {
        let location = PathRef::new("local", "reports/q1.csv");
        let expires_at = expires.map(|ts| Utc.timestamp_opt(ts, 0).unwrap());
        let url = signer().sign(RouteKind::Stream, &location, "Q1 report.csv", expires_at);
        SignedRequest::parse(&url).unwrap()
    }

    fn at(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).unwrap()
    }

    #[test]
    fn test_sign_url_shape() {
        let url = signer().sign(
            RouteKind::Download,
            &PathRef::new("local", "reports/q1 final.csv"),
            "q1.csv",
            None,
        );
        assert!(url.starts_with("https://files.test/file/download/local/reports/q1%20final.csv?name=q1.csv&signature="));
        assert!(!url.contains("expires="));
    }

    #[test]
    fn test_round_trip() {
        let request = signed(Some(EXPIRES));
        assert_eq!(request.path, "reports/q1.csv");
        assert_eq!(request.name, "Q1 report.csv");
        assert_eq!(signer().verify(&request, at(EXPIRES - 100)), Ok(()));
    }

    #[test]
    fn test_round_trip_with_dot_segments() {
        let location = PathRef::new("local", "a//b/./c.txt");
        let url = signer().sign(RouteKind::Stream, &location, "c.txt", Some(at(EXPIRES)));
        assert!(url.contains("/file/stream/local/a/b/c.txt?"));

        let request = SignedRequest::parse(&url).unwrap();
        assert_eq!(request.path, "a/b/c.txt");
        assert_eq!(signer().verify(&request, at(EXPIRES - 1)), Ok(()));
    }

    #[test]
    fn test_round_trip_reserved_characters() {
        let location = PathRef::new("local", "dir a/100% #1+x ü;?.txt");
        let url = signer().sign(RouteKind::Download, &location, "100% #1+x ü;?.txt", None);

        let request = SignedRequest::parse(&url).unwrap();
        assert_eq!(request.path, "dir a/100% #1+x ü;?.txt");
        assert_eq!(request.name, "100% #1+x ü;?.txt");
        assert_eq!(signer().verify(&request, at(EXPIRES)), Ok(()));
    }

    #[test]
    fn test_round_trip_root_disk() {
        let location = PathRef::new("root", "/tmp/diskfile/abc/file.bin");
        let url = signer().sign(RouteKind::Stream, &location, "file.bin", None);
        let request = SignedRequest::parse(&url).unwrap();

        assert_eq!(request.path, "tmp/diskfile/abc/file.bin");
        assert_eq!(PathRef::new(request.disk.as_str(), &request.path), location);
        assert_eq!(signer().validate(&request), Ok(()));
    }

    #[test]
    fn test_tampering_any_field_invalidates() {
        let original = signed(Some(EXPIRES));
        let now = at(EXPIRES - 100);

        let tampered = [
            SignedRequest { disk: "cloud".to_string(), ..original.clone() },
            SignedRequest { path: "reports/q2.csv".to_string(), ..original.clone() },
            SignedRequest { name: "other.csv".to_string(), ..original.clone() },
            SignedRequest { expires: Some(EXPIRES + 3600), ..original.clone() },
            SignedRequest { expires: None, ..original.clone() },
            SignedRequest { kind: RouteKind::Download, ..original.clone() },
            SignedRequest { signature: None, ..original.clone() },
        ];

        for request in tampered {
            assert!(
                matches!(signer().verify(&request, now), Err(SigningError::Invalid(_))),
                "accepted tampered request {:?}",
                request
            );
        }
    }

    #[test]
    fn test_other_secret_is_invalid() {
        let other = UrlSigner::new("another-secret", "https://files.test").unwrap();
        assert!(matches!(other.verify(&signed(None), at(0)), Err(SigningError::Invalid(_))));
    }

    #[test]
    fn test_expiration_boundary() {
        let request = signed(Some(EXPIRES));

        assert_eq!(signer().verify(&request, at(EXPIRES - 1)), Ok(()));
        assert_eq!(signer().verify(&request, at(EXPIRES)), Ok(()));
        assert_eq!(signer().verify(&request, at(EXPIRES + 1)), Err(SigningError::Expired(EXPIRES)));
    }

    #[test]
    fn test_invalid_signature_wins_over_expiry() {
        let request = SignedRequest { name: "x".to_string(), ..signed(Some(EXPIRES)) };
        assert!(matches!(signer().verify(&request, at(EXPIRES + 1)), Err(SigningError::Invalid(_))));
    }

    #[test]
    fn test_without_expiration_never_expires() {
        assert_eq!(signer().verify(&signed(None), at(4_000_000_000)), Ok(()));
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        assert!(UrlSigner::new("", "https://files.test").is_err());
    }
}
