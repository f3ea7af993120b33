//! CloudFront canned-policy URL signing.
//!
//! Policy: `{"Statement":[{"Resource":"<url>","Condition":{"DateLessThan":{"AWS:EpochTime":<expires>}}}]}`
//! Signature = CloudFront-base64(RSA-SHA1-PKCS1v15(private_key, policy)).

use std::fmt;
use std::time::Duration;

use base64::Engine;
use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha1::{Digest, Sha1};
use vidcourse_core::config::CdnConfig;

use super::{SignedUrl, SigningError, UrlSigner};

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/');

pub struct CloudFrontSigner {
    base_url: String,
    key_pair_id: String,
    private_key: RsaPrivateKey,
}

impl fmt::Debug for CloudFrontSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudFrontSigner")
            .field("base_url", &self.base_url)
            .field("key_pair_id", &self.key_pair_id)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

fn load_private_key(pem: &str) -> Result<RsaPrivateKey, SigningError> {
    let pem = pem.trim();
    RsaPrivateKey::from_pkcs8_pem(pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
        // Never echo the parser error, it may quote key material
        .map_err(|_| {
            SigningError::InvalidKey("expected a PKCS#1 or PKCS#8 RSA PEM".to_string())
        })
}

/// Standard base64 with the three characters CloudFront rejects swapped out.
fn cloudfront_base64(data: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD
        .encode(data)
        .chars()
        .map(|c| match c {
            '+' => '-',
            '=' => '_',
            '/' => '~',
            other => other,
        })
        .collect()
}

fn canned_policy(resource: &str, expires: i64) -> String {
    // CloudFront rebuilds this exact byte sequence to verify, so key order matters
    format!(
        r#"{{"Statement":[{{"Resource":"{}","Condition":{{"DateLessThan":{{"AWS:EpochTime":{}}}}}}}]}}"#,
        resource, expires
    )
}

impl CloudFrontSigner {
    pub fn new(
        domain: &str,
        key_pair_id: impl Into<String>,
        private_key_pem: &str,
    ) -> Result<Self, SigningError> {
        let domain = domain.trim().trim_end_matches('/');
        let base_url = if domain.starts_with("http://") || domain.starts_with("https://") {
            domain.to_string()
        } else {
            format!("https://{}", domain)
        };

        Ok(Self {
            base_url,
            key_pair_id: key_pair_id.into(),
            private_key: load_private_key(private_key_pem)?,
        })
    }

    pub fn from_config(config: &CdnConfig) -> Result<Self, SigningError> {
        Self::new(&config.domain, config.key_pair_id.clone(), &config.private_key_pem)
    }

    /// Public URL of an object path on the CDN, before signing.
    pub fn resource_url(&self, object_path: &str) -> String {
        let encoded: Vec<String> = object_path
            .trim_start_matches('/')
            .split('/')
            .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
            .collect();
        format!("{}/{}", self.base_url, encoded.join("/"))
    }

    /// Sign `object_path` so that it expires at `expires_at`.
    pub fn sign_at(
        &self,
        object_path: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<SignedUrl, SigningError> {
        let resource = self.resource_url(object_path);
        let expires = expires_at.timestamp();
        let policy = canned_policy(&resource, expires);

        let digest = Sha1::digest(policy.as_bytes());
        let signature = self
            .private_key
            .sign(Pkcs1v15Sign::new::<Sha1>(), &digest)
            .map_err(|e| SigningError::SignatureFailed(e.to_string()))?;

        let separator = if resource.contains('?') { '&' } else { '?' };
        let url = format!(
            "{}{}Expires={}&Signature={}&Key-Pair-Id={}",
            resource,
            separator,
            expires,
            cloudfront_base64(&signature),
            self.key_pair_id
        );

        Ok(SignedUrl {
            url,
            expires_at: DateTime::<Utc>::from_timestamp(expires, 0).unwrap_or(expires_at),
        })
    }
}

impl UrlSigner for CloudFrontSigner {
    fn sign(&self, object_path: &str, valid_for: Duration) -> Result<SignedUrl, SigningError> {
        let valid_for = chrono::Duration::from_std(valid_for)
            .map_err(|e| SigningError::InvalidExpiry(e.to_string()))?;
        let expires_at = Utc::now()
            .checked_add_signed(valid_for)
            .ok_or_else(|| SigningError::InvalidExpiry("expiry overflows".to_string()))?;

        let signed = self.sign_at(object_path, expires_at)?;
        tracing::debug!(
            key = %object_path,
            expires_at = %signed.expires_at,
            "Signed CDN URL issued"
        );
        Ok(signed)
    }
}
