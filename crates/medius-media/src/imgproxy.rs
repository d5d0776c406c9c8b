//! Signed thumbnail links for an external imgproxy instance.
//!
//! The service never resizes thumbnails itself; it derives a signed URL the
//! proxy will accept: `{host}/{signature}/rs:fit:{w}:{h}:{enlarge}/{base64(url)}`.
//! The signature is HMAC-SHA256 over `salt || unsigned_path`, base64
//! url-safe without padding. Any deviation in byte encoding, padding, or
//! component order breaks proxy compatibility, so the scheme is pinned by
//! exact-bytes tests.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::ThumbnailSize;

#[derive(Debug, thiserror::Error)]
pub enum SignerConfigError {
    #[error("Invalid hex in imgproxy {field}: {source}")]
    InvalidHex {
        field: &'static str,
        #[source]
        source: hex::FromHexError,
    },
}

/// Builds proxy-compatible signed thumbnail URLs. Key and salt are configured
/// as hex strings and decoded once at startup.
#[derive(Clone)]
pub struct ThumbnailSigner {
    host: String,
    key: Vec<u8>,
    salt: Vec<u8>,
    enlarge: bool,
}

impl ThumbnailSigner {
    pub fn new(
        host: impl Into<String>,
        hex_key: &str,
        hex_salt: &str,
        enlarge: bool,
    ) -> Result<Self, SignerConfigError> {
        let key = hex::decode(hex_key).map_err(|source| SignerConfigError::InvalidHex {
            field: "key",
            source,
        })?;
        let salt = hex::decode(hex_salt).map_err(|source| SignerConfigError::InvalidHex {
            field: "salt",
            source,
        })?;
        Ok(Self {
            host: host.into().trim_end_matches('/').to_string(),
            key,
            salt,
            enlarge,
        })
    }

    /// Derive the signed proxy URL requesting a `fit` resize of
    /// `original_url` to `size`.
    pub fn thumbnail_link(&self, original_url: &str, size: ThumbnailSize) -> String {
        let processing_options = format!(
            "rs:fit:{}:{}:{}",
            size.width,
            size.height,
            u8::from(self.enlarge)
        );
        let encoded_url = URL_SAFE_NO_PAD.encode(original_url.as_bytes());
        let unsigned_path = format!("/{}/{}", processing_options, encoded_url);
        let signature = self.sign(&unsigned_path);

        format!("{}/{}{}", self.host, signature, unsigned_path)
    }

    fn sign(&self, unsigned_path: &str) -> String {
        // The proxy signs salt || path; a path without the leading slash is a
        // bug in the caller, not a user error.
        assert!(
            unsigned_path.starts_with('/'),
            "unsigned path must start with '/'"
        );

        let mut mac =
            Hmac::<Sha256>::new_from_slice(&self.key).expect("HMAC accepts any key size");
        mac.update(&self.salt);
        mac.update(unsigned_path.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "943b421c9eb07c830af81030552c86009268de4e532ba2ee2eab8247c6da0881";
    const SALT: &str = "520f986b998545b4785e0defbc4f3c1203f22de2374a3d53cb7a7fe9fea309c5";
    const HOST: &str = "https://imgproxy.example.com";
    const URL: &str = "https://bucket.s3.amazonaws.com/media/photo.png?X-Amz-Signature=abc";

    fn signer(enlarge: bool) -> ThumbnailSigner {
        ThumbnailSigner::new(HOST, KEY, SALT, enlarge).unwrap()
    }

    // base64url(URL), no padding
    const ENCODED_URL: &str = "aHR0cHM6Ly9idWNrZXQuczMuYW1hem9uYXdzLmNvbS9tZWRpYS9waG90by5wbmc_WC1BbXotU2lnbmF0dXJlPWFiYw";

    #[test]
    fn test_exact_signed_url() {
        let link = signer(false).thumbnail_link(
            URL,
            ThumbnailSize {
                width: 128,
                height: 128,
            },
        );
        let expected = format!(
            "{HOST}/WerjxqA43ZI_NTECpnXmbAlWCquLqTG1_DPgKfoIXWo/rs:fit:128:128:0/{ENCODED_URL}"
        );
        assert_eq!(link, expected);
    }

    #[test]
    fn test_exact_signature_with_enlarge() {
        let link = signer(true).thumbnail_link(
            URL,
            ThumbnailSize {
                width: 320,
                height: 240,
            },
        );
        let signature = link
            .strip_prefix("https://imgproxy.example.com/")
            .unwrap()
            .split('/')
            .next()
            .unwrap();
        assert_eq!(signature, "h2Tg3PDYb8Seyg_DlhHT_qze19kK2mcUCa9no1TZXn4");
        assert!(link.contains("/rs:fit:320:240:1/"));
    }

    #[test]
    fn test_signing_is_deterministic() {
        let size = ThumbnailSize {
            width: 64,
            height: 64,
        };
        assert_eq!(
            signer(false).thumbnail_link(URL, size),
            signer(false).thumbnail_link(URL, size)
        );
    }

    #[test]
    fn test_any_input_change_changes_signature() {
        let size = ThumbnailSize {
            width: 64,
            height: 64,
        };
        let reference = signer(false).thumbnail_link(URL, size);

        let sig_of = |link: &str| {
            link.strip_prefix("https://imgproxy.example.com/")
                .unwrap()
                .split('/')
                .next()
                .unwrap()
                .to_string()
        };

        // Different source URL.
        let other_url = signer(false).thumbnail_link("https://example.com/x.png", size);
        assert_ne!(sig_of(&reference), sig_of(&other_url));

        // Different size.
        let other_size = signer(false).thumbnail_link(
            URL,
            ThumbnailSize {
                width: 65,
                height: 64,
            },
        );
        assert_ne!(sig_of(&reference), sig_of(&other_size));

        // Different enlarge flag.
        let other_enlarge = signer(true).thumbnail_link(URL, size);
        assert_ne!(sig_of(&reference), sig_of(&other_enlarge));
    }

    #[test]
    fn test_trailing_slash_host_is_normalized() {
        let signer = ThumbnailSigner::new("https://imgproxy.example.com/", KEY, SALT, false)
            .unwrap();
        let link = signer.thumbnail_link(
            URL,
            ThumbnailSize {
                width: 128,
                height: 128,
            },
        );
        assert!(link.starts_with("https://imgproxy.example.com/W"));
    }

    #[test]
    fn test_invalid_hex_is_config_error() {
        assert!(matches!(
            ThumbnailSigner::new(HOST, "not-hex", SALT, false),
            Err(SignerConfigError::InvalidHex { field: "key", .. })
        ));
        assert!(matches!(
            ThumbnailSigner::new(HOST, KEY, "zz", false),
            Err(SignerConfigError::InvalidHex { field: "salt", .. })
        ));
    }
}
