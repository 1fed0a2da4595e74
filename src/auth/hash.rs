use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use hmac::{Hmac as HmacImpl, Mac};
use sha2::Sha256;

/// Keyed hash used to store remember tokens.
///
/// Deterministic for a given key, so a token can be looked up by its hash.
#[derive(Clone)]
pub struct Hmac {
    key: Vec<u8>,
}

impl Hmac {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.as_bytes().to_vec(),
        }
    }

    /// HMAC-SHA256 of `input`, base64 (URL-safe) encoded.
    ///
    /// An empty result is rejected downstream as a missing hash.
    pub fn hash(&self, input: &str) -> String {
        // new_from_slice accepts keys of any length for SHA256
        let mut mac = match <HmacImpl<Sha256>>::new_from_slice(&self.key) {
            Ok(m) => m,
            Err(_) => return String::new(),
        };
        mac.update(input.as_bytes());
        URL_SAFE.encode(mac.finalize().into_bytes())
    }
}
