use anyhow::Context;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// Number of random bytes in a remember token.
pub const REMEMBER_TOKEN_BYTES: usize = 32;

/// Generate a new remember token of [`REMEMBER_TOKEN_BYTES`] bytes.
pub fn remember_token() -> anyhow::Result<String> {
    string(REMEMBER_TOKEN_BYTES)
}

/// `n` bytes from the OS random source.
pub fn bytes(n: usize) -> anyhow::Result<Vec<u8>> {
    let mut b = vec![0u8; n];
    OsRng.try_fill_bytes(&mut b).context("read os rng")?;
    Ok(b)
}

/// `n_bytes` random bytes, base64 (URL-safe) encoded.
pub fn string(n_bytes: usize) -> anyhow::Result<String> {
    Ok(URL_SAFE.encode(bytes(n_bytes)?))
}

/// Number of bytes a base64 (URL-safe) token decodes to.
pub fn n_bytes(token: &str) -> anyhow::Result<usize> {
    let b = URL_SAFE.decode(token).context("decode remember token")?;
    Ok(b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_token_has_expected_entropy() {
        let token = remember_token().expect("rng");
        assert_eq!(n_bytes(&token).expect("decode"), REMEMBER_TOKEN_BYTES);
    }

    #[test]
    fn tokens_are_unique() {
        let a = remember_token().unwrap();
        let b = remember_token().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn short_strings_report_their_size() {
        let s = string(8).unwrap();
        assert_eq!(n_bytes(&s).unwrap(), 8);
    }

    #[test]
    fn n_bytes_rejects_non_base64() {
        assert!(n_bytes("not base64 at all!").is_err());
    }
}
