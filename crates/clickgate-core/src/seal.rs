//! Sealed token codec for client-held correlation state.
//!
//! Seals a short string into an opaque, tamper-evident token the client can
//! carry (cookies, URL path segments) but not read or forge. Format is
//! `base64url(nonce (12 bytes) || ciphertext)`; the purpose string is bound
//! as AAD so a token sealed here cannot be replayed into another context.

use anyhow::{Context as _, Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chacha20poly1305::{
    ChaCha20Poly1305, Key, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
};

/// AAD bound into every sealed token.
const PURPOSE: &[u8] = b"clickgate.secret-cookies.v1";

/// Seals and unseals opaque client-held tokens with a server-held key.
#[derive(Clone)]
pub struct Sealer {
    cipher: ChaCha20Poly1305,
}

impl Sealer {
    pub fn new(key: &[u8; 32]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(key)),
        }
    }

    /// Build a sealer from a base64url-encoded 32-byte key (the `SEAL_KEY`
    /// env var format).
    pub fn from_base64_key(encoded: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .context("SEAL_KEY is not valid base64url")?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| anyhow!("SEAL_KEY must decode to exactly 32 bytes"))?;
        Ok(Self::new(&key))
    }

    pub fn seal(&self, plaintext: &str) -> Result<String> {
        let nonce = ChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(
                &nonce,
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: PURPOSE,
                },
            )
            .map_err(|e| anyhow!("seal failure: {e}"))?;

        let mut out = Vec::with_capacity(nonce.len() + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(out))
    }

    /// Unseal a token. Fails on malformed encoding, truncation, tampering,
    /// a wrong key, or a non-UTF-8 payload.
    pub fn unseal(&self, token: &str) -> Result<String> {
        let data = URL_SAFE_NO_PAD
            .decode(token)
            .context("sealed token is not valid base64url")?;
        if data.len() < 12 {
            return Err(anyhow!("sealed token too short"));
        }

        let (nonce_bytes, ciphertext) = data.split_at(12);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(nonce_bytes),
                Payload {
                    msg: ciphertext,
                    aad: PURPOSE,
                },
            )
            .map_err(|e| anyhow!("unseal failure: {e}"))?;

        String::from_utf8(plaintext).context("sealed payload is not UTF-8")
    }
}
