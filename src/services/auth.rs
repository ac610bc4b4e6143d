use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Issues and checks the dev server's bearer tokens and password digests.
///
/// A token is `base64(user_id) "." base64(hmac_sha1(secret, user_id))`.
#[derive(Clone)]
pub struct TokenSigner {
    secret: String,
}

impl TokenSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, data: &[u8]) -> HmacSha1 {
        // HMAC accepts keys of any length.
        let mut mac = HmacSha1::new_from_slice(self.secret.as_bytes())
            .unwrap_or_else(|_| unreachable!("hmac key length is unrestricted"));
        mac.update(data);
        mac
    }

    pub fn issue(&self, user_id: &str) -> String {
        let signature = self.mac(user_id.as_bytes()).finalize().into_bytes();
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(user_id),
            URL_SAFE_NO_PAD.encode(signature)
        )
    }

    /// Returns the user id the token was issued for, if the signature holds.
    pub fn verify(&self, token: &str) -> Option<String> {
        let (id_part, sig_part) = token.split_once('.')?;
        let user_id = String::from_utf8(URL_SAFE_NO_PAD.decode(id_part).ok()?).ok()?;
        let signature = URL_SAFE_NO_PAD.decode(sig_part).ok()?;

        self.mac(user_id.as_bytes())
            .verify_slice(&signature)
            .ok()
            .map(|_| user_id)
    }

    pub fn hash_password(&self, email: &str, password: &str) -> String {
        let data = format!("{}:{password}", email.trim().to_lowercase());
        URL_SAFE_NO_PAD.encode(self.mac(data.as_bytes()).finalize().into_bytes())
    }

    pub fn verify_password(&self, email: &str, password: &str, digest: &str) -> bool {
        let data = format!("{}:{password}", email.trim().to_lowercase());
        match URL_SAFE_NO_PAD.decode(digest) {
            Ok(expected) => self.mac(data.as_bytes()).verify_slice(&expected).is_ok(),
            Err(_) => false,
        }
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
