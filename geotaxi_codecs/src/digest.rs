use sha1::{Digest, Sha1};
use subtle::ConstantTimeEq;

/// The signed part of a position report, in wire text, in signing order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Fields<'a> {
    pub timestamp: &'a str,
    pub operator: &'a str,
    pub taxi: &'a str,
    pub lat: &'a str,
    pub lon: &'a str,
    pub device: &'a str,
    pub status: &'a str,
    pub version: &'a str,
}

impl Fields<'_> {
    /// Hex SHA-1 over the concatenated fields followed by the operator secret.
    pub fn sign(&self, secret: &str) -> String {
        let mut hasher = Sha1::new();
        for part in [
            self.timestamp,
            self.operator,
            self.taxi,
            self.lat,
            self.lon,
            self.device,
            self.status,
            self.version,
            secret,
        ] {
            hasher.update(part.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    pub fn verify(&self, secret: &str, hash: &str) -> bool {
        self.sign(secret).as_bytes().ct_eq(hash.as_bytes()).into()
    }
}
