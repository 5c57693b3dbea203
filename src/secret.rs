//! Shared-secret provisioning for authenticator apps.

use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::base32;

/// Secret size in bytes (160 bits, the TOTP convention).
pub const SECRET_LENGTH: usize = 20;
const MANUAL_GROUP: usize = 4;

/// Opaque shared secret owned by exactly one subject.
///
/// Created once during authenticator setup and cleared when two-factor is
/// disabled; a cleared secret is never reused.
#[derive(Clone)]
pub struct SharedSecret(Zeroizing<Vec<u8>>);

impl PartialEq for SharedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for SharedSecret {}

impl SharedSecret {
    /// Fill a fresh secret from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = vec![0u8; SECRET_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self(Zeroizing::new(bytes))
    }

    /// Rebuild a secret from its stored Base32 text form.
    ///
    /// Decoding is lenient; corrupted text yields a secret that rejects
    /// every code rather than an error.
    pub fn from_base32(text: &str) -> Self {
        Self(Zeroizing::new(base32::decode(text)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Canonical Base32 text form.
    pub fn to_base32(&self) -> String {
        base32::encode(&self.0)
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}

/// Provisioning URI consumed by authenticator apps.
///
/// Byte-exact format; algorithm, digit count and period are left to the
/// consumer defaults (SHA1 / 6 / 30 s).
pub fn provisioning_uri(
    issuer: &str,
    account: &str,
    secret: &SharedSecret,
) -> String {
    let issuer = urlencoding::encode(issuer);
    let account = urlencoding::encode(account);
    format!(
        "otpauth://totp/{issuer}:{account}?secret={}&issuer={issuer}",
        secret.to_base32()
    )
}

/// Base32 text in groups of four symbols, for typing the key by hand.
pub fn manual_entry_format(secret: &SharedSecret) -> String {
    let text = secret.to_base32();
    let mut out = String::with_capacity(text.len() + text.len() / MANUAL_GROUP);
    for (i, symbol) in text.chars().enumerate() {
        if i > 0 && i % MANUAL_GROUP == 0 {
            out.push(' ');
        }
        out.push(symbol);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secret_shape() {
        let secret = SharedSecret::generate();
        assert_eq!(secret.as_bytes().len(), SECRET_LENGTH);
        // ceil(160 / 5) symbols, no padding.
        assert_eq!(secret.to_base32().len(), 32);
        assert_ne!(secret, SharedSecret::generate());
    }

    #[test]
    fn test_base32_round_trip() {
        let secret = SharedSecret::generate();
        let restored = SharedSecret::from_base32(&secret.to_base32());
        assert_eq!(secret, restored);

        let typed = manual_entry_format(&secret).to_lowercase();
        assert_eq!(SharedSecret::from_base32(&typed), secret);
    }

    #[test]
    fn test_provisioning_uri_is_byte_exact() {
        let secret = SharedSecret::from_base32("JBSWY3DPEHPK3PXP");
        let uri =
            provisioning_uri("VzOverFlow", "user@example.com", &secret);
        assert_eq!(
            uri,
            "otpauth://totp/VzOverFlow:user%40example.com?secret=JBSWY3DPEHPK3PXP&issuer=VzOverFlow"
        );
    }

    #[test]
    fn test_provisioning_uri_escapes_issuer() {
        let secret = SharedSecret::from_base32("JBSWY3DPEHPK3PXP");
        let uri = provisioning_uri("Vz OverFlow", "user:name", &secret);
        assert_eq!(
            uri,
            "otpauth://totp/Vz%20OverFlow:user%3Aname?secret=JBSWY3DPEHPK3PXP&issuer=Vz%20OverFlow"
        );
    }

    #[test]
    fn test_manual_entry_grouping() {
        let secret = SharedSecret::from_base32("ABCDEFGHIJKLMNOP");
        assert_eq!(manual_entry_format(&secret), "ABCD EFGH IJKL MNOP");

        let short = SharedSecret::from_base32("JBSWY3DPEE");
        assert_eq!(manual_entry_format(&short), "JBSW Y3DP EE");
    }
}
