//! Materialization of decrypted plaintext into a typed private key.
//!
//! This stage performs no cryptography: it parses the plaintext as a PKCS#8
//! `PrivateKeyInfo` and hands the key bytes to the matching key crate.

use core::fmt;

use der::asn1::ObjectIdentifier;
use der::Decode;
use pkcs8::PrivateKeyInfo;

use crate::error::KeycryptError;

/// `rsaEncryption` (RFC 8017): 1.2.840.113549.1.1.1
pub const OID_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");

/// `id-ecPublicKey` (RFC 5480): 1.2.840.10045.2.1
pub const OID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// `secp256r1` named curve (RFC 5480): 1.2.840.10045.3.1.7
pub const OID_SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");

/// `id-Ed25519` (RFC 8410): 1.3.101.112
pub const OID_ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// A decrypted, fully parsed private key.
pub enum PrivateKey {
    Rsa(rsa::RsaPrivateKey),
    EcdsaP256(p256::SecretKey),
    Ed25519(ed25519_dalek::SigningKey),
}

impl PrivateKey {
    /// Algorithm name for diagnostics.
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            PrivateKey::Rsa(_) => "RSA",
            PrivateKey::EcdsaP256(_) => "ECDSA P-256",
            PrivateKey::Ed25519(_) => "Ed25519",
        }
    }
}

// Key material must never appear in Debug output.
impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm_name())
            .finish_non_exhaustive()
    }
}

/// Parses decrypted plaintext as a PKCS#8 `PrivateKeyInfo` and materializes
/// the typed key. EC keys are accepted on the P-256 curve only; other named
/// curves (and unknown key algorithms) are rejected rather than guessed at.
pub fn materialize_private_key(plaintext: &[u8]) -> Result<PrivateKey, KeycryptError> {
    let info = PrivateKeyInfo::from_der(plaintext)
        .map_err(|source| KeycryptError::KeyStructure(pkcs8::Error::Asn1(source)))?;

    match info.algorithm.oid {
        OID_RSA_ENCRYPTION => rsa::RsaPrivateKey::try_from(info)
            .map(PrivateKey::Rsa)
            .map_err(KeycryptError::KeyStructure),
        OID_EC_PUBLIC_KEY => {
            let curve = named_curve(&info)?;
            if curve == OID_SECP256R1 {
                p256::SecretKey::try_from(info)
                    .map(PrivateKey::EcdsaP256)
                    .map_err(KeycryptError::KeyStructure)
            } else {
                Err(KeycryptError::UnsupportedKeyAlgorithm { oid: curve })
            }
        }
        OID_ED25519 => ed25519_dalek::SigningKey::try_from(info)
            .map(PrivateKey::Ed25519)
            .map_err(KeycryptError::KeyStructure),
        other => Err(KeycryptError::UnsupportedKeyAlgorithm { oid: other }),
    }
}

/// Extracts the namedCurve OID an EC key declares as its parameters.
fn named_curve(info: &PrivateKeyInfo<'_>) -> Result<ObjectIdentifier, KeycryptError> {
    info.algorithm
        .parameters
        .ok_or(KeycryptError::KeyStructure(
            pkcs8::Error::ParametersMalformed,
        ))?
        .decode_as::<ObjectIdentifier>()
        .map_err(|_| KeycryptError::KeyStructure(pkcs8::Error::ParametersMalformed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::asn1::AnyRef;
    use der::Encode;
    use pkcs8::EncodePrivateKey;
    use spki::AlgorithmIdentifierRef;

    #[test]
    fn materializes_ed25519() {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&[0x42; 32]);
        let doc = signing_key.to_pkcs8_der().unwrap();

        match materialize_private_key(doc.as_bytes()).unwrap() {
            PrivateKey::Ed25519(key) => assert_eq!(key.to_bytes(), signing_key.to_bytes()),
            other => panic!("expected Ed25519, got {other:?}"),
        }
    }

    #[test]
    fn materializes_p256() {
        let secret = p256::SecretKey::from_slice(&[0x17; 32]).unwrap();
        let doc = secret.to_pkcs8_der().unwrap();

        match materialize_private_key(doc.as_bytes()).unwrap() {
            PrivateKey::EcdsaP256(key) => assert_eq!(key.to_bytes(), secret.to_bytes()),
            other => panic!("expected P-256, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_key_algorithm() {
        let oid = ObjectIdentifier::new_unwrap("1.2.3.4.5");
        let info = PrivateKeyInfo {
            algorithm: AlgorithmIdentifierRef {
                oid,
                parameters: None,
            },
            private_key: &[0u8; 4],
            public_key: None,
        };
        let der = info.to_der().unwrap();

        assert_eq!(
            materialize_private_key(&der).unwrap_err(),
            KeycryptError::UnsupportedKeyAlgorithm { oid }
        );
    }

    #[test]
    fn rejects_non_p256_curves_before_parsing_key_bytes() {
        let secp384r1 = ObjectIdentifier::new_unwrap("1.3.132.0.34");
        let curve_der = secp384r1.to_der().unwrap();
        let info = PrivateKeyInfo {
            algorithm: AlgorithmIdentifierRef {
                oid: OID_EC_PUBLIC_KEY,
                parameters: Some(AnyRef::try_from(curve_der.as_slice()).unwrap()),
            },
            // Garbage key bytes: the curve gate must reject first.
            private_key: &[0xff; 3],
            public_key: None,
        };
        let der = info.to_der().unwrap();

        assert_eq!(
            materialize_private_key(&der).unwrap_err(),
            KeycryptError::UnsupportedKeyAlgorithm { oid: secp384r1 }
        );
    }

    #[test]
    fn rejects_plaintext_that_is_not_private_key_info() {
        assert!(matches!(
            materialize_private_key(b"not a key"),
            Err(KeycryptError::KeyStructure(_))
        ));
    }

    #[test]
    fn debug_output_is_redacted() {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(&[0x42; 32]);
        let rendered = format!("{:?}", PrivateKey::Ed25519(signing_key));
        assert!(rendered.contains("Ed25519"));
        assert!(!rendered.contains("42"));
    }
}
