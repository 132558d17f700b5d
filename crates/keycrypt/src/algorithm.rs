//! Strict algorithm-identifier resolution.
//!
//! Every identifier read from the input is matched against a closed set and
//! converted to an enum at this boundary; later stages never see raw OIDs.
//! Unknown identifiers are an error, never a default.

use der::asn1::ObjectIdentifier;
use spki::AlgorithmIdentifierRef;

use crate::error::KeycryptError;

/// `id-PBES2` (RFC 8018): 1.2.840.113549.1.5.13
pub const OID_PBES2: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.5.13");

/// `id-PBKDF2` (RFC 8018): 1.2.840.113549.1.5.12
pub const OID_PBKDF2: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.5.12");

/// `hmacWithSHA1`: 1.2.840.113549.2.7
pub const OID_HMAC_SHA1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.2.7");

/// `hmacWithSHA224`: 1.2.840.113549.2.8
pub const OID_HMAC_SHA224: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.2.8");

/// `hmacWithSHA256`: 1.2.840.113549.2.9
pub const OID_HMAC_SHA256: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.2.9");

/// `aes128-CBC-PAD` (NIST): 2.16.840.1.101.3.4.1.2
pub const OID_AES_128_CBC: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.2");

/// `aes256-CBC-PAD` (NIST): 2.16.840.1.101.3.4.1.42
pub const OID_AES_256_CBC: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.42");

/// PRF used inside PBKDF2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prf {
    HmacSha1,
    HmacSha224,
    HmacSha256,
}

/// Supported symmetric encryption schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cipher {
    Aes128Cbc,
    Aes256Cbc,
}

impl Cipher {
    /// AES block size; also the required IV length.
    pub const BLOCK_SIZE: usize = 16;

    /// Length of the key PBKDF2 must derive for this cipher.
    pub fn key_size(self) -> usize {
        match self {
            Cipher::Aes128Cbc => 16,
            Cipher::Aes256Cbc => 32,
        }
    }
}

/// Requires the outer encryption algorithm to be PBES2.
pub fn require_pbes2(algorithm: &AlgorithmIdentifierRef<'_>) -> Result<(), KeycryptError> {
    if algorithm.oid == OID_PBES2 {
        Ok(())
    } else {
        Err(KeycryptError::UnsupportedScheme { oid: algorithm.oid })
    }
}

/// Requires the PBES2 key-derivation function to be PBKDF2.
pub fn require_pbkdf2(kdf: &AlgorithmIdentifierRef<'_>) -> Result<(), KeycryptError> {
    if kdf.oid == OID_PBKDF2 {
        Ok(())
    } else {
        Err(KeycryptError::UnsupportedKdf { oid: kdf.oid })
    }
}

/// Resolves the PBKDF2 PRF identifier.
pub fn resolve_prf(prf: &AlgorithmIdentifierRef<'_>) -> Result<Prf, KeycryptError> {
    match prf.oid {
        OID_HMAC_SHA1 => Ok(Prf::HmacSha1),
        OID_HMAC_SHA224 => Ok(Prf::HmacSha224),
        OID_HMAC_SHA256 => Ok(Prf::HmacSha256),
        other => Err(KeycryptError::UnsupportedPrf { oid: other }),
    }
}

/// Resolves the PBES2 encryption-scheme identifier.
pub fn resolve_cipher(scheme: &AlgorithmIdentifierRef<'_>) -> Result<Cipher, KeycryptError> {
    match scheme.oid {
        OID_AES_128_CBC => Ok(Cipher::Aes128Cbc),
        OID_AES_256_CBC => Ok(Cipher::Aes256Cbc),
        other => Err(KeycryptError::UnsupportedCipher { oid: other }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alg(oid: ObjectIdentifier) -> AlgorithmIdentifierRef<'static> {
        AlgorithmIdentifierRef {
            oid,
            parameters: None,
        }
    }

    #[test]
    fn resolves_supported_prfs() {
        assert_eq!(resolve_prf(&alg(OID_HMAC_SHA1)), Ok(Prf::HmacSha1));
        assert_eq!(resolve_prf(&alg(OID_HMAC_SHA224)), Ok(Prf::HmacSha224));
        assert_eq!(resolve_prf(&alg(OID_HMAC_SHA256)), Ok(Prf::HmacSha256));
    }

    #[test]
    fn rejects_hmac_sha512_prf() {
        let sha512 = ObjectIdentifier::new_unwrap("1.2.840.113549.2.11");
        assert_eq!(
            resolve_prf(&alg(sha512)),
            Err(KeycryptError::UnsupportedPrf { oid: sha512 })
        );
    }

    #[test]
    fn resolves_supported_ciphers_with_key_sizes() {
        assert_eq!(resolve_cipher(&alg(OID_AES_128_CBC)), Ok(Cipher::Aes128Cbc));
        assert_eq!(resolve_cipher(&alg(OID_AES_256_CBC)), Ok(Cipher::Aes256Cbc));
        assert_eq!(Cipher::Aes128Cbc.key_size(), 16);
        assert_eq!(Cipher::Aes256Cbc.key_size(), 32);
    }

    #[test]
    fn rejects_out_of_set_ciphers() {
        // des-CBC and aes192-CBC are both well-known and both out of scope.
        for oid in ["1.3.14.3.2.7", "2.16.840.1.101.3.4.1.22"] {
            let oid = ObjectIdentifier::new_unwrap(oid);
            assert_eq!(
                resolve_cipher(&alg(oid)),
                Err(KeycryptError::UnsupportedCipher { oid })
            );
        }
    }

    #[test]
    fn wrapper_and_kdf_gates_fail_closed() {
        assert!(require_pbes2(&alg(OID_PBES2)).is_ok());
        assert_eq!(
            require_pbes2(&alg(OID_PBKDF2)),
            Err(KeycryptError::UnsupportedScheme { oid: OID_PBKDF2 })
        );
        assert!(require_pbkdf2(&alg(OID_PBKDF2)).is_ok());
        assert_eq!(
            require_pbkdf2(&alg(OID_PBES2)),
            Err(KeycryptError::UnsupportedKdf { oid: OID_PBES2 })
        );
    }
}
