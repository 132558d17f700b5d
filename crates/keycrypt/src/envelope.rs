//! DER data model for the encrypted-key envelope and its nested
//! PBES2/PBKDF2 parameter structures.
//!
//! Nested parameters stay opaque (`AnyRef`) until the owning algorithm
//! identifier has been confirmed by the resolver; the decode functions here
//! are applied lazily so parameters of unrecognized algorithms are never
//! interpreted.

use der::asn1::{AnyRef, OctetStringRef};
use der::{Decode, Sequence, Tag};
use spki::AlgorithmIdentifierRef;

use crate::error::KeycryptError;

/// Encrypted PKCS#8 container (RFC 5958).
///
/// ```text
/// EncryptedPrivateKeyInfo ::= SEQUENCE {
///   encryptionAlgorithm  AlgorithmIdentifier,
///   encryptedData        OCTET STRING }
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Sequence)]
pub struct EncryptedPrivateKeyInfo<'a> {
    /// Identifies the encryption scheme; only PBES2 is accepted downstream.
    pub algorithm: AlgorithmIdentifierRef<'a>,

    /// The ciphertext of the inner `PrivateKeyInfo`.
    pub encrypted_data: OctetStringRef<'a>,
}

/// PBES2 parameter pair (RFC 8018 appendix A.4).
///
/// ```text
/// PBES2-params ::= SEQUENCE {
///   keyDerivationFunc  AlgorithmIdentifier,
///   encryptionScheme   AlgorithmIdentifier }
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Sequence)]
pub struct Pbes2Parameters<'a> {
    pub kdf: AlgorithmIdentifierRef<'a>,
    pub encryption_scheme: AlgorithmIdentifierRef<'a>,
}

/// PBKDF2 parameters (RFC 8018 appendix A.2), restricted to the shapes the
/// pipeline accepts.
///
/// ```text
/// PBKDF2-params ::= SEQUENCE {
///   salt            OCTET STRING,   -- `otherSource` choice rejected
///   iterationCount  INTEGER,
///   prf             AlgorithmIdentifier }
/// ```
///
/// The optional `keyLength` field is not modeled: an encoding that carries
/// it fails to decode, as does one that omits `prf` to rely on the RFC's
/// hmacWithSHA1 default. Salt is accepted only as an inlined byte string,
/// and the iteration count must fit a `u32` (zero decodes like any other
/// value; it is passed through to the KDF unchanged).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Sequence)]
pub struct Pbkdf2Parameters<'a> {
    pub salt: OctetStringRef<'a>,
    pub iteration_count: u32,
    pub prf: AlgorithmIdentifierRef<'a>,
}

/// Decodes the outer envelope. Trailing bytes after the structure are an
/// error.
pub fn parse_encrypted_private_key_info(
    der: &[u8],
) -> Result<EncryptedPrivateKeyInfo<'_>, KeycryptError> {
    EncryptedPrivateKeyInfo::from_der(der).map_err(|source| KeycryptError::MalformedEncoding {
        context: "encrypted private key envelope",
        source,
    })
}

/// Decodes the PBES2 parameter pair from the envelope's algorithm
/// identifier. Call only after the identifier has resolved to PBES2.
pub fn decode_pbes2_parameters<'a>(
    algorithm: &AlgorithmIdentifierRef<'a>,
) -> Result<Pbes2Parameters<'a>, KeycryptError> {
    let params = require_parameters(algorithm, Tag::Sequence, "PBES2 parameters")?;
    params
        .decode_as::<Pbes2Parameters<'a>>()
        .map_err(|source| KeycryptError::MalformedEncoding {
            context: "PBES2 parameters",
            source,
        })
}

/// Decodes the PBKDF2 parameters from the key-derivation algorithm
/// identifier. Call only after the identifier has resolved to PBKDF2.
pub fn decode_pbkdf2_parameters<'a>(
    kdf: &AlgorithmIdentifierRef<'a>,
) -> Result<Pbkdf2Parameters<'a>, KeycryptError> {
    let params = require_parameters(kdf, Tag::Sequence, "PBKDF2 parameters")?;
    params
        .decode_as::<Pbkdf2Parameters<'a>>()
        .map_err(|source| KeycryptError::MalformedEncoding {
            context: "PBKDF2 parameters",
            source,
        })
}

/// Decodes the CBC initialization vector carried as the encryption scheme's
/// parameters. Call only after the identifier has resolved to a supported
/// cipher. Length is validated by the decryption engine, not here.
pub fn decode_iv<'a>(scheme: &AlgorithmIdentifierRef<'a>) -> Result<&'a [u8], KeycryptError> {
    let params = require_parameters(scheme, Tag::OctetString, "cipher initialization vector")?;
    let iv = params.decode_as::<OctetStringRef<'a>>().map_err(|source| {
        KeycryptError::MalformedEncoding {
            context: "cipher initialization vector",
            source,
        }
    })?;
    Ok(iv.as_bytes())
}

fn require_parameters<'a>(
    algorithm: &AlgorithmIdentifierRef<'a>,
    expected: Tag,
    context: &'static str,
) -> Result<AnyRef<'a>, KeycryptError> {
    algorithm
        .parameters
        .ok_or_else(|| KeycryptError::MalformedEncoding {
            context,
            source: expected.value_error(),
        })
}
