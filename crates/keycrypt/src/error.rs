use der::asn1::ObjectIdentifier;
use thiserror::Error;

/// Errors produced while decoding and decrypting an encrypted private key.
///
/// Every variant is terminal for the call that produced it; nothing is
/// retried internally. Messages never include the password, the derived
/// key, or decrypted key material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeycryptError {
    /// The DER input did not match the expected shape at some decoding
    /// point. `context` names that point (outer envelope, PBES2 params,
    /// PBKDF2 params, IV).
    #[error("malformed {context}: {source}")]
    MalformedEncoding {
        context: &'static str,
        source: der::Error,
    },

    /// The outer encryption algorithm is not PBES2.
    #[error("unsupported encryption scheme {oid}, expected PBES2")]
    UnsupportedScheme { oid: ObjectIdentifier },

    /// The key-derivation function is not PBKDF2.
    #[error("unsupported key derivation function {oid}, expected PBKDF2")]
    UnsupportedKdf { oid: ObjectIdentifier },

    /// The PBKDF2 PRF is outside the supported HMAC-SHA1/224/256 set.
    #[error("unsupported PBKDF2 PRF {oid}")]
    UnsupportedPrf { oid: ObjectIdentifier },

    /// The encryption scheme is outside the supported AES-CBC set.
    #[error("unsupported cipher {oid}")]
    UnsupportedCipher { oid: ObjectIdentifier },

    /// The decrypted key declares an algorithm the materializer does not
    /// handle (for EC keys this may be the named-curve identifier).
    #[error("unsupported private key algorithm {oid}")]
    UnsupportedKeyAlgorithm { oid: ObjectIdentifier },

    /// The IV must be exactly one AES block (16 bytes).
    #[error("invalid initialization vector length {len}, expected 16 bytes")]
    InvalidIvLength { len: usize },

    /// Ciphertext must be a nonzero multiple of the AES block size.
    #[error("invalid ciphertext length {len}, expected a nonzero multiple of 16 bytes")]
    InvalidCiphertextLength { len: usize },

    /// Padding validation failed after decryption. The password is wrong
    /// or the input is corrupted; the two cases are indistinguishable.
    #[error("invalid padding after decryption (wrong password or corrupted input)")]
    InvalidPadding,

    /// The decrypted plaintext is not a valid PKCS#8 private key structure.
    #[error("decrypted data is not a valid private key: {0}")]
    KeyStructure(pkcs8::Error),

    /// Interactive password acquisition failed.
    #[error("failed to read password: {reason}")]
    PasswordRead { reason: String },

    /// PEM input carried a label other than `ENCRYPTED PRIVATE KEY`.
    #[error("unexpected PEM label {label:?}, expected \"ENCRYPTED PRIVATE KEY\"")]
    NotEncryptedPrivateKeyPem { label: String },

    /// PEM armor itself did not decode.
    #[error("malformed PEM armor: {0}")]
    InvalidPem(pem_rfc7468::Error),
}
