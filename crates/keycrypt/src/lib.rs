//! Decryption of PBES2 (PKCS#5 v2.0) encrypted PKCS#8 private keys.
//!
//! This crate currently supports:
//! - Decoding the DER `EncryptedPrivateKeyInfo` envelope (RFC 5958) and its
//!   nested PBES2/PBKDF2 parameter structures (RFC 8018)
//! - PBKDF2 key derivation with HMAC-SHA1, HMAC-SHA224, or HMAC-SHA256
//! - AES-128-CBC and AES-256-CBC payload decryption with PKCS#7 unpadding
//! - Materializing the decrypted plaintext into a typed RSA, ECDSA P-256,
//!   or Ed25519 private key
//!
//! Algorithm resolution is strict: identifiers outside the sets above are
//! rejected with an error naming the identifier, never downgraded or
//! defaulted. Nested parameters are only decoded after their algorithm
//! identifier has been accepted, so unrecognized algorithms never get their
//! parameters interpreted.
//!
//! The password comes from an explicit [`PasswordSource`]: caller-provided
//! bytes (used verbatim) or an echo-suppressed terminal prompt. Derived
//! keys, plaintext buffers, and prompted passwords are zeroized on drop.

#![forbid(unsafe_code)]

mod algorithm;
mod crypto;
mod envelope;
mod error;
mod key;
mod password;


pub use algorithm::{
    require_pbes2, require_pbkdf2, resolve_cipher, resolve_prf, Cipher, Prf, OID_AES_128_CBC,
    OID_AES_256_CBC, OID_HMAC_SHA1, OID_HMAC_SHA224, OID_HMAC_SHA256, OID_PBES2, OID_PBKDF2,
};
pub use crypto::{decrypt_pbes2_pbkdf2, derive_key, strip_pkcs7_padding};
pub use envelope::{
    decode_iv, decode_pbes2_parameters, decode_pbkdf2_parameters,
    parse_encrypted_private_key_info, EncryptedPrivateKeyInfo, Pbes2Parameters, Pbkdf2Parameters,
};
pub use error::KeycryptError;
pub use key::{
    materialize_private_key, PrivateKey, OID_EC_PUBLIC_KEY, OID_ED25519, OID_RSA_ENCRYPTION,
    OID_SECP256R1,
};
pub use password::PasswordSource;

/// PEM type label for an encrypted PKCS#8 key (RFC 7468 §11).
const ENCRYPTED_PRIVATE_KEY_LABEL: &str = "ENCRYPTED PRIVATE KEY";

/// Decrypts a DER-encoded `EncryptedPrivateKeyInfo` into a typed private
/// key.
///
/// Runs the full pipeline: decode the envelope, resolve every algorithm
/// identifier (failing closed on anything unsupported), decode the nested
/// parameters, acquire the password, derive the key, decrypt, strip the
/// padding, and parse the plaintext. The password is acquired only once the
/// structure has been validated, so a prompt source is never consulted for
/// a malformed file.
pub fn decrypt_encrypted_private_key(
    der: &[u8],
    password: &PasswordSource<'_>,
) -> Result<PrivateKey, KeycryptError> {
    let envelope = envelope::parse_encrypted_private_key_info(der)?;
    algorithm::require_pbes2(&envelope.algorithm)?;
    let pbes2 = envelope::decode_pbes2_parameters(&envelope.algorithm)?;

    algorithm::require_pbkdf2(&pbes2.kdf)?;
    let kdf_params = envelope::decode_pbkdf2_parameters(&pbes2.kdf)?;
    let prf = algorithm::resolve_prf(&kdf_params.prf)?;

    let cipher = algorithm::resolve_cipher(&pbes2.encryption_scheme)?;
    let iv = envelope::decode_iv(&pbes2.encryption_scheme)?;

    let password = password.acquire()?;
    let plaintext = crypto::decrypt_pbes2_pbkdf2(
        &kdf_params,
        prf,
        cipher,
        iv,
        envelope.encrypted_data.as_bytes(),
        &password,
    )?;
    key::materialize_private_key(&plaintext)
}

/// Convenience wrapper for a caller that already holds the password bytes.
pub fn decrypt_encrypted_private_key_with_password(
    der: &[u8],
    password: &[u8],
) -> Result<PrivateKey, KeycryptError> {
    decrypt_encrypted_private_key(der, &PasswordSource::Provided(password))
}

/// Decrypts a PEM-armored encrypted key (`-----BEGIN ENCRYPTED PRIVATE
/// KEY-----`). Any other armor label is rejected before the envelope is
/// examined.
pub fn decrypt_encrypted_private_key_pem(
    pem: &str,
    password: &PasswordSource<'_>,
) -> Result<PrivateKey, KeycryptError> {
    let (label, der) =
        pem_rfc7468::decode_vec(pem.as_bytes()).map_err(KeycryptError::InvalidPem)?;
    if label != ENCRYPTED_PRIVATE_KEY_LABEL {
        return Err(KeycryptError::NotEncryptedPrivateKeyPem {
            label: label.to_owned(),
        });
    }
    decrypt_encrypted_private_key(&der, password)
}
