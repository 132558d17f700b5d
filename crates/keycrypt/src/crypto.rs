//! Key derivation, CBC decryption, and PKCS#7 unpadding.

use aes::{Aes128, Aes256};
use cipher::block_padding::NoPadding;
use cipher::{BlockCipher, BlockDecryptMut, KeyInit, KeyIvInit};
use sha1::Sha1;
use sha2::{Sha224, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::algorithm::{Cipher, Prf};
use crate::envelope::Pbkdf2Parameters;
use crate::error::KeycryptError;

/// Advisory floor for the iteration count (RFC 8018 recommends at least
/// 1000). Lower counts still decrypt; they only draw a warning.
const ITERATION_WARN_FLOOR: u32 = 1000;

/// Derives the symmetric key for `cipher` via PBKDF2. Salt and iteration
/// count come verbatim from the decoded parameters.
pub fn derive_key(
    params: &Pbkdf2Parameters<'_>,
    prf: Prf,
    cipher: Cipher,
    password: &[u8],
) -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(vec![0u8; cipher.key_size()]);
    let salt = params.salt.as_bytes();
    let rounds = params.iteration_count;
    match prf {
        Prf::HmacSha1 => pbkdf2::pbkdf2_hmac::<Sha1>(password, salt, rounds, &mut key),
        Prf::HmacSha224 => pbkdf2::pbkdf2_hmac::<Sha224>(password, salt, rounds, &mut key),
        Prf::HmacSha256 => pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut key),
    }
    key
}

/// Decrypts a PBES2/PBKDF2 payload and strips its padding.
///
/// The IV and ciphertext lengths are validated before any key derivation or
/// decryption happens. The returned plaintext is zeroized on drop.
pub fn decrypt_pbes2_pbkdf2(
    params: &Pbkdf2Parameters<'_>,
    prf: Prf,
    cipher: Cipher,
    iv: &[u8],
    ciphertext: &[u8],
    password: &[u8],
) -> Result<Zeroizing<Vec<u8>>, KeycryptError> {
    if iv.len() != Cipher::BLOCK_SIZE {
        return Err(KeycryptError::InvalidIvLength { len: iv.len() });
    }
    if ciphertext.is_empty() || ciphertext.len() % Cipher::BLOCK_SIZE != 0 {
        return Err(KeycryptError::InvalidCiphertextLength {
            len: ciphertext.len(),
        });
    }

    if params.iteration_count < ITERATION_WARN_FLOOR {
        log::warn!(
            "PBKDF2 iteration count {} is below the RFC 8018 recommended minimum of {}",
            params.iteration_count,
            ITERATION_WARN_FLOOR
        );
    }
    log::debug!(
        "decrypting {} bytes with {:?} ({:?}, {} PBKDF2 iterations)",
        ciphertext.len(),
        cipher,
        prf,
        params.iteration_count
    );

    let key = derive_key(params, prf, cipher, password);
    let mut plaintext = Zeroizing::new(ciphertext.to_vec());
    match cipher {
        Cipher::Aes128Cbc => cbc_decrypt_in_place::<Aes128>(&key, iv, &mut plaintext)?,
        Cipher::Aes256Cbc => cbc_decrypt_in_place::<Aes256>(&key, iv, &mut plaintext)?,
    }

    let unpadded_len = strip_pkcs7_padding(&plaintext)?.len();
    plaintext.truncate(unpadded_len);
    Ok(plaintext)
}

fn cbc_decrypt_in_place<C>(key: &[u8], iv: &[u8], buf: &mut [u8]) -> Result<(), KeycryptError>
where
    C: BlockCipher + BlockDecryptMut + KeyInit,
{
    let decryptor = cbc::Decryptor::<C>::new_from_slices(key, iv)
        .map_err(|_| KeycryptError::InvalidIvLength { len: iv.len() })?;
    // The Ok slice keeps `buf` borrowed while `map_err` runs, so the length
    // has to be read up front.
    let len = buf.len();
    decryptor
        .decrypt_padded_mut::<NoPadding>(buf)
        .map_err(|_| KeycryptError::InvalidCiphertextLength { len })?;
    Ok(())
}

/// Validates PKCS#7 padding and returns the payload slice.
///
/// Rules, applied in order: the buffer must be at least one block (16
/// bytes) long; the pad length is the value of the final byte and must lie
/// in 1..=16; it must not exceed the buffer length; every one of the final
/// `pad_len` bytes must equal `pad_len`. The tail comparison is
/// constant-time; a failure reveals nothing about which rule tripped.
pub fn strip_pkcs7_padding(buf: &[u8]) -> Result<&[u8], KeycryptError> {
    if buf.len() < Cipher::BLOCK_SIZE {
        return Err(KeycryptError::InvalidPadding);
    }
    let pad_len = usize::from(buf[buf.len() - 1]);
    if pad_len < 1 || pad_len > Cipher::BLOCK_SIZE {
        return Err(KeycryptError::InvalidPadding);
    }
    if pad_len > buf.len() {
        return Err(KeycryptError::InvalidPadding);
    }
    let (payload, pad) = buf.split_at(buf.len() - pad_len);
    let expected = [pad_len as u8; Cipher::BLOCK_SIZE];
    if bool::from(pad.ct_eq(&expected[..pad_len])) {
        Ok(payload)
    } else {
        Err(KeycryptError::InvalidPadding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::asn1::OctetStringRef;
    use spki::AlgorithmIdentifierRef;

    use crate::algorithm::OID_HMAC_SHA1;

    fn params<'a>(salt: &'a [u8], iteration_count: u32) -> Pbkdf2Parameters<'a> {
        Pbkdf2Parameters {
            salt: OctetStringRef::new(salt).unwrap(),
            iteration_count,
            prf: AlgorithmIdentifierRef {
                oid: OID_HMAC_SHA1,
                parameters: None,
            },
        }
    }

    #[test]
    fn derive_key_matches_rfc6070_sha1_vector() {
        // RFC 6070 case 1: P="password", S="salt", c=1, DK=0c60c80f...
        // PBKDF2 output is prefix-consistent, so a 16-byte key is the first
        // 16 bytes of the 20-byte vector.
        let key = derive_key(
            &params(b"salt", 1),
            Prf::HmacSha1,
            Cipher::Aes128Cbc,
            b"password",
        );
        assert_eq!(
            key.as_slice(),
            hex::decode("0c60c80f961f0e71f3a9b524af601206")
                .unwrap()
                .as_slice()
        );
    }

    #[test]
    fn derive_key_matches_rfc7914_sha256_vector() {
        // RFC 7914 §11: PBKDF2-HMAC-SHA256, P="passwd", S="salt", c=1.
        let key = derive_key(
            &params(b"salt", 1),
            Prf::HmacSha256,
            Cipher::Aes256Cbc,
            b"passwd",
        );
        assert_eq!(
            key.as_slice(),
            hex::decode("55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc")
                .unwrap()
                .as_slice()
        );
    }

    #[test]
    fn derive_key_lengths_follow_cipher() {
        let p = params(b"salt", 2);
        assert_eq!(derive_key(&p, Prf::HmacSha224, Cipher::Aes128Cbc, b"x").len(), 16);
        assert_eq!(derive_key(&p, Prf::HmacSha224, Cipher::Aes256Cbc, b"x").len(), 32);
    }

    #[test]
    fn rejects_wrong_iv_length_before_decrypting() {
        for len in [0usize, 8, 15, 17, 32] {
            let iv = vec![0u8; len];
            let err = decrypt_pbes2_pbkdf2(
                &params(b"salt", 1),
                Prf::HmacSha1,
                Cipher::Aes128Cbc,
                &iv,
                &[0u8; 16],
                b"pw",
            )
            .unwrap_err();
            assert_eq!(err, KeycryptError::InvalidIvLength { len });
        }
    }

    #[test]
    fn rejects_misaligned_or_empty_ciphertext() {
        for len in [0usize, 1, 15, 17, 31] {
            let ciphertext = vec![0u8; len];
            let err = decrypt_pbes2_pbkdf2(
                &params(b"salt", 1),
                Prf::HmacSha1,
                Cipher::Aes128Cbc,
                &[0u8; 16],
                &ciphertext,
                b"pw",
            )
            .unwrap_err();
            assert_eq!(err, KeycryptError::InvalidCiphertextLength { len });
        }
    }

    #[test]
    fn padding_accepts_valid_tails() {
        let mut buf = vec![7u8; 15];
        buf.push(0x01);
        assert_eq!(strip_pkcs7_padding(&buf).unwrap(), &[7u8; 15][..]);

        // A full block of padding leaves an empty payload.
        let full = [0x10u8; 16];
        assert_eq!(strip_pkcs7_padding(&full).unwrap(), &[] as &[u8]);

        let mut two_blocks = vec![0xabu8; 28];
        two_blocks.extend_from_slice(&[0x04; 4]);
        assert_eq!(strip_pkcs7_padding(&two_blocks).unwrap().len(), 28);
    }

    #[test]
    fn padding_rejects_short_buffers() {
        assert_eq!(
            strip_pkcs7_padding(&[0x01; 15]),
            Err(KeycryptError::InvalidPadding)
        );
        assert_eq!(strip_pkcs7_padding(&[]), Err(KeycryptError::InvalidPadding));
    }

    #[test]
    fn padding_rejects_out_of_range_pad_byte() {
        // 0x00 and 0x11 (17) are both outside 1..=16.
        let mut buf = [0x02u8; 16];
        buf[15] = 0x00;
        assert_eq!(strip_pkcs7_padding(&buf), Err(KeycryptError::InvalidPadding));
        buf[15] = 0x11;
        assert_eq!(strip_pkcs7_padding(&buf), Err(KeycryptError::InvalidPadding));
    }

    #[test]
    fn padding_rejects_mismatched_tail_bytes() {
        let mut buf = [0xcdu8; 16];
        buf[14] = 0x02;
        buf[15] = 0x03; // claims 3 pad bytes, but buf[13] is 0xcd
        assert_eq!(strip_pkcs7_padding(&buf), Err(KeycryptError::InvalidPadding));
    }
}
