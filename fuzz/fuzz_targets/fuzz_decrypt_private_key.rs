#![no_main]

use libfuzzer_sys::fuzz_target;

/// Keep the harness itself bounded.
///
/// Encrypted PKCS#8 envelopes are small in practice; larger inputs only slow
/// the DER parser down without reaching new code.
const MAX_INPUT_BYTES: usize = 64 * 1024;

/// The PBKDF2 iteration count comes from the input, so a fuzz case can demand
/// billions of HMAC invocations. The library forwards the count verbatim; the
/// harness skips cases that would stall the run on key derivation.
const MAX_FUZZ_ITERATIONS: u32 = 1_024;

fn kdf_cost_is_bounded(der: &[u8]) -> bool {
    let Ok(info) = keycrypt::parse_encrypted_private_key_info(der) else {
        return true;
    };
    if keycrypt::require_pbes2(&info.algorithm).is_err() {
        return true;
    }
    let Ok(params) = keycrypt::decode_pbes2_parameters(&info.algorithm) else {
        return true;
    };
    if keycrypt::require_pbkdf2(&params.kdf).is_err() {
        return true;
    }
    match keycrypt::decode_pbkdf2_parameters(&params.kdf) {
        Ok(kdf) => kdf.iteration_count <= MAX_FUZZ_ITERATIONS,
        Err(_) => true,
    }
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte selects the password so empty and non-UTF-8 passwords get
    // exercised too; the rest is the DER input.
    let (selector, der) = (data[0], &data[1..]);
    let der = if der.len() > MAX_INPUT_BYTES {
        &der[..MAX_INPUT_BYTES]
    } else {
        der
    };

    if !kdf_cost_is_bounded(der) {
        return;
    }

    let password: &[u8] = match selector % 3 {
        0 => b"",
        1 => b"fuzz password",
        _ => b" p\xc3\xa2ss\x00word \xff",
    };
    let _ = keycrypt::decrypt_encrypted_private_key_with_password(der, password);
});
