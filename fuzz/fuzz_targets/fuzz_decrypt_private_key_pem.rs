#![no_main]

use libfuzzer_sys::fuzz_target;

/// Keep the harness itself bounded; PEM armor roughly 4/3-inflates the DER.
const MAX_INPUT_BYTES: usize = 96 * 1024;

/// Same bound as the DER target: the iteration count is attacker-controlled,
/// so skip cases whose PBKDF2 cost would stall the run.
const MAX_FUZZ_ITERATIONS: u32 = 1_024;

const PASSWORD: &[u8] = b"fuzz password";

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
    let data = if data.len() > MAX_INPUT_BYTES {
        &data[..MAX_INPUT_BYTES]
    } else {
        data
    };

    // Accept arbitrary bytes as input; treat invalid UTF-8 lossy.
    let text = String::from_utf8_lossy(data);

    if let Ok((_, der)) = pem_rfc7468::decode_vec(text.as_bytes()) {
        if !kdf_cost_is_bounded(&der) {
            return;
        }
    }

    let _ = keycrypt::decrypt_encrypted_private_key_pem(
        &text,
        &keycrypt::PasswordSource::Provided(PASSWORD),
    );
});
